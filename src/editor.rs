//! 対話式編集モジュール
//!
//! セッションファイルを読み込み、行追加・削除・セル更新・絞り込み・並べ替えを
//! 1コマンドずつ入力して実行する。終了時に保存する。

use crate::config::Config;
use crate::display::{describe_state, render_table};
use crate::error::{InvoiceGridError, Result};
use crate::session::SessionFile;
use dialoguer::Input;
use invoice_grid_common::{ActiveCell, ColumnKey, InvoiceStore};
use std::path::Path;

/// 対話アクション
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// 空行を追加
    Add,
    /// 行を削除（1始まり）
    Remove(usize),
    /// セルを更新（1始まり）
    Set(usize, ColumnKey, String),
    /// 絞り込み（空パターンで解除）
    Filter(ColumnKey, String),
    /// 絞り込みをすべて解除
    ClearFilters,
    /// 並び順を切り替え
    Sort(ColumnKey),
    /// 並べ替えを解除
    ClearSort,
    /// 表示
    Show,
    /// ヘルプ
    Help,
    /// 保存して終了
    Quit,
}

const HELP: &str = "操作: add | rm N | set N KEY VALUE | filter KEY [PATTERN] | unfilter | sort KEY | unsort | show | help | q";

/// 入力行を解析
pub fn parse_action(input: &str) -> std::result::Result<EditAction, String> {
    let trimmed = input.trim();
    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    let parse_row = |text: &str| -> std::result::Result<usize, String> {
        text.parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| format!("行番号が不正です: {}", text))
    };
    let parse_key = |text: &str| -> std::result::Result<ColumnKey, String> {
        text.parse::<ColumnKey>().map_err(|e| e.to_string())
    };

    match command {
        "" | "show" | "ls" => Ok(EditAction::Show),
        "add" | "a" => Ok(EditAction::Add),
        "rm" | "remove" => parse_row(rest).map(EditAction::Remove),
        "set" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let row = parse_row(parts.next().unwrap_or(""))?;
            let key = parse_key(parts.next().unwrap_or(""))?;
            let value = parts.next().unwrap_or("").trim().to_string();
            Ok(EditAction::Set(row, key, value))
        }
        "filter" | "f" => {
            let (key, pattern) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Ok(EditAction::Filter(parse_key(key)?, pattern.trim().to_string()))
        }
        "unfilter" => Ok(EditAction::ClearFilters),
        "sort" | "s" => parse_key(rest).map(EditAction::Sort),
        "unsort" => Ok(EditAction::ClearSort),
        "help" | "h" | "?" => Ok(EditAction::Help),
        "q" | "quit" | "exit" => Ok(EditAction::Quit),
        _ => Err(format!("不明なコマンド: {}", command)),
    }
}

/// 1始まりの行番号を位置に変換
fn row_index(row: usize) -> Result<usize> {
    row.checked_sub(1)
        .ok_or_else(|| InvoiceGridError::CliExecution("行番号は1から指定してください".into()))
}

/// アクションを実行（Quit 以外）
///
/// 実行結果のメッセージを返す。
pub fn apply_action(
    store: &mut InvoiceStore,
    action: &EditAction,
    config: &Config,
) -> Result<String> {
    let message = match action {
        EditAction::Add => {
            let index = store.append_row();
            if let Some(rate) = config.default_exchange_rate {
                store.update_cell(index, ColumnKey::ExchangeRate, rate)?;
            }
            format!("行 {} を追加しました", index + 1)
        }
        EditAction::Remove(row) => {
            store.remove_row(row_index(*row)?)?;
            format!("行 {} を削除しました（{}行）", row, store.len())
        }
        EditAction::Set(row, key, value) => {
            let index = row_index(*row)?;
            store.set_active_cell(Some(ActiveCell { row: index, column: *key }));
            let result = store.update_cell(index, *key, value.as_str());
            store.set_active_cell(None);
            result?;
            format!("行 {} の {} を更新しました", row, key)
        }
        EditAction::Filter(key, pattern) => {
            store.set_filter(*key, pattern.clone());
            describe_state(store)
        }
        EditAction::ClearFilters => {
            store.clear_filters();
            describe_state(store)
        }
        EditAction::Sort(key) => {
            store.toggle_sort(*key);
            describe_state(store)
        }
        EditAction::ClearSort => {
            store.clear_sort();
            describe_state(store)
        }
        EditAction::Show => format!(
            "{}\n{}",
            render_table(&store.view(), &store.totals(), &config.trailer_marker),
            describe_state(store)
        ),
        EditAction::Help => HELP.to_string(),
        EditAction::Quit => String::new(),
    };
    Ok(message)
}

/// 対話式で編集
pub fn run_interactive_edit(session_path: &Path, config: &Config) -> Result<()> {
    let mut session = SessionFile::load(session_path)?;
    let mut store = session.clone().into_store();

    println!("📝 {}行を読み込みました", store.len());
    println!("---");
    println!("{}", HELP);
    println!("---\n");

    loop {
        let input: String = Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| InvoiceGridError::CliExecution(e.to_string()))?;

        let action = match parse_action(&input) {
            Ok(action) => action,
            Err(message) => {
                println!("⚠ {}", message);
                continue;
            }
        };

        if action == EditAction::Quit {
            println!("保存して終了します...");
            break;
        }

        // 編集エラーは表示して続行
        match apply_action(&mut store, &action, config) {
            Ok(message) => println!("{}\n", message),
            Err(e) => println!("⚠ {}\n", e),
        }
    }

    // 保存
    session.update_from(&store);
    session.save(session_path)?;
    println!("\n✓ 保存しました: {}", session_path.display());

    Ok(())
}
