use clap::Parser;
use invoice_grid::{cli, config, display, editor, error, export, reader, session};
use cli::{Cli, Commands};
use config::Config;
use error::{InvoiceGridError, Result};
use invoice_grid_common::{CellValue, ColumnKey, InvoiceStore};
use session::SessionFile;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Import { input, output, header_marker, trailer_marker } => {
            println!("📥 invoice-grid - 取り込み\n");

            let mut options = config.import_options();
            if let Some(marker) = header_marker {
                options.header_marker = marker;
            }
            if let Some(marker) = trailer_marker {
                options.trailer_marker = marker;
            }

            let mut store = InvoiceStore::new();
            store.set_loading(true);

            // 1. 読み込み
            println!("[1/3] ファイルを読み込み中...");
            let grid = reader::load_grid(&input).await;
            let grid = match grid {
                Ok(grid) => grid,
                Err(e) => {
                    store.set_loading(false);
                    return Err(e);
                }
            };
            println!("✔ {}行を読み込み\n", grid.len());

            // 2. 正規化
            println!("[2/3] 明細を正規化中...");
            let report = store.import_grid(&grid, &options);
            store.set_loading(false);
            let report = match report {
                Ok(report) => report,
                Err(e) if e.is_import_failure() => {
                    println!(
                        "✗ 明細を取り込めませんでした（ヘッダー: \"{}\", 合計行: \"{}\"）",
                        options.header_marker, options.trailer_marker
                    );
                    println!("  --header-marker / --trailer-marker でマーカーを指定できます");
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            };
            println!(
                "✔ {}行を取り込み（ヘッダー: {}行目, 空行: {}, 合計行: {}）\n",
                report.imported,
                report.header_row + 1,
                report.skipped_blank,
                report.skipped_trailer
            );

            // 3. 保存
            println!("[3/3] セッションを保存中...");
            let output = output.unwrap_or_else(|| session::default_session_path(&input));
            let mut session = SessionFile::new(
                store.into_rows(),
                Some(input.display().to_string()),
            );
            session.save(&output)?;
            println!("✔ セッションを保存: {}", output.display());

            println!("\n✅ 取り込み完了");
        }

        Commands::New { output, rows } => {
            let store = InvoiceStore::with_blank_rows(rows);
            let mut session = SessionFile::new(store.into_rows(), None);
            session.save(&output)?;
            println!("✔ {}行の新規セッションを作成: {}", rows, output.display());
        }

        Commands::Show { session, view, limit } => {
            let mut store = SessionFile::load(&session)?.into_store();
            view.apply(&mut store);

            let rows = store.view();
            let shown = limit.map_or(rows.as_slice(), |n| &rows[..n.min(rows.len())]);
            println!("{}", display::render_table(shown, &store.totals(), &config.trailer_marker));
            println!("{}", display::describe_state(&store));
        }

        Commands::Add { session: session_path, count } => {
            let mut session = SessionFile::load(&session_path)?;
            let mut store = session.clone().into_store();

            for _ in 0..count {
                let index = store.append_row();
                if let Some(rate) = config.default_exchange_rate {
                    store.update_cell(index, ColumnKey::ExchangeRate, rate)?;
                }
            }

            session.update_from(&store);
            session.save(&session_path)?;
            println!("✔ {}行を追加しました（{}行）", count, store.len());
        }

        Commands::Remove { session: session_path, row } => {
            let index = row
                .checked_sub(1)
                .ok_or_else(|| InvoiceGridError::CliExecution("行番号は1から指定してください".into()))?;

            let mut session = SessionFile::load(&session_path)?;
            let mut store = session.clone().into_store();
            store.remove_row(index)?;

            session.update_from(&store);
            session.save(&session_path)?;
            println!("✔ 行 {} を削除しました（{}行）", row, store.len());
        }

        Commands::Set { session: session_path, row, column, value } => {
            let index = row
                .checked_sub(1)
                .ok_or_else(|| InvoiceGridError::CliExecution("行番号は1から指定してください".into()))?;

            let mut session = SessionFile::load(&session_path)?;
            let mut store = session.clone().into_store();
            store.update_cell(index, column, CellValue::Text(value))?;

            session.update_from(&store);
            session.save(&session_path)?;

            let updated = &store.rows()[index];
            println!(
                "✔ 行 {} の {} を更新（金額: {} / 正味金額: {}）",
                row,
                column,
                display::format_cell(&updated.amount),
                display::format_cell(&updated.net_amount)
            );
        }

        Commands::Edit { session } => {
            println!("📝 invoice-grid - 対話編集\n");
            editor::run_interactive_edit(&session, &config)?;
        }

        Commands::Export { session, format, output, title, view } => {
            println!("📄 invoice-grid - エクスポート\n");

            let mut store = SessionFile::load(&session)?.into_store();
            view.apply(&mut store);

            let title = title.unwrap_or_else(|| config.default_title.clone());
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));

            export::export_view(
                &store.view(),
                &store.totals(),
                &format,
                &output_dir,
                &title,
                &config.trailer_marker,
            )?;

            println!("\n✅ エクスポート完了");
        }

        Commands::Config { set_header_marker, set_trailer_marker, set_title, set_exchange_rate, show } => {
            let mut config = config;

            if let Some(marker) = set_header_marker {
                config.set_header_marker(marker)?;
                println!("✔ ヘッダーマーカーを設定しました");
            }

            if let Some(marker) = set_trailer_marker {
                config.set_trailer_marker(marker)?;
                println!("✔ 合計行マーカーを設定しました");
            }

            if let Some(title) = set_title {
                config.default_title = title;
                config.save()?;
                println!("✔ タイトルを設定しました");
            }

            if let Some(rate) = set_exchange_rate {
                config.default_exchange_rate = Some(rate);
                config.save()?;
                println!("✔ 為替レートを設定しました");
            }

            if show {
                println!("設定:");
                println!("  ヘッダーマーカー: {}", config.header_marker);
                println!("  合計行マーカー: {}", config.trailer_marker);
                println!("  タイトル: {}", config.default_title);
                println!(
                    "  為替レート: {}",
                    config
                        .default_exchange_rate
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "未設定".to_string())
                );
            }
        }
    }

    Ok(())
}
