use clap::{Args, Parser, Subcommand};
use invoice_grid_common::{ColumnKey, InvoiceStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "invoice-grid")]
#[command(about = "インボイス明細の取り込み・編集・集計ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Excel/CSVを取り込んでセッションを作成
    Import {
        /// 入力ファイル（xlsx/xls/xlsb/ods/csv）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力セッションファイル（デフォルト: 入力ファイル名.session.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ヘッダー行の先頭セル（設定値を上書き）
        #[arg(long)]
        header_marker: Option<String>,

        /// 合計行の先頭セル（設定値を上書き）
        #[arg(long)]
        trailer_marker: Option<String>,
    },

    /// 空行だけの新規セッションを作成
    New {
        /// 出力セッションファイル
        #[arg(short, long, default_value = "invoice.session.json")]
        output: PathBuf,

        /// 行数
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,
    },

    /// 明細を表示
    Show {
        /// セッションファイル
        #[arg(required = true)]
        session: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        /// 表示行数の上限
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 末尾に空行を追加
    Add {
        /// セッションファイル
        #[arg(required = true)]
        session: PathBuf,

        /// 追加する行数
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// 行を削除（番号は1始まり）
    Remove {
        /// セッションファイル
        #[arg(required = true)]
        session: PathBuf,

        /// 行番号
        #[arg(required = true)]
        row: usize,
    },

    /// セルを更新（行番号は1始まり）
    Set {
        /// セッションファイル
        #[arg(required = true)]
        session: PathBuf,

        /// 行番号
        #[arg(required = true)]
        row: usize,

        /// 列キー（例: qty, rate, description）
        #[arg(required = true)]
        column: ColumnKey,

        /// 値
        #[arg(required = true, allow_hyphen_values = true)]
        value: String,
    },

    /// 対話的に編集
    Edit {
        /// セッションファイル
        #[arg(required = true)]
        session: PathBuf,
    },

    /// 表示中の明細をExcel/JSONに出力
    Export {
        /// セッションファイル
        #[arg(required = true)]
        session: PathBuf,

        /// 出力形式 (excel/json/both)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ドキュメントタイトル（デフォルト: 設定値）
        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// 設定を表示/編集
    Config {
        /// ヘッダー行の先頭セルを設定
        #[arg(long)]
        set_header_marker: Option<String>,

        /// 合計行の先頭セルを設定
        #[arg(long)]
        set_trailer_marker: Option<String>,

        /// Excel出力のタイトルを設定
        #[arg(long)]
        set_title: Option<String>,

        /// 新規行の為替レートを設定
        #[arg(long)]
        set_exchange_rate: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 絞り込み・並べ替えの指定
#[derive(Args, Clone, Debug, Default)]
pub struct ViewArgs {
    /// 絞り込み（列キー=文字列、複数指定可）
    #[arg(long = "filter", value_name = "KEY=PATTERN")]
    pub filters: Vec<FilterArg>,

    /// 並べ替え列（同じ列を繰り返すと昇順/降順を切り替え）
    #[arg(long = "sort", value_name = "KEY")]
    pub sorts: Vec<ColumnKey>,
}

impl ViewArgs {
    /// ストアに絞り込み・並べ替えを適用
    pub fn apply(&self, store: &mut InvoiceStore) {
        for filter in &self.filters {
            store.set_filter(filter.key, filter.pattern.clone());
        }
        for key in &self.sorts {
            store.toggle_sort(*key);
        }
    }
}

/// 絞り込み指定（key=pattern）
#[derive(Clone, Debug, PartialEq)]
pub struct FilterArg {
    pub key: ColumnKey,
    pub pattern: String,
}

impl std::str::FromStr for FilterArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, pattern) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid filter: {}. Use KEY=PATTERN", s))?;
        let key = key.parse::<ColumnKey>().map_err(|e| e.to_string())?;
        Ok(FilterArg {
            key,
            pattern: pattern.to_string(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub enum ExportFormat {
    #[default]
    Excel,
    Json,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use excel, json, or both", s)),
        }
    }
}
