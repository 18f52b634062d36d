use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceGridError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ブック読み込みエラー: {0}")]
    WorkbookRead(String),

    #[error("CSV読み込みエラー: {0}")]
    CsvRead(String),

    #[error("対応していないファイル形式です: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Core(#[from] invoice_grid_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

pub type Result<T> = std::result::Result<T, InvoiceGridError>;
