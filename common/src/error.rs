//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Import marker must not be empty: {0}")]
    EmptyMarker(&'static str),

    #[error("Could not find header row with \"{marker}\"")]
    HeaderNotFound { marker: String },

    #[error("Source sheet is empty")]
    EmptySource,

    #[error("Row index {index} is out of range (rows: {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("Column \"{column}\" is calculated and cannot be edited")]
    EditBlocked { column: String },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

impl Error {
    /// 取り込み処理の構造的な失敗か（ストアは変更されない）
    pub fn is_import_failure(&self) -> bool {
        matches!(
            self,
            Error::HeaderNotFound { .. } | Error::EmptySource | Error::EmptyMarker(_)
        )
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
