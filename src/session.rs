//! セッションファイル
//!
//! 明細行をJSONで保存し、コマンド間で引き継ぐ。
//! 保存するのは常に整合済みのストアなので、読み込み時に再計算はしない。

use crate::error::{InvoiceGridError, Result};
use chrono::{DateTime, Local};
use invoice_grid_common::{InvoiceStore, Row};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// セッションファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    /// バージョン（互換性チェック用）
    pub version: u32,
    /// 保存日時
    pub saved_at: DateTime<Local>,
    /// 取り込み元ファイル
    #[serde(default)]
    pub source: Option<String>,
    /// 明細行
    pub rows: Vec<Row>,
}

impl SessionFile {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(rows: Vec<Row>, source: Option<String>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            saved_at: Local::now(),
            source,
            rows,
        }
    }

    /// セッションファイルを読み込み
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(InvoiceGridError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let session: SessionFile = serde_json::from_reader(reader)?;

        // バージョンチェック
        if session.version != Self::CURRENT_VERSION {
            return Err(InvoiceGridError::Config(format!(
                "セッションファイルのバージョンが違います: {} (対応: {})",
                session.version,
                Self::CURRENT_VERSION
            )));
        }
        Ok(session)
    }

    /// セッションファイルを保存（保存日時を更新）
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        self.saved_at = Local::now();
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// ストアに展開
    pub fn into_store(self) -> InvoiceStore {
        InvoiceStore::with_rows(self.rows)
    }

    /// ストアの内容で行を置き換え
    pub fn update_from(&mut self, store: &InvoiceStore) {
        self.rows = store.rows().to_vec();
    }
}

/// 入力ファイルから既定のセッションパスを決める（invoice.xlsx → invoice.session.json）
pub fn default_session_path(source: &Path) -> std::path::PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    source.with_file_name(format!("{stem}.session.json"))
}
