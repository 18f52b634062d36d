use crate::error::{InvoiceGridError, Result};
use invoice_grid_common::normalizer::{DEFAULT_HEADER_MARKER, DEFAULT_TRAILER_MARKER};
use invoice_grid_common::ImportOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ヘッダー行の先頭セル
    pub header_marker: String,
    /// 合計行の先頭セル
    pub trailer_marker: String,
    /// Excel出力のタイトル
    pub default_title: String,
    /// 新規行の為替レート（未設定なら空欄）
    pub default_exchange_rate: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InvoiceGridError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("invoice-grid").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            header_marker: DEFAULT_HEADER_MARKER.into(),
            trailer_marker: DEFAULT_TRAILER_MARKER.into(),
            default_title: "COMMERCIAL INVOICE".into(),
            default_exchange_rate: None,
        }
    }

    /// 取り込みオプション
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            header_marker: self.header_marker.clone(),
            trailer_marker: self.trailer_marker.clone(),
        }
    }

    pub fn set_header_marker(&mut self, marker: String) -> Result<()> {
        if marker.trim().is_empty() {
            return Err(InvoiceGridError::Config("ヘッダーマーカーが空です".into()));
        }
        self.header_marker = marker;
        self.save()
    }

    pub fn set_trailer_marker(&mut self, marker: String) -> Result<()> {
        if marker.trim().is_empty() {
            return Err(InvoiceGridError::Config("合計行マーカーが空です".into()));
        }
        self.trailer_marker = marker;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let config = Config::default();
        let options = config.import_options();
        assert_eq!(options, ImportOptions::default());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: Config = serde_json::from_str(r#"{"header_marker": "No."}"#).unwrap();
        assert_eq!(config.header_marker, "No.");
        assert_eq!(config.trailer_marker, "TOTAL");
        assert_eq!(config.default_exchange_rate, None);
    }
}
