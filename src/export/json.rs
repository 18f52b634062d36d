//! JSON出力
//!
//! 表示中の行を見出し付きの表（配列の配列）として書き出す

use crate::error::Result;
use invoice_grid_common::export::table::to_grid;
use invoice_grid_common::Row;
use std::path::Path;

pub fn generate_json(view: &[&Row], output_path: &Path) -> Result<()> {
    let grid = to_grid(view);
    let json = serde_json::to_string_pretty(&grid)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, json)?;
    Ok(())
}
