//! Excel生成（CLI版）
//!
//! 共通ライブラリの excel_core でバッファを作り、ファイルに書き出す

use crate::error::{InvoiceGridError, Result};
use invoice_grid_common::export::excel_core::{generate_invoice_buffer, ExcelOptions};
use invoice_grid_common::{Row, Totals};
use std::path::Path;

pub fn generate_excel(
    view: &[&Row],
    totals: &Totals,
    output_path: &Path,
    title: &str,
    trailer_marker: &str,
) -> Result<()> {
    let options = ExcelOptions {
        title: title.to_string(),
        trailer_marker: trailer_marker.to_string(),
        ..Default::default()
    };

    let buffer = generate_invoice_buffer(view, totals, &options)
        .map_err(InvoiceGridError::ExcelGeneration)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, buffer)?;

    Ok(())
}
