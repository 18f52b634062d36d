//! Excel生成（共通ライブラリ）
//!
//! columns.rs の列定義を使用してインボイス明細のExcelを生成

use crate::columns::COLUMNS;
use crate::export::table::totals_row;
use crate::query::Totals;
use crate::types::{Cell, CellValue, Row};
use rust_xlsxwriter::*;

/// Excel出力オプション
#[derive(Debug, Clone)]
pub struct ExcelOptions {
    /// シート上部のタイトル
    pub title: String,
    /// シート名
    pub sheet_name: String,
    /// 合計行の先頭セル
    pub trailer_marker: String,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        Self {
            title: "COMMERCIAL INVOICE".to_string(),
            sheet_name: "Invoice".to_string(),
            trailer_marker: crate::normalizer::DEFAULT_TRAILER_MARKER.to_string(),
        }
    }
}

/// 明細行の開始位置（タイトル行・見出し行の次）
pub const FIRST_DATA_ROW: u32 = 2;

/// Excelをバッファに生成
///
/// # Arguments
/// * `view` - 出力する行（絞り込み・並べ替え後）
/// * `totals` - 列合計
/// * `options` - 出力オプション
pub fn generate_invoice_buffer(
    view: &[&Row],
    totals: &Totals,
    options: &ExcelOptions,
) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    // フォーマット定義
    let title_format = Format::new()
        .set_bold()
        .set_font_size(14.0)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let header_format = Format::new()
        .set_bold()
        .set_font_size(9.0)
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let input_format = Format::new()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    let calculated_format = input_format
        .clone()
        .set_background_color(Color::RGB(0xEEF4FB))
        .set_num_format("#,##0.00");

    let highlighted_format = input_format
        .clone()
        .set_background_color(Color::RGB(0xFFF59D));

    let totals_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA))
        .set_num_format("#,##0.00");

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(&options.sheet_name)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    // 列幅
    for (col, column) in COLUMNS.iter().enumerate() {
        worksheet
            .set_column_width_pixels(col as u16, column.width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    // タイトル
    let last_col = (COLUMNS.len() - 1) as u16;
    worksheet
        .merge_range(0, 0, 0, last_col, &options.title, &title_format)
        .map_err(|e| format!("タイトル書き込みエラー: {}", e))?;

    // 見出し
    for (col, column) in COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(1, col as u16, column.label, &header_format)
            .map_err(|e| format!("見出し書き込みエラー: {}", e))?;
    }
    worksheet
        .set_freeze_panes(FIRST_DATA_ROW, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    // 明細
    for (i, row) in view.iter().enumerate() {
        let excel_row = FIRST_DATA_ROW + i as u32;
        for (col, column) in COLUMNS.iter().enumerate() {
            let cell = row.cell(column.key);
            let format = if cell.is_highlighted {
                &highlighted_format
            } else if cell.is_calculated {
                &calculated_format
            } else {
                &input_format
            };
            write_cell(worksheet, excel_row, col as u16, cell, format)?;
        }
    }

    // 合計行
    let totals_excel_row = FIRST_DATA_ROW + view.len() as u32;
    for (col, value) in totals_row(totals, &options.trailer_marker).iter().enumerate() {
        let cell = Cell::input(value.clone());
        write_cell(worksheet, totals_excel_row, col as u16, &cell, &totals_format)?;
    }

    // バッファに書き出し
    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: &Format,
) -> Result<(), String> {
    let written = match &cell.value {
        CellValue::Number(n) if n.is_finite() => worksheet.write_number_with_format(row, col, *n, format),
        value => worksheet.write_string_with_format(row, col, value.to_string(), format),
    };
    written
        .map(|_| ())
        .map_err(|e| format!("セル書き込みエラー({}, {}): {}", row, col, e))
}
