//! ブック読み込みモジュール
//!
//! アップロードされたファイル（xlsx/xls/xlsb/ods/csv）の1枚目のシートを
//! 行×列の生値に変換する。
//!
//! - 空セルは空文字列
//! - 行の順序は保持
//! - 完全な空行は除外

use crate::error::{InvoiceGridError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ByteRecord;
use invoice_grid_common::{CellValue, Grid};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// 入力ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    /// 拡張子から判定
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(InvoiceGridError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// ファイルを読み込んで表に変換
///
/// ファイル読み込みのみ非同期、変換は同期処理。
pub async fn load_grid(path: &Path) -> Result<Grid> {
    if !path.exists() {
        return Err(InvoiceGridError::FileNotFound(path.display().to_string()));
    }

    let format = SourceFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "source file read");

    decode_grid(bytes, format)
}

/// バイト列を表に変換
pub fn decode_grid(bytes: Vec<u8>, format: SourceFormat) -> Result<Grid> {
    match format {
        SourceFormat::Workbook => decode_workbook(bytes),
        SourceFormat::Csv => decode_csv(&bytes),
    }
}

/// ブックの1枚目のシートを変換
pub fn decode_workbook(bytes: Vec<u8>) -> Result<Grid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| InvoiceGridError::WorkbookRead(format!("ブックを開けません: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range
            .map_err(|e| InvoiceGridError::WorkbookRead(format!("シート読み込みエラー: {}", e)))?,
        // シートなし
        None => return Ok(Grid::new()),
    };

    // Range は最初の非空セルから始まるので、列位置を合わせるため左側を埋める
    let leading_cols = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let grid: Grid = range
        .rows()
        .map(|row| {
            std::iter::repeat_with(CellValue::empty)
                .take(leading_cols)
                .chain(row.iter().map(data_to_value))
                .collect::<Vec<_>>()
        })
        .filter(|row| !is_blank(row))
        .collect();

    debug!(rows = grid.len(), leading_cols, "workbook decoded");
    Ok(grid)
}

fn data_to_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::empty(),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // シリアル値のまま
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("{:?}", e)),
    }
}

/// CSVを変換
///
/// 引用符内の改行・カンマはフィールドの一部。列数は行ごとに違ってよい。
/// 数値として完全に読めるフィールドは数値、それ以外は文字列。
pub fn decode_csv(bytes: &[u8]) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Grid::new();
    let mut record = ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .map_err(|e| InvoiceGridError::CsvRead(e.to_string()))?
    {
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| csv_value(&String::from_utf8_lossy(field)))
            .collect();
        if !is_blank(&row) {
            grid.push(row);
        }
    }

    debug!(rows = grid.len(), "csv decoded");
    Ok(grid)
}

fn csv_value(field: &str) -> CellValue {
    let trimmed = field.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if !trimmed.is_empty() && n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

fn is_blank(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}
