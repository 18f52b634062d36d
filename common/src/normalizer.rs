//! 取り込み正規化モジュール
//!
//! アップロードされた表（行×列の生値）を明細行に変換する。
//!
//! ## 処理フロー
//! 1. 先頭セルがヘッダーマーカー（"SR NO"）の行を探す
//! 2. ヘッダー以降の空行・合計行（"TOTAL"）を読み飛ばす
//! 3. 固定の列位置から各列の値を取り出す
//! 4. 全行を再計算して返す
//!
//! ヘッダー行はデータ領域の開始位置を決めるだけで、
//! 列の対応はヘッダーの文字列ではなく `IMPORT_COLUMNS` で決まる。

use crate::error::{Error, Result};
use crate::parser::to_number;
use crate::recalc::recalculate;
use crate::types::{Cell, CellValue, ColumnKey, Row};
use tracing::debug;

/// 取り込み元の表（行優先）
pub type Grid = Vec<Vec<CellValue>>;

/// 既定のヘッダーマーカー
pub const DEFAULT_HEADER_MARKER: &str = "SR NO";

/// 既定の合計行マーカー
pub const DEFAULT_TRAILER_MARKER: &str = "TOTAL";

/// 列の取り出し方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// 前後の空白を除いた文字列
    Text,
    /// 数値（読めなければ 0）
    Number,
    /// 通し番号（読めなければ出力順の番号）
    Serial,
}

/// 取り込み元の列位置と列キーの対応
#[derive(Debug, Clone, Copy)]
pub struct ImportColumn {
    pub position: usize,
    pub key: ColumnKey,
    pub kind: ImportKind,
}

/// 列位置の対応表
///
/// 取り込み元シートの列配置に合わせた固定値。4, 6, 10, 12列目は使わない。
pub const IMPORT_COLUMNS: [ImportColumn; 10] = [
    ImportColumn { position: 0, key: ColumnKey::SrNo, kind: ImportKind::Serial },
    ImportColumn { position: 1, key: ColumnKey::HsCode, kind: ImportKind::Text },
    ImportColumn { position: 2, key: ColumnKey::HtsCode, kind: ImportKind::Text },
    ImportColumn { position: 3, key: ColumnKey::MarksNos, kind: ImportKind::Text },
    ImportColumn { position: 5, key: ColumnKey::Description, kind: ImportKind::Text },
    ImportColumn { position: 7, key: ColumnKey::Rate, kind: ImportKind::Number },
    ImportColumn { position: 8, key: ColumnKey::Boxes, kind: ImportKind::Number },
    ImportColumn { position: 9, key: ColumnKey::Qty, kind: ImportKind::Number },
    ImportColumn { position: 11, key: ColumnKey::ExchangeRate, kind: ImportKind::Number },
    ImportColumn { position: 13, key: ColumnKey::NetWeight, kind: ImportKind::Number },
];

/// 取り込みオプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// ヘッダー行の先頭セル（大文字小文字は区別しない）
    pub header_marker: String,
    /// 合計行の先頭セル（大文字小文字は区別しない）
    pub trailer_marker: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
            trailer_marker: DEFAULT_TRAILER_MARKER.to_string(),
        }
    }
}

/// 取り込み結果の統計情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// ヘッダー行の位置（0始まり）
    pub header_row: usize,
    /// 取り込んだ行数
    pub imported: usize,
    /// 読み飛ばした空行数
    pub skipped_blank: usize,
    /// 読み飛ばした合計行数
    pub skipped_trailer: usize,
}

/// 表を明細行に変換する
pub fn normalize_grid(grid: &[Vec<CellValue>], options: &ImportOptions) -> Result<Vec<Row>> {
    normalize_grid_with_report(grid, options).map(|(rows, _)| rows)
}

/// 表を明細行に変換し、統計情報も返す
///
/// ヘッダーが見つからない場合は1行も返さない。
/// マーカーが空だと先頭セルが空の行すべてに一致するため拒否する。
pub fn normalize_grid_with_report(
    grid: &[Vec<CellValue>],
    options: &ImportOptions,
) -> Result<(Vec<Row>, ImportReport)> {
    if options.header_marker.trim().is_empty() {
        return Err(Error::EmptyMarker("header"));
    }
    if options.trailer_marker.trim().is_empty() {
        return Err(Error::EmptyMarker("trailer"));
    }
    if grid.is_empty() {
        return Err(Error::EmptySource);
    }

    let header_row = find_header_row(grid, &options.header_marker).ok_or_else(|| {
        Error::HeaderNotFound {
            marker: options.header_marker.clone(),
        }
    })?;
    debug!(header_row, "header row located");

    let trailer = marker_key(&options.trailer_marker);
    let mut report = ImportReport {
        header_row,
        ..Default::default()
    };
    let mut rows = Vec::new();

    for source in &grid[header_row + 1..] {
        if is_blank_row(source) {
            report.skipped_blank += 1;
            continue;
        }
        if first_cell_key(source) == trailer {
            report.skipped_trailer += 1;
            continue;
        }

        let row = build_row(source, rows.len() + 1);
        rows.push(recalculate(&row));
    }

    report.imported = rows.len();
    debug!(
        imported = report.imported,
        skipped_blank = report.skipped_blank,
        skipped_trailer = report.skipped_trailer,
        "grid normalized"
    );

    Ok((rows, report))
}

/// ヘッダー行を探す
pub fn find_header_row(grid: &[Vec<CellValue>], header_marker: &str) -> Option<usize> {
    let marker = marker_key(header_marker);
    grid.iter().position(|row| first_cell_key(row) == marker)
}

fn marker_key(text: &str) -> String {
    text.trim().to_uppercase()
}

fn first_cell_key(row: &[CellValue]) -> String {
    row.first()
        .map(|cell| marker_key(&cell.to_string()))
        .unwrap_or_default()
}

fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

/// 1行分の生値から明細行を組み立てる（再計算前）
fn build_row(source: &[CellValue], output_position: usize) -> Row {
    let mut row = Row::blank(output_position);
    let empty = CellValue::empty();

    for column in IMPORT_COLUMNS.iter() {
        let raw = source.get(column.position).unwrap_or(&empty);
        let cell = row.cell_mut(column.key);
        match column.kind {
            ImportKind::Text => {
                *cell = Cell::input(raw.to_string().trim());
            }
            ImportKind::Number => {
                *cell = Cell::input(to_number(raw));
            }
            ImportKind::Serial => {
                let serial = to_number(raw);
                // 読めない・0 の場合は出力順の番号（Infinity はそのまま）
                let serial = if serial == 0.0 || serial.is_nan() {
                    output_position as f64
                } else {
                    serial
                };
                *cell = Cell::calculated(serial);
            }
        }
    }

    row
}
