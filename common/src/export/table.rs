//! 表形式への書き出し
//!
//! 表示中の行（絞り込み・並べ替え後）を固定の列順で行×列の表にする。

use crate::columns::COLUMNS;
use crate::normalizer::Grid;
use crate::query::Totals;
use crate::types::{CellValue, Row};

/// 見出し行（列ラベル）
pub fn header_row() -> Vec<CellValue> {
    COLUMNS.iter().map(|c| CellValue::from(c.label)).collect()
}

/// 1行分の値
pub fn row_values(row: &Row) -> Vec<CellValue> {
    COLUMNS.iter().map(|c| row.value(c.key).clone()).collect()
}

/// 合計行
///
/// 先頭セルは合計行マーカー、計算列と合計のない列は空欄。
pub fn totals_row(totals: &Totals, trailer_marker: &str) -> Vec<CellValue> {
    COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                CellValue::from(trailer_marker)
            } else {
                totals
                    .get(&c.key)
                    .map(|sum| CellValue::Number(*sum))
                    .unwrap_or_else(CellValue::empty)
            }
        })
        .collect()
}

/// 見出し + 各行の表
pub fn to_grid(view: &[&Row]) -> Grid {
    let mut grid = Vec::with_capacity(view.len() + 1);
    grid.push(header_row());
    grid.extend(view.iter().map(|row| row_values(row)));
    grid
}
