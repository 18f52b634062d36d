//! 表示用クエリ
//!
//! 絞り込み・並べ替え・列合計を行う。元の行データは変更しない。

use crate::columns::ColumnDescriptor;
use crate::parser::{is_numeric, parse_number, to_number};
use crate::types::{CellValue, ColumnKey, Row};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 列ごとの絞り込み条件（部分一致）
pub type FilterSet = BTreeMap<ColumnKey, String>;

/// 列合計
pub type Totals = BTreeMap<ColumnKey, f64>;

/// 並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// 並べ替え指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub key: ColumnKey,
    pub direction: SortDirection,
}

/// 絞り込み
///
/// 空でない条件すべてについて、セル値の文字列（小文字）が
/// 条件（小文字）を含む行だけを残す。
pub fn filtered_view<'a>(rows: &'a [Row], filters: &FilterSet) -> Vec<&'a Row> {
    let active: Vec<(ColumnKey, String)> = filters
        .iter()
        .filter(|(_, pattern)| !pattern.is_empty())
        .map(|(key, pattern)| (*key, pattern.to_lowercase()))
        .collect();

    rows.iter()
        .filter(|row| {
            active.iter().all(|(key, pattern)| {
                row.value(*key).to_string().to_lowercase().contains(pattern.as_str())
            })
        })
        .collect()
}

/// 並べ替え（安定ソート）
///
/// 同値の行は入力順を保つ（降順でも同じ）。
pub fn sorted_view<'a>(mut rows: Vec<&'a Row>, directive: Option<&SortDirective>) -> Vec<&'a Row> {
    if let Some(directive) = directive {
        rows.sort_by(|a, b| {
            let ordering = compare_values(a.value(directive.key), b.value(directive.key));
            match directive.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }
    rows
}

/// 生値の比較
///
/// 数値として読める値（数値、または数値で始まる文字列）は数値として比較し、
/// 読めない文字列より前に並べる。読めない文字列どうしは文字列比較。
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (sort_key(a), sort_key(b)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
    }
}

enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
}

fn sort_key(value: &CellValue) -> SortKey<'_> {
    match value {
        CellValue::Number(n) => SortKey::Number(*n),
        CellValue::Text(s) => match parse_number(s) {
            Some(n) if !n.is_nan() => SortKey::Number(n),
            _ => SortKey::Text(s),
        },
    }
}

/// 並び順の切り替え
///
/// 同じ列で昇順なら降順、それ以外（別の列・降順・未指定）は昇順。
pub fn toggle_sort_direction(current: Option<&SortDirective>, key: ColumnKey) -> SortDirective {
    let direction = match current {
        Some(current) if current.key == key && current.direction == SortDirection::Asc => {
            SortDirection::Desc
        }
        _ => SortDirection::Asc,
    };
    SortDirective { key, direction }
}

/// 列合計
///
/// 計算列は対象外。数値として読めるセルが1つもない列は結果に含めない。
pub fn column_totals(view: &[&Row], columns: &[ColumnDescriptor]) -> Totals {
    let mut totals = Totals::new();

    for column in columns.iter().filter(|c| !c.is_calculated) {
        let mut summable = false;
        let mut sum = 0.0;

        for row in view {
            let value = row.value(column.key);
            if is_numeric(value) {
                summable = true;
            }
            sum += to_number(value);
        }

        if summable {
            totals.insert(column.key, sum);
        }
    }

    totals
}
