//! 数値変換
//!
//! セルの生値を計算用の数値に変換する。
//! 変換できない値はエラーにせず 0 として扱う。

use crate::types::CellValue;
use regex::Regex;

/// 文字列先頭の数値部分を解析
///
/// 先頭の空白を読み飛ばし、数値として読める最長の接頭辞を使う
/// （"12kg" → 12, "1.5e2x" → 150）。数値部分がなければ None。
pub fn parse_number(text: &str) -> Option<f64> {
    lazy_static::lazy_static! {
        static ref NUMBER_PREFIX_RE: Regex =
            Regex::new(r"^\s*([+-]?)(Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").unwrap();
    }

    let caps = NUMBER_PREFIX_RE.captures(text)?;
    let negative = &caps[1] == "-";
    let body = &caps[2];

    let magnitude = if body == "Infinity" {
        f64::INFINITY
    } else {
        body.parse::<f64>().ok()?
    };

    Some(if negative { -magnitude } else { magnitude })
}

/// 計算用の数値に変換
///
/// 数値はそのまま、文字列は `parse_number`、読めなければ 0。
pub fn to_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_number(s).filter(|n| !n.is_nan()).unwrap_or(0.0),
    }
}

/// 数値として読めるセルか（合計対象の判定用）
pub fn is_numeric(value: &CellValue) -> bool {
    match value {
        CellValue::Number(n) => !n.is_nan(),
        CellValue::Text(s) => parse_number(s).is_some(),
    }
}
