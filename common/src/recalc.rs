//! 再計算エンジン
//!
//! 入力列（単価・箱数・数量・為替レート）から計算列を導出する。
//! 金額計算の式はすべてここに集約する。

use crate::parser::to_number;
use crate::types::{Cell, CellValue, ColumnKey, Row};

/// 値引率
pub const DISCOUNT_RATE: f64 = 0.15;

/// 値引上限
pub const DISCOUNT_CAP: f64 = 50.0;

/// 変更時に再計算が必要な列
pub const RECALC_TRIGGERS: [ColumnKey; 4] = [
    ColumnKey::Rate,
    ColumnKey::Boxes,
    ColumnKey::Qty,
    ColumnKey::ExchangeRate,
];

/// 再計算が必要な列か
pub fn triggers_recalc(key: ColumnKey) -> bool {
    RECALC_TRIGGERS.contains(&key)
}

/// 計算結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub product_value_usd: f64,
    pub amount: f64,
    pub discount: f64,
    pub net_amount: f64,
    pub product_value_inr: f64,
}

/// 入力値から計算列を導出
pub fn derive(rate: f64, boxes: f64, qty: f64, exchange_rate: f64) -> Derived {
    let product_value_usd = rate * qty;
    let amount = rate * boxes * qty;
    let discount = (amount * DISCOUNT_RATE).min(DISCOUNT_CAP);

    Derived {
        product_value_usd,
        amount,
        discount,
        net_amount: amount - discount,
        product_value_inr: product_value_usd * exchange_rate,
    }
}

/// 行を再計算
///
/// 常に現在の入力値から計算し直す（差分更新はしない）。
/// 計算列以外はそのまま引き継ぐ。
pub fn recalculate(row: &Row) -> Row {
    let derived = derive(
        to_number(&row.rate.value),
        to_number(&row.boxes.value),
        to_number(&row.qty.value),
        to_number(&row.exchange_rate.value),
    );

    Row {
        product_value_usd: calculated_cell(&row.product_value_usd, derived.product_value_usd),
        amount: calculated_cell(&row.amount, derived.amount),
        discount: calculated_cell(&row.discount, derived.discount),
        net_amount: calculated_cell(&row.net_amount, derived.net_amount),
        product_value_inr: calculated_cell(&row.product_value_inr, derived.product_value_inr),
        ..row.clone()
    }
}

/// ハイライト状態は引き継ぎ、値と計算フラグを上書き
fn calculated_cell(prev: &Cell, value: f64) -> Cell {
    Cell {
        value: CellValue::Number(value),
        is_calculated: true,
        ..prev.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn row_with(rate: CellValue, boxes: CellValue, qty: CellValue, exchange_rate: CellValue) -> Row {
        Row {
            rate: Cell::input(rate),
            boxes: Cell::input(boxes),
            qty: Cell::input(qty),
            exchange_rate: Cell::input(exchange_rate),
            ..Row::blank(1)
        }
    }

    fn number(row: &Row, key: ColumnKey) -> f64 {
        row.value(key).as_number().expect("計算列が数値でない")
    }

    #[test]
    fn test_formula_values() {
        let row = recalculate(&row_with(num(2.0), num(3.0), num(10.0), num(80.0)));
        assert_eq!(number(&row, ColumnKey::ProductValueUsd), 20.0);
        assert_eq!(number(&row, ColumnKey::Amount), 60.0);
        assert_eq!(number(&row, ColumnKey::Discount), 9.0);
        assert_eq!(number(&row, ColumnKey::NetAmount), 51.0);
        assert_eq!(number(&row, ColumnKey::ProductValueInr), 1600.0);
    }

    #[test]
    fn test_discount_cap() {
        let row = recalculate(&row_with(num(100.0), num(10.0), num(10.0), num(0.0)));
        assert_eq!(number(&row, ColumnKey::Amount), 10000.0);
        assert_eq!(number(&row, ColumnKey::Discount), 50.0);
        assert_eq!(number(&row, ColumnKey::NetAmount), 9950.0);
    }

    #[test]
    fn test_text_inputs_are_coerced() {
        let row = recalculate(&row_with("2".into(), "3".into(), "10".into(), "abc".into()));
        assert_eq!(number(&row, ColumnKey::Amount), 60.0);
        assert_eq!(number(&row, ColumnKey::ProductValueInr), 0.0);
        // 入力セルは変換せずそのまま
        assert_eq!(row.rate.value, CellValue::from("2"));
    }

    #[test]
    fn test_idempotent() {
        let once = recalculate(&row_with("1.25".into(), num(4.0), "7".into(), num(83.5)));
        let twice = recalculate(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_calculated_flags_forced() {
        let mut row = row_with(num(1.0), num(1.0), num(1.0), num(1.0));
        row.amount.is_calculated = false;
        row.amount.is_highlighted = true;

        let result = recalculate(&row);
        assert!(result.amount.is_calculated);
        assert!(result.amount.is_highlighted);
    }

    #[test]
    fn test_passthrough_fields() {
        let mut row = row_with(num(1.0), num(1.0), num(1.0), num(1.0));
        row.description = Cell::input("Steel pipes");
        row.net_weight = Cell::input(num(12.5));

        let result = recalculate(&row);
        assert_eq!(result.description, row.description);
        assert_eq!(result.net_weight, row.net_weight);
        assert_eq!(result.sr_no, row.sr_no);
    }

    #[test]
    fn test_triggers() {
        assert!(triggers_recalc(ColumnKey::Qty));
        assert!(triggers_recalc(ColumnKey::ExchangeRate));
        assert!(!triggers_recalc(ColumnKey::Description));
        assert!(!triggers_recalc(ColumnKey::NetWeight));
    }
}
