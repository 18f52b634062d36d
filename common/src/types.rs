//! 明細行の型定義
//!
//! CLIとエクスポートで共有される型:
//! - CellValue: セルの生値（文字列 or 数値）
//! - Cell: 生値 + ハイライト/計算フラグ
//! - ColumnKey: 固定スキーマの列キー
//! - Row: 全列を必ず持つ明細行

use crate::error::Error;
use crate::recalc::recalculate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// セルの生値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 空文字列
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// 空セル判定（空白のみの文字列も空とみなす）
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) if n.is_nan() => write!(f, "NaN"),
            CellValue::Number(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            // -0 は 0 として表示
            CellValue::Number(n) if *n == 0.0 => write!(f, "0"),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// セル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    pub value: CellValue,
    pub is_highlighted: bool,
    pub is_calculated: bool,
}

impl Cell {
    /// ユーザー入力セル
    pub fn input(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// 計算セル
    pub fn calculated(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            is_calculated: true,
            ..Default::default()
        }
    }
}

/// 列キー（スキーマ順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKey {
    SrNo,
    HsCode,
    HtsCode,
    MarksNos,
    Description,
    Rate,
    Boxes,
    Qty,
    #[serde(rename = "productValueUSD")]
    ProductValueUsd,
    ExchangeRate,
    #[serde(rename = "productValueINR")]
    ProductValueInr,
    NetWeight,
    Amount,
    Discount,
    NetAmount,
}

impl ColumnKey {
    /// 全列（スキーマ順）
    pub const ALL: [ColumnKey; 15] = [
        ColumnKey::SrNo,
        ColumnKey::HsCode,
        ColumnKey::HtsCode,
        ColumnKey::MarksNos,
        ColumnKey::Description,
        ColumnKey::Rate,
        ColumnKey::Boxes,
        ColumnKey::Qty,
        ColumnKey::ProductValueUsd,
        ColumnKey::ExchangeRate,
        ColumnKey::ProductValueInr,
        ColumnKey::NetWeight,
        ColumnKey::Amount,
        ColumnKey::Discount,
        ColumnKey::NetAmount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKey::SrNo => "srNo",
            ColumnKey::HsCode => "hsCode",
            ColumnKey::HtsCode => "htsCode",
            ColumnKey::MarksNos => "marksNos",
            ColumnKey::Description => "description",
            ColumnKey::Rate => "rate",
            ColumnKey::Boxes => "boxes",
            ColumnKey::Qty => "qty",
            ColumnKey::ProductValueUsd => "productValueUSD",
            ColumnKey::ExchangeRate => "exchangeRate",
            ColumnKey::ProductValueInr => "productValueINR",
            ColumnKey::NetWeight => "netWeight",
            ColumnKey::Amount => "amount",
            ColumnKey::Discount => "discount",
            ColumnKey::NetAmount => "netAmount",
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnKey {
    type Err = Error;

    /// キー名は大文字小文字を区別しない（"qty", "QTY", "productvalueusd" など）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ColumnKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::UnknownColumn(s.to_string()))
    }
}

/// 明細行
///
/// 列ごとに1フィールドを持つので、欠けた行は表現できない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub sr_no: Cell,
    pub hs_code: Cell,
    pub hts_code: Cell,
    pub marks_nos: Cell,
    pub description: Cell,
    pub rate: Cell,
    pub boxes: Cell,
    pub qty: Cell,
    #[serde(rename = "productValueUSD")]
    pub product_value_usd: Cell,
    pub exchange_rate: Cell,
    #[serde(rename = "productValueINR")]
    pub product_value_inr: Cell,
    pub net_weight: Cell,
    pub amount: Cell,
    pub discount: Cell,
    pub net_amount: Cell,
}

impl Row {
    /// 空行を作成
    ///
    /// 入力セルは空文字列、計算セルは計算済み（すべて0）。
    pub fn blank(sr_no: usize) -> Self {
        let row = Self {
            sr_no: Cell::calculated(sr_no as f64),
            product_value_usd: Cell::calculated(CellValue::empty()),
            product_value_inr: Cell::calculated(CellValue::empty()),
            amount: Cell::calculated(CellValue::empty()),
            discount: Cell::calculated(CellValue::empty()),
            net_amount: Cell::calculated(CellValue::empty()),
            ..Default::default()
        };
        recalculate(&row)
    }

    pub fn cell(&self, key: ColumnKey) -> &Cell {
        match key {
            ColumnKey::SrNo => &self.sr_no,
            ColumnKey::HsCode => &self.hs_code,
            ColumnKey::HtsCode => &self.hts_code,
            ColumnKey::MarksNos => &self.marks_nos,
            ColumnKey::Description => &self.description,
            ColumnKey::Rate => &self.rate,
            ColumnKey::Boxes => &self.boxes,
            ColumnKey::Qty => &self.qty,
            ColumnKey::ProductValueUsd => &self.product_value_usd,
            ColumnKey::ExchangeRate => &self.exchange_rate,
            ColumnKey::ProductValueInr => &self.product_value_inr,
            ColumnKey::NetWeight => &self.net_weight,
            ColumnKey::Amount => &self.amount,
            ColumnKey::Discount => &self.discount,
            ColumnKey::NetAmount => &self.net_amount,
        }
    }

    pub fn cell_mut(&mut self, key: ColumnKey) -> &mut Cell {
        match key {
            ColumnKey::SrNo => &mut self.sr_no,
            ColumnKey::HsCode => &mut self.hs_code,
            ColumnKey::HtsCode => &mut self.hts_code,
            ColumnKey::MarksNos => &mut self.marks_nos,
            ColumnKey::Description => &mut self.description,
            ColumnKey::Rate => &mut self.rate,
            ColumnKey::Boxes => &mut self.boxes,
            ColumnKey::Qty => &mut self.qty,
            ColumnKey::ProductValueUsd => &mut self.product_value_usd,
            ColumnKey::ExchangeRate => &mut self.exchange_rate,
            ColumnKey::ProductValueInr => &mut self.product_value_inr,
            ColumnKey::NetWeight => &mut self.net_weight,
            ColumnKey::Amount => &mut self.amount,
            ColumnKey::Discount => &mut self.discount,
            ColumnKey::NetAmount => &mut self.net_amount,
        }
    }

    /// セルの生値
    pub fn value(&self, key: ColumnKey) -> &CellValue {
        &self.cell(key).value
    }
}
