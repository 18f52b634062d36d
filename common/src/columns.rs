//! 列定義
//!
//! 表示ラベル・表示幅・編集可否を列ごとに固定で持つ。
//! 実行時に変更されることはない。

use crate::types::ColumnKey;

/// 列メタデータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub key: ColumnKey,
    pub label: &'static str,
    /// 表示幅（px）
    pub width: u32,
    pub editable: bool,
    pub is_calculated: bool,
}

const fn input(key: ColumnKey, label: &'static str, width: u32) -> ColumnDescriptor {
    ColumnDescriptor { key, label, width, editable: true, is_calculated: false }
}

const fn calculated(key: ColumnKey, label: &'static str, width: u32) -> ColumnDescriptor {
    ColumnDescriptor { key, label, width, editable: false, is_calculated: true }
}

/// 全列（スキーマ順）
pub const COLUMNS: [ColumnDescriptor; 15] = [
    calculated(ColumnKey::SrNo, "Sr No", 60),
    input(ColumnKey::HsCode, "HS CODE", 100),
    input(ColumnKey::HtsCode, "HTS CODE", 100),
    input(ColumnKey::MarksNos, "MARKS & NOS", 100),
    input(ColumnKey::Description, "DESCRIPTION OF GOODS", 300),
    input(ColumnKey::Rate, "RATE IN USD", 100),
    input(ColumnKey::Boxes, "TOTAL No. OF BOXES", 120),
    input(ColumnKey::Qty, "TOTAL QTY", 100),
    calculated(ColumnKey::ProductValueUsd, "PRODUCT VALUE IN USD", 150),
    input(ColumnKey::ExchangeRate, "EXCHANGE RATE", 120),
    calculated(ColumnKey::ProductValueInr, "PRODUCT VALUE IN INR", 150),
    input(ColumnKey::NetWeight, "Net Weight", 100),
    calculated(ColumnKey::Amount, "AMOUNT", 120),
    calculated(ColumnKey::Discount, "DISCOUNT", 120),
    calculated(ColumnKey::NetAmount, "NET AMOUNT", 120),
];

/// 列キーから列定義を取得
pub fn descriptor(key: ColumnKey) -> &'static ColumnDescriptor {
    // COLUMNS は ColumnKey::ALL と同じ順序
    &COLUMNS[key as usize]
}
