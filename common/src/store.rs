//! 明細ストア
//!
//! 明細行の一覧と、画面側が参照する一時状態（アクティブセル・絞り込み・
//! 並べ替え・読み込み中フラグ）を保持する。
//!
//! - 通し番号の振り直しは `remove_row` のみ
//! - 並べ替えは保持順を変えない（`view` でのみ反映）
//! - 入力列の編集時は該当行だけ再計算する

use crate::columns::{descriptor, COLUMNS};
use crate::error::{Error, Result};
use crate::normalizer::{normalize_grid_with_report, ImportOptions, ImportReport};
use crate::query::{
    column_totals, filtered_view, sorted_view, toggle_sort_direction, FilterSet, SortDirective,
    Totals,
};
use crate::recalc::{recalculate, triggers_recalc};
use crate::types::{CellValue, ColumnKey, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 編集中のセル位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCell {
    pub row: usize,
    pub column: ColumnKey,
}

/// 明細ストア
#[derive(Debug, Clone, Default)]
pub struct InvoiceStore {
    rows: Vec<Row>,
    active_cell: Option<ActiveCell>,
    filters: FilterSet,
    sort: Option<SortDirective>,
    is_loading: bool,
}

impl InvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の行から作成（再計算はしない）
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    /// 空行をn行持つストアを作成
    pub fn with_blank_rows(count: usize) -> Self {
        let mut store = Self::new();
        for _ in 0..count {
            store.append_row();
        }
        store
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortDirective> {
        self.sort.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn active_cell(&self) -> Option<ActiveCell> {
        self.active_cell
    }

    /// 全行を置き換える（取り込み後に使用、再計算はしない）
    pub fn replace_all(&mut self, rows: Vec<Row>) {
        debug!(rows = rows.len(), "replace all rows");
        self.rows = rows;
        if let Some(active) = self.active_cell {
            if active.row >= self.rows.len() {
                self.active_cell = None;
            }
        }
    }

    /// 表を取り込んで全行を置き換える
    ///
    /// 失敗した場合は現在の行をそのまま残す。
    pub fn import_grid(
        &mut self,
        grid: &[Vec<CellValue>],
        options: &ImportOptions,
    ) -> Result<ImportReport> {
        let (rows, report) = normalize_grid_with_report(grid, options)?;
        self.replace_all(rows);
        Ok(report)
    }

    /// 末尾に空行を追加し、その位置を返す
    pub fn append_row(&mut self) -> usize {
        let index = self.rows.len();
        self.rows.push(Row::blank(index + 1));
        index
    }

    /// 行を削除し、残りの通し番号を振り直す
    pub fn remove_row(&mut self, index: usize) -> Result<Row> {
        self.check_index(index)?;

        let removed = self.rows.remove(index);
        self.renumber();

        if let Some(active) = self.active_cell {
            if active.row >= index {
                self.active_cell = None;
            }
        }

        debug!(index, remaining = self.rows.len(), "row removed");
        Ok(removed)
    }

    /// セルを更新する
    ///
    /// 計算列への書き込みは拒否する。単価・箱数・数量・為替レートの場合は
    /// その行を再計算する。
    pub fn update_cell(
        &mut self,
        row_index: usize,
        key: ColumnKey,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        let column = descriptor(key);
        if !column.editable || column.is_calculated {
            return Err(Error::EditBlocked {
                column: key.to_string(),
            });
        }
        self.check_index(row_index)?;

        let row = &mut self.rows[row_index];
        let cell = row.cell_mut(key);
        cell.value = value.into();
        cell.is_calculated = false;

        if triggers_recalc(key) {
            *row = recalculate(row);
            debug!(row = row_index, column = %key, "row recalculated");
        }

        Ok(())
    }

    /// 絞り込み条件を設定（空文字は解除）
    pub fn set_filter(&mut self, key: ColumnKey, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if pattern.is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, pattern);
        }
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// 並び順を切り替える（昇順 → 降順 → 昇順）
    pub fn toggle_sort(&mut self, key: ColumnKey) -> SortDirective {
        let next = toggle_sort_direction(self.sort.as_ref(), key);
        self.sort = Some(next);
        next
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_active_cell(&mut self, cell: Option<ActiveCell>) {
        self.active_cell = cell;
    }

    /// 絞り込み・並べ替え後の行
    pub fn view(&self) -> Vec<&Row> {
        sorted_view(filtered_view(&self.rows, &self.filters), self.sort.as_ref())
    }

    /// 絞り込み後の列合計
    pub fn totals(&self) -> Totals {
        column_totals(&filtered_view(&self.rows, &self.filters), &COLUMNS)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(Error::InvalidIndex {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    fn renumber(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.sr_no.value = CellValue::Number((i + 1) as f64);
            row.sr_no.is_calculated = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;
    use crate::types::Cell;

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn sr_numbers(rows: &[Row]) -> Vec<f64> {
        rows.iter().filter_map(|r| r.sr_no.value.as_number()).collect()
    }

    #[test]
    fn test_append_row_numbers_sequentially() {
        let mut store = InvoiceStore::new();
        assert_eq!(store.append_row(), 0);
        assert_eq!(store.append_row(), 1);
        assert_eq!(sr_numbers(store.rows()), vec![1.0, 2.0]);
        assert_eq!(store.rows()[1].amount.value, num(0.0));
    }

    #[test]
    fn test_remove_row_renumbers() {
        for remove_at in 0..5 {
            let mut store = InvoiceStore::with_blank_rows(5);
            store.update_cell(remove_at, ColumnKey::Description, "gone").unwrap();

            let removed = store.remove_row(remove_at).unwrap();
            assert_eq!(removed.description.value, CellValue::from("gone"));
            assert_eq!(store.len(), 4);
            assert_eq!(sr_numbers(store.rows()), vec![1.0, 2.0, 3.0, 4.0]);
        }
    }

    #[test]
    fn test_remove_row_out_of_range_is_rejected() {
        let mut store = InvoiceStore::with_blank_rows(2);
        let result = store.remove_row(2);
        assert!(matches!(result, Err(Error::InvalidIndex { index: 2, len: 2 })));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_qty_recalculates() {
        let mut store = InvoiceStore::with_blank_rows(2);
        store.update_cell(0, ColumnKey::Rate, "2").unwrap();
        store.update_cell(0, ColumnKey::Boxes, "3").unwrap();
        store.update_cell(0, ColumnKey::ExchangeRate, "80").unwrap();
        store.update_cell(0, ColumnKey::Qty, "10").unwrap();

        let row = &store.rows()[0];
        assert_eq!(row.product_value_usd.value, num(20.0));
        assert_eq!(row.amount.value, num(60.0));
        assert_eq!(row.discount.value, num(9.0));
        assert_eq!(row.net_amount.value, num(51.0));
        assert_eq!(row.product_value_inr.value, num(1600.0));
        assert!(!row.qty.is_calculated);

        // 他の行は変わらない
        assert_eq!(store.rows()[1], Row::blank(2));
    }

    #[test]
    fn test_update_description_does_not_recalculate() {
        let mut store = InvoiceStore::with_rows(vec![Row {
            rate: Cell::input(num(2.0)),
            qty: Cell::input(num(10.0)),
            // わざと古い計算値を残す
            amount: Cell::calculated(num(999.0)),
            ..Row::blank(1)
        }]);

        store.update_cell(0, ColumnKey::Description, "Steel").unwrap();
        let row = &store.rows()[0];
        assert_eq!(row.description.value, CellValue::from("Steel"));
        assert_eq!(row.amount.value, num(999.0));
    }

    #[test]
    fn test_update_calculated_column_is_blocked() {
        let mut store = InvoiceStore::with_blank_rows(1);
        let before = store.rows()[0].clone();

        for key in [ColumnKey::SrNo, ColumnKey::Amount, ColumnKey::NetAmount] {
            let result = store.update_cell(0, key, "5");
            assert!(matches!(result, Err(Error::EditBlocked { .. })));
        }
        assert_eq!(store.rows()[0], before);
    }

    #[test]
    fn test_update_out_of_range_is_rejected() {
        let mut store = InvoiceStore::with_blank_rows(1);
        let result = store.update_cell(3, ColumnKey::Qty, "1");
        assert!(matches!(result, Err(Error::InvalidIndex { index: 3, len: 1 })));
    }

    #[test]
    fn test_sort_does_not_reorder_storage() {
        let mut store = InvoiceStore::with_blank_rows(3);
        store.update_cell(0, ColumnKey::Qty, num(3.0)).unwrap();
        store.update_cell(1, ColumnKey::Qty, num(1.0)).unwrap();
        store.update_cell(2, ColumnKey::Qty, num(2.0)).unwrap();

        let directive = store.toggle_sort(ColumnKey::Qty);
        assert_eq!(directive.direction, SortDirection::Asc);
        let view: Vec<f64> = store.view().iter().filter_map(|r| r.sr_no.value.as_number()).collect();
        assert_eq!(view, vec![2.0, 3.0, 1.0]);
        assert_eq!(sr_numbers(store.rows()), vec![1.0, 2.0, 3.0]);

        assert_eq!(store.toggle_sort(ColumnKey::Qty).direction, SortDirection::Desc);
        assert_eq!(store.toggle_sort(ColumnKey::Qty).direction, SortDirection::Asc);
    }

    #[test]
    fn test_set_filter_and_clear() {
        let mut store = InvoiceStore::with_blank_rows(2);
        store.update_cell(1, ColumnKey::Description, "Steel").unwrap();

        store.set_filter(ColumnKey::Description, "steel");
        assert_eq!(store.view().len(), 1);

        store.set_filter(ColumnKey::Description, "");
        assert!(store.filters().is_empty());
        assert_eq!(store.view().len(), 2);
    }

    #[test]
    fn test_totals_use_filtered_rows() {
        let mut store = InvoiceStore::with_blank_rows(2);
        store.update_cell(0, ColumnKey::Qty, "4").unwrap();
        store.update_cell(1, ColumnKey::Qty, "6").unwrap();
        store.update_cell(1, ColumnKey::Description, "copper").unwrap();

        assert_eq!(store.totals().get(&ColumnKey::Qty), Some(&10.0));
        store.set_filter(ColumnKey::Description, "copper");
        assert_eq!(store.totals().get(&ColumnKey::Qty), Some(&6.0));
    }

    #[test]
    fn test_import_failure_keeps_rows() {
        let mut store = InvoiceStore::with_blank_rows(3);
        let grid = vec![vec![CellValue::from("no header here")]];

        let result = store.import_grid(&grid, &ImportOptions::default());
        assert!(matches!(result, Err(Error::HeaderNotFound { .. })));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_import_replaces_rows() {
        let mut store = InvoiceStore::with_blank_rows(5);
        let grid = vec![
            vec![CellValue::from("SR NO")],
            vec![num(1.0), CellValue::from("7318")],
        ];
        let report = store.import_grid(&grid, &ImportOptions::default()).unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.rows()[0].hs_code.value, CellValue::from("7318"));
    }

    /// 数量だけを持つ取り込み元の行（数量は10列目）
    fn qty_line(qty: f64) -> Vec<CellValue> {
        let mut line = vec![CellValue::empty(); 10];
        line[9] = num(qty);
        line
    }

    #[test]
    fn test_sort_after_text_edit_of_imported_numbers() {
        let mut store = InvoiceStore::new();
        let grid = vec![
            vec![CellValue::from("SR NO")],
            qty_line(100.0),
            qty_line(20.0),
            qty_line(7.0),
        ];
        store.import_grid(&grid, &ImportOptions::default()).unwrap();
        store.update_cell(2, ColumnKey::Qty, CellValue::from("50")).unwrap();

        store.toggle_sort(ColumnKey::Qty);
        let qty: Vec<String> = store.view().iter().map(|r| r.qty.value.to_string()).collect();
        assert_eq!(qty, vec!["20", "50", "100"]);
    }

    #[test]
    fn test_import_with_empty_marker_keeps_rows() {
        let mut store = InvoiceStore::with_blank_rows(2);
        let grid = vec![vec![CellValue::from("SR NO")], qty_line(3.0)];
        let options = ImportOptions {
            trailer_marker: "  ".to_string(),
            ..Default::default()
        };

        let result = store.import_grid(&grid, &options);
        assert!(matches!(result, Err(Error::EmptyMarker("trailer"))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_active_cell_cleared_on_remove() {
        let mut store = InvoiceStore::with_blank_rows(3);
        store.set_active_cell(Some(ActiveCell { row: 2, column: ColumnKey::Qty }));
        store.remove_row(0).unwrap();
        assert_eq!(store.active_cell(), None);

        store.set_active_cell(Some(ActiveCell { row: 0, column: ColumnKey::Qty }));
        store.remove_row(1).unwrap();
        assert_eq!(store.active_cell(), Some(ActiveCell { row: 0, column: ColumnKey::Qty }));
    }

    #[test]
    fn test_loading_flag_is_advisory() {
        let mut store = InvoiceStore::new();
        store.set_loading(true);
        assert!(store.is_loading());
        store.append_row();
        assert_eq!(store.len(), 1);
        store.set_loading(false);
        assert!(!store.is_loading());
    }
}
