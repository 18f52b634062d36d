//! Excel/JSON出力の統合テスト

use calamine::{open_workbook_auto, Data, Reader};
use invoice_grid::cli::ExportFormat;
use invoice_grid::export::{self, excel, json};
use invoice_grid_common::{ColumnKey, InvoiceStore};
use tempfile::tempdir;

fn create_test_store() -> InvoiceStore {
    let mut store = InvoiceStore::with_blank_rows(3);
    let lines = [("Steel bolts", "2", "10", "5"), ("Nuts", "1", "4", "20"), ("Washers", "0.5", "2", "100")];
    for (i, (desc, rate, boxes, qty)) in lines.iter().enumerate() {
        store.update_cell(i, ColumnKey::Description, *desc).unwrap();
        store.update_cell(i, ColumnKey::Rate, *rate).unwrap();
        store.update_cell(i, ColumnKey::Boxes, *boxes).unwrap();
        store.update_cell(i, ColumnKey::Qty, *qty).unwrap();
    }
    store
}

#[test]
fn test_excel_generation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("invoice.xlsx");
    let store = create_test_store();

    let result = excel::generate_excel(
        &store.view(),
        &store.totals(),
        &output_path,
        "テストインボイス",
        "TOTAL",
    );
    assert!(result.is_ok(), "Excel生成に失敗: {:?}", result.err());
    assert!(output_path.exists(), "Excelファイルが作成されていない");

    // 読み戻して見出しと行数を確認
    let mut workbook = open_workbook_auto(&output_path).expect("Excelを開けない");
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    let rows: Vec<_> = range.rows().collect();

    // タイトル + 見出し + 3行 + 合計
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0][0], Data::String("テストインボイス".to_string()));
    assert_eq!(rows[1][0], Data::String("Sr No".to_string()));
    assert_eq!(rows[5][0], Data::String("TOTAL".to_string()));
}

#[test]
fn test_excel_generation_filtered_view() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("filtered.xlsx");
    let mut store = create_test_store();
    store.set_filter(ColumnKey::Description, "nuts");

    assert_eq!(store.view().len(), 1);
    excel::generate_excel(&store.view(), &store.totals(), &output_path, "INVOICE", "TOTAL").unwrap();

    let mut workbook = open_workbook_auto(&output_path).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(range.rows().count(), 4);
}

#[test]
fn test_json_generation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("nested").join("invoice.json");
    let mut store = create_test_store();
    store.toggle_sort(ColumnKey::Amount);

    json::generate_json(&store.view(), &output_path).unwrap();

    let content = std::fs::read_to_string(&output_path).unwrap();
    let grid: Vec<Vec<serde_json::Value>> = serde_json::from_str(&content).unwrap();

    assert_eq!(grid.len(), 4);
    assert_eq!(grid[0][0], serde_json::json!("Sr No"));
    // 金額の昇順なので先頭は Nuts (1 × 4 × 20)
    assert_eq!(grid[1][4], serde_json::json!("Nuts"));
}

#[test]
fn test_export_view_both_into_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = create_test_store();

    export::export_view(
        &store.view(),
        &store.totals(),
        &ExportFormat::Both,
        dir.path(),
        "INVOICE",
        "TOTAL",
    )
    .unwrap();

    assert!(dir.path().join("INVOICE.xlsx").exists());
    assert!(dir.path().join("INVOICE.json").exists());
}

#[test]
fn test_excel_generation_empty_view() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("empty.xlsx");
    let store = InvoiceStore::new();

    let result = excel::generate_excel(&store.view(), &store.totals(), &output_path, "EMPTY", "TOTAL");
    assert!(result.is_ok(), "空の明細でもExcelは作成できるべき");
}
