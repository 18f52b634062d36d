//! 明細の表形式表示

use invoice_grid_common::{Cell, CellValue, InvoiceStore, Row, Totals, COLUMNS};

/// 列の最大表示幅（文字数）
const MAX_COLUMN_WIDTH: usize = 24;

/// セルの表示文字列（計算列は小数2桁）
pub fn format_cell(cell: &Cell) -> String {
    match &cell.value {
        CellValue::Number(n) if cell.is_calculated && n.fract() != 0.0 => format!("{:.2}", n),
        value => value.to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut s: String = text.chars().take(width.saturating_sub(1)).collect();
        s.push('…');
        s
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// 表を組み立てる
///
/// 合計行は計算列を空欄にする。
pub fn render_table(view: &[&Row], totals: &Totals, trailer_marker: &str) -> String {
    let body: Vec<Vec<String>> = view
        .iter()
        .map(|row| COLUMNS.iter().map(|c| format_cell(row.cell(c.key))).collect())
        .collect();

    let totals_line: Vec<String> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| match totals.get(&c.key) {
            _ if i == 0 => trailer_marker.to_string(),
            Some(sum) => CellValue::Number(*sum).to_string(),
            None => String::new(),
        })
        .collect();

    let widths: Vec<usize> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, c)| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.label.chars().count()))
                .chain(std::iter::once(totals_line[i].chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(&truncate(cell, *width), *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let header: Vec<String> = COLUMNS.iter().map(|c| c.label.to_string()).collect();
    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = vec![format_line(header.as_slice()), separator.clone()];
    lines.extend(body.iter().map(|r| format_line(r.as_slice())));
    lines.push(separator);
    lines.push(format_line(totals_line.as_slice()));
    lines.join("\n")
}

/// ストアの状態（絞り込み・並び順・件数）を1行で
pub fn describe_state(store: &InvoiceStore) -> String {
    let filters = if store.filters().is_empty() {
        "なし".to_string()
    } else {
        store
            .filters()
            .iter()
            .map(|(k, p)| format!("{}~\"{}\"", k, p))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let sort = store
        .sort()
        .map(|s| format!("{} {:?}", s.key, s.direction).to_lowercase())
        .unwrap_or_else(|| "なし".to_string());

    format!(
        "表示 {}/{} 行 | 絞り込み: {} | 並び順: {}",
        store.view().len(),
        store.len(),
        filters,
        sort
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_grid_common::ColumnKey;

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&Cell::calculated(CellValue::Number(9.5))), "9.50");
        assert_eq!(format_cell(&Cell::calculated(CellValue::Number(60.0))), "60");
        assert_eq!(format_cell(&Cell::input(CellValue::Number(2.5))), "2.5");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }

    #[test]
    fn test_render_table_contains_totals() {
        let mut store = InvoiceStore::with_blank_rows(2);
        store.update_cell(0, ColumnKey::Qty, "4").unwrap();
        store.update_cell(1, ColumnKey::Qty, "6").unwrap();

        let table = render_table(&store.view(), &store.totals(), "TOTAL");
        let lines: Vec<&str> = table.lines().collect();
        // 見出し + 区切り + 2行 + 区切り + 合計
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Sr No"));
        assert!(lines[5].starts_with("TOTAL"));
        assert!(lines[5].contains("10"));
    }

    #[test]
    fn test_describe_state() {
        let mut store = InvoiceStore::with_blank_rows(3);
        store.set_filter(ColumnKey::Description, "steel");
        store.toggle_sort(ColumnKey::Qty);
        let text = describe_state(&store);
        assert!(text.contains("0/3"));
        assert!(text.contains("description~\"steel\""));
        assert!(text.contains("qty asc"));
    }
}
