pub mod excel;
pub mod json;

use crate::cli::ExportFormat;
use crate::error::Result;
use invoice_grid_common::{Row, Totals};
use std::path::Path;

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> std::path::PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_both(output: &Path, title: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        let excel_path = output.join(format!("{}.xlsx", title));
        let json_path = output.join(format!("{}.json", title));
        (excel_path, json_path)
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        let excel_path = parent.join(format!("{}.xlsx", stem));
        let json_path = parent.join(format!("{}.json", stem));
        (excel_path, json_path)
    }
}

/// 表示中の行を出力
pub fn export_view(
    view: &[&Row],
    totals: &Totals,
    format: &ExportFormat,
    output: &Path,
    title: &str,
    trailer_marker: &str,
) -> Result<()> {
    match format {
        ExportFormat::Excel => {
            let output_path = output_path_for_format(output, title, "xlsx");
            println!("- Excelを生成中...");
            excel::generate_excel(view, totals, &output_path, title, trailer_marker)?;
            println!("✔ Excel出力: {}", output_path.display());
        }
        ExportFormat::Json => {
            let output_path = output_path_for_format(output, title, "json");
            println!("- JSONを生成中...");
            json::generate_json(view, &output_path)?;
            println!("✔ JSON出力: {}", output_path.display());
        }
        ExportFormat::Both => {
            let (excel_path, json_path) = output_paths_for_both(output, title);

            println!("- Excelを生成中...");
            excel::generate_excel(view, totals, &excel_path, title, trailer_marker)?;
            println!("✔ Excel出力: {}", excel_path.display());

            println!("- JSONを生成中...");
            json::generate_json(view, &json_path)?;
            println!("✔ JSON出力: {}", json_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_output_path_for_file() {
        let path = output_path_for_format(&PathBuf::from("out/invoice.xlsx"), "INVOICE", "xlsx");
        assert_eq!(path, PathBuf::from("out/invoice.xlsx"));
    }

    #[test]
    fn test_output_path_for_dir_like() {
        let path = output_path_for_format(&PathBuf::from("out"), "INVOICE", "json");
        assert_eq!(path, PathBuf::from("out/INVOICE.json"));
    }

    #[test]
    fn test_output_paths_for_both_with_file() {
        let (excel, json) = output_paths_for_both(&PathBuf::from("out/march.xlsx"), "INVOICE");
        assert_eq!(excel, PathBuf::from("out/march.xlsx"));
        assert_eq!(json, PathBuf::from("out/march.json"));
    }
}
