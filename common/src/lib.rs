//! Invoice Grid Common Library
//!
//! 明細行モデル・再計算・取り込み正規化・ストア・クエリ

pub mod types;
pub mod columns;
pub mod parser;
pub mod recalc;
pub mod normalizer;
pub mod query;
pub mod store;
pub mod export;
pub mod error;

pub use types::{Cell, CellValue, ColumnKey, Row};
pub use columns::{ColumnDescriptor, COLUMNS};
pub use recalc::recalculate;
pub use normalizer::{normalize_grid, Grid, ImportOptions, ImportReport};
pub use query::{FilterSet, SortDirection, SortDirective, Totals};
pub use store::{ActiveCell, InvoiceStore};
pub use error::{Error, Result};
