//! Export core modules shared by the CLI.

pub mod table;

#[cfg(feature = "excel")]
pub mod excel_core;
