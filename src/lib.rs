pub mod cli;
pub mod config;
pub mod display;
pub mod editor;
pub mod error;
pub mod export;
pub mod reader;
pub mod session;
