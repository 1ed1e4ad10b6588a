//! Presentation modules
//!
//! - export: JSON, CSV and text rendering of decoded records and catalogs

pub mod export;
