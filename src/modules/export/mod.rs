//! Export Module
//!
//! Renders decoded records for the terminal or a file.
//!
//! - JSON: pretty printed, big integers as decimal strings
//! - CSV: one `path,value` row per leaf
//! - Text: aligned `name: value` lines

mod catalog_export;
mod csv_export;
mod json_export;
mod text_export;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::abi::Record;

pub use catalog_export::render_catalog;

/// Output format for decoded records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
    Csv,
}

/// Render a record in the requested format
pub fn render(record: &Record, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json_export::to_json(record),
        OutputFormat::Csv => csv_export::to_csv(record),
        OutputFormat::Text => Ok(text_export::to_text(record)),
    }
}

/// Render a record and write it to `path`, returning the number of top-level fields
pub fn write_record(path: &Path, record: &Record, format: OutputFormat) -> Result<usize> {
    let rendered = render(record, format)?;
    let mut file =
        File::create(path).with_context(|| format!("create {}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(record.len())
}
