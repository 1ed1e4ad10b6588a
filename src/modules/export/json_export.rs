//! JSON Export

use anyhow::Result;

use crate::domain::abi::Record;

/// Pretty JSON, keeping field order
pub fn to_json(record: &Record) -> Result<String> {
    Ok(serde_json::to_string_pretty(record)?)
}
