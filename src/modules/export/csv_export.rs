//! CSV Export
//!
//! Flattens a record into `path,value` rows.

use anyhow::{Context, Result};

use crate::domain::abi::Record;

pub fn to_csv(record: &Record) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    // Write header
    wtr.write_record(["path", "value"])?;

    let mut rows = Vec::new();
    for (name, value) in record {
        value.for_each_leaf(name, &mut |path, leaf| {
            rows.push([path.to_string(), leaf.to_string()]);
        });
    }

    // Write data rows
    for row in &rows {
        wtr.write_record(row)?;
    }

    let bytes = wtr.into_inner().context("flush csv")?;
    Ok(String::from_utf8(bytes)?)
}
