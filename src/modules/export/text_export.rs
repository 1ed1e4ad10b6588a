//! Plain text rendering
//!
//! One `path: value` line per leaf. Hex leaves that decode to printable
//! UTF-8 also show the text.

use crate::domain::abi::{DecodedValue, Record};
use crate::infrastructure::abi::hex_to_utf8;

pub fn to_text(record: &Record) -> String {
    let mut rows: Vec<(String, String)> = Vec::new();
    for (name, value) in record {
        value.for_each_leaf(name, &mut |path, leaf| {
            rows.push((path.to_string(), render_leaf(leaf)));
        });
    }

    // Values line up one column past the longest `path:` label
    let width = rows.iter().map(|(path, _)| path.len() + 1).max().unwrap_or(0);
    let mut out = String::new();
    for (path, value) in rows {
        let label = format!("{path}:");
        out.push_str(&format!("{label:<width$} {value}\n"));
    }
    out
}

fn render_leaf(value: &DecodedValue) -> String {
    match value {
        DecodedValue::Hex(hex) => match hex_to_utf8(hex) {
            Some(text) => format!("{hex} {text:?}"),
            None => hex.clone(),
        },
        other => other.to_string(),
    }
}
