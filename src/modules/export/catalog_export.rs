//! Catalog listing
//!
//! JSON dumps the parsed catalog; text and CSV list one declaration per line.

use anyhow::{Context, Result};

use super::OutputFormat;
use crate::domain::abi::{AbiCatalog, AbiParam, InterfaceItem, MemberLocation};

pub fn render_catalog(catalog: &AbiCatalog, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(catalog)?),
        OutputFormat::Text => {
            let rows = catalog_rows(catalog);
            let width = rows.iter().map(|(kind, _)| kind.len()).max().unwrap_or(0);
            let mut out = String::new();
            for (kind, signature) in rows {
                out.push_str(&format!("{kind:<width$}  {signature}\n"));
            }
            Ok(out)
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            wtr.write_record(["kind", "signature"])?;
            for (kind, signature) in catalog_rows(catalog) {
                wtr.write_record([kind, signature.as_str()])?;
            }
            let bytes = wtr.into_inner().context("flush csv")?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}

fn catalog_rows(catalog: &AbiCatalog) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    for function in catalog.functions() {
        let outputs = function
            .outputs
            .iter()
            .map(|param| param.kind.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut signature = format!("{}({})", function.name, params(&function.inputs));
        if !outputs.is_empty() {
            signature.push_str(&format!(" -> ({outputs})"));
        }
        rows.push(("function", signature));
    }

    for event in catalog.events() {
        let fields = if event.members.is_empty() {
            params(&event.inputs)
        } else {
            event
                .members
                .iter()
                .map(|member| {
                    let tag = match member.location {
                        MemberLocation::Key => "#[key] ",
                        MemberLocation::Data => "",
                    };
                    format!("{tag}{}: {}", member.name, member.kind)
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        rows.push(("event", format!("{}({fields})", event.name)));
    }

    for def in catalog.structs() {
        rows.push(("struct", format!("{} {{ {} }}", def.name, params(&def.members))));
    }

    for def in catalog.enums() {
        rows.push(("enum", format!("{} {{ {} }}", def.name, params(&def.variants))));
    }

    for interface in catalog.interfaces() {
        let items = interface
            .items
            .iter()
            .map(|item| match item {
                InterfaceItem::Function(function) => function.name.as_str(),
                InterfaceItem::Event(event) => event.name.as_str(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(("interface", format!("{} [{items}]", interface.name)));
    }

    rows
}

fn params(params: &[AbiParam]) -> String {
    params
        .iter()
        .map(|param| match &param.name {
            Some(name) => format!("{name}: {}", param.kind),
            None => param.kind.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> AbiCatalog {
        AbiCatalog::build(&[
            json!({"type": "struct", "name": "demo::Point", "members": [
                {"name": "x", "type": "core::felt252"},
                {"name": "y", "type": "core::felt252"}
            ]}),
            json!({"type": "function", "name": "get_point", "inputs": [
                {"name": "id", "type": "core::integer::u32"}
            ], "outputs": [{"type": "demo::Point"}], "state_mutability": "view"}),
        ])
    }

    #[test]
    fn test_text_listing() {
        let text = render_catalog(&catalog(), OutputFormat::Text).unwrap();
        assert!(text.contains("function  get_point(id: core::integer::u32) -> (demo::Point)"));
        assert!(text.contains("struct    demo::Point { x: core::felt252, y: core::felt252 }"));
    }

    #[test]
    fn test_csv_listing() {
        let csv = render_catalog(&catalog(), OutputFormat::Csv).unwrap();
        assert!(csv.starts_with("kind,signature\n"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_json_dump() {
        let json = render_catalog(&catalog(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["functions"][0]["name"], "get_point");
    }
}
