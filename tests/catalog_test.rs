//! Catalog building, type parsing and export through the public API

use serde_json::json;
use strk_decode::domain::abi::{EventKind, MemberLocation, PrimitiveKind};
use strk_decode::modules::export::{render, render_catalog, OutputFormat};
use strk_decode::{parse_type, AbiCatalog, AbiDecoder, CatalogDecoder, TypeSchema};

fn contract_abi() -> serde_json::Value {
    json!([
        { "type": "impl", "name": "VaultImpl", "interface_name": "vault::IVault" },
        {
            "type": "struct",
            "name": "vault::Position",
            "members": [
                { "name": "owner", "type": "core::starknet::contract_address::ContractAddress" },
                { "name": "shares", "type": "core::integer::u128" },
                { "name": "pnl", "type": "core::integer::i32" }
            ]
        },
        {
            "type": "interface",
            "name": "vault::IVault",
            "items": [
                {
                    "type": "function",
                    "name": "positions",
                    "inputs": [],
                    "outputs": [{ "type": "core::array::Span::<vault::Position>" }],
                    "state_mutability": "view"
                },
                {
                    "type": "function",
                    "name": "pair",
                    "inputs": [],
                    "outputs": [{ "type": "(core::integer::u8, core::bool)" }],
                    "state_mutability": "view"
                }
            ]
        },
        { "type": "function", "inputs": [] },
        {
            "type": "event",
            "name": "vault::Deposit",
            "kind": "struct",
            "members": [
                { "name": "user", "type": "core::starknet::contract_address::ContractAddress", "kind": "key" },
                { "name": "amount", "type": "core::integer::u128", "kind": "data" }
            ]
        }
    ])
}

#[test]
fn test_catalog_from_wrapped_abi() {
    // 1. Contract class JSON carries the ABI as a string
    let class = json!({ "abi": contract_abi().to_string() });
    let catalog = AbiCatalog::from_json_value(class).unwrap();

    // 2. Interface functions are flattened; malformed entries are skipped
    let names: Vec<_> = catalog.functions().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["positions", "pair"]);
    assert_eq!(catalog.interfaces().len(), 1);
    assert_eq!(catalog.structs().len(), 1);

    // 3. Events keep their key/data split
    let deposit = catalog.event("Deposit").expect("deposit event");
    assert_eq!(deposit.kind, EventKind::Struct);
    assert_eq!(deposit.members[0].location, MemberLocation::Key);
    assert_eq!(deposit.members[1].location, MemberLocation::Data);
}

#[test]
fn test_span_of_structs_and_tuples() {
    let catalog = AbiCatalog::from_json_str(&contract_abi().to_string()).unwrap();
    let decoder = CatalogDecoder::new(catalog);

    // -3 is encoded as P - 3
    let minus_three = "0x800000000000010fffffffffffffffffffffffffffffffffffffffffffffffe";
    let result = strk_decode::parse_felts(&["1", "0xabc", "250", minus_three]).unwrap();
    let record = decoder.decode_output("positions", &result).unwrap();

    let positions = record.get("data").and_then(|v| v.as_array()).unwrap();
    assert_eq!(positions.len(), 1);
    let position = positions[0].as_struct().unwrap();
    assert_eq!(position.get("owner").and_then(|v| v.as_hex()), Some("0xabc"));
    assert_eq!(position.get("pnl").and_then(|v| v.as_int()), Some(-3));

    let result = strk_decode::parse_felts(&["7", "1"]).unwrap();
    let record = decoder.decode_output("pair", &result).unwrap();
    let pair = record.get("data").and_then(|v| v.as_array()).unwrap();
    assert_eq!(pair[0].as_int(), Some(7));
    assert_eq!(pair[1].as_bool(), Some(true));
}

#[test]
fn test_type_descriptors() {
    assert_eq!(
        parse_type("core::array::Span::<core::integer::u64>"),
        TypeSchema::array(TypeSchema::primitive("core::integer::u64"))
    );
    assert_eq!(parse_type("felt*"), TypeSchema::array(TypeSchema::primitive("felt")));
    assert_eq!(parse_type("vault::Position"), TypeSchema::struct_ref("vault::Position"));
    assert_eq!(
        parse_type("core::integer::u256").primitive_kind(),
        Some(PrimitiveKind::U256)
    );
}

#[test]
fn test_export_formats() {
    let catalog = AbiCatalog::from_json_str(&contract_abi().to_string()).unwrap();
    let decoder = CatalogDecoder::new(catalog);
    let result = strk_decode::parse_felts(&["1", "0xabc", "250", "5"]).unwrap();
    let record = decoder.decode_output("positions", &result).unwrap();

    let csv = render(&record, OutputFormat::Csv).unwrap();
    assert_eq!(
        csv,
        "path,value\ndata.0.owner,0xabc\ndata.0.shares,250\ndata.0.pnl,5\n"
    );

    let json: serde_json::Value =
        serde_json::from_str(&render(&record, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["data"][0]["owner"], "0xabc");

    let listing = render_catalog(decoder.catalog(), OutputFormat::Text).unwrap();
    assert!(listing.contains("vault::Deposit(#[key] user: "));
    assert!(listing.contains("interface  vault::IVault [positions, pair]"));
}
