//! Decode Starknet felt buffers (call results, event keys and data) into
//! typed values using a contract's Cairo ABI.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod modules;

pub use domain::abi::{
    parse_type, AbiCatalog, AbiDecoder, DecodeError, DecodeOptions, DecodedValue,
    FeltStringPolicy, Record, TypeRegistry, TypeSchema,
};
pub use domain::{parse_felts, FieldElement};
pub use infrastructure::abi::{decode, hex_to_utf8, CoreDecoder};
pub use infrastructure::{decode_event, decode_function_result, CatalogDecoder};
