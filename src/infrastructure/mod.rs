//! Infrastructure layer
//!
//! Felt decoding driven by a parsed ABI catalog.

pub mod abi;

pub use abi::{decode_event, decode_function_result, CatalogDecoder};
