//! ABI domain models and contracts
//!
//! This module defines the catalog, type schema and value types for
//! felt-based ABI decoding, independent of the decoder implementation.

mod catalog;
mod decoder;
mod error;
mod registry;
mod types;
mod value;

pub use catalog::{
    AbiCatalog, AbiParam, EnumDef, EventDef, EventKind, EventMember, FunctionDef, InterfaceDef,
    InterfaceItem, MemberLocation, StructDef,
};
pub use decoder::{AbiDecoder, DecodeOptions, FeltStringPolicy, DEFAULT_MAX_BYTE_ARRAY_WORDS};
pub use error::DecodeError;
pub use registry::TypeRegistry;
pub use types::{parse_type, IntoTypeSchema, PrimitiveKind, TypeSchema};
pub use value::{DecodedValue, Record};
