//! Domain layer - ABI models, decoded values and field elements

pub mod abi;
pub mod felt;

pub use felt::{parse_felts, FieldElement};
