//! ABI decoder trait and options

use serde::{Deserialize, Serialize};

use super::{DecodeError, Record};
use crate::domain::felt::FieldElement;

/// Byte arrays longer than this many full words are treated as plain felts
pub const DEFAULT_MAX_BYTE_ARRAY_WORDS: usize = 1000;

/// How a bare `felt252` that looks like a packed byte array is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeltStringPolicy {
    /// Decode as a byte array when the following slots fit the layout
    #[default]
    Heuristic,
    /// Always one slot, rendered as hex
    Strict,
}

/// Knobs for the core decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub felt_strings: FeltStringPolicy,
    pub max_byte_array_words: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            felt_strings: FeltStringPolicy::Heuristic,
            max_byte_array_words: DEFAULT_MAX_BYTE_ARRAY_WORDS,
        }
    }
}

/// Trait for ABI-driven decoding of call results and events
///
/// Implementations hold a parsed ABI and are read-only once built, so a
/// single decoder can be shared across threads.
pub trait AbiDecoder: Send + Sync {
    /// Decode the result buffer of a call to `function_name`
    ///
    /// # Returns
    /// * `Ok(Record)` - outputs keyed by name (or `data`, `data1`, ... when unnamed)
    /// * `Err(DecodeError::FunctionNotFound)` - if the ABI has no such function
    /// * `Err(...)` - if the buffer does not match the declared outputs
    fn decode_output(
        &self,
        function_name: &str,
        result: &[FieldElement],
    ) -> Result<Record, DecodeError>;

    /// Decode an emitted event from its keys and data
    ///
    /// `keys[0]` is the event selector and is not decoded.
    fn decode_event(
        &self,
        event_name: &str,
        keys: &[FieldElement],
        data: &[FieldElement],
    ) -> Result<Record, DecodeError>;
}
