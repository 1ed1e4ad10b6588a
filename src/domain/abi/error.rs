//! Decode failures

use thiserror::Error;

/// Everything that can stop a decode call.
///
/// All variants are terminal for the call that raised them: no partial
/// record is handed back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("function `{0}` not found in ABI")]
    FunctionNotFound(String),

    #[error("event `{0}` not found in ABI")]
    EventNotFound(String),

    #[error("undefined struct: {0}")]
    UndefinedStruct(String),

    /// A required slot is missing from the buffer
    #[error("invalid {ty} value at offset {offset}")]
    InvalidValue { ty: String, offset: usize },

    /// The slot is present but does not fit the declared integer width
    #[error("{ty} value out of range at offset {offset}")]
    ValueOutOfRange { ty: String, offset: usize },

    #[error("invalid ByteArray: {0}")]
    InvalidByteArray(String),

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A raw result slot is not a decimal or hex number
    #[error("invalid field element `{0}`")]
    InvalidFelt(String),
}

impl DecodeError {
    pub(crate) fn invalid_value(ty: impl Into<String>, offset: usize) -> Self {
        Self::InvalidValue {
            ty: ty.into(),
            offset,
        }
    }

    pub(crate) fn out_of_range(ty: impl Into<String>, offset: usize) -> Self {
        Self::ValueOutOfRange {
            ty: ty.into(),
            offset,
        }
    }
}
