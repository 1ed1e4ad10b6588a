//! Field elements - the atomic slot of a call result buffer

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::abi::DecodeError;

/// Stark field prime: 2^251 + 17 * 2^192 + 1
pub const FELT_PRIME: U256 = U256::from_limbs([1, 0, 0, 0x0800_0000_0000_0011]);

/// Largest felt that still reads as a non-negative signed integer (floor(P / 2))
pub const FELT_HALF_PRIME: U256 = U256::from_limbs([0, 0, 0x8000_0000_0000_0000, 0x0400_0000_0000_0008]);

/// One slot of a flat result buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldElement(U256);

impl FieldElement {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn from_u256(value: U256) -> Self {
        Self(value)
    }

    /// Parse decimal or `0x`-prefixed hex text
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let trimmed = text.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some("") => Err(()),
            Some(hex_digits) => U256::from_str_radix(hex_digits, 16).map_err(|_| ()),
            None if trimmed.is_empty() => Err(()),
            None => U256::from_str_radix(trimmed, 10).map_err(|_| ()),
        };
        parsed
            .map(Self)
            .map_err(|()| DecodeError::InvalidFelt(text.to_string()))
    }

    pub fn value(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Lowercase `0x`-prefixed hex without leading zeros
    pub fn to_hex(&self) -> String {
        format!("0x{:x}", self.0)
    }

    /// Value as a machine index, if it fits
    pub fn to_usize(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for FieldElement {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for FieldElement {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Parse a whole result buffer, failing on the first bad slot
pub fn parse_felts<S: AsRef<str>>(raw: &[S]) -> Result<Vec<FieldElement>, DecodeError> {
    raw.iter().map(|s| FieldElement::parse(s.as_ref())).collect()
}
