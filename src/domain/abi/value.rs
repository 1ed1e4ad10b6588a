//! Decoded value tree

use std::fmt;

use alloy_primitives::{I256, U256};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// One decoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Bool(bool),
    /// 8/16/32-bit integers, signed or unsigned
    Int(i64),
    /// u64, u128, u256 and bytes31
    BigUint(U256),
    /// i64 and i128
    BigInt(I256),
    /// Felts, addresses, class hashes and byte arrays
    Hex(String),
    Array(Vec<DecodedValue>),
    Struct(Record),
}

impl DecodedValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_biguint(&self) -> Option<U256> {
        match self {
            Self::BigUint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<I256> {
        match self {
            Self::BigInt(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_hex(&self) -> Option<&str> {
        match self {
            Self::Hex(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Record> {
        match self {
            Self::Struct(record) => Some(record),
            _ => None,
        }
    }

    /// Visit every leaf with its dotted path (`point.x`, `items.0`).
    /// Empty arrays and structs are leaves themselves.
    pub fn for_each_leaf<F: FnMut(&str, &DecodedValue)>(&self, prefix: &str, f: &mut F) {
        match self {
            Self::Array(items) if !items.is_empty() => {
                for (idx, item) in items.iter().enumerate() {
                    item.for_each_leaf(&join_path(prefix, &idx.to_string()), f);
                }
            }
            Self::Struct(record) if !record.is_empty() => {
                for (name, value) in record.iter() {
                    value.for_each_leaf(&join_path(prefix, name), f);
                }
            }
            leaf => f(prefix, leaf),
        }
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::BigUint(u) => write!(f, "{u}"),
            Self::BigInt(i) => write!(f, "{i}"),
            Self::Hex(s) => f.write_str(s),
            Self::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Struct(record) => write!(f, "{record}"),
        }
    }
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            // Decimal strings keep full precision in JSON
            Self::BigUint(u) => serializer.collect_str(u),
            Self::BigInt(i) => serializer.collect_str(i),
            Self::Hex(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Struct(record) => record.serialize(serializer),
        }
    }
}

/// Name-keyed record that keeps declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, DecodedValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field; an existing name keeps its position and takes the new value
    pub fn insert(&mut self, name: impl Into<String>, value: DecodedValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_value(self) -> DecodedValue {
        DecodedValue::Struct(self)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (name, value)) in self.fields.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a (String, DecodedValue);
    type IntoIter = std::slice::Iter<'a, (String, DecodedValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
