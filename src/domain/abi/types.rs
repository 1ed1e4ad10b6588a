//! Type schema parsing
//!
//! Turns textual Cairo type descriptors such as
//! `core::array::Array::<core::integer::u32>` into a [`TypeSchema`] tree.
//! Parsing never fails: anything unrecognised becomes an unresolved
//! primitive and is reported when (and only if) it is decoded.

use std::fmt;

use serde::Serialize;

/// Parsed shape of an ABI type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeSchema {
    /// A leaf type, kept verbatim (short or fully qualified name)
    Primitive { name: String },
    /// Length-prefixed sequence (`Array::<T>`, `Span::<T>`, legacy `T*`)
    Array { element: Box<TypeSchema> },
    /// Named struct; members are resolved from the registry at decode time
    StructRef { name: String },
    /// `(T1, T2, ...)`, serialized as its items back to back
    Tuple { items: Vec<TypeSchema> },
}

impl TypeSchema {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive { name: name.into() }
    }

    pub fn array(element: TypeSchema) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    pub fn struct_ref(name: impl Into<String>) -> Self {
        Self::StructRef { name: name.into() }
    }

    /// Primitive kind, if this is a known primitive
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive { name } => PrimitiveKind::from_name(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { name } | Self::StructRef { name } => f.write_str(name),
            Self::Array { element } => write!(f, "core::array::Array::<{element}>"),
            Self::Tuple { items } => {
                f.write_str("(")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Primitive types the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Felt,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    I8,
    I16,
    I32,
    I64,
    I128,
    ContractAddress,
    ClassHash,
    EthAddress,
    Bytes31,
    ByteArray,
}

impl PrimitiveKind {
    /// Match a short alias or fully qualified name
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" | "core::bool" => Self::Bool,
            "felt" | "felt252" | "core::felt252" => Self::Felt,
            "u8" | "core::integer::u8" => Self::U8,
            "u16" | "core::integer::u16" => Self::U16,
            "u32" | "core::integer::u32" => Self::U32,
            "u64" | "core::integer::u64" => Self::U64,
            "u128" | "core::integer::u128" => Self::U128,
            "u256" | "uint256" | "core::integer::u256" => Self::U256,
            "i8" | "core::integer::i8" => Self::I8,
            "i16" | "core::integer::i16" => Self::I16,
            "i32" | "core::integer::i32" => Self::I32,
            "i64" | "core::integer::i64" => Self::I64,
            "i128" | "core::integer::i128" => Self::I128,
            "contract_address" | "core::starknet::contract_address::ContractAddress" => {
                Self::ContractAddress
            }
            "class_hash" | "core::starknet::class_hash::ClassHash" => Self::ClassHash,
            "eth_address" | "core::starknet::eth_address::EthAddress" => Self::EthAddress,
            "bytes31" | "core::bytes_31::bytes31" => Self::Bytes31,
            "ByteArray" | "core::byte_array::ByteArray" => Self::ByteArray,
            _ => return None,
        };
        Some(kind)
    }

    /// Bit width and signedness for the fixed-width integer kinds
    pub fn integer_width(self) -> Option<(usize, bool)> {
        match self {
            Self::U8 => Some((8, false)),
            Self::U16 => Some((16, false)),
            Self::U32 => Some((32, false)),
            Self::U64 => Some((64, false)),
            Self::U128 => Some((128, false)),
            Self::I8 => Some((8, true)),
            Self::I16 => Some((16, true)),
            Self::I32 => Some((32, true)),
            Self::I64 => Some((64, true)),
            Self::I128 => Some((128, true)),
            _ => None,
        }
    }
}

/// Anything `parse_type` accepts: descriptor text or an already parsed schema
pub trait IntoTypeSchema {
    fn into_type_schema(self) -> TypeSchema;
}

impl IntoTypeSchema for TypeSchema {
    fn into_type_schema(self) -> TypeSchema {
        self
    }
}

impl IntoTypeSchema for &TypeSchema {
    fn into_type_schema(self) -> TypeSchema {
        self.clone()
    }
}

impl IntoTypeSchema for &str {
    fn into_type_schema(self) -> TypeSchema {
        parse_descriptor(self)
    }
}

impl IntoTypeSchema for &String {
    fn into_type_schema(self) -> TypeSchema {
        parse_descriptor(self)
    }
}

impl IntoTypeSchema for String {
    fn into_type_schema(self) -> TypeSchema {
        parse_descriptor(&self)
    }
}

/// Parse a type descriptor; schema nodes pass through unchanged
pub fn parse_type(descriptor: impl IntoTypeSchema) -> TypeSchema {
    descriptor.into_type_schema()
}

fn parse_descriptor(descriptor: &str) -> TypeSchema {
    let descriptor = descriptor.trim();

    if let Some(items) = tuple_items(descriptor) {
        return TypeSchema::Tuple {
            items: items.into_iter().map(parse_descriptor).collect(),
        };
    }

    if let Some(inner) = wrapped_array_element(descriptor) {
        return TypeSchema::array(parse_descriptor(inner));
    }

    // Cairo 0 style `felt*`
    if let Some(base) = descriptor.strip_suffix('*') {
        return TypeSchema::array(parse_descriptor(base));
    }

    if PrimitiveKind::from_name(descriptor).is_some() {
        return TypeSchema::primitive(descriptor);
    }

    if descriptor.contains("::") {
        return TypeSchema::struct_ref(descriptor);
    }

    TypeSchema::primitive(descriptor)
}

/// `path::Array::<Inner>` / `path::Span::<Inner>` -> `Inner`
fn wrapped_array_element(descriptor: &str) -> Option<&str> {
    let open = descriptor.find("::<")?;
    let inner = descriptor[open + 3..].strip_suffix('>')?;
    let container = &descriptor[..open];
    let last_segment = container.rsplit("::").next().unwrap_or(container);
    let is_sequence =
        last_segment.eq_ignore_ascii_case("array") || last_segment.eq_ignore_ascii_case("span");
    is_sequence.then_some(inner)
}

/// Split `(A, B<C, D>, (E, F))` on its top-level commas
fn tuple_items(descriptor: &str) -> Option<Vec<&str>> {
    let inner = descriptor.strip_prefix('(')?.strip_suffix(')')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '(' | '<' | '[' => depth += 1,
            ')' | '>' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(inner[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    let tail = inner[start..].trim();
    // `(T,)` is a one element tuple
    if !tail.is_empty() {
        items.push(tail);
    }
    Some(items)
}
