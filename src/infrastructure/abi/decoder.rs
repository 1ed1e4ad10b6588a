//! Core felt decoder
//!
//! Walks a flat felt buffer and a [`TypeSchema`] in lock-step. Every decode
//! step returns the value together with the next unread offset, so the
//! cursor is threaded through the recursion explicitly.

use alloy_primitives::{Sign, I256, U256};

use super::byte_array::{byte_array_candidate, read_byte_array, read_candidate};
use crate::domain::abi::{
    AbiParam, DecodeError, DecodeOptions, DecodedValue, FeltStringPolicy, PrimitiveKind, Record,
    StructDef, TypeRegistry, TypeSchema,
};
use crate::domain::felt::{FieldElement, FELT_HALF_PRIME, FELT_PRIME};

/// Nesting depth at which decoding gives up (guards cyclic struct definitions)
const MAX_DEPTH: usize = 128;

/// Decode one value with default options
pub fn decode(
    schema: &TypeSchema,
    buffer: &[FieldElement],
    offset: usize,
    registry: &TypeRegistry,
) -> Result<(DecodedValue, usize), DecodeError> {
    CoreDecoder::new(registry, DecodeOptions::default()).decode(schema, buffer, offset)
}

/// Record key for a parameter: its name, or `data`, `data1`, ... when unnamed
pub fn param_key(param: &AbiParam, idx: usize) -> String {
    match &param.name {
        Some(name) => name.clone(),
        None if idx == 0 => "data".to_string(),
        None => format!("data{idx}"),
    }
}

/// `key` if the record does not hold it yet, else the first free
/// `{stem}{n}` with `n > idx`
pub(crate) fn unique_key(record: &Record, key: String, stem: &str, idx: usize) -> String {
    if record.get(&key).is_none() {
        return key;
    }
    (idx + 1..)
        .map(|n| format!("{stem}{n}"))
        .find(|candidate| record.get(candidate).is_none())
        .unwrap_or(key)
}

/// Schema-driven decoder borrowing a read-only registry
#[derive(Debug, Clone, Copy)]
pub struct CoreDecoder<'a> {
    registry: &'a TypeRegistry,
    options: DecodeOptions,
}

impl<'a> CoreDecoder<'a> {
    pub fn new(registry: &'a TypeRegistry, options: DecodeOptions) -> Self {
        Self { registry, options }
    }

    /// Decode `schema` starting at `offset`, returning the value and the next offset
    pub fn decode(
        &self,
        schema: &TypeSchema,
        buffer: &[FieldElement],
        offset: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        self.decode_at(schema, buffer, offset, 0)
    }

    /// Decode a resolved struct definition
    pub fn decode_struct_def(
        &self,
        def: &StructDef,
        buffer: &[FieldElement],
        offset: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        let (record, next) = self.decode_params_at(&def.members, buffer, offset, 1)?;
        Ok((DecodedValue::Struct(record), next))
    }

    /// Decode parameters back to back into a record
    pub fn decode_params(
        &self,
        params: &[AbiParam],
        buffer: &[FieldElement],
        offset: usize,
    ) -> Result<(Record, usize), DecodeError> {
        self.decode_params_at(params, buffer, offset, 0)
    }

    fn decode_params_at(
        &self,
        params: &[AbiParam],
        buffer: &[FieldElement],
        mut offset: usize,
        depth: usize,
    ) -> Result<(Record, usize), DecodeError> {
        let mut record = Record::new();
        for (idx, param) in params.iter().enumerate() {
            let (value, next) = self.decode_at(&param.kind, buffer, offset, depth)?;
            let stem = param.name.as_deref().unwrap_or("data");
            record.insert(unique_key(&record, param_key(param, idx), stem, idx), value);
            offset = next;
        }
        Ok((record, offset))
    }

    fn decode_at(
        &self,
        schema: &TypeSchema,
        buffer: &[FieldElement],
        offset: usize,
        depth: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::UnsupportedType(format!(
                "{schema} (nested deeper than {MAX_DEPTH} levels)"
            )));
        }

        match schema {
            TypeSchema::StructRef { name } => self.decode_struct(name, buffer, offset, depth),
            TypeSchema::Array { element } => self.decode_array(schema, element, buffer, offset, depth),
            TypeSchema::Tuple { items } => {
                let mut values = Vec::with_capacity(items.len());
                let mut offset = offset;
                for item in items {
                    let (value, next) = self.decode_at(item, buffer, offset, depth + 1)?;
                    values.push(value);
                    offset = next;
                }
                Ok((DecodedValue::Array(values), offset))
            }
            TypeSchema::Primitive { name } => self.decode_primitive(name, buffer, offset),
        }
    }

    fn decode_struct(
        &self,
        name: &str,
        buffer: &[FieldElement],
        offset: usize,
        depth: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        let Some(def) = self.registry.get_struct(name) else {
            if self.registry.is_enum(name) {
                return Err(DecodeError::UnsupportedType(format!("enum {name}")));
            }
            return Err(DecodeError::UndefinedStruct(name.to_string()));
        };

        let (record, next) = self.decode_params_at(&def.members, buffer, offset, depth + 1)?;
        Ok((DecodedValue::Struct(record), next))
    }

    fn decode_array(
        &self,
        schema: &TypeSchema,
        element: &TypeSchema,
        buffer: &[FieldElement],
        offset: usize,
        depth: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        // A missing length slot reads as an empty array
        let len = match buffer.get(offset) {
            Some(felt) => felt
                .to_usize()
                .ok_or_else(|| DecodeError::invalid_value(schema.to_string(), offset))?,
            None => 0,
        };

        // A count past the remaining slots is rejected; this also bounds
        // zero-width elements (empty structs, `()`)
        let remaining = buffer.len().saturating_sub(offset + 1);
        if len > remaining {
            return Err(DecodeError::invalid_value(schema.to_string(), offset));
        }
        let mut items = Vec::with_capacity(len);
        let mut cursor = offset + 1;
        for _ in 0..len {
            let (value, next) = self.decode_at(element, buffer, cursor, depth + 1)?;
            items.push(value);
            cursor = next;
        }
        Ok((DecodedValue::Array(items), cursor))
    }

    fn decode_primitive(
        &self,
        name: &str,
        buffer: &[FieldElement],
        offset: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        let Some(kind) = PrimitiveKind::from_name(name) else {
            return Err(DecodeError::UnsupportedType(name.to_string()));
        };
        let slot = |at: usize| {
            buffer
                .get(at)
                .copied()
                .ok_or_else(|| DecodeError::invalid_value(name, at))
        };

        match kind {
            PrimitiveKind::Bool => Ok((DecodedValue::Bool(!slot(offset)?.is_zero()), offset + 1)),
            PrimitiveKind::Felt => self.decode_felt(name, buffer, offset),
            PrimitiveKind::U256 => {
                let low = slot(offset)?.value();
                let high = slot(offset + 1)?.value();
                // Only a value past 256 bits is rejected
                let value = (high.bit_len() <= 128)
                    .then(|| low.checked_add(high << 128))
                    .flatten()
                    .ok_or_else(|| DecodeError::out_of_range(name, offset))?;
                Ok((DecodedValue::BigUint(value), offset + 2))
            }
            PrimitiveKind::ContractAddress | PrimitiveKind::ClassHash | PrimitiveKind::EthAddress => {
                Ok((DecodedValue::Hex(slot(offset)?.to_hex()), offset + 1))
            }
            PrimitiveKind::Bytes31 => Ok((DecodedValue::BigUint(slot(offset)?.value()), offset + 1)),
            PrimitiveKind::ByteArray => {
                let (hex, next) =
                    read_byte_array(buffer, offset, self.options.max_byte_array_words)?;
                Ok((DecodedValue::Hex(hex), next))
            }
            PrimitiveKind::U8
            | PrimitiveKind::U16
            | PrimitiveKind::U32
            | PrimitiveKind::U64
            | PrimitiveKind::U128
            | PrimitiveKind::I8
            | PrimitiveKind::I16
            | PrimitiveKind::I32
            | PrimitiveKind::I64
            | PrimitiveKind::I128 => {
                let value = decode_integer(kind, name, slot(offset)?, offset)?;
                Ok((value, offset + 1))
            }
        }
    }

    /// A bare felt, possibly carrying a packed byte array
    fn decode_felt(
        &self,
        name: &str,
        buffer: &[FieldElement],
        offset: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        let felt = buffer
            .get(offset)
            .ok_or_else(|| DecodeError::invalid_value(name, offset))?;

        if self.options.felt_strings == FeltStringPolicy::Heuristic {
            if let Some(data_len) = byte_array_candidate(buffer, offset) {
                if let Some((hex, next)) = read_candidate(buffer, offset, data_len) {
                    tracing::debug!(offset, data_len, "felt decoded as packed byte array");
                    return Ok((DecodedValue::Hex(hex), next));
                }
            }
        }

        Ok((DecodedValue::Hex(felt.to_hex()), offset + 1))
    }
}

/// Fixed-width integer from one felt.
///
/// Unsigned slots are taken as they are: `u8..u32` become `Int` when the
/// value fits an `i64`, wider values stay `BigUint`. Signed values use the
/// field encoding `P - |x|`, so anything above `P / 2` reads as negative,
/// and must fit the declared width.
fn decode_integer(
    kind: PrimitiveKind,
    name: &str,
    felt: FieldElement,
    offset: usize,
) -> Result<DecodedValue, DecodeError> {
    let Some((bits, signed)) = kind.integer_width() else {
        return Err(DecodeError::UnsupportedType(name.to_string()));
    };
    let out_of_range = || DecodeError::out_of_range(name, offset);
    let value = felt.value();

    if !signed {
        return Ok(match i64::try_from(value) {
            Ok(small) if bits <= 32 => DecodedValue::Int(small),
            _ => DecodedValue::BigUint(value),
        });
    }

    let (sign, magnitude) = if value <= FELT_HALF_PRIME {
        (Sign::Positive, value)
    } else if value < FELT_PRIME {
        (Sign::Negative, FELT_PRIME - value)
    } else {
        return Err(out_of_range());
    };

    let limit = U256::from(1u8) << (bits - 1);
    let fits = match sign {
        Sign::Positive => magnitude < limit,
        Sign::Negative => magnitude <= limit,
    };
    if !fits {
        return Err(out_of_range());
    }

    if bits <= 32 {
        let magnitude = i64::from(magnitude.to::<u32>());
        return Ok(DecodedValue::Int(match sign {
            Sign::Positive => magnitude,
            Sign::Negative => -magnitude,
        }));
    }

    I256::checked_from_sign_and_abs(sign, magnitude)
        .map(DecodedValue::BigInt)
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::{parse_type, EnumDef};

    fn felts(values: &[&str]) -> Vec<FieldElement> {
        values
            .iter()
            .map(|v| FieldElement::parse(v).unwrap())
            .collect()
    }

    fn registry() -> TypeRegistry {
        let point = StructDef {
            name: "geo::Point".to_string(),
            members: vec![
                AbiParam::new("x", parse_type("core::integer::u32")),
                AbiParam::new("y", parse_type("core::integer::u32")),
            ],
        };
        let path = StructDef {
            name: "geo::Path".to_string(),
            members: vec![
                AbiParam::new("label", parse_type("core::felt252")),
                AbiParam::new("points", parse_type("core::array::Array::<geo::Point>")),
            ],
        };
        let looped = StructDef {
            name: "geo::Loop".to_string(),
            members: vec![AbiParam::new("next", parse_type("geo::Loop"))],
        };
        let option = EnumDef {
            name: "core::option::Option::<core::integer::u32>".to_string(),
            variants: vec![],
        };
        let empty = StructDef {
            name: "geo::Empty".to_string(),
            members: vec![],
        };
        TypeRegistry::from_defs(vec![point, path, looped, empty], vec![option])
    }

    fn decode_str(
        ty: &str,
        buffer: &[&str],
    ) -> Result<(DecodedValue, usize), DecodeError> {
        decode(&parse_type(ty), &felts(buffer), 0, &registry())
    }

    #[test]
    fn test_struct_point() {
        let (value, next) = decode_str("geo::Point", &["3", "4"]).unwrap();
        let point = value.as_struct().unwrap();
        assert_eq!(point.get("x"), Some(&DecodedValue::Int(3)));
        assert_eq!(point.get("y"), Some(&DecodedValue::Int(4)));
        assert_eq!(next, 2);
    }

    #[test]
    fn test_array_of_u8() {
        let (value, next) =
            decode_str("core::array::Array::<core::integer::u8>", &["2", "10", "20"]).unwrap();
        assert_eq!(
            value,
            DecodedValue::Array(vec![DecodedValue::Int(10), DecodedValue::Int(20)])
        );
        assert_eq!(next, 3);
    }

    #[test]
    fn test_empty_and_missing_array_length() {
        let (value, next) = decode_str("felt*", &["0", "99"]).unwrap();
        assert_eq!(value, DecodedValue::Array(vec![]));
        assert_eq!(next, 1);

        let (value, next) = decode_str("felt*", &[]).unwrap();
        assert_eq!(value, DecodedValue::Array(vec![]));
        assert_eq!(next, 1);
    }

    #[test]
    fn test_nested_struct_array_resolves_registry() {
        let (value, next) =
            decode_str("geo::Path", &["0x616263", "2", "1", "2", "3", "4"]).unwrap();
        let path = value.as_struct().unwrap();
        assert_eq!(path.get("label"), Some(&DecodedValue::Hex("0x616263".into())));
        let points = path.get("points").unwrap().as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[1].as_struct().unwrap().get("y"),
            Some(&DecodedValue::Int(4))
        );
        assert_eq!(next, 6);
    }

    #[test]
    fn test_array_count_past_buffer_fails() {
        let err = decode_str("core::array::Array::<core::integer::u8>", &["3", "1"]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidValue {
                ty: "core::array::Array::<core::integer::u8>".into(),
                offset: 0
            }
        );

        // Nested arrays cannot stretch past the end either
        let err = decode_str("felt**", &["1000000000000"]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { offset: 0, .. }));
    }

    #[test]
    fn test_zero_width_elements_are_bounded() {
        let (value, next) = decode_str("geo::Empty*", &["2", "0", "0"]).unwrap();
        assert_eq!(value.as_array().map(|items| items.len()), Some(2));
        assert_eq!(next, 1);

        let err = decode_str("geo::Empty*", &["20000000"]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { offset: 0, .. }));
        let err = decode_str("()*", &["18446744073709551615"]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { offset: 0, .. }));
    }

    #[test]
    fn test_u256_composition() {
        let low = U256::from(u128::MAX);
        let high = U256::from(7u8);
        let (value, next) = decode_str(
            "core::integer::u256",
            &[&low.to_string(), &high.to_string()],
        )
        .unwrap();
        assert_eq!(value, DecodedValue::BigUint(low + (high << 128)));
        assert_eq!(next, 2);

        let err = decode_str("u256", &["1"]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { offset: 1, .. }));

        // A high half past 128 bits cannot be represented
        let err = decode_str("u256", &["0", "0x100000000000000000000000000000000"]).unwrap_err();
        assert!(matches!(err, DecodeError::ValueOutOfRange { offset: 0, .. }));
    }

    #[test]
    fn test_bool_and_missing_slots() {
        assert_eq!(decode_str("bool", &["0"]).unwrap().0, DecodedValue::Bool(false));
        assert_eq!(decode_str("core::bool", &["1"]).unwrap().0, DecodedValue::Bool(true));
        for ty in ["bool", "u8", "u64", "i128", "contract_address", "bytes31", "felt252"] {
            let err = decode_str(ty, &[]).unwrap_err();
            assert!(
                matches!(err, DecodeError::InvalidValue { offset: 0, .. }),
                "{ty}: {err}"
            );
        }
    }

    #[test]
    fn test_narrow_integers() {
        assert_eq!(decode_str("u8", &["0"]).unwrap().0, DecodedValue::Int(0));
        assert_eq!(decode_str("u32", &["0xffffffff"]).unwrap().0, DecodedValue::Int(4294967295));

        // Unsigned slots are not width checked
        assert_eq!(decode_str("core::integer::u8", &["256"]).unwrap().0, DecodedValue::Int(256));
        let (value, next) = decode_str("u16", &["0x10000000000000000"]).unwrap();
        assert_eq!(value, DecodedValue::BigUint(U256::from(1u8) << 64));
        assert_eq!(next, 1);
    }

    #[test]
    fn test_signed_integers_from_field_encoding() {
        let minus_five = (FELT_PRIME - U256::from(5u8)).to_string();
        assert_eq!(decode_str("i8", &[&minus_five]).unwrap().0, DecodedValue::Int(-5));
        assert_eq!(decode_str("i32", &["5"]).unwrap().0, DecodedValue::Int(5));

        let (value, _) = decode_str("core::integer::i128", &[&minus_five]).unwrap();
        assert_eq!(value.as_bigint().unwrap().to_string(), "-5");

        let min_i8 = (FELT_PRIME - U256::from(128u8)).to_string();
        assert_eq!(decode_str("i8", &[&min_i8]).unwrap().0, DecodedValue::Int(-128));
        assert!(decode_str("i8", &["128"]).is_err());
    }

    #[test]
    fn test_wide_unsigned_and_bytes31() {
        let (value, _) = decode_str("u64", &["18446744073709551615"]).unwrap();
        assert_eq!(value, DecodedValue::BigUint(U256::from(u64::MAX)));
        let (value, _) = decode_str("u64", &["0x10000000000000000"]).unwrap();
        assert_eq!(value, DecodedValue::BigUint(U256::from(1u8) << 64));
        let (value, _) = decode_str("core::integer::u128", &["7"]).unwrap();
        assert_eq!(value, DecodedValue::BigUint(U256::from(7u8)));

        let (value, _) = decode_str("core::bytes_31::bytes31", &["0x6869"]).unwrap();
        assert_eq!(value, DecodedValue::BigUint(U256::from(0x6869u32)));
    }

    #[test]
    fn test_addresses_are_hex() {
        let (value, next) = decode_str(
            "core::starknet::contract_address::ContractAddress",
            &["1234"],
        )
        .unwrap();
        assert_eq!(value, DecodedValue::Hex("0x4d2".into()));
        assert_eq!(next, 1);
    }

    #[test]
    fn test_felt_stays_felt_when_large() {
        let (value, next) = decode_str("core::felt252", &["0x48656c6c6f"]).unwrap();
        assert_eq!(value, DecodedValue::Hex("0x48656c6c6f".into()));
        assert_eq!(next, 1);
    }

    #[test]
    fn test_felt_byte_array_heuristic() {
        // [data_len = 0, pending = "Hi", pending_len = 2]
        let buffer = felts(&["0", "0x4869", "2"]);
        let schema = parse_type("felt252");
        let (value, next) = decode(&schema, &buffer, 0, &registry()).unwrap();
        assert_eq!(value, DecodedValue::Hex("0x4869".into()));
        assert_eq!(next, 3);

        let strict = DecodeOptions {
            felt_strings: FeltStringPolicy::Strict,
            ..DecodeOptions::default()
        };
        let registry = registry();
        let (value, next) = CoreDecoder::new(&registry, strict)
            .decode(&schema, &buffer, 0)
            .unwrap();
        assert_eq!(value, DecodedValue::Hex("0x0".into()));
        assert_eq!(next, 1);
    }

    #[test]
    fn test_byte_array_field() {
        let (value, next) =
            decode_str("core::byte_array::ByteArray", &["0", "0x616263", "3"]).unwrap();
        assert_eq!(value, DecodedValue::Hex("0x616263".into()));
        assert_eq!(next, 3);

        let err = decode_str("ByteArray", &[]).unwrap_err();
        assert_eq!(err, DecodeError::InvalidByteArray("missing length".into()));
    }

    #[test]
    fn test_tuples() {
        let (value, next) = decode_str("(core::integer::u8, core::bool)", &["7", "1"]).unwrap();
        assert_eq!(
            value,
            DecodedValue::Array(vec![DecodedValue::Int(7), DecodedValue::Bool(true)])
        );
        assert_eq!(next, 2);

        let (value, next) = decode_str("()", &[]).unwrap();
        assert_eq!(value, DecodedValue::Array(vec![]));
        assert_eq!(next, 0);
    }

    #[test]
    fn test_unknown_shapes() {
        assert_eq!(
            decode_str("geo::Missing", &["1"]).unwrap_err(),
            DecodeError::UndefinedStruct("geo::Missing".into())
        );
        assert!(matches!(
            decode_str("core::option::Option::<core::integer::u32>", &["0", "1"]).unwrap_err(),
            DecodeError::UnsupportedType(_)
        ));
        assert_eq!(
            decode_str("Uint256", &["1"]).unwrap_err(),
            DecodeError::UnsupportedType("Uint256".into())
        );
    }

    #[test]
    fn test_cyclic_struct_is_rejected() {
        let err = decode_str("geo::Loop", &["1"]).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedType(_)));
    }

    #[test]
    fn test_offset_threading() {
        let registry = registry();
        let buffer = felts(&["9", "9", "5", "6"]);
        let core = CoreDecoder::new(&registry, DecodeOptions::default());
        let def = registry.get_struct("geo::Point").unwrap();
        let (value, next) = core.decode_struct_def(def, &buffer, 2).unwrap();
        assert_eq!(value.as_struct().unwrap().get("x"), Some(&DecodedValue::Int(5)));
        assert_eq!(next, 4);
    }

    #[test]
    fn test_param_keys() {
        let named = AbiParam::new("amount", parse_type("u8"));
        let unnamed = AbiParam {
            name: None,
            kind: parse_type("u8"),
        };
        assert_eq!(param_key(&named, 3), "amount");
        assert_eq!(param_key(&unnamed, 0), "data");
        assert_eq!(param_key(&unnamed, 2), "data2");
    }

    #[test]
    fn test_placeholder_does_not_shadow_named_output() {
        let registry = registry();
        let params = vec![
            AbiParam::new("data1", parse_type("u8")),
            AbiParam {
                name: None,
                kind: parse_type("u8"),
            },
            AbiParam::new("data1", parse_type("u8")),
        ];
        let (record, next) = CoreDecoder::new(&registry, DecodeOptions::default())
            .decode_params(&params, &felts(&["1", "2", "3"]), 0)
            .unwrap();

        assert_eq!(next, 3);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("data1"), Some(&DecodedValue::Int(1)));
        assert_eq!(record.get("data2"), Some(&DecodedValue::Int(2)));
        assert_eq!(record.get("data13"), Some(&DecodedValue::Int(3)));
    }
}
