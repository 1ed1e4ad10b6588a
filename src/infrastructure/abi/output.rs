//! Function result and event decoding against a parsed ABI

use serde_json::Value;

use super::decoder::{param_key, unique_key, CoreDecoder};
use crate::domain::abi::{
    AbiCatalog, AbiDecoder, DecodeError, DecodeOptions, EventKind, MemberLocation, Record,
    TypeRegistry,
};
use crate::domain::felt::{parse_felts, FieldElement};

/// Decode a raw call result for `function_name` against a raw ABI
///
/// Builds a fresh catalog on every call; use [`CatalogDecoder`] to reuse one.
pub fn decode_function_result<S: AsRef<str>>(
    raw_result: &[S],
    function_name: &str,
    abi: &[Value],
) -> Result<Record, DecodeError> {
    CatalogDecoder::from_abi(abi).decode_function_result(raw_result, function_name)
}

/// Decode a raw event (keys and data) for `event_name` against a raw ABI
pub fn decode_event<S: AsRef<str>>(
    raw_keys: &[S],
    raw_data: &[S],
    event_name: &str,
    abi: &[Value],
) -> Result<Record, DecodeError> {
    let keys = parse_felts(raw_keys)?;
    let data = parse_felts(raw_data)?;
    CatalogDecoder::from_abi(abi).decode_event(event_name, &keys, &data)
}

/// ABI decoder over a parsed catalog
///
/// The catalog and its type registry are built once and only read
/// afterwards; the decoder is `Send + Sync` and can be shared behind an
/// `Arc` across threads.
#[derive(Debug, Clone)]
pub struct CatalogDecoder {
    catalog: AbiCatalog,
    registry: TypeRegistry,
    options: DecodeOptions,
}

impl CatalogDecoder {
    /// Create a decoder with default options
    pub fn new(catalog: AbiCatalog) -> Self {
        Self::with_options(catalog, DecodeOptions::default())
    }

    pub fn with_options(catalog: AbiCatalog, options: DecodeOptions) -> Self {
        let registry = catalog.type_registry();
        Self {
            catalog,
            registry,
            options,
        }
    }

    /// Parse raw ABI entries and build a decoder
    pub fn from_abi(abi: &[Value]) -> Self {
        Self::new(AbiCatalog::build(abi))
    }

    /// Get the underlying catalog
    pub fn catalog(&self) -> &AbiCatalog {
        &self.catalog
    }

    /// Get the struct/enum registry
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decode textual result slots for `function_name`
    ///
    /// The function is resolved before any slot is parsed, so an unknown
    /// name fails with `FunctionNotFound` regardless of the buffer.
    pub fn decode_function_result<S: AsRef<str>>(
        &self,
        raw_result: &[S],
        function_name: &str,
    ) -> Result<Record, DecodeError> {
        if self.catalog.function(function_name).is_none() {
            return Err(DecodeError::FunctionNotFound(function_name.to_string()));
        }
        let result = parse_felts(raw_result)?;
        self.decode_output(function_name, &result)
    }

    fn core(&self) -> CoreDecoder<'_> {
        CoreDecoder::new(&self.registry, self.options)
    }
}

impl AbiDecoder for CatalogDecoder {
    fn decode_output(
        &self,
        function_name: &str,
        result: &[FieldElement],
    ) -> Result<Record, DecodeError> {
        let function = self
            .catalog
            .function(function_name)
            .ok_or_else(|| DecodeError::FunctionNotFound(function_name.to_string()))?;

        let (record, consumed) = self.core().decode_params(&function.outputs, result, 0)?;
        if consumed < result.len() {
            tracing::debug!(
                function = function_name,
                consumed,
                total = result.len(),
                "result buffer has trailing slots"
            );
        }
        Ok(record)
    }

    fn decode_event(
        &self,
        event_name: &str,
        keys: &[FieldElement],
        data: &[FieldElement],
    ) -> Result<Record, DecodeError> {
        let event = self
            .catalog
            .event(event_name)
            .ok_or_else(|| DecodeError::EventNotFound(event_name.to_string()))?;

        if event.kind == EventKind::Enum {
            return Err(DecodeError::UnsupportedType(format!("enum event {}", event.name)));
        }

        let core = self.core();
        let mut record = Record::new();
        // keys[0] is the event selector
        let mut key_offset = 1;
        let mut data_offset = 0;

        for (idx, member) in event.members.iter().enumerate() {
            let (buffer, offset) = match member.location {
                MemberLocation::Key => (keys, &mut key_offset),
                MemberLocation::Data => (data, &mut data_offset),
            };
            let (value, next) = core.decode(&member.kind, buffer, *offset)?;
            *offset = next;
            record.insert(unique_key(&record, member.name.clone(), &member.name, idx), value);
        }

        // Plain inputs follow the members in the data buffer
        for (idx, param) in event.inputs.iter().enumerate() {
            let (value, next) = core.decode(&param.kind, data, data_offset)?;
            data_offset = next;
            let stem = param.name.as_deref().unwrap_or("data");
            record.insert(unique_key(&record, param_key(param, idx), stem, idx), value);
        }

        tracing::debug!(event = %event.name, fields = record.len(), "decoded event");
        Ok(record)
    }
}
