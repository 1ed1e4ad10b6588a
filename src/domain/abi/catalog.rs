//! ABI catalog - functions, events, structs, enums and interfaces parsed
//! from a raw Cairo ABI

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{parse_type, TypeSchema};
use super::TypeRegistry;

/// A named, typed parameter (function input/output, struct member, enum variant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbiParam {
    /// Parameter name (Cairo 1 outputs are usually unnamed)
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TypeSchema,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, kind: TypeSchema) -> Self {
        Self {
            name: Some(name.into()),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDef {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
}

/// How an event lays out its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Cairo 1 struct event: members tagged `key` or `data`
    Struct,
    /// Cairo 1 enum event wrapping other events
    Enum,
    /// Cairo 0 / plain `inputs` event
    Plain,
}

/// Which buffer an event member is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberLocation {
    Key,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventMember {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TypeSchema,
    pub location: MemberLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDef {
    pub name: String,
    pub kind: EventKind,
    pub inputs: Vec<AbiParam>,
    pub members: Vec<EventMember>,
    /// Always empty: enum event variants are not decoded
    pub variants: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDef {
    pub name: String,
    pub members: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterfaceItem {
    Function(FunctionDef),
    Event(EventDef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceDef {
    pub name: String,
    pub items: Vec<InterfaceItem>,
}

/// Parsed ABI.
///
/// Built in one pass over the raw entries and read-only afterwards.
/// Interface functions and events are also flattened into the top-level
/// lists, so a name may appear more than once; lookups return the first
/// declaration in ABI order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AbiCatalog {
    functions: Vec<FunctionDef>,
    events: Vec<EventDef>,
    structs: Vec<StructDef>,
    enums: Vec<EnumDef>,
    interfaces: Vec<InterfaceDef>,
}

impl AbiCatalog {
    /// Build a catalog from raw ABI entries.
    ///
    /// Entries of other kinds (`constructor`, `impl`, `l1_handler`) are
    /// ignored; malformed entries are skipped with a warning.
    pub fn build(entries: &[Value]) -> Self {
        let mut catalog = Self::default();

        for (idx, entry) in entries.iter().enumerate() {
            match RawEntry::deserialize(entry) {
                Ok(raw) => catalog.push_entry(raw),
                Err(err) => {
                    tracing::warn!(index = idx, error = %err, "skipping malformed ABI entry");
                }
            }
        }

        tracing::debug!(
            functions = catalog.functions.len(),
            events = catalog.events.len(),
            structs = catalog.structs.len(),
            enums = catalog.enums.len(),
            interfaces = catalog.interfaces.len(),
            "built ABI catalog"
        );
        catalog
    }

    /// Parse ABI JSON text: either the entry array itself or a contract class
    /// object carrying it under `abi` (as an array or as JSON-encoded text)
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(entries) => Ok(Self::build(&entries)),
            Value::Object(mut object) => match object.remove("abi") {
                Some(Value::Array(entries)) => Ok(Self::build(&entries)),
                Some(Value::String(text)) => Self::from_json_str(&text),
                _ => Err(serde::de::Error::custom(
                    "expected an ABI array or an object with an `abi` field",
                )),
            },
            _ => Err(serde::de::Error::custom("expected an ABI array")),
        }
    }

    fn push_entry(&mut self, raw: RawEntry) {
        match raw {
            RawEntry::Function(function) => self.functions.push(function.into_def()),
            RawEntry::Event(event) => self.events.push(event.into_def()),
            RawEntry::Interface(interface) => {
                let mut items = Vec::new();
                for item in &interface.items {
                    match RawEntry::deserialize(item) {
                        Ok(RawEntry::Function(function)) => {
                            let def = function.into_def();
                            self.functions.push(def.clone());
                            items.push(InterfaceItem::Function(def));
                        }
                        Ok(RawEntry::Event(event)) => {
                            let def = event.into_def();
                            self.events.push(def.clone());
                            items.push(InterfaceItem::Event(def));
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::warn!(
                                interface = %interface.name,
                                error = %err,
                                "skipping malformed interface item"
                            );
                        }
                    }
                }
                self.interfaces.push(InterfaceDef {
                    name: interface.name,
                    items,
                });
            }
            RawEntry::Struct(raw) => self.structs.push(StructDef {
                name: raw.name,
                members: parse_params(raw.members),
            }),
            RawEntry::Enum(raw) => self.enums.push(EnumDef {
                name: raw.name,
                variants: parse_params(raw.variants),
            }),
            RawEntry::Ignored => {}
        }
    }

    /// First function declared under `name`
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// First event declared under `name`, falling back to the first event
    /// whose qualified name ends in `::name`
    pub fn event(&self, name: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.name == name).or_else(|| {
            let suffix = format!("::{name}");
            self.events.iter().find(|e| e.name.ends_with(&suffix))
        })
    }

    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }

    pub fn events(&self) -> &[EventDef] {
        &self.events
    }

    pub fn structs(&self) -> &[StructDef] {
        &self.structs
    }

    pub fn enums(&self) -> &[EnumDef] {
        &self.enums
    }

    pub fn interfaces(&self) -> &[InterfaceDef] {
        &self.interfaces
    }

    /// Struct and enum lookup table for decoding
    pub fn type_registry(&self) -> TypeRegistry {
        TypeRegistry::from_catalog(self)
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawEntry {
    Function(RawFunction),
    Event(RawEvent),
    Interface(RawInterface),
    Struct(RawStruct),
    Enum(RawEnum),
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default, alias = "stateMutability")]
    state_mutability: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    name: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    members: Vec<RawMember>,
    #[serde(default)]
    keys: Vec<RawParam>,
    #[serde(default)]
    data: Vec<RawParam>,
}

/// Cairo 1 event member; `kind` here is the key/data tag
#[derive(Debug, Deserialize)]
struct RawMember {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInterface {
    name: String,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStruct {
    name: String,
    #[serde(default)]
    members: Vec<RawParam>,
}

#[derive(Debug, Deserialize)]
struct RawEnum {
    name: String,
    #[serde(default)]
    variants: Vec<RawParam>,
}

impl RawFunction {
    fn into_def(self) -> FunctionDef {
        FunctionDef {
            name: self.name,
            inputs: parse_params(self.inputs),
            outputs: parse_params(self.outputs),
            state_mutability: self.state_mutability,
        }
    }
}

impl RawEvent {
    fn into_def(self) -> EventDef {
        let kind = match self.kind.as_deref() {
            Some("struct") => EventKind::Struct,
            Some("enum") => EventKind::Enum,
            _ => EventKind::Plain,
        };

        let mut members: Vec<EventMember> = self
            .members
            .into_iter()
            .map(|member| EventMember {
                location: match member.kind.as_deref() {
                    Some("key") => MemberLocation::Key,
                    _ => MemberLocation::Data,
                },
                kind: parse_type(member.ty.as_str()),
                name: member.name,
            })
            .collect();

        // Cairo 0 events list `keys` and `data` separately
        let legacy = self
            .keys
            .into_iter()
            .map(|p| (p, MemberLocation::Key))
            .chain(self.data.into_iter().map(|p| (p, MemberLocation::Data)));
        for (idx, (param, location)) in legacy.enumerate() {
            members.push(EventMember {
                name: param.name.unwrap_or_else(|| format!("arg{idx}")),
                kind: parse_type(param.kind.as_str()),
                location,
            });
        }

        EventDef {
            name: self.name,
            kind,
            inputs: parse_params(self.inputs),
            members,
            variants: Vec::new(),
        }
    }
}

fn parse_params(raw: Vec<RawParam>) -> Vec<AbiParam> {
    raw.into_iter()
        .map(|param| AbiParam {
            name: param.name.filter(|name| !name.trim().is_empty()),
            kind: parse_type(param.kind.as_str()),
        })
        .collect()
}
