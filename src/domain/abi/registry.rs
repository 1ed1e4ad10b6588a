//! Type registry - struct and enum definitions indexed by name

use std::collections::HashMap;

use super::{AbiCatalog, EnumDef, StructDef};

/// Read-only lookup table consulted while decoding nested types.
///
/// Built once from a catalog and never mutated afterwards, so one registry
/// can back any number of concurrent decodes.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    structs: HashMap<String, StructDef>,
    enums: HashMap<String, EnumDef>,
}

impl TypeRegistry {
    /// Index a catalog's structs and enums
    ///
    /// Note: the last definition for a given name wins
    pub fn from_catalog(catalog: &AbiCatalog) -> Self {
        Self::from_defs(
            catalog.structs().iter().cloned(),
            catalog.enums().iter().cloned(),
        )
    }

    pub fn from_defs(
        structs: impl IntoIterator<Item = StructDef>,
        enums: impl IntoIterator<Item = EnumDef>,
    ) -> Self {
        Self {
            structs: structs
                .into_iter()
                .map(|def| (def.name.clone(), def))
                .collect(),
            enums: enums.into_iter().map(|def| (def.name.clone(), def)).collect(),
        }
    }

    /// Look up a struct by fully qualified name
    pub fn get_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    /// Look up an enum by fully qualified name
    pub fn get_enum(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    /// Struct names, unordered
    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }
}
