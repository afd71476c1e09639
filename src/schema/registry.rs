//! Schema Registries
//!
//! Two insertion-ordered maps, entity-like and embeddable-like, each keyed by
//! type name and then field name. The builder grows monotonically during
//! extraction; `freeze` turns it into the read-only `SchemaRegistry` that
//! projection compilation runs against.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

use super::descriptor::{FieldDescriptor, FieldName, TypeName};

/// Fields of one schema type, in declaration order
pub type FieldMap = IndexMap<FieldName, FieldDescriptor>;

/// Which registry a schema type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaRole {
    Entity,
    Embeddable,
}

/// Mutable registries used while extraction is running
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    entities: IndexMap<TypeName, FieldMap>,
    embeddables: IndexMap<TypeName, FieldMap>,
    seen: HashSet<TypeName>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a type has already been claimed for extraction
    pub fn is_seen(&self, type_name: &str) -> bool {
        self.seen.contains(type_name)
    }

    /// Claim a type for extraction. Returns false if it was already claimed.
    pub fn mark_seen(&mut self, type_name: &str) -> bool {
        self.seen.insert(type_name.to_string())
    }

    /// Record a type's fields. The first insertion of a name wins.
    pub fn insert(&mut self, role: SchemaRole, type_name: TypeName, fields: FieldMap) {
        let registry = match role {
            SchemaRole::Entity => &mut self.entities,
            SchemaRole::Embeddable => &mut self.embeddables,
        };
        registry.entry(type_name).or_insert(fields);
    }

    pub fn type_count(&self) -> usize {
        self.entities.len() + self.embeddables.len()
    }

    /// Finish extraction
    pub fn freeze(self) -> SchemaRegistry {
        SchemaRegistry {
            entities: self.entities,
            embeddables: self.embeddables,
        }
    }
}

/// Read-only schema metadata: `TypeName -> FieldName -> FieldDescriptor`
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaRegistry {
    entities: IndexMap<TypeName, FieldMap>,
    embeddables: IndexMap<TypeName, FieldMap>,
}

impl SchemaRegistry {
    pub fn entity(&self, type_name: &str) -> Option<&FieldMap> {
        self.entities.get(type_name)
    }

    pub fn embeddable(&self, type_name: &str) -> Option<&FieldMap> {
        self.embeddables.get(type_name)
    }

    /// Look up a type in the entity registry, falling back to embeddables
    pub fn lookup(&self, type_name: &str) -> Option<&FieldMap> {
        self.entity(type_name).or_else(|| self.embeddable(type_name))
    }

    pub fn role(&self, type_name: &str) -> Option<SchemaRole> {
        if self.entities.contains_key(type_name) {
            Some(SchemaRole::Entity)
        } else if self.embeddables.contains_key(type_name) {
            Some(SchemaRole::Embeddable)
        } else {
            None
        }
    }

    pub fn field(&self, type_name: &str, field: &str) -> Option<&FieldDescriptor> {
        self.lookup(type_name)?.get(field)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    pub fn entities(&self) -> impl Iterator<Item = (&TypeName, &FieldMap)> {
        self.entities.iter()
    }

    pub fn embeddables(&self) -> impl Iterator<Item = (&TypeName, &FieldMap)> {
        self.embeddables.iter()
    }

    /// Every schema type with its role, entities first
    pub fn all_types(&self) -> impl Iterator<Item = (SchemaRole, &TypeName, &FieldMap)> {
        self.entities
            .iter()
            .map(|(name, fields)| (SchemaRole::Entity, name, fields))
            .chain(
                self.embeddables
                    .iter()
                    .map(|(name, fields)| (SchemaRole::Embeddable, name, fields)),
            )
    }

    pub fn type_count(&self) -> usize {
        self.entities.len() + self.embeddables.len()
    }
}
