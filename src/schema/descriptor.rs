//! Schema Graph Model
//!
//! One `FieldDescriptor` per schema field. Descriptors are built once during
//! extraction and never mutated after they are inserted into a registry.

use serde::{Deserialize, Serialize};

use crate::model::TypeRef;

/// Name of a declared type
pub type TypeName = String;

/// Name of a declared field
pub type FieldName = String;

/// Classification of a referenced type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Scalar,
    EntityLike,
    EmbeddableLike,
    Unknown,
}

impl Kind {
    /// Entity-like and embeddable-like types have fields of their own
    pub fn is_schema_type(self) -> bool {
        matches!(self, Self::EntityLike | Self::EmbeddableLike)
    }
}

/// Container shape of a collection-valued field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    List,
    Set,
    Map,
    Collection,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    /// Classification of the element type
    pub kind: Kind,
    pub container: Container,
    /// Bidirectional back-reference on the element type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_field: Option<FieldName>,
    /// Declarative ordering expression, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

/// A field of a schema type.
///
/// A descriptor is either an identifier or collection-valued, never both;
/// the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    is_identifier: bool,
    /// The field's own type, or the element type for collections
    related_type: TypeName,
    /// Exact declared type, including container and type arguments
    declared_type: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mapped_identifier_field: Option<FieldName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collection: Option<CollectionDescriptor>,
}

impl FieldDescriptor {
    /// A single-valued field (scalar, embedded value or singular relationship)
    pub fn single(declared_type: TypeRef) -> Self {
        Self {
            is_identifier: false,
            related_type: declared_type.to_string(),
            declared_type,
            mapped_identifier_field: None,
            collection: None,
        }
    }

    /// A simple or composite identifier
    pub fn identifier(declared_type: TypeRef) -> Self {
        Self {
            is_identifier: true,
            ..Self::single(declared_type)
        }
    }

    /// A collection-valued field whose elements are `element_type`
    pub fn collection_valued(
        declared_type: TypeRef,
        element_type: impl Into<TypeName>,
        collection: CollectionDescriptor,
    ) -> Self {
        Self {
            is_identifier: false,
            related_type: element_type.into(),
            declared_type,
            mapped_identifier_field: None,
            collection: Some(collection),
        }
    }

    /// Link this field to a composite-identifier component
    pub fn with_mapped_identifier(mut self, field: Option<FieldName>) -> Self {
        self.mapped_identifier_field = field;
        self
    }

    pub fn is_identifier(&self) -> bool {
        self.is_identifier
    }

    pub fn related_type(&self) -> &str {
        &self.related_type
    }

    pub fn declared_type(&self) -> &TypeRef {
        &self.declared_type
    }

    pub fn mapped_identifier_field(&self) -> Option<&str> {
        self.mapped_identifier_field.as_deref()
    }

    pub fn collection(&self) -> Option<&CollectionDescriptor> {
        self.collection.as_ref()
    }

    pub fn is_collection(&self) -> bool {
        self.collection.is_some()
    }
}
