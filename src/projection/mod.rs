//! Projection Metadata
//!
//! Compiled, immutable descriptions of view types: which schema paths each
//! view field maps from, and how computed fields are derived.

pub mod compiler;
pub mod method;

pub use compiler::{ProjectionCompiler, ProjectionFailure};
pub use method::{
    convention_name, MethodRequest, MethodResolver, MethodSignature, DEFAULT_METHOD_PREFIX,
};

use indexmap::IndexMap;
use serde::Serialize;

pub use crate::model::{MethodReference, ProviderRef};
use crate::schema::{CollectionDescriptor, FieldName, TypeName};

/// A view field copied from a schema path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectMapping {
    pub target_field: FieldName,
    pub source_path: String,
    /// Related type of the path's terminal field
    pub target_type: TypeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionDescriptor>,
}

/// A view field derived by a provider method
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedField {
    pub target_field: FieldName,
    pub dependency_paths: Vec<String>,
    pub reducers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_reference: Option<MethodReference>,
    pub resolved_method: MethodSignature,
}

/// Everything the runtime needs to populate one view type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionMetadata {
    pub source_type: TypeName,
    pub direct_mappings: Vec<DirectMapping>,
    pub computed_fields: Vec<ComputedField>,
    pub providers: Vec<ProviderRef>,
}

impl ProjectionMetadata {
    pub fn direct_mapping(&self, field: &str) -> Option<&DirectMapping> {
        self.direct_mappings.iter().find(|m| m.target_field == field)
    }

    pub fn computed_field(&self, field: &str) -> Option<&ComputedField> {
        self.computed_fields.iter().find(|c| c.target_field == field)
    }
}

/// Compiled views keyed by view type name, in discovery order
pub type ProjectionRegistry = IndexMap<TypeName, ProjectionMetadata>;
