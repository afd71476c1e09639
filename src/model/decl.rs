//! Declaration Documents
//!
//! The host describes every declared type (schema types, value objects,
//! views, providers) as plain data: ancestry, fields with their declared types
//! and markers, and methods. These documents are what a `TypeModel` serves.

use serde::{Deserialize, Serialize};

use super::TypeRef;

/// A single declaration document (one JSON or TOML file)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclarationDocument {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// What kind of declaration a type is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    #[default]
    Class,
    Enum,
    Interface,
}

/// A declared type as seen by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,

    #[serde(default)]
    pub kind: DeclKind,

    /// Direct supertype, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Carries the entity-identity marker
    #[serde(default)]
    pub entity: bool,

    /// Carries the value-object marker
    #[serde(default)]
    pub embeddable: bool,

    /// Explicit composite-identifier declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_class: Option<String>,

    /// Present on view types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<ProjectionDecl>,

    #[serde(default)]
    pub fields: Vec<FieldDecl>,

    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn is_enum(&self) -> bool {
        self.kind == DeclKind::Enum
    }

    pub fn is_view(&self) -> bool {
        self.projection.is_some()
    }
}

/// A declared field with its markers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,

    // --- Schema markers ---
    #[serde(default)]
    pub id: bool,

    #[serde(default)]
    pub embedded_id: bool,

    #[serde(default)]
    pub embedded: bool,

    #[serde(default)]
    pub transient: bool,

    #[serde(default, rename = "static")]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationDecl>,

    /// Declarative ordering expression for collection relationships
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Composite-identifier component this relationship maps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_id: Option<String>,

    // --- View markers ---
    /// Explicit source path override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedDecl>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodReference>,

    /// Excluded from view mapping
    #[serde(default)]
    pub exclude: bool,
}

impl FieldDecl {
    /// Static and transient fields never take part in the schema
    pub fn is_persistent(&self) -> bool {
        !(self.is_static || self.transient)
    }

    /// View fields that take part in mapping
    pub fn is_mapped(&self) -> bool {
        self.is_persistent() && !self.exclude
    }
}

/// Relationship cardinality marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
    ElementCollection,
}

impl RelationKind {
    pub fn is_to_many(self) -> bool {
        matches!(
            self,
            Self::OneToMany | Self::ManyToMany | Self::ElementCollection
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDecl {
    pub kind: RelationKind,

    /// Inverse (owning side) field name on the target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,

    /// Explicit target type for raw containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Marks a type as a view over a schema type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionDecl {
    pub source: String,

    /// Candidate provider types, in precedence order
    #[serde(default)]
    pub providers: Vec<ProviderRef>,
}

/// A provider type plus an opaque instance-resolution hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRef {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bean: Option<String>,
}

impl ProviderRef {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            bean: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedDecl {
    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub reducers: Vec<String>,
}

/// Explicit method override for a computed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReference {
    /// Restricts the search to this provider type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    pub name: String,
}

/// A declared method on a provider type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,

    pub returns: TypeRef,

    #[serde(default)]
    pub params: Vec<ParamDecl>,

    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,
}
