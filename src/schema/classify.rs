//! Type Classification
//!
//! Decides what a referenced type name is (scalar, entity-like,
//! embeddable-like, or unknown) and what container shape a declared field
//! has. Classification is total: types outside the compilation unit's
//! visibility degrade to `Unknown` / `None` instead of failing.

use std::collections::HashSet;

use super::descriptor::{Container, Kind};
use crate::model::{simple_name, TypeModel, TypeRef};

/// Primitive, wrapper, text, numeric and temporal types that are always scalar
pub const SCALAR_TYPES: &[&str] = &[
    // Primitives
    "boolean", "byte", "short", "int", "long", "float", "double", "char",
    // Wrappers
    "Boolean", "Byte", "Short", "Integer", "Long", "Float", "Double", "Character",
    // Text
    "String", "CharSequence",
    // Numeric
    "Number", "BigDecimal", "BigInteger",
    // Temporal
    "Date", "Calendar", "Instant", "Duration", "Period", "LocalDate", "LocalTime",
    "LocalDateTime", "OffsetTime", "OffsetDateTime", "ZonedDateTime", "Year", "YearMonth",
    // Identity / binary
    "UUID", "byte[]", "Byte[]", "char[]", "Character[]",
];

/// Classifies type names against the declared type model
pub struct TypeClassifier<'a> {
    model: &'a dyn TypeModel,
    extra_scalars: HashSet<String>,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(model: &'a dyn TypeModel) -> Self {
        Self {
            model,
            extra_scalars: HashSet::new(),
        }
    }

    /// Treat additional type names as scalar
    pub fn with_extra_scalars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_scalars.extend(names.into_iter().map(Into::into));
        self
    }

    /// Classify a referenced type name.
    ///
    /// Declared markers take precedence over the built-in scalar names, so a
    /// model type called `Period` or `Duration` is still entity-like.
    pub fn classify_kind(&self, type_name: &str) -> Kind {
        match self.model.lookup(type_name) {
            Some(decl) if decl.entity => return Kind::EntityLike,
            Some(decl) if decl.embeddable => return Kind::EmbeddableLike,
            Some(decl) if decl.is_enum() => return Kind::Scalar,
            _ => {}
        }

        if self.is_builtin_scalar(type_name) {
            Kind::Scalar
        } else {
            Kind::Unknown
        }
    }

    fn is_builtin_scalar(&self, type_name: &str) -> bool {
        let simple = simple_name(type_name);
        SCALAR_TYPES.contains(&type_name)
            || SCALAR_TYPES.contains(&simple)
            || self.extra_scalars.contains(type_name)
    }

    /// Classify a declared field type's container shape by its erased base.
    ///
    /// Returns `None` for anything that is not one of the known containers;
    /// callers that know a field is collection-valued map that to
    /// `Container::Unknown`.
    pub fn classify_container(declared: &TypeRef) -> Option<Container> {
        if declared.is_array() {
            return None;
        }
        match declared.simple_name() {
            "List" => Some(Container::List),
            "Set" => Some(Container::Set),
            "Map" => Some(Container::Map),
            "Collection" => Some(Container::Collection),
            _ => None,
        }
    }
}
