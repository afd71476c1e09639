//! Path Resolution
//!
//! Navigates a dotted path (`address.city`, `orders`) through the frozen
//! schema registry. Every segment but the last must lead to a non-scalar
//! type; the last segment may land on anything, including a relationship
//! object or a collection.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::classify::TypeClassifier;
use super::descriptor::{FieldDescriptor, Kind};
use super::registry::{FieldMap, SchemaRegistry};
use crate::error::PathError;

/// Separator between path segments
pub const PATH_SEPARATOR: char = '.';

/// Last segment of a dotted path
pub fn last_segment(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

/// Resolves dotted paths against a frozen registry
pub struct PathResolver<'a> {
    registry: &'a SchemaRegistry,
    classifier: &'a TypeClassifier<'a>,
    suggest: bool,
}

impl<'a> PathResolver<'a> {
    pub fn new(registry: &'a SchemaRegistry, classifier: &'a TypeClassifier<'a>) -> Self {
        Self {
            registry,
            classifier,
            suggest: false,
        }
    }

    /// Attach "did you mean" suggestions to unknown-field errors
    pub fn with_suggestions(mut self, suggest: bool) -> Self {
        self.suggest = suggest;
        self
    }

    /// Resolve a path to the related type of its terminal field
    pub fn resolve(&self, root: &str, path: &str) -> Result<&'a str, PathError> {
        self.resolve_field(root, path).map(FieldDescriptor::related_type)
    }

    /// Resolve a path to its terminal field descriptor
    pub fn resolve_field(&self, root: &str, path: &str) -> Result<&'a FieldDescriptor, PathError> {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let Some((terminal, navigation)) = segments.split_last() else {
            return Err(self.unknown_field(root, path, path, None));
        };

        let mut current = root;
        for segment in navigation {
            let field = self.field(current, segment, path)?;
            if self.classifier.classify_kind(field.related_type()) == Kind::Scalar {
                return Err(PathError::NonNavigableSegment {
                    segment: segment.to_string(),
                    type_name: current.to_string(),
                    path: path.to_string(),
                });
            }
            current = field.related_type();
        }

        self.field(current, terminal, path)
    }

    fn field(&self, type_name: &str, segment: &str, path: &str) -> Result<&'a FieldDescriptor, PathError> {
        let registry: &'a SchemaRegistry = self.registry;
        let fields = registry
            .lookup(type_name)
            .ok_or_else(|| PathError::UnresolvedRootType {
                path: path.to_string(),
                type_name: type_name.to_string(),
            })?;

        fields
            .get(segment)
            .ok_or_else(|| self.unknown_field(type_name, segment, path, Some(fields)))
    }

    fn unknown_field(
        &self,
        type_name: &str,
        segment: &str,
        path: &str,
        fields: Option<&FieldMap>,
    ) -> PathError {
        let suggestion = match fields {
            Some(fields) if self.suggest => suggest(fields, segment),
            _ => None,
        };
        PathError::UnknownField {
            segment: segment.to_string(),
            type_name: type_name.to_string(),
            path: path.to_string(),
            suggestion,
        }
    }
}

/// Best fuzzy match for a misspelled field name
fn suggest(fields: &FieldMap, segment: &str) -> Option<String> {
    if segment.is_empty() {
        return None;
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    fields
        .keys()
        .filter_map(|name| matcher.fuzzy_match(name, segment).map(|score| (score, name)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, name)| name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Declarations;
    use crate::schema::extract::SchemaExtractor;
    use crate::schema::registry::SchemaRegistryBuilder;

    const MODEL: &str = r#"{ "types": [
        { "name": "User", "entity": true, "fields": [
            { "name": "id", "type": "Long", "id": true },
            { "name": "firstName", "type": "String" },
            { "name": "address", "type": "Address", "embedded": true },
            { "name": "orders", "type": "List<Order>", "relation": { "kind": "one_to_many" } },
            { "name": "status", "type": "Status" }
        ] },
        { "name": "Address", "embeddable": true, "fields": [ { "name": "city", "type": "String" } ] },
        { "name": "Order", "entity": true, "fields": [
            { "name": "id", "type": "Long", "id": true },
            { "name": "total", "type": "BigDecimal" }
        ] },
        { "name": "Status", "kind": "enum" }
    ] }"#;

    fn with_resolver(f: impl FnOnce(&PathResolver<'_>)) {
        let model = Declarations::from_json_str(MODEL).unwrap();
        let classifier = TypeClassifier::new(&model);
        let mut builder = SchemaRegistryBuilder::new();
        SchemaExtractor::new(&model, &classifier, &mut builder)
            .extract("User")
            .unwrap();
        let registry = builder.freeze();
        let resolver = PathResolver::new(&registry, &classifier).with_suggestions(true);
        f(&resolver);
    }

    #[test]
    fn test_resolve_through_embeddable() {
        with_resolver(|resolver| {
            assert_eq!(resolver.resolve("User", "address.city"), Ok("String"));
            assert_eq!(resolver.resolve("User", "address.city"), resolver.resolve("User", "address.city"));
        });
    }

    #[test]
    fn test_terminal_may_be_non_scalar() {
        with_resolver(|resolver| {
            assert_eq!(resolver.resolve("User", "address"), Ok("Address"));

            let orders = resolver.resolve_field("User", "orders").unwrap();
            assert_eq!(orders.related_type(), "Order");
            assert!(orders.is_collection());
        });
    }

    #[test]
    fn test_navigate_through_collection() {
        with_resolver(|resolver| {
            assert_eq!(resolver.resolve("User", "orders.total"), Ok("BigDecimal"));
        });
    }

    #[test]
    fn test_scalar_segment_is_not_navigable() {
        with_resolver(|resolver| {
            assert_eq!(
                resolver.resolve("User", "firstName.anything"),
                Err(PathError::NonNavigableSegment {
                    segment: "firstName".to_string(),
                    type_name: "User".to_string(),
                    path: "firstName.anything".to_string(),
                })
            );
            assert!(matches!(
                resolver.resolve("User", "status.code"),
                Err(PathError::NonNavigableSegment { .. })
            ));
            assert!(matches!(
                resolver.resolve("User", "address.city.length"),
                Err(PathError::NonNavigableSegment { segment, type_name, .. })
                    if segment == "city" && type_name == "Address"
            ));
        });
    }

    #[test]
    fn test_unknown_field() {
        with_resolver(|resolver| {
            let err = resolver.resolve("User", "nonExistentField").unwrap_err();
            assert!(matches!(
                &err,
                PathError::UnknownField { segment, type_name, .. }
                    if segment == "nonExistentField" && type_name == "User"
            ));
        });
    }

    #[test]
    fn test_unknown_field_suggestion() {
        with_resolver(|resolver| {
            let err = resolver.resolve("User", "address.cty").unwrap_err();
            assert!(matches!(
                err,
                PathError::UnknownField { suggestion: Some(s), .. } if s == "city"
            ));
        });
    }

    #[test]
    fn test_unresolved_root_type() {
        with_resolver(|resolver| {
            assert_eq!(
                resolver.resolve("Ghost", "id"),
                Err(PathError::UnresolvedRootType {
                    path: "id".to_string(),
                    type_name: "Ghost".to_string(),
                })
            );
        });
    }

    #[test]
    fn test_last_segment() {
        assert_eq!(last_segment("address.city"), "city");
        assert_eq!(last_segment("orders"), "orders");
    }
}
