//! Schema Extraction
//!
//! Walks a root type and its ancestry into field descriptors, then follows
//! every non-scalar field to the schema types it references. A seen-set keyed
//! by type name makes each type extracted exactly once, so cyclic embeddable
//! and relationship graphs terminate.

use std::collections::VecDeque;
use tracing::{debug, trace};

use super::classify::TypeClassifier;
use super::descriptor::{CollectionDescriptor, Container, FieldDescriptor, Kind};
use super::registry::{FieldMap, SchemaRegistryBuilder, SchemaRole};
use crate::error::SchemaError;
use crate::model::{FieldDecl, TypeModel};

/// Populates a `SchemaRegistryBuilder` from the type model
pub struct SchemaExtractor<'a> {
    model: &'a dyn TypeModel,
    classifier: &'a TypeClassifier<'a>,
    registry: &'a mut SchemaRegistryBuilder,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(
        model: &'a dyn TypeModel,
        classifier: &'a TypeClassifier<'a>,
        registry: &'a mut SchemaRegistryBuilder,
    ) -> Self {
        Self {
            model,
            classifier,
            registry,
        }
    }

    /// Extract `root` and every schema type reachable from it.
    ///
    /// Types already seen are skipped, so calling this again for the same
    /// root is a no-op. Findings are returned together; none of them stop
    /// extraction.
    pub fn extract(&mut self, root: &str) -> Result<(), Vec<SchemaError>> {
        let mut findings = Vec::new();
        let mut pending = VecDeque::from([root.to_string()]);

        while let Some(type_name) = pending.pop_front() {
            if self.registry.is_seen(&type_name) {
                continue;
            }

            let role = match self.classifier.classify_kind(&type_name) {
                Kind::EntityLike => SchemaRole::Entity,
                Kind::EmbeddableLike => SchemaRole::Embeddable,
                kind => {
                    trace!(type_name = %type_name, ?kind, "not a schema type, skipping");
                    continue;
                }
            };
            self.registry.mark_seen(&type_name);

            let fields = self.collect_fields(&type_name, &mut findings);
            if role == SchemaRole::Entity {
                self.check_identifiers(&type_name, &fields, &mut findings);
            }

            for field in fields.values() {
                let related = field.related_type();
                if !self.registry.is_seen(related)
                    && self.classifier.classify_kind(related).is_schema_type()
                {
                    pending.push_back(related.to_string());
                }
            }

            debug!(type_name = %type_name, ?role, fields = fields.len(), "extracted schema type");
            self.registry.insert(role, type_name, fields);
        }

        if findings.is_empty() {
            Ok(())
        } else {
            Err(findings)
        }
    }

    /// Collect fields over the ancestry chain; the closest declaration of a
    /// name shadows any further up.
    fn collect_fields(&self, type_name: &str, findings: &mut Vec<SchemaError>) -> FieldMap {
        let mut fields = FieldMap::new();

        for decl in self.model.ancestry(type_name) {
            for field in decl.fields.iter().filter(|f| f.is_persistent()) {
                if let Some(existing) = fields.get(&field.name) {
                    if existing.declared_type() != &field.ty {
                        debug!(
                            type_name,
                            field = %field.name,
                            shadowed_in = %decl.name,
                            kept = %existing.declared_type(),
                            shadowed = %field.ty,
                            "field shadows an ancestor field of a different type"
                        );
                    }
                    continue;
                }

                let descriptor = self.describe(type_name, field, findings);
                fields.insert(field.name.clone(), descriptor);
            }
        }

        fields
    }

    fn describe(
        &self,
        owner: &str,
        field: &FieldDecl,
        findings: &mut Vec<SchemaError>,
    ) -> FieldDescriptor {
        if field.id {
            return FieldDescriptor::identifier(field.ty.clone());
        }

        if field.embedded_id {
            self.require_value_object(owner, field, findings);
            return FieldDescriptor::identifier(field.ty.clone());
        }

        if field.embedded {
            self.require_value_object(owner, field, findings);
            return FieldDescriptor::single(field.ty.clone());
        }

        let container = TypeClassifier::classify_container(&field.ty);
        let to_many = field.relation.as_ref().is_some_and(|r| r.kind.is_to_many());

        if to_many || container.is_some() {
            let element = field
                .ty
                .element()
                .map(|e| e.to_string())
                .or_else(|| field.relation.as_ref().and_then(|r| r.target.clone()))
                .unwrap_or_else(|| field.ty.to_string());

            let collection = CollectionDescriptor {
                kind: self.classifier.classify_kind(&element),
                container: container.unwrap_or(Container::Unknown),
                inverse_field: field.relation.as_ref().and_then(|r| r.mapped_by.clone()),
                ordering: field.order_by.clone(),
            };
            return FieldDescriptor::collection_valued(field.ty.clone(), element, collection);
        }

        FieldDescriptor::single(field.ty.clone()).with_mapped_identifier(field.maps_id.clone())
    }

    fn require_value_object(&self, owner: &str, field: &FieldDecl, findings: &mut Vec<SchemaError>) {
        let type_name = field.ty.to_string();
        if self.classifier.classify_kind(&type_name) != Kind::EmbeddableLike {
            findings.push(SchemaError::NotAValueObject {
                owner: owner.to_string(),
                field: field.name.clone(),
                type_name,
            });
        }
    }

    fn check_identifiers(&self, type_name: &str, fields: &FieldMap, findings: &mut Vec<SchemaError>) {
        let identifiers: Vec<String> = fields
            .iter()
            .filter(|(_, f)| f.is_identifier())
            .map(|(name, _)| name.clone())
            .collect();

        if identifiers.is_empty() {
            findings.push(SchemaError::MissingIdentifier {
                type_name: type_name.to_string(),
            });
        } else if identifiers.len() > 1 && !self.declares_composite_identifier(type_name) {
            findings.push(SchemaError::DuplicateIdentifierWithoutComposite {
                type_name: type_name.to_string(),
                fields: identifiers,
            });
        }
    }

    fn declares_composite_identifier(&self, type_name: &str) -> bool {
        self.model
            .ancestry(type_name)
            .iter()
            .any(|decl| decl.id_class.is_some())
    }
}
