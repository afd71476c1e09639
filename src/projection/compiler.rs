//! Projection Compiler
//!
//! Compiles every declared view against the frozen schema registry. Failures
//! accumulate: each field is compiled independently, every defect is
//! reported, and a view with any failed field is left out of the output
//! without stopping the views after it.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::method::{convention_name, MethodRequest, MethodResolver, DEFAULT_METHOD_PREFIX};
use super::{ComputedField, DirectMapping, ProjectionMetadata, ProjectionRegistry};
use crate::diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics};
use crate::error::ProjectionError;
use crate::model::{ComputedDecl, FieldDecl, ProjectionDecl, TypeDecl, TypeModel};
use crate::schema::{last_segment, PathResolver, SchemaRegistry, TypeClassifier};

/// A compilation failure and the declaration it is reported against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionFailure {
    /// `View` or `View.field`
    pub element: String,
    pub error: ProjectionError,
}

impl ProjectionFailure {
    fn new(view: &str, field: Option<&str>, error: impl Into<ProjectionError>) -> Self {
        let element = match field {
            Some(field) => format!("{}.{}", view, field),
            None => view.to_string(),
        };
        Self {
            element,
            error: error.into(),
        }
    }
}

pub struct ProjectionCompiler<'a> {
    model: &'a dyn TypeModel,
    registry: &'a SchemaRegistry,
    paths: PathResolver<'a>,
    methods: MethodResolver<'a>,
    method_prefix: String,
}

impl<'a> ProjectionCompiler<'a> {
    pub fn new(
        model: &'a dyn TypeModel,
        registry: &'a SchemaRegistry,
        classifier: &'a TypeClassifier<'a>,
    ) -> Self {
        Self {
            model,
            registry,
            paths: PathResolver::new(registry, classifier),
            methods: MethodResolver::new(model),
            method_prefix: DEFAULT_METHOD_PREFIX.to_string(),
        }
    }

    pub fn with_method_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.method_prefix = prefix.into();
        self
    }

    pub fn with_suggestions(mut self, suggest: bool) -> Self {
        self.paths = self.paths.with_suggestions(suggest);
        self
    }

    /// Compile every view of the model, reporting failures to `diagnostics`
    pub fn compile_all(&self, diagnostics: &mut Diagnostics) -> ProjectionRegistry {
        let mut projections = ProjectionRegistry::new();

        for view in self.model.views() {
            let Some(projection) = &view.projection else {
                continue;
            };

            match self.compile(view, projection) {
                Ok(metadata) => {
                    debug!(
                        view = %view.name,
                        source = %metadata.source_type,
                        mapped = metadata.direct_mappings.len(),
                        computed = metadata.computed_fields.len(),
                        "compiled view"
                    );
                    projections.insert(view.name.clone(), metadata);
                }
                Err(failures) => {
                    warn!(view = %view.name, failures = failures.len(), "dropping view");
                    for failure in &failures {
                        diagnostics.report(failure.element.as_str(), &failure.error);
                    }
                    diagnostics.push(DiagnosticItem::new(
                        view.name.as_str(),
                        DiagnosticCode::ViewDropped,
                        format!(
                            "View {} excluded from output: {} unresolved field(s)",
                            view.name,
                            failures.len()
                        ),
                    ));
                }
            }
        }

        projections
    }

    /// Compile one view.
    ///
    /// Every field is attempted even after an earlier one fails; the error
    /// list holds all failures of the view.
    pub fn compile(
        &self,
        view: &TypeDecl,
        projection: &ProjectionDecl,
    ) -> Result<ProjectionMetadata, Vec<ProjectionFailure>> {
        let source = projection.source.as_str();
        if !self.registry.contains(source) {
            return Err(vec![ProjectionFailure::new(
                &view.name,
                None,
                ProjectionError::UnresolvedSourceType {
                    view: view.name.clone(),
                    source_type: source.to_string(),
                },
            )]);
        }

        let mut direct_mappings = Vec::new();
        let mut computed_fields = Vec::new();
        let mut failures = Vec::new();

        for field in self.view_fields(&view.name) {
            match (&field.path, &field.computed) {
                (Some(_), Some(_)) => failures.push(ProjectionFailure::new(
                    &view.name,
                    Some(field.name.as_str()),
                    ProjectionError::ComputedAndMapped {
                        view: view.name.clone(),
                        field: field.name.clone(),
                    },
                )),
                (None, Some(computed)) => {
                    match self.compile_computed(view, projection, field, computed) {
                        Ok(compiled) => computed_fields.push(compiled),
                        Err(errors) => failures.extend(errors),
                    }
                }
                (path, None) => {
                    let source_path = path.clone().unwrap_or_else(|| field.name.clone());
                    match self.paths.resolve_field(source, &source_path) {
                        Ok(descriptor) => direct_mappings.push(DirectMapping {
                            target_field: field.name.clone(),
                            source_path,
                            target_type: descriptor.related_type().to_string(),
                            collection: descriptor.collection().cloned(),
                        }),
                        Err(err) => failures.push(ProjectionFailure::new(
                            &view.name,
                            Some(field.name.as_str()),
                            err,
                        )),
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(failures);
        }

        Ok(ProjectionMetadata {
            source_type: source.to_string(),
            direct_mappings,
            computed_fields,
            providers: projection.providers.clone(),
        })
    }

    /// Mapped fields over the view's ancestry; the closest declaration wins
    fn view_fields(&self, view: &str) -> Vec<&'a FieldDecl> {
        let mut fields: IndexMap<&str, &FieldDecl> = IndexMap::new();
        for decl in self.model.ancestry(view) {
            for field in decl.fields.iter().filter(|f| f.is_mapped()) {
                fields.entry(field.name.as_str()).or_insert(field);
            }
        }
        fields.into_values().collect()
    }

    fn compile_computed(
        &self,
        view: &TypeDecl,
        projection: &ProjectionDecl,
        field: &FieldDecl,
        computed: &ComputedDecl,
    ) -> Result<ComputedField, Vec<ProjectionFailure>> {
        let fail = |error: ProjectionError| {
            ProjectionFailure::new(&view.name, Some(field.name.as_str()), error)
        };

        if computed.depends_on.is_empty() {
            return Err(vec![fail(ProjectionError::EmptyDependencyList {
                view: view.name.clone(),
                field: field.name.clone(),
            })]);
        }

        let mut failures = Vec::new();
        let mut params = Vec::with_capacity(computed.depends_on.len());
        let mut collection_dependencies = 0;
        let names = parameter_names(&computed.depends_on);

        for (path, name) in computed.depends_on.iter().zip(names) {
            match self.paths.resolve_field(&projection.source, path) {
                Ok(descriptor) => {
                    if descriptor.is_collection() {
                        collection_dependencies += 1;
                    }
                    params.push((descriptor.declared_type().clone(), name));
                }
                Err(err) => failures.push(fail(err.into())),
            }
        }

        // Without every dependency type there is no signature to match
        if !failures.is_empty() {
            return Err(failures);
        }

        if computed.reducers.len() != collection_dependencies {
            failures.push(fail(ProjectionError::ReducerCountMismatch {
                view: view.name.clone(),
                field: field.name.clone(),
                required: collection_dependencies,
                found: computed.reducers.len(),
            }));
        }

        let method_name = match &field.method {
            Some(reference) => reference.name.clone(),
            None => convention_name(&self.method_prefix, &field.name),
        };
        let candidates: Vec<&str> = match field.method.as_ref().and_then(|r| r.type_name.as_deref()) {
            Some(explicit) => vec![explicit],
            None => projection.providers.iter().map(|p| p.type_name.as_str()).collect(),
        };

        let request = MethodRequest {
            view: view.name.clone(),
            field: field.name.clone(),
            method_name,
            return_type: field.ty.clone(),
            params,
        };

        match self.methods.resolve(&request, &candidates) {
            Ok(resolved_method) if failures.is_empty() => Ok(ComputedField {
                target_field: field.name.clone(),
                dependency_paths: computed.depends_on.clone(),
                reducers: computed.reducers.clone(),
                method_reference: field.method.clone(),
                resolved_method,
            }),
            Ok(_) => Err(failures),
            Err(err) => {
                failures.push(fail(err.into()));
                Err(failures)
            }
        }
    }
}

/// Parameter names for the expected-signature text.
///
/// A dependency is named by its last segment unless another dependency ends
/// in the same segment; those are named by the whole path joined with `_`.
fn parameter_names(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|path| {
            let segment = last_segment(path);
            let shared = paths
                .iter()
                .filter(|other| last_segment(other) == segment)
                .count()
                > 1;
            if shared {
                path.replace('.', "_")
            } else {
                segment.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MethodError, PathError};
    use crate::model::Declarations;
    use crate::schema::{Container, SchemaExtractor, SchemaRegistryBuilder};

    const SCHEMA: &str = r#"
        { "name": "User", "entity": true, "fields": [
            { "name": "id", "type": "Long", "id": true },
            { "name": "firstName", "type": "String" },
            { "name": "lastName", "type": "String" },
            { "name": "address", "type": "Address", "embedded": true },
            { "name": "orders", "type": "List<Order>", "relation": { "kind": "one_to_many", "mapped_by": "user" } }
        ] },
        { "name": "Address", "embeddable": true, "fields": [ { "name": "city", "type": "String" } ] },
        { "name": "Order", "entity": true, "fields": [
            { "name": "id", "type": "Long", "id": true },
            { "name": "user", "type": "User", "relation": { "kind": "many_to_one" } }
        ] },
        { "name": "UserComputations", "methods": [
            { "name": "getOrderCount", "returns": "int",
              "params": [ { "name": "orders", "type": "List<Order>" } ] },
            { "name": "describe", "returns": "String",
              "params": [ { "name": "city", "type": "String" } ] }
        ] }"#;

    fn compile(views: &str) -> (ProjectionRegistry, Diagnostics) {
        let json = format!(r#"{{ "types": [ {}, {} ] }}"#, SCHEMA, views);
        let model = Declarations::from_json_str(&json).unwrap();
        let classifier = TypeClassifier::new(&model);
        let mut builder = SchemaRegistryBuilder::new();
        SchemaExtractor::new(&model, &classifier, &mut builder)
            .extract("User")
            .unwrap();
        let registry = builder.freeze();

        let mut diagnostics = Diagnostics::new();
        let projections = ProjectionCompiler::new(&model, &registry, &classifier)
            .compile_all(&mut diagnostics);
        (projections, diagnostics)
    }

    fn errors(diagnostics: &Diagnostics) -> Vec<(String, DiagnosticCode)> {
        diagnostics
            .errors()
            .map(|d| (d.element.clone(), d.code))
            .collect()
    }

    #[test]
    fn test_direct_mappings() {
        let (projections, diagnostics) = compile(
            r#"{ "name": "UserView", "projection": { "source": "User" }, "fields": [
                { "name": "firstName", "type": "String" },
                { "name": "city", "type": "String", "path": "address.city" },
                { "name": "orders", "type": "List<OrderView>" },
                { "name": "debug", "type": "String", "exclude": true }
            ] }"#,
        );

        assert!(diagnostics.is_empty());
        let view = &projections["UserView"];
        assert_eq!(view.source_type, "User");
        assert_eq!(view.direct_mappings.len(), 3);

        let city = view.direct_mapping("city").unwrap();
        assert_eq!(city.source_path, "address.city");
        assert_eq!(city.target_type, "String");

        let orders = view.direct_mapping("orders").unwrap();
        assert_eq!(orders.target_type, "Order");
        assert_eq!(orders.collection.as_ref().unwrap().container, Container::List);
    }

    #[test]
    fn test_reducer_count_and_method() {
        let (projections, diagnostics) = compile(
            r#"{ "name": "Missing", "projection": { "source": "User", "providers": [ { "type": "UserComputations" } ] },
                 "fields": [
                    { "name": "orderCount", "type": "int", "computed": { "depends_on": ["orders"] } }
                 ] },
               { "name": "Present", "projection": { "source": "User", "providers": [ { "type": "UserComputations" } ] },
                 "fields": [
                    { "name": "orderCount", "type": "int", "computed": { "depends_on": ["orders"], "reducers": ["SUM"] } }
                 ] }"#,
        );

        assert_eq!(
            errors(&diagnostics),
            vec![("Missing.orderCount".to_string(), DiagnosticCode::ReducerCountMismatch)]
        );
        assert!(diagnostics.errors().next().unwrap().message.contains("required 1, found 0"));
        assert!(!projections.contains_key("Missing"));

        let computed = projections["Present"].computed_field("orderCount").unwrap();
        assert_eq!(computed.reducers, vec!["SUM"]);
        assert_eq!(computed.resolved_method.name, "getOrderCount");
        assert_eq!(computed.resolved_method.provider, "UserComputations");
    }

    #[test]
    fn test_reducers_without_collection_dependency() {
        let (projections, diagnostics) = compile(
            r#"{ "name": "UserView", "projection": { "source": "User" }, "fields": [
                { "name": "shout", "type": "String",
                  "computed": { "depends_on": ["firstName"], "reducers": ["SUM"] },
                  "method": { "type": "UserComputations", "name": "describe" } }
            ] }"#,
        );

        assert_eq!(
            errors(&diagnostics),
            vec![("UserView.shout".to_string(), DiagnosticCode::ReducerCountMismatch)]
        );
        assert!(diagnostics.errors().next().unwrap().message.contains("required 0, found 1"));
        assert!(!projections.contains_key("UserView"));
    }

    #[test]
    fn test_explicit_method_reference() {
        let (projections, diagnostics) = compile(
            r#"{ "name": "UserView", "projection": { "source": "User" }, "fields": [
                { "name": "summary", "type": "String",
                  "computed": { "depends_on": ["address.city"] },
                  "method": { "type": "UserComputations", "name": "describe" } }
            ] }"#,
        );

        assert!(diagnostics.is_empty());
        let summary = projections["UserView"].computed_field("summary").unwrap();
        assert_eq!(summary.resolved_method.name, "describe");
        assert_eq!(
            summary.method_reference.as_ref().and_then(|r| r.type_name.as_deref()),
            Some("UserComputations")
        );
    }

    #[test]
    fn test_fail_slow_within_view() {
        let (projections, diagnostics) = compile(
            r#"{ "name": "Broken", "projection": { "source": "User" }, "fields": [
                { "name": "nonExistentField", "type": "String" },
                { "name": "bad", "type": "String", "path": "firstName.anything" },
                { "name": "empty", "type": "String", "computed": { "depends_on": [] } },
                { "name": "both", "type": "String", "path": "firstName", "computed": { "depends_on": ["firstName"] } },
                { "name": "fullName", "type": "String", "computed": { "depends_on": ["firstName", "lastName"] } }
            ] },
            { "name": "Fine", "projection": { "source": "User" }, "fields": [
                { "name": "firstName", "type": "String" }
            ] }"#,
        );

        assert_eq!(
            errors(&diagnostics),
            vec![
                ("Broken.nonExistentField".to_string(), DiagnosticCode::UnknownField),
                ("Broken.bad".to_string(), DiagnosticCode::NonNavigableSegment),
                ("Broken.empty".to_string(), DiagnosticCode::EmptyDependencyList),
                ("Broken.both".to_string(), DiagnosticCode::ComputedAndMapped),
                ("Broken.fullName".to_string(), DiagnosticCode::NoMatchingMethod),
            ]
        );
        assert_eq!(diagnostics.with_code(DiagnosticCode::ViewDropped).count(), 1);
        assert!(!projections.contains_key("Broken"));
        assert!(projections.contains_key("Fine"));

        let no_match = diagnostics.with_code(DiagnosticCode::NoMatchingMethod).next().unwrap();
        assert!(no_match
            .context
            .contains(&"expected signature: String getFullName(String firstName, String lastName)".to_string()));
    }

    #[test]
    fn test_parameter_names_are_unique() {
        let paths = |p: &[&str]| p.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(
            parameter_names(&paths(&["firstName", "address.city"])),
            vec!["firstName", "city"]
        );
        assert_eq!(
            parameter_names(&paths(&["address.city", "billing.city", "lastName"])),
            vec!["address_city", "billing_city", "lastName"]
        );
    }

    #[test]
    fn test_unresolved_source_type() {
        let (projections, diagnostics) = compile(
            r#"{ "name": "GhostView", "projection": { "source": "Ghost" }, "fields": [
                { "name": "id", "type": "Long" }
            ] }"#,
        );

        assert!(projections.is_empty());
        assert_eq!(
            errors(&diagnostics),
            vec![("GhostView".to_string(), DiagnosticCode::UnresolvedRootType)]
        );
    }

    #[test]
    fn test_compile_returns_typed_failures() {
        let json = format!(
            r#"{{ "types": [ {}, {{ "name": "V", "projection": {{ "source": "User" }}, "fields": [
                {{ "name": "fullName", "type": "String", "computed": {{ "depends_on": ["firstName", "lastName"] }} }}
            ] }} ] }}"#,
            SCHEMA
        );
        let model = Declarations::from_json_str(&json).unwrap();
        let classifier = TypeClassifier::new(&model);
        let mut builder = SchemaRegistryBuilder::new();
        SchemaExtractor::new(&model, &classifier, &mut builder)
            .extract("User")
            .unwrap();
        let registry = builder.freeze();
        let compiler = ProjectionCompiler::new(&model, &registry, &classifier);

        let view = model.lookup("V").unwrap();
        let failures = compiler
            .compile(view, view.projection.as_ref().unwrap())
            .unwrap_err();

        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0].error,
            ProjectionError::Method(MethodError::NoMatchingMethod { expected, candidates, .. })
                if expected == "String getFullName(String firstName, String lastName)" && candidates.is_empty()
        ));
    }

    #[test]
    fn test_computed_may_not_depend_on_view_fields() {
        let (_, diagnostics) = compile(
            r#"{ "name": "UserView", "projection": { "source": "User" }, "fields": [
                { "name": "firstName", "type": "String" },
                { "name": "greeting", "type": "String", "computed": { "depends_on": ["shout"] } },
                { "name": "shout", "type": "String", "computed": { "depends_on": ["firstName"] } }
            ] }"#,
        );

        let unknown = diagnostics.with_code(DiagnosticCode::UnknownField).next().unwrap();
        assert_eq!(unknown.element, "UserView.greeting");
        assert!(unknown.message.contains(&PathError::UnknownField {
            segment: "shout".to_string(),
            type_name: "User".to_string(),
            path: "shout".to_string(),
            suggestion: None,
        }
        .to_string()));
    }
}
