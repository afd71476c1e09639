//! Compilation Unit
//!
//! One pass of the compiler over one type model. The unit owns its schema
//! registries for the duration of `run`: extraction fills a fresh builder,
//! the builder is frozen, and projection compilation reads the frozen
//! registry. Nothing is retained between runs.

use serde::Serialize;
use tracing::info;

use crate::checksum::Checksum;
use crate::config::CompilerConfig;
use crate::diagnostics::Diagnostics;
use crate::model::TypeModel;
use crate::projection::{ProjectionCompiler, ProjectionRegistry};
use crate::schema::{SchemaExtractor, SchemaRegistry, SchemaRegistryBuilder, TypeClassifier};

/// Everything one compilation unit produces
#[derive(Debug, Clone, Serialize)]
pub struct CompilationOutput {
    pub schema: SchemaRegistry,
    pub projections: ProjectionRegistry,
    pub diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,
}

impl CompilationOutput {
    /// Whether any error-severity diagnostic was reported
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn with_checksum(mut self, checksum: Option<Checksum>) -> Self {
        self.checksum = checksum;
        self
    }
}

/// Context object for one compiler invocation
pub struct CompilationUnit<'a> {
    model: &'a dyn TypeModel,
    config: CompilerConfig,
}

impl<'a> CompilationUnit<'a> {
    pub fn new(model: &'a dyn TypeModel, config: CompilerConfig) -> Self {
        Self { model, config }
    }

    fn classifier(&self) -> TypeClassifier<'a> {
        TypeClassifier::new(self.model)
            .with_extra_scalars(self.config.extra_scalar_types.iter().cloned())
    }

    /// Extract and compile every view of the model
    pub fn run(&self) -> CompilationOutput {
        let classifier = self.classifier();
        let mut diagnostics = Diagnostics::new();

        let sources: Vec<&str> = self
            .model
            .views()
            .into_iter()
            .filter_map(|view| view.projection.as_ref())
            .map(|projection| projection.source.as_str())
            .collect();
        let schema = self.extract_with(&classifier, &sources, &mut diagnostics);

        let projections = ProjectionCompiler::new(self.model, &schema, &classifier)
            .with_method_prefix(self.config.method_prefix.as_str())
            .with_suggestions(self.config.suggest_fields)
            .compile_all(&mut diagnostics);

        info!(
            schema_types = schema.type_count(),
            views = projections.len(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "compilation unit finished"
        );

        CompilationOutput {
            schema,
            projections,
            diagnostics,
            checksum: None,
        }
    }

    /// Extract the schema reachable from `roots` without compiling any view
    pub fn extract_schema(&self, roots: &[&str], diagnostics: &mut Diagnostics) -> SchemaRegistry {
        let classifier = self.classifier();
        self.extract_with(&classifier, roots, diagnostics)
    }

    fn extract_with(
        &self,
        classifier: &TypeClassifier<'a>,
        roots: &[&str],
        diagnostics: &mut Diagnostics,
    ) -> SchemaRegistry {
        let mut builder = SchemaRegistryBuilder::new();
        let mut extractor = SchemaExtractor::new(self.model, classifier, &mut builder);

        for root in roots {
            if let Err(findings) = extractor.extract(root) {
                for finding in &findings {
                    diagnostics.report(finding.owner(), finding);
                }
            }
        }

        builder.freeze()
    }
}
