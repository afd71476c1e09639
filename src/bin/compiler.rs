//! Projection Compiler CLI
//!
//! Compiles a directory of declaration documents and reports diagnostics.
//!
//! Usage:
//!   projection-compiler --declarations ./declarations check
//!   projection-compiler compile --output projections.json
//!   projection-compiler resolve User address.city

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use familiar_projections::config::OutputFormat;
use familiar_projections::schema::{PathResolver, SchemaRole, TypeClassifier};
use familiar_projections::{
    load_from_directory, CompilationOutput, CompilationUnit, Declarations, Diagnostics,
    ProjectionConfig, Severity,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "projection-compiler")]
#[command(about = "Validate views against the domain schema and compile projection metadata")]
struct Cli {
    /// Path to the declarations directory (overrides config)
    #[arg(short, long)]
    declarations: Option<PathBuf>,

    /// Explicit config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile all views and report diagnostics
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Compile all views and write the metadata as JSON
    Compile {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Resolve a dotted path from a root type
    Resolve {
        /// Root schema type
        root: String,

        /// Dotted path, e.g. address.city
        path: String,
    },

    /// List the schema types reachable from declared views
    Types,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ProjectionConfig::load_from(cli.config.as_deref())?;
    let dir = cli
        .declarations
        .clone()
        .unwrap_or_else(|| config.declarations.path.clone());

    let declarations = load_from_directory(&dir, &config.load_config())?;

    match cli.command {
        Commands::Check { strict } => {
            println!("🔍 Checking {} declared types in {:?}\n", declarations.len(), dir);
            let output = compile(&declarations, &config);

            print_diagnostics(&output.diagnostics);
            println!();

            let failed = output.has_errors() || (strict && output.diagnostics.warning_count() > 0);
            if failed {
                println!(
                    "❌ {} error(s), {} warning(s); {} view(s) compiled",
                    output.diagnostics.error_count(),
                    output.diagnostics.warning_count(),
                    output.projections.len()
                );
                std::process::exit(1);
            }

            println!(
                "✅ {} view(s) compiled over {} schema type(s), {} warning(s)",
                output.projections.len(),
                output.schema.type_count(),
                output.diagnostics.warning_count()
            );
            Ok(())
        }

        Commands::Compile { output: path, compact } => {
            let output = compile(&declarations, &config);

            let mut report = serde_json::to_value(&output)?;
            if let Some(fields) = report.as_object_mut() {
                fields.insert(
                    "generated_at".to_string(),
                    serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
                );
                if !config.output.include_schema {
                    fields.remove("schema");
                }
            }

            let content = if compact || config.output.format == OutputFormat::Compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };

            match path {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!(
                        "✅ Wrote {} view(s) to {:?}",
                        output.projections.len(),
                        path
                    );
                }
                None => println!("{}", content),
            }

            if output.has_errors() {
                eprintln!("❌ {} error(s)", output.diagnostics.error_count());
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Resolve { root, path } => {
            let unit = CompilationUnit::new(&declarations, config.compiler.clone());
            let mut diagnostics = Diagnostics::new();
            let schema = unit.extract_schema(&[root.as_str()], &mut diagnostics);

            let classifier = TypeClassifier::new(&declarations)
                .with_extra_scalars(config.compiler.extra_scalar_types.iter().cloned());
            let resolver = PathResolver::new(&schema, &classifier)
                .with_suggestions(config.compiler.suggest_fields);

            match resolver.resolve_field(&root, &path) {
                Ok(field) => {
                    println!("✅ {}.{} -> {}", root, path, field.related_type());
                    println!("   declared as {}", field.declared_type());
                    if let Some(collection) = field.collection() {
                        println!(
                            "   collection: {:?} of {:?}",
                            collection.container, collection.kind
                        );
                    }
                    Ok(())
                }
                Err(err) => {
                    println!("❌ {}", err);
                    std::process::exit(1);
                }
            }
        }

        Commands::Types => {
            let output = compile(&declarations, &config);

            for (role, name, fields) in output.schema.all_types() {
                let label = match role {
                    SchemaRole::Entity => "entity",
                    SchemaRole::Embeddable => "embeddable",
                };
                println!("{} ({}, {} fields)", name, label, fields.len());
                for (field_name, field) in fields {
                    let marker = if field.is_identifier() { " [id]" } else { "" };
                    println!("   └─ {}: {}{}", field_name, field.declared_type(), marker);
                }
            }
            Ok(())
        }
    }
}

fn compile(declarations: &Declarations, config: &ProjectionConfig) -> CompilationOutput {
    CompilationUnit::new(declarations, config.compiler.clone())
        .run()
        .with_checksum(declarations.checksum().cloned())
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for item in diagnostics {
        let icon = match item.severity() {
            Severity::Error => "❌",
            Severity::Warning => "⚠️ ",
            Severity::Note => "ℹ️ ",
        };
        println!("{} {}", icon, item);
    }
}
