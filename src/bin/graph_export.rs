use std::path::PathBuf;

use clap::Parser;
use familiar_projections::{load_from_directory, CompilationUnit, ProjectionConfig, SchemaGraph};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-graph-export")]
#[command(about = "Export the extracted schema graph to DOT/SVG format")]
struct Cli {
    /// Path to the declarations directory (defaults to config)
    #[arg(short, long)]
    declarations: Option<PathBuf>,

    /// Output file (defaults to schema.dot)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: dot or svg
    #[arg(short, long, default_value = "dot")]
    format: String,

    /// Print reference cycles between schema types
    #[arg(long)]
    cycles: bool,
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
    let config = ProjectionConfig::load()?;
    let dir = cli
        .declarations
        .unwrap_or_else(|| config.declarations.path.clone());

    println!("Loading declarations from: {:?}", dir);
    let declarations = load_from_directory(&dir, &config.load_config())?;
    let output = CompilationUnit::new(&declarations, config.compiler.clone()).run();
    let graph = SchemaGraph::from_registry(&output.schema);

    println!(
        "Graph built: {} schema types, {} edges",
        graph.type_count(),
        graph.edge_count()
    );

    if cli.cycles {
        let cycles = graph.cycles();
        if cycles.is_empty() {
            println!("✅ No reference cycles");
        } else {
            println!("🔁 {} reference cycle(s):", cycles.len());
            for cycle in cycles {
                println!("   └─ {}", cycle.join(" ↔ "));
            }
        }
    }

    let dot_content = graph.to_dot();

    match cli.format.as_str() {
        "dot" => {
            let output_path = cli.output.unwrap_or_else(|| PathBuf::from("schema.dot"));
            std::fs::write(&output_path, &dot_content)?;
            println!("✅ Exported DOT to: {:?}", output_path);
        }
        "svg" => {
            let output_path = cli.output.unwrap_or_else(|| PathBuf::from("schema.svg"));

            // Write DOT to temp file, then convert to SVG
            let temp_dot = output_path.with_extension("temp.dot");
            std::fs::write(&temp_dot, &dot_content)?;

            let output = std::process::Command::new("dot")
                .arg("-Tsvg")
                .arg(&temp_dot)
                .arg("-o")
                .arg(&output_path)
                .output()?;

            let _ = std::fs::remove_file(&temp_dot);

            if output.status.success() {
                println!("✅ Exported SVG to: {:?}", output_path);
            } else {
                eprintln!("❌ GraphViz conversion failed:");
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("❌ Invalid format. Use 'dot' or 'svg'");
            std::process::exit(1);
        }
    }

    Ok(())
}
