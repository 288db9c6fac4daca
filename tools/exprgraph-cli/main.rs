use clap::{Parser, ValueEnum};
use exprgraph::prelude::*;
use std::fs;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Validation policies selectable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyCli {
    /// Top-level entries must be `IFTHEN(checkEventType(...), ...)`
    StudyRule,
    /// Every operation name must be registered
    KnownOps,
    /// Both of the above
    Strict,
}

/// Validate, lay out and round-trip an expression document
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the expression document JSON file
    document_path: String,

    /// Additional validation policy to enforce
    #[arg(short, long, value_enum)]
    policy: Option<PolicyCli>,

    /// Optional path to a JSON layout configuration
    #[arg(long)]
    layout_config: Option<String>,

    /// Write the laid-out graph as JSON to this path
    #[arg(long)]
    graph_out: Option<String>,

    /// Print each expression as an indented tree
    #[arg(short, long)]
    tree: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let registry = OperationRegistry::with_defaults();
    let total_start = Instant::now();

    // --- 1. File Loading ---
    let text = fs::read_to_string(&cli.document_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read document '{}': {}",
            cli.document_path, e
        ))
    });
    let raw: serde_json::Value = serde_json::from_str(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse document JSON: {}", e)));

    let config = match &cli.layout_config {
        Some(path) => {
            let config_text = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read layout config '{}': {}", path, e))
            });
            LayoutConfig::from_json(&config_text)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid layout config: {}", e)))
        }
        None => LayoutConfig::default(),
    };

    // --- 2. Validation ---
    let validate_start = Instant::now();
    let expressions = match cli.policy {
        None => parse_expression_document(&raw),
        Some(PolicyCli::StudyRule) => parse_with_policy(&raw, &StudyRulePolicy),
        Some(PolicyCli::KnownOps) => parse_with_policy(
            &raw,
            &KnownOperationsPolicy {
                registry: &registry,
            },
        ),
        Some(PolicyCli::Strict) => parse_with_policy(
            &raw,
            &CompositePolicy::new()
                .with(StudyRulePolicy)
                .with(KnownOperationsPolicy {
                    registry: &registry,
                }),
        ),
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Document rejected: {}", e)));
    let validate_duration = validate_start.elapsed();
    info!(expressions = expressions.len(), "document accepted");

    if cli.tree {
        for (index, expr) in expressions.iter().enumerate() {
            println!("\n[{}] {}", index, DisplayExpression { expr });
        }
    }

    // --- 3. Layout ---
    let layout_start = Instant::now();
    let engine = LayoutEngine::new(&registry, config);
    let graph = engine.layout_document(&expressions);
    let layout_duration = layout_start.elapsed();

    println!("\n--- Graph ---");
    println!("{:<24} {:<14} {:>9} {:>9} {:>7}  {}", "ID", "KIND", "X", "Y", "SLOTS", "NAME");
    for node in &graph.nodes {
        println!(
            "{:<24} {:<14} {:>9.1} {:>9.1} {:>7}  {}",
            node.id,
            format!("{:?}", node.kind),
            node.position.x,
            node.position.y,
            node.slots.len(),
            node.name().unwrap_or("<constant>")
        );
    }
    println!("Edges: {}", graph.edges.len());

    if let Some(path) = &cli.graph_out {
        let json = serde_json::to_string_pretty(&graph)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph: {}", e)));
        fs::write(path, json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
        println!("Graph written to '{}'", path);
    }

    // --- 4. Round Trip ---
    let reconstruct_start = Instant::now();
    let rebuilt = reconstruct_document(&graph)
        .unwrap_or_else(|e| exit_with_error(&format!("Reconstruction failed: {}", e)));
    let reconstruct_duration = reconstruct_start.elapsed();
    if rebuilt == expressions {
        println!("\nRound trip: OK ({} expressions)", rebuilt.len());
    } else {
        exit_with_error("Round trip produced a different document");
    }

    // --- 5. Summary ---
    println!("\n--- Performance Summary ---");
    println!("Validation:           {:?}", validate_duration);
    println!("Layout:               {:?}", layout_duration);
    println!("Reconstruction:       {:?}", reconstruct_duration);
    println!("-----------------------------");
    println!("Total Execution:      {:?}", total_start.elapsed());
}

/// Installs a `tracing` subscriber; `RUST_LOG` overrides the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
