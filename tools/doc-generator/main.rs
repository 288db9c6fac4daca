use clap::Parser;
use exprgraph::ast::{Expression, ExpressionArg};
use exprgraph::document::to_document_string;
use rand::Rng;
use rand::rngs::ThreadRng;
use std::fs;

/// A CLI tool to generate random expression documents for stress-testing the editor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_document.json")]
    output: String,

    /// Number of top-level expressions
    #[arg(short, long, default_value_t = 5)]
    count: usize,

    /// Maximum nesting depth of each expression
    #[arg(short, long, default_value_t = 4)]
    depth: usize,

    /// Maximum number of arguments per operation
    #[arg(long, default_value_t = 3)]
    max_args: usize,
}

const OPERATIONS: &[&str] = &["and", "or", "not", "eq", "lt", "gt", "IF", "DO", "getAttribute"];
const ACTIONS: &[&str] = &["UPDATE_FLAG", "ADD_REPORT", "REMOVE_FLAG", "UPDATE_STUDY_STATUS"];
const EVENT_TYPES: &[&str] = &["ENTER", "SUBMIT", "TIMER", "LEAVE"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.depth == 0 {
        eprintln!("Error: --depth must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating {} study rules (depth up to {}, up to {} args per operation)...",
        cli.count, cli.depth, cli.max_args
    );

    let expressions: Vec<Expression> = (0..cli.count)
        .map(|_| generate_rule(&mut rng, cli.depth, cli.max_args))
        .collect();
    let node_count: usize = expressions.iter().map(Expression::node_count).sum();

    let json_output = to_document_string(&expressions)?;
    fs::write(&cli.output, json_output)?;

    println!(
        "Successfully generated {} expression nodes and saved them to '{}'",
        node_count, cli.output
    );

    Ok(())
}

/// Generates an `IFTHEN(checkEventType(..), <condition>, <action>)` rule.
fn generate_rule(rng: &mut ThreadRng, depth: usize, max_args: usize) -> Expression {
    let event = EVENT_TYPES[rng.random_range(0..EVENT_TYPES.len())];
    let event_check = Expression::new(
        "checkEventType",
        vec![ExpressionArg::StringLiteral(event.to_string())],
    );
    let mut args = vec![ExpressionArg::ExpressionRef(event_check)];
    if depth > 1 {
        args.push(ExpressionArg::ExpressionRef(generate_expression(
            rng,
            depth - 1,
            max_args,
        )));
    }
    let action = ACTIONS[rng.random_range(0..ACTIONS.len())];
    args.push(ExpressionArg::ExpressionRef(Expression::new(
        action,
        vec![ExpressionArg::StringLiteral(format!("flag_{}", rng.random_range(0..100)))],
    )));
    Expression::new("IFTHEN", args)
}

fn generate_expression(rng: &mut ThreadRng, depth: usize, max_args: usize) -> Expression {
    let name = OPERATIONS[rng.random_range(0..OPERATIONS.len())];
    let arg_count = rng.random_range(0..=max_args);
    let args = (0..arg_count)
        .map(|_| generate_arg(rng, depth, max_args))
        .collect();
    Expression::new(name, args)
}

fn generate_arg(rng: &mut ThreadRng, depth: usize, max_args: usize) -> ExpressionArg {
    match rng.random_range(0..3) {
        0 => ExpressionArg::NumberLiteral(rng.random_range(0..1000) as f64),
        1 => ExpressionArg::StringLiteral(format!("key_{}", rng.random_range(0..50))),
        _ if depth > 1 => ExpressionArg::ExpressionRef(generate_expression(rng, depth - 1, max_args)),
        _ => ExpressionArg::NumberLiteral(0.0),
    }
}
