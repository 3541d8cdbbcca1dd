//! Command-line driver for the SAAAM compiler.

use anyhow::Context;
use clap::Parser;
use saaam_compiler::CompileResult;
use std::io::Read as _;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

/// Compile a SAAAM game script to its target text.
#[derive(Parser, Debug)]
#[command(name = "saaamc", version, about, long_about = None)]
struct Args {
    /// Path to a `.saaam` source file. Reads from stdin when omitted.
    input: Option<PathBuf>,

    /// Emit the compile result as JSON instead of plain text.
    #[arg(long)]
    json: bool,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn read_source(input: &Option<PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_text(result: &CompileResult, source: &str) {
    for err in &result.errors {
        eprintln!("{}", err.render(source));
    }
    for warning in &result.warnings {
        eprintln!("{}", warning.render(source));
    }
    if let Some(output) = &result.output {
        println!("{output}");
    }
}

fn print_json(result: &CompileResult, source: &str) -> anyhow::Result<()> {
    let errors: Vec<String> = result.errors.iter().map(|d| d.render(source)).collect();
    let warnings: Vec<String> = result.warnings.iter().map(|d| d.render(source)).collect();
    let value = serde_json::json!({
        "success": result.success,
        "output": result.output,
        "errors": errors,
        "warnings": warnings,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let source = read_source(&args.input)?;
    tracing::info!(bytes = source.len(), "compiling source");
    let result = saaam_compiler::compile(&source);

    if args.json {
        print_json(&result, &source)?;
    } else {
        print_text(&result, &source);
    }

    if result.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
