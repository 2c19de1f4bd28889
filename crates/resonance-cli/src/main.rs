//! Resonance CLI - Earned-Media Diagnostics
//!
//! Command-line driver over the resonance-core engine:
//! - `inspect`: resolve and print the column-mapping preview
//! - `pass1`: states, modifiers, central narrative, validation
//! - `pass2`: windowed topic/narrative/entity signals
//! - `run`: both passes, Pass 2 consuming the Pass-1 output

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use resonance_core::{DiagnosticEngine, SignalConfig, Table};

/// Earned-media diagnostics: states, modifiers, and windowed signals.
#[derive(Debug, Parser)]
#[command(name = "resonance", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the schema and print the column-mapping preview
    Inspect {
        /// Input CSV file
        input: PathBuf,
        /// Emit the mapping as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run Pass 1: states, modifiers, central narrative, validation
    Pass1 {
        /// Input CSV file
        input: PathBuf,
        /// Output path (default: Diagnostics_<input> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run Pass 2: windowed topic, narrative, and entity signals
    Pass2 {
        /// Input CSV file (ideally the Pass-1 output)
        input: PathBuf,
        /// Output path (default: Signals_<input> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Window anchor date, YYYY-MM-DD (default: max date in the input)
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDate>,
    },
    /// Run both passes; Pass 2 consumes the Pass-1 output
    Run {
        /// Input CSV file
        input: PathBuf,
        /// Window anchor date, YYYY-MM-DD (default: max date in the input)
        #[arg(long, value_parser = parse_as_of)]
        as_of: Option<NaiveDate>,
    },
}

fn parse_as_of(value: &str) -> std::result::Result<NaiveDate, String> {
    resonance_core::parse_date(value)
        .ok_or_else(|| format!("unrecognized date \"{value}\" (expected YYYY-MM-DD)"))
}

fn derived_path(input: &Path, prefix: &str) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.csv".to_string());
    input.with_file_name(format!("{prefix}{file_name}"))
}

fn load_table(input: &Path) -> Result<Table> {
    Table::from_path(input).with_context(|| format!("failed to read {}", input.display()))
}

fn write_table(table: &Table, path: &Path) -> Result<()> {
    table
        .write_path(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("{} {}", "wrote".green().bold(), path.display());
    Ok(())
}

fn print_preview(schema: &resonance_core::SchemaMap) {
    println!("{}", "Column mapping".bold());
    print!("{}", schema.preview());
    if !schema.warnings.is_empty() {
        println!(
            "{} {} substitution(s) tolerated",
            "note:".yellow().bold(),
            schema.warnings.len()
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { input, json } => {
            let table = load_table(&input)?;
            let schema = DiagnosticEngine::new()
                .resolve(&table)
                .context("schema resolution failed")?;
            if json {
                println!("{}", schema.to_json()?);
            } else {
                print_preview(&schema);
            }
        }
        Command::Pass1 { input, output } => {
            let table = load_table(&input)?;
            let engine = DiagnosticEngine::new();
            let schema = engine.resolve(&table).context("schema resolution failed")?;
            print_preview(&schema);

            let annotated = engine.pass1(&table)?;
            info!(rows = annotated.len(), "pass 1 complete");
            let path = output.unwrap_or_else(|| derived_path(&input, "Diagnostics_"));
            write_table(&annotated, &path)?;
        }
        Command::Pass2 {
            input,
            output,
            as_of,
        } => {
            let table = load_table(&input)?;
            let engine = DiagnosticEngine::with_config(SignalConfig {
                as_of,
                ..SignalConfig::default()
            });
            let annotated = engine.pass2(&table)?;
            info!(rows = annotated.len(), "pass 2 complete");
            let path = output.unwrap_or_else(|| derived_path(&input, "Signals_"));
            write_table(&annotated, &path)?;
        }
        Command::Run { input, as_of } => {
            let table = load_table(&input)?;
            let engine = DiagnosticEngine::with_config(SignalConfig {
                as_of,
                ..SignalConfig::default()
            });
            let schema = engine.resolve(&table).context("schema resolution failed")?;
            print_preview(&schema);

            let (pass1, pass2) = engine.run(&table)?;
            write_table(&pass1, &derived_path(&input, "Diagnostics_"))?;
            write_table(&pass2, &derived_path(&input, "Signals_"))?;
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
