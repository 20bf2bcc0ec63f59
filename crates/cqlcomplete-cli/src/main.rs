//! cqlcomplete CLI - schema-aware CQL completion

use cqlcomplete_cli::cli;
use cqlcomplete_cli::input;
use cqlcomplete_cli::output;
use cqlcomplete_cli::schema;

use anyhow::{Context, Result};
use clap::Parser;
use cqlcomplete_core::schema::describe::create_table_statement;
use cqlcomplete_core::{cql, SchemaCatalog};
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Args, OutputFormat};
use output::{format_completions, format_completions_json, format_description, Description};

/// No candidates, or a described table with diagnostics.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (unreadable schema or config, unknown table).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        init_tracing();
    }

    let outcome = match args.describe.clone() {
        Some(table) => run_describe(&args, &table),
        None => run(&args),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_FAILURE),
        Err(e) => {
            eprintln!("cqlcomplete: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cqlcomplete_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Complete the statement. Returns false when nothing was printed.
fn run(args: &Args) -> Result<bool> {
    let catalog = load_catalog(args)?;
    let options = schema::load_options(
        args.config.as_deref(),
        args.keyword_case.map(Into::into),
    )?;
    let statement = input::read_statement(args.statement.as_deref())?;

    let engine = cql::engine(options).context("Failed to build the CQL grammar")?;
    let completions = engine.resolve(&statement, &catalog);

    if let Some(error) = &completions.error {
        tracing::warn!(%error, "completion rejected");
    }

    let output_str = match args.format {
        OutputFormat::Json => format_completions_json(&completions, args.quiet, args.compact)
            .context("Failed to serialize completions")?,
        OutputFormat::Text => format_completions(&completions, args.quiet, colored(args)),
    };
    write_output(&args.output, &output_str)?;

    if let Some(error) = &completions.error {
        if args.format != OutputFormat::Json && !args.quiet {
            eprintln!("cqlcomplete: error: {error}");
        }
    }

    let shown = !completions.candidates.is_empty()
        || (!args.quiet && !completions.hints.is_empty());
    Ok(shown && completions.error.is_none())
}

/// Print a decoded table. Returns false when decoding produced diagnostics.
fn run_describe(args: &Args, table: &str) -> Result<bool> {
    let catalog = load_catalog(args)?;
    let (table, diagnostics) = catalog
        .describe(table, args.keyspace.as_deref())
        .with_context(|| format!("Failed to describe table '{table}'"))?;

    let output_str = match args.format {
        OutputFormat::Json => output::format_json(
            &Description {
                table: &table,
                diagnostics: &diagnostics,
                create_statement: create_table_statement(&table),
            },
            args.compact,
        )
        .context("Failed to serialize table description")?,
        OutputFormat::Text => format_description(&table, &diagnostics, args.quiet, colored(args)),
    };
    write_output(&args.output, &output_str)?;

    Ok(diagnostics.is_empty())
}

fn load_catalog(args: &Args) -> Result<SchemaCatalog> {
    schema::load_catalog(args.schema.as_deref(), args.keyspace.as_deref())
        .context("Failed to load schema")
}

fn colored(args: &Args) -> bool {
    args.output.is_none() && io::stdout().is_terminal()
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.is_empty() && !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
