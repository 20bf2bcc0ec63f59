//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use cqlcomplete_core::KeywordCase;
use std::path::PathBuf;

/// cqlcomplete - schema-aware CQL completion
#[derive(Parser, Debug)]
#[command(name = "cqlcomplete")]
#[command(about = "Complete a partial CQL statement", long_about = None)]
#[command(version)]
pub struct Args {
    /// Partial statement, ending at the cursor (reads from stdin if omitted)
    #[arg(value_name = "STATEMENT")]
    pub statement: Option<String>,

    /// Schema snapshot JSON file
    #[arg(short, long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Current keyspace, as set by USE
    #[arg(short, long, value_name = "KEYSPACE")]
    pub keyspace: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Print the decoded definition of a table instead of completing
    #[arg(long, value_name = "TABLE", requires = "schema")]
    pub describe: Option<String>,

    /// Completion options JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Casing of keyword candidates (overrides --config)
    #[arg(long, value_enum)]
    pub keyword_case: Option<KeywordCaseArg>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress hints and diagnostics
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Log resolution details to stderr (RUST_LOG overrides the level)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeywordCaseArg {
    Upper,
    Lower,
    AsDeclared,
    MatchPartial,
}

impl From<KeywordCaseArg> for KeywordCase {
    fn from(k: KeywordCaseArg) -> Self {
        match k {
            KeywordCaseArg::Upper => KeywordCase::Upper,
            KeywordCaseArg::Lower => KeywordCase::Lower,
            KeywordCaseArg::AsDeclared => KeywordCase::AsDeclared,
            KeywordCaseArg::MatchPartial => KeywordCase::MatchPartial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_case_conversion() {
        let case: KeywordCase = KeywordCaseArg::AsDeclared.into();
        assert_eq!(case, KeywordCase::AsDeclared);
    }

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::parse_from(["cqlcomplete", "SELECT * FROM "]);
        assert_eq!(args.statement.as_deref(), Some("SELECT * FROM "));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.schema.is_none());
        assert!(args.keyword_case.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::parse_from([
            "cqlcomplete",
            "-s",
            "schema.json",
            "-k",
            "app",
            "-f",
            "json",
            "--keyword-case",
            "lower",
            "-q",
            "USE ",
        ]);
        assert_eq!(args.keyspace.as_deref(), Some("app"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.keyword_case, Some(KeywordCaseArg::Lower));
        assert!(args.quiet);
    }

    #[test]
    fn test_describe_requires_schema() {
        let result = Args::try_parse_from(["cqlcomplete", "--describe", "users"]);
        assert!(result.is_err());
    }
}
