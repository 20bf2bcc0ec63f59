//! Human-readable output formatting.

use cqlcomplete_core::schema::describe::create_table_statement;
use cqlcomplete_core::{Completions, Diagnostic, TableDef};
use owo_colors::OwoColorize;
use std::fmt::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// One candidate per line, then hints in angle brackets unless `quiet`.
pub fn format_completions(completions: &Completions, quiet: bool, colored: bool) -> String {
    let mut out = String::new();

    for candidate in &completions.candidates {
        writeln!(out, "{candidate}").unwrap();
    }

    if !quiet {
        for hint in &completions.hints {
            if colored {
                writeln!(out, "{}", hint.dimmed()).unwrap();
            } else {
                writeln!(out, "{hint}").unwrap();
            }
        }
    }

    out
}

#[derive(Tabled)]
struct ColumnRow<'a> {
    #[tabled(rename = "Column")]
    name: &'a str,
    #[tabled(rename = "Type")]
    cql_type: &'a str,
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Index")]
    index: &'a str,
}

/// Column table, diagnostics and DDL for a decoded table.
pub fn format_description(
    table: &TableDef,
    diagnostics: &[Diagnostic],
    quiet: bool,
    colored: bool,
) -> String {
    let mut out = String::new();

    let title = table.qualified_name();
    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
    }

    let rows = table.columns.iter().map(|column| ColumnRow {
        name: &column.name,
        cql_type: &column.cql_type,
        key: key_role(table, &column.name),
        index: column.index_name.as_deref().unwrap_or(""),
    });
    writeln!(out, "{}", Table::new(rows).with(Style::rounded())).unwrap();
    writeln!(out).unwrap();

    if !quiet && !diagnostics.is_empty() {
        let header = format!("Diagnostics ({}):", diagnostics.len());
        if colored {
            writeln!(out, "{}", header.yellow().bold()).unwrap();
        } else {
            writeln!(out, "{header}").unwrap();
        }
        for diagnostic in diagnostics {
            writeln!(out, "  {diagnostic}").unwrap();
        }
        writeln!(out).unwrap();
    }

    writeln!(out, "{}", create_table_statement(table)).unwrap();
    out
}

fn key_role(table: &TableDef, column: &str) -> &'static str {
    if table.partition_key() == Some(column) {
        "partition"
    } else if table.is_key_column(column) {
        "clustering"
    } else {
        ""
    }
}
