//! Fuzz target for schema row decoding.
//!
//! This tests that `TableDef::build()` doesn't panic on arbitrary layout rows.

#![no_main]

use arbitrary::Arbitrary;
use cqlcomplete_core::{ColumnRow, LayoutRow, TableDef};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    comparator: String,
    key_alias: Option<String>,
    value_alias: Option<String>,
    column_aliases: Option<String>,
    compression_parameters: Option<String>,
    columns: Vec<(String, String)>,
}

fuzz_target!(|input: FuzzInput| {
    let layout = LayoutRow {
        comparator: input.comparator,
        key_alias: input.key_alias,
        value_alias: input.value_alias,
        column_aliases: input.column_aliases,
        compression_parameters: input.compression_parameters,
        ..LayoutRow::new("ks", "t")
    };
    let rows: Vec<ColumnRow> = input
        .columns
        .into_iter()
        .map(|(name, validator)| ColumnRow::new(name, validator))
        .collect();

    // Shape problems are reported as diagnostics, never as panics.
    let _result = TableDef::build(&layout, &rows);
});
