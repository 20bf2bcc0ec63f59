//! Fuzz target for completion resolution.
//!
//! This tests that `resolve()` doesn't panic on arbitrary partial statements.

#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use cqlcomplete_core::{cql, CompletionEngine, CompletionOptions, KeywordCase, SchemaCatalog};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    statement: String,
    case_idx: u8,
    with_keyspace: bool,
}

impl FuzzInput {
    fn keyword_case(&self) -> KeywordCase {
        match self.case_idx % 4 {
            0 => KeywordCase::Upper,
            1 => KeywordCase::Lower,
            2 => KeywordCase::AsDeclared,
            _ => KeywordCase::MatchPartial,
        }
    }
}

fn catalog() -> &'static SchemaCatalog {
    static CATALOG: OnceLock<SchemaCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        SchemaCatalog::from_json(
            r#"{"keyspaces": [{"name": "app", "tables": [
                {"layout": {"columnfamily": "users", "key_alias": "id"},
                 "columns": [{"column": "name"}, {"column": "email", "index_name": "by_email"}]}
            ]}]}"#,
        )
        .expect("fuzz schema should parse")
    })
}

fuzz_target!(|input: FuzzInput| {
    let engine: CompletionEngine = cql::engine(CompletionOptions {
        keyword_case: input.keyword_case(),
        ..CompletionOptions::default()
    })
    .expect("CQL grammar should build");

    let catalog = if input.with_keyspace {
        catalog().clone().with_current_keyspace("app")
    } else {
        catalog().clone()
    };

    // Resolution never fails; bad input only narrows the candidates.
    let _result = engine.resolve(&input.statement, &catalog);
});
