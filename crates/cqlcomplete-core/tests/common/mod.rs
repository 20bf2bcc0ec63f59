use std::path::PathBuf;

use cqlcomplete_core::{cql, CompletionEngine, CompletionOptions, Completions, SchemaCatalog};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// The fixture catalog, with no current keyspace.
pub fn catalog() -> SchemaCatalog {
    let path = fixtures_dir().join("schema.json");
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load schema {path:?}: {e}"));
    SchemaCatalog::from_json(&json)
        .unwrap_or_else(|e| panic!("Failed to parse schema {path:?}: {e}"))
}

pub fn engine() -> CompletionEngine {
    cql::engine(CompletionOptions::default()).expect("CQL grammar should build")
}

pub fn complete(input: &str) -> Completions {
    engine().resolve(input, &catalog())
}

pub fn complete_in(keyspace: &str, input: &str) -> Completions {
    engine().resolve(input, &catalog().with_current_keyspace(keyspace))
}
