//! Loading of the schema snapshot and completion options.

use anyhow::{Context, Result};
use cqlcomplete_core::{CompletionOptions, KeywordCase, SchemaCatalog};
use std::path::Path;

/// Load a schema snapshot, or an empty catalog when no file is given.
pub fn load_catalog(path: Option<&Path>, keyspace: Option<&str>) -> Result<SchemaCatalog> {
    let mut catalog = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
            SchemaCatalog::from_json(&content)
                .with_context(|| format!("Failed to parse schema file: {}", path.display()))?
        }
        None => SchemaCatalog::default(),
    };
    catalog.set_current_keyspace(keyspace.map(str::to_string));
    Ok(catalog)
}

/// Read completion options from a JSON file, then apply flag overrides.
pub fn load_options(
    path: Option<&Path>,
    keyword_case: Option<KeywordCase>,
) -> Result<CompletionOptions> {
    let mut options = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            parse_options(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        }
        None => CompletionOptions::default(),
    };
    if let Some(case) = keyword_case {
        options.keyword_case = case;
    }
    Ok(options)
}

fn parse_options(content: &str) -> Result<CompletionOptions> {
    Ok(serde_json::from_str(content)?)
}
