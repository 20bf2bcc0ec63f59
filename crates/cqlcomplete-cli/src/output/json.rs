//! JSON output formatting.

use cqlcomplete_core::{Completions, Diagnostic, TableDef};
use serde::Serialize;

/// A decoded table as printed by `--describe`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Description<'a> {
    pub table: &'a TableDef,
    pub diagnostics: &'a [Diagnostic],
    pub create_statement: String,
}

/// Format any serializable result as JSON.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json<T: Serialize>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

/// Completions as JSON, dropping hints when `quiet`.
pub fn format_completions_json(
    completions: &Completions,
    quiet: bool,
    compact: bool,
) -> serde_json::Result<String> {
    if quiet && !completions.hints.is_empty() {
        let trimmed = Completions {
            hints: Vec::new(),
            ..completions.clone()
        };
        format_json(&trimmed, compact)
    } else {
        format_json(completions, compact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Completions {
        Completions {
            candidates: vec!["events".to_string(), "users".to_string()],
            hints: vec!["<value>".to_string()],
            partial: None,
            error: None,
        }
    }

    #[test]
    fn test_json_pretty() {
        let json = format_completions_json(&sample(), false, false).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"candidates\""));
        assert!(json.contains("<value>"));
    }

    #[test]
    fn test_json_compact_quiet() {
        let json = format_completions_json(&sample(), true, true).unwrap();
        assert_eq!(json, r#"{"candidates":["events","users"]}"#);
    }
}
