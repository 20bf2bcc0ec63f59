//! Options controlling completion resolution.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum input size (10MB) to prevent memory exhaustion.
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 10 * 1024 * 1024;

/// Maximum number of significant tokens in the statement under the cursor.
pub const DEFAULT_MAX_STATEMENT_TOKENS: usize = 4096;

/// How keyword candidates are cased in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub enum KeywordCase {
    /// Always upper-case.
    Upper,
    /// Always lower-case.
    Lower,
    /// Keep the spelling used in the grammar.
    AsDeclared,
    /// Lower-case when the partial token is all lower-case, upper-case otherwise.
    #[default]
    MatchPartial,
}

impl KeywordCase {
    /// Apply this casing to a keyword, given the partial token being completed.
    pub fn apply(self, keyword: &str, partial: Option<&str>) -> String {
        match self {
            Self::Upper => keyword.to_uppercase(),
            Self::Lower => keyword.to_lowercase(),
            Self::AsDeclared => keyword.to_string(),
            Self::MatchPartial => {
                let lower = partial.is_some_and(|p| {
                    p.chars().any(|c| c.is_alphabetic())
                        && !p.chars().any(|c| c.is_uppercase())
                });
                if lower {
                    keyword.to_lowercase()
                } else {
                    keyword.to_uppercase()
                }
            }
        }
    }
}

/// Options for [`crate::CompletionEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    /// Inputs longer than this many bytes are rejected (default: 10MB).
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,

    /// Statements with more significant tokens than this are not matched
    /// (default: 4096). Matching cost grows with statement length.
    #[serde(default = "default_max_statement_tokens")]
    pub max_statement_tokens: usize,

    /// Casing applied to keyword candidates.
    #[serde(default)]
    pub keyword_case: KeywordCase,

    /// Whether static hints are reported at all (default: true).
    #[serde(default = "default_include_hints")]
    pub include_hints: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            max_statement_tokens: DEFAULT_MAX_STATEMENT_TOKENS,
            keyword_case: KeywordCase::default(),
            include_hints: true,
        }
    }
}

fn default_max_input_length() -> usize {
    DEFAULT_MAX_INPUT_LENGTH
}

fn default_max_statement_tokens() -> usize {
    DEFAULT_MAX_STATEMENT_TOKENS
}

fn default_include_hints() -> bool {
    true
}
