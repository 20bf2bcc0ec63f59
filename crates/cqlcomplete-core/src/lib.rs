//! Grammar-driven, schema-aware completion for CQL statements.
//!
//! A [`Grammar`] is assembled from rule text, completers are attached to named
//! binding sites in a [`CompleterRegistry`], and a [`CompletionEngine`] answers
//! "what may follow this input?" against a [`SchemaAccessor`]. The [`cql`]
//! module provides the stock CQL grammar and completers.

pub mod completion;
pub mod config;
pub mod cql;
pub mod error;
pub mod escape;
pub mod grammar;
pub mod schema;

pub use completion::{
    BindingContext, CompleterEntry, CompleterFn, CompleterKey, CompleterRegistry,
    CompletionEngine, Completions,
};
pub use config::{
    CompletionOptions, KeywordCase, DEFAULT_MAX_INPUT_LENGTH, DEFAULT_MAX_STATEMENT_TOKENS,
};
pub use error::{ErrorCode, GrammarError, SchemaError, SchemaObject, UnknownErrorCode};
pub use escape::{
    escape_name, escape_value, is_reserved_keyword, is_valid_name, maybe_escape_name,
    unescape_name, unescape_value,
};
pub use grammar::{
    BindingSite, Expected, Grammar, GrammarBuilder, GrammarMatcher, Matcher, ReachablePosition,
    Span, Token, TokenKind, UnterminatedKind,
};
pub use schema::{
    ColumnDef, ColumnRow, Diagnostic, DiagnosticKind, KeyspaceSnapshot, LayoutRow,
    SchemaAccessor, SchemaCatalog, SchemaSnapshot, TableDef, TableOptions, TableSnapshot,
};

// Test utilities (must be at end of file)
#[cfg(test)]
pub mod test_utils;
