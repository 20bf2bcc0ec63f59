//! The CQL statement grammar and its completers.
//!
//! ```
//! use cqlcomplete_core::{cql, CompletionOptions, SchemaCatalog};
//!
//! let engine = cql::engine(CompletionOptions::default()).unwrap();
//! let result = engine.resolve("TRUNC", &SchemaCatalog::default());
//! assert_eq!(result.candidates, vec!["TRUNCATE"]);
//! ```

mod completers;
mod syntax;

pub use completers::{
    COLUMNFAMILY_MAP_OPTIONS, COLUMNFAMILY_OPTIONS, CONSISTENCY_LEVELS, KEYSPACE_OPTIONS,
};
pub use syntax::START_RULE;

use crate::completion::{CompleterRegistry, CompletionEngine};
use crate::config::CompletionOptions;
use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, UnterminatedKind};

/// Builder loaded with the CQL rules, for callers that want to add their own.
pub fn grammar_builder() -> Result<GrammarBuilder, GrammarError> {
    let mut builder = GrammarBuilder::new();
    builder
        .register_text(syntax::TERMINALS)?
        .register_text(syntax::STATEMENTS)?
        .register_text(syntax::SELECT)?
        .register_text(syntax::MODIFICATION)?
        .register_text(syntax::SCHEMA_CHANGES)?
        .unterminated(
            UnterminatedKind::Literal,
            "unclosedString",
            syntax::UNCLOSED_STRING,
        )?
        .unterminated(UnterminatedKind::Name, "unclosedName", syntax::UNCLOSED_NAME)?
        .unterminated(
            UnterminatedKind::Comment,
            "unclosedComment",
            syntax::UNCLOSED_COMMENT,
        )?;
    Ok(builder)
}

pub fn grammar() -> Result<Grammar, GrammarError> {
    grammar_builder()?.build(START_RULE)
}

pub fn completers() -> Result<CompleterRegistry, GrammarError> {
    let mut registry = CompleterRegistry::new();
    completers::register(&mut registry)?;
    Ok(registry)
}

/// A ready-to-use engine for CQL.
pub fn engine(options: CompletionOptions) -> Result<CompletionEngine, GrammarError> {
    CompletionEngine::new(grammar()?, completers()?, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_builds() {
        let grammar = grammar().unwrap();
        assert_eq!(grammar.start(), START_RULE);
        assert!(grammar.contains("selectStatement"));
        assert_eq!(grammar.unterminated().count(), 3);
    }

    #[test]
    fn test_every_completer_targets_a_rule() {
        let grammar = grammar().unwrap();
        let registry = completers().unwrap();
        for key in registry.keys() {
            assert!(grammar.contains(&key.production), "{}", key.production);
        }
    }

    /// Tables of the current keyspace, with no keyspaces listed.
    struct Tables;

    impl crate::schema::SchemaAccessor for Tables {
        fn keyspace_names(&self) -> Result<Vec<String>, crate::SchemaError> {
            Ok(Vec::new())
        }

        fn columnfamily_names(
            &self,
            _keyspace: Option<&str>,
        ) -> Result<Vec<String>, crate::SchemaError> {
            Ok(vec!["users".to_string(), "events".to_string()])
        }

        fn columnfamily(
            &self,
            name: &str,
            _keyspace: Option<&str>,
        ) -> Result<crate::TableDef, crate::SchemaError> {
            Err(crate::SchemaError::table_not_found(name))
        }

        fn index_names(&self, _keyspace: Option<&str>) -> Result<Vec<String>, crate::SchemaError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_from_offers_exactly_the_tables() {
        let engine = engine(CompletionOptions::default()).unwrap();
        let result = engine.resolve("SELECT * FROM ", &Tables);
        assert_eq!(result.candidates, vec!["events", "users"]);
        assert!(result.hints.is_empty());
    }

    #[test]
    fn test_failing_schema_yields_no_names() {
        let schema = crate::test_utils::StubSchema::new().failing();
        let engine = engine(CompletionOptions::default()).unwrap();
        let result = engine.resolve("USE ", &schema);
        assert!(result.is_empty());
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_consistency_levels_match_grammar() {
        let grammar = grammar().unwrap();
        let rule = grammar.lookup("consistencyLevel").unwrap();
        assert_eq!(rule.alternatives.len(), CONSISTENCY_LEVELS.len());
    }
}
