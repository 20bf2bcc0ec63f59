mod common;

use common::{catalog, complete, complete_in};
use cqlcomplete_core::{
    cql, CompleterRegistry, CompletionEngine, CompletionOptions, GrammarBuilder, KeywordCase,
    SchemaCatalog, SchemaError,
};
use rstest::rstest;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_empty_input_offers_statement_keywords() {
    let result = complete("");
    assert_eq!(
        result.candidates,
        strings(&[
            "ALTER", "BEGIN", "CREATE", "DELETE", "DROP", "INSERT", "SELECT", "TRUNCATE", "UPDATE",
            "USE",
        ])
    );
    assert!(result.hints.is_empty());
    assert_eq!(result.partial, None);
}

#[rstest]
#[case("SEL", &["SELECT"])]
#[case("sel", &["select"])]
#[case("dr", &["drop"])]
#[case("-- note\nTRUNC", &["TRUNCATE"])]
fn test_partial_keyword(#[case] input: &str, #[case] expected: &[&str]) {
    assert_eq!(complete(input).candidates, strings(expected));
}

#[test]
fn test_keyword_case_option() {
    let options = CompletionOptions {
        keyword_case: KeywordCase::Lower,
        ..CompletionOptions::default()
    };
    let engine = cql::engine(options).unwrap();
    let result = engine.resolve("SELECT * FROM users ", &catalog().with_current_keyspace("app"));
    assert!(result.candidates.contains(&"where".to_string()));
    assert!(!result.candidates.contains(&"WHERE".to_string()));
}

#[test]
fn test_use_offers_keyspaces() {
    assert_eq!(complete("USE ").candidates, strings(&["app", "metrics"]));
    assert_eq!(complete("USE m").candidates, strings(&["metrics"]));
}

#[test]
fn test_table_names_without_current_keyspace() {
    // Only keyspace qualifiers can be offered until a keyspace is known.
    assert_eq!(
        complete("SELECT * FROM ").candidates,
        strings(&["app.", "metrics."])
    );
}

#[test]
fn test_table_names_in_current_keyspace() {
    assert_eq!(
        complete_in("app", "SELECT * FROM ").candidates,
        strings(&["\"Audit Log\"", "app.", "events", "metrics.", "users"])
    );
}

#[test]
fn test_table_names_after_keyspace_qualifier() {
    assert_eq!(
        complete("SELECT * FROM metrics.").candidates,
        strings(&["samples"])
    );
    assert_eq!(
        complete_in("metrics", "SELECT * FROM app.e").candidates,
        strings(&["events"])
    );
}

#[test]
fn test_unknown_keyspace_empties_only_its_branch() {
    let result = complete("SELECT * FROM nope.");
    assert!(result.candidates.is_empty());
    assert_eq!(result.error, None);
}

#[test]
fn test_quoted_partial_completes_quoted_names() {
    let result = complete_in("app", "SELECT * FROM \"Au");
    assert_eq!(result.candidates, strings(&["\"Audit Log\""]));
    assert_eq!(result.partial.as_deref(), Some("\"Au"));

    let result = complete_in("app", "SELECT * FROM \"us");
    assert_eq!(result.candidates, strings(&["\"users\""]));
}

#[test]
fn test_clauses_after_table_name() {
    let result = complete_in("app", "SELECT * FROM users ");
    for keyword in ["WHERE", "LIMIT", "ORDER", "USING"] {
        assert!(
            result.candidates.contains(&keyword.to_string()),
            "missing {keyword}: {:?}",
            result.candidates
        );
    }
}

#[test]
fn test_where_offers_filterable_columns() {
    assert_eq!(
        complete_in("app", "SELECT * FROM users WHERE ").candidates,
        strings(&["email", "id"])
    );
    assert_eq!(
        complete_in("app", "SELECT * FROM users WHERE id = 1 AND ").candidates,
        strings(&["email"])
    );
}

#[test]
fn test_where_value_is_a_hint() {
    let result = complete_in("app", "SELECT * FROM users WHERE email = ");
    assert!(result.candidates.is_empty());
    assert_eq!(result.hints, strings(&["<value>"]));
}

#[test]
fn test_order_by_offers_clustering_columns() {
    assert_eq!(
        complete_in("app", "SELECT * FROM events WHERE source = 'web' ORDER BY ").candidates,
        strings(&["ts"])
    );
}

#[test]
fn test_consistency_levels() {
    let result = complete_in("app", "SELECT * FROM users USING CONSISTENCY ");
    let mut expected = strings(cql::CONSISTENCY_LEVELS);
    expected.sort();
    assert_eq!(result.candidates, expected);
}

#[test]
fn test_insert_offers_key_first() {
    assert_eq!(
        complete_in("app", "INSERT INTO users (").candidates,
        strings(&["id"])
    );
}

#[test]
fn test_insert_never_reoffers_listed_columns() {
    assert_eq!(
        complete_in("app", "INSERT INTO users (id, ").candidates,
        strings(&["age", "email", "name"])
    );
    assert_eq!(
        complete_in("app", "INSERT INTO users (id, email, ").candidates,
        strings(&["age", "name"])
    );
}

#[test]
fn test_insert_values_hint() {
    let result = complete_in("app", "INSERT INTO users (id, name) VALUES (");
    assert!(result.candidates.is_empty());
    assert_eq!(result.hints, strings(&["<value>"]));
}

#[test]
fn test_using_options_exclude_chosen_ones() {
    let result = complete_in(
        "app",
        "INSERT INTO users (id, name) VALUES (1, 'x') USING TTL 30 AND ",
    );
    assert_eq!(result.candidates, strings(&["CONSISTENCY", "TIMESTAMP"]));

    let result = complete_in("app", "UPDATE users USING CONSISTENCY ONE AND ");
    assert_eq!(result.candidates, strings(&["TIMESTAMP", "TTL"]));
}

#[rstest]
#[case(KeywordCase::MatchPartial, "t", &["timestamp", "ttl"])]
#[case(KeywordCase::MatchPartial, "T", &["TIMESTAMP", "TTL"])]
#[case(KeywordCase::Lower, "", &["consistency", "timestamp", "ttl"])]
fn test_using_options_follow_keyword_case(
    #[case] case: KeywordCase,
    #[case] partial: &str,
    #[case] expected: &[&str],
) {
    let options = CompletionOptions {
        keyword_case: case,
        ..CompletionOptions::default()
    };
    let engine = cql::engine(options).unwrap();
    let input = format!("INSERT INTO users (id) VALUES (1) USING {partial}");
    let result = engine.resolve(&input, &catalog().with_current_keyspace("app"));
    assert_eq!(result.candidates, strings(expected));
}

#[test]
fn test_delete_has_no_ttl_option() {
    assert_eq!(
        complete_in("app", "DELETE FROM users USING ").candidates,
        strings(&["CONSISTENCY", "TIMESTAMP"])
    );
}

#[test]
fn test_update_set_offers_unassigned_columns() {
    assert_eq!(
        complete_in("app", "UPDATE users SET name = 'a', ").candidates,
        strings(&["age", "email"])
    );
}

#[test]
fn test_statement_inside_batch() {
    let result = complete_in(
        "app",
        "BEGIN BATCH INSERT INTO users (id) VALUES (1); UPDATE users SET ",
    );
    assert_eq!(result.candidates, strings(&["age", "email", "name"]));
}

#[test]
fn test_batch_statements_do_not_share_a_keyspace() {
    let result = complete_in(
        "app",
        "BEGIN BATCH INSERT INTO metrics.samples (series) VALUES ('a'); UPDATE users SET ",
    );
    assert_eq!(result.candidates, strings(&["age", "email", "name"]));

    let result = complete_in(
        "app",
        "BEGIN BATCH UPDATE users SET age = 1 WHERE id = 1; INSERT INTO metrics.samples (",
    );
    assert_eq!(result.candidates, strings(&["at", "series"]));
}

#[test]
fn test_only_last_statement_is_completed() {
    assert_eq!(
        complete("USE app; USE ").candidates,
        strings(&["app", "metrics"])
    );
}

#[test]
fn test_unterminated_comment_yields_nothing() {
    assert!(complete("SELECT * /* unfinished").is_empty());
}

#[test]
fn test_create_statements_report_hints() {
    let result = complete("CREATE KEYSPACE ");
    assert!(result.candidates.is_empty());
    assert_eq!(result.hints, strings(&["<new_keyspace_name>"]));

    let result = complete("CREATE TABLE t (id int PRIMARY KEY, ");
    assert_eq!(result.candidates, strings(&["PRIMARY"]));
    assert_eq!(result.hints, strings(&["<new_column_name>"]));
}

#[test]
fn test_hints_can_be_disabled() {
    let options = CompletionOptions {
        include_hints: false,
        ..CompletionOptions::default()
    };
    let engine = cql::engine(options).unwrap();
    assert!(engine.resolve("CREATE KEYSPACE ", &catalog()).is_empty());
}

#[test]
fn test_table_properties() {
    let result = complete("CREATE TABLE t (id int PRIMARY KEY) WITH ");
    assert!(result.candidates.contains(&"COMPACT".to_string()));
    assert!(result.candidates.contains(&"caching".to_string()));
    assert!(result
        .candidates
        .contains(&"compression_parameters:sstable_compression".to_string()));

    let result = complete("CREATE TABLE t (id int PRIMARY KEY) WITH comment = 'x' AND ");
    assert!(!result.candidates.contains(&"comment".to_string()));
}

#[test]
fn test_table_property_values() {
    assert_eq!(
        complete("CREATE TABLE t (id int PRIMARY KEY) WITH caching = ").candidates,
        strings(&["'ALL'", "'KEYS_ONLY'", "'NONE'", "'ROWS_ONLY'"])
    );
    assert_eq!(
        complete("CREATE TABLE t (id int PRIMARY KEY) WITH caching = 'K").candidates,
        strings(&["'KEYS_ONLY'"])
    );
}

#[test]
fn test_primary_key_list_offers_declared_columns() {
    assert_eq!(
        complete("CREATE TABLE t (a int, b text, PRIMARY KEY (a, ").candidates,
        strings(&["b"])
    );
}

#[test]
fn test_index_statements() {
    assert_eq!(
        complete_in("app", "CREATE INDEX ON users (").candidates,
        strings(&["age", "name"])
    );
    assert_eq!(
        complete_in("app", "DROP INDEX ").candidates,
        strings(&["users_email_idx"])
    );
}

#[test]
fn test_alter_offers_non_key_columns() {
    assert_eq!(
        complete_in("app", "ALTER TABLE users DROP ").candidates,
        strings(&["age", "email", "name"])
    );
}

#[test]
fn test_oversized_input_is_rejected() {
    let options = CompletionOptions {
        max_input_length: 8,
        ..CompletionOptions::default()
    };
    let engine = cql::engine(options).unwrap();
    let result = engine.resolve("SELECT * FROM users", &catalog());
    assert!(result.candidates.is_empty());
    assert_eq!(
        result.error.as_deref(),
        Some("Input exceeds maximum length of 8 bytes")
    );
}

#[test]
fn test_long_statement_is_rejected() {
    let options = CompletionOptions {
        max_statement_tokens: 3,
        ..CompletionOptions::default()
    };
    let engine = cql::engine(options).unwrap();
    let catalog = catalog().with_current_keyspace("app");

    let result = engine.resolve("USE app; SELECT * FROM ", &catalog);
    assert_eq!(result.error, None);
    assert!(result.candidates.contains(&"users".to_string()));

    let result = engine.resolve("SELECT * FROM users ", &catalog);
    assert!(result.candidates.is_empty());
    assert_eq!(
        result.error.as_deref(),
        Some("Statement exceeds maximum of 3 tokens")
    );
}

#[test]
fn test_mixed_case_names_are_matched_exactly() {
    let catalog = SchemaCatalog::from_json(
        r#"{"keyspaces": [{"name": "Shop", "tables": [
            {"layout": {"columnfamily": "MyTable", "key_alias": "id"},
             "columns": [
                {"column": "Email", "index_name": "mytable_email_idx"},
                {"column": "age"}
             ]}
        ]}]}"#,
    )
    .unwrap();
    let engine = common::engine();

    let result = engine.resolve("SELECT * FROM Shop.MyTable WHERE ", &catalog);
    assert_eq!(result.candidates, strings(&["Email", "id"]));

    let catalog = catalog.with_current_keyspace("Shop");
    let result = engine.resolve("INSERT INTO MyTable (id, Email, ", &catalog);
    assert_eq!(result.candidates, strings(&["age"]));

    let result = engine.resolve("UPDATE MyTable SET Email = 'x', ", &catalog);
    assert_eq!(result.candidates, strings(&["age"]));
}

#[test]
fn test_failing_completer_leaves_other_branches() {
    let mut builder = GrammarBuilder::new();
    builder
        .register_text(
            r#"
            JUNK ::= /[ ]+/ ;
            <word> ::= /[a-z]+/ ;
            <start> ::= "GET" ( broken=<word> | working=<word> ) ;
            "#,
        )
        .unwrap();
    let grammar = builder.build("start").unwrap();

    let mut registry = CompleterRegistry::new();
    registry
        .register_completer("start", "broken", |_, _| {
            Err(SchemaError::keyspace_not_found("gone"))
        })
        .unwrap()
        .register_completer("start", "working", |_, _| Ok(vec!["beta".to_string()]))
        .unwrap();

    let engine = CompletionEngine::new(grammar, registry, CompletionOptions::default()).unwrap();
    let result = engine.resolve("GET ", &catalog());
    assert_eq!(result.candidates, strings(&["beta"]));
    assert_eq!(result.error, None);
}

#[test]
fn test_completer_for_unknown_rule_is_rejected() {
    let mut registry = CompleterRegistry::new();
    registry.register_hint("noSuchRule", "x", "<x>").unwrap();
    let err = CompletionEngine::new(
        cql::grammar().unwrap(),
        registry,
        CompletionOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "unknown grammar rule <noSuchRule>");
}
