//! Quoting and unquoting of identifiers and string literals.
//!
//! Identifiers that are valid bare words and not reserved keywords are emitted
//! as-is; everything else is wrapped in double quotes with embedded double quotes
//! doubled. String literal values always use single quotes with embedded single
//! quotes doubled. The `unescape_*` functions are exact inverses.

use regex::Regex;
use std::sync::OnceLock;

/// Reserved words that can never be used as bare identifiers.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "select",
    "from",
    "where",
    "and",
    "key",
    "insert",
    "update",
    "with",
    "limit",
    "using",
    "consistency",
    "one",
    "quorum",
    "all",
    "any",
    "local_quorum",
    "each_quorum",
    "two",
    "three",
    "use",
    "count",
    "set",
    "begin",
    "apply",
    "batch",
    "truncate",
    "delete",
    "in",
    "create",
    "keyspace",
    "schema",
    "columnfamily",
    "table",
    "index",
    "on",
    "drop",
    "primary",
    "into",
    "values",
    "timestamp",
    "ttl",
    "alter",
    "add",
    "type",
    "compact",
    "storage",
    "order",
    "by",
    "asc",
    "desc",
];

fn bare_word_regex() -> &'static Regex {
    static BARE_WORD: OnceLock<Regex> = OnceLock::new();
    BARE_WORD.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("Invalid regex pattern"))
}

/// Returns true if `word` is a reserved keyword (case-insensitive).
pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(word))
}

/// Returns true if `name` can be written without quotes.
pub fn is_valid_name(name: &str) -> bool {
    bare_word_regex().is_match(name) && !is_reserved_keyword(name)
}

/// Always quote `name`, doubling embedded double quotes.
pub fn escape_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote `name` only when it is not a valid bare identifier.
///
/// # Examples
/// - `users` → `users`
/// - `select` → `"select"`
/// - `My "Table"` → `"My ""Table"""`
pub fn maybe_escape_name(name: &str) -> String {
    if is_valid_name(name) {
        name.to_string()
    } else {
        escape_name(name)
    }
}

/// Reverse [`maybe_escape_name`].
///
/// Surrounding whitespace is ignored. A quoted name without its closing quote (as
/// typed mid-way by a user) is unquoted as far as it goes.
pub fn unescape_name(name: &str) -> String {
    strip_quotes(name.trim(), '"')
}

/// Quote a string literal value, doubling embedded single quotes.
pub fn escape_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Reverse [`escape_value`].
///
/// Input that does not start with a single quote is returned unchanged.
pub fn unescape_value(value: &str) -> String {
    strip_quotes(value, '\'')
}

fn strip_quotes(text: &str, quote: char) -> String {
    let Some(inner) = text.strip_prefix(quote) else {
        return text.to_string();
    };

    // An odd run of trailing quotes means the final one closes the literal.
    let trailing = inner.chars().rev().take_while(|c| *c == quote).count();
    let inner = if trailing % 2 == 1 {
        &inner[..inner.len() - quote.len_utf8()]
    } else {
        inner
    };

    let doubled: String = [quote, quote].iter().collect();
    inner.replace(&doubled, &quote.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names_are_not_quoted() {
        assert_eq!(maybe_escape_name("users"), "users");
        assert_eq!(maybe_escape_name("User_2"), "User_2");
    }

    #[test]
    fn test_reserved_keywords_are_quoted_in_any_case() {
        assert_eq!(maybe_escape_name("select"), "\"select\"");
        assert_eq!(maybe_escape_name("SELECT"), "\"SELECT\"");
        assert!(!is_valid_name("Table"));
    }

    #[test]
    fn test_invalid_words_are_quoted() {
        assert_eq!(maybe_escape_name("2fast"), "\"2fast\"");
        assert_eq!(maybe_escape_name("with space"), "\"with space\"");
        assert_eq!(maybe_escape_name(""), "\"\"");
    }

    #[test]
    fn test_embedded_double_quotes_are_doubled() {
        assert_eq!(escape_name("a\"b"), "\"a\"\"b\"");
        assert_eq!(unescape_name("\"a\"\"b\""), "a\"b");
    }

    #[test]
    fn test_unescape_bare_name_trims() {
        assert_eq!(unescape_name("  users "), "users");
        assert_eq!(unescape_name(""), "");
    }

    #[test]
    fn test_unescape_unterminated_name() {
        assert_eq!(unescape_name("\"My Ta"), "My Ta");
        assert_eq!(unescape_name("\"a\"\""), "a\"");
    }

    #[test]
    fn test_unescape_keeps_case_of_bare_names() {
        assert_eq!(unescape_name("MyTable"), "MyTable");
        assert_eq!(unescape_name(&maybe_escape_name("Email")), "Email");
        assert_eq!(unescape_name("\"Users\""), "Users");
    }

    #[test]
    fn test_value_quoting() {
        assert_eq!(escape_value("it's"), "'it''s'");
        assert_eq!(unescape_value("'it''s'"), "it's");
        assert_eq!(unescape_value("'unfinished"), "unfinished");
        assert_eq!(unescape_value("42"), "42");
    }

    #[test]
    fn test_quote_only_values() {
        assert_eq!(escape_value("'"), "''''");
        assert_eq!(unescape_value("''''"), "'");
        assert_eq!(unescape_value("''"), "");
    }
}
