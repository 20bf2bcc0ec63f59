//! Grammar representation with named capture bindings.
//!
//! A [`Grammar`] is assembled once by a [`GrammarBuilder`] from rule text fragments
//! and is immutable afterwards. Rules are written in a small BNF-like syntax:
//!
//! ```text
//! <selectStatement> ::= "SELECT" <selectClause> "FROM" cf=<columnFamilyName>
//!                       ( "WHERE" <whereClause> )? ;
//! <whereClause>     ::= [rel_lhs]=<cident> "=" <term> ( "AND" [rel_lhs]=<cident> "=" <term> )* ;
//! ```
//!
//! - `<name>` references a rule, `"text"` is a literal (keywords compare
//!   case-insensitively), `/regex/` is a case-insensitive pattern that must match a
//!   whole token.
//! - `name=` binds the text matched by the following atom; `[name]=` does the same
//!   but accumulates values across repetitions.
//! - `|` separates alternatives, `( … )` groups, `?`, `*` and `+` repeat.
//! - `JUNK ::= … ;` declares the inter-token skip production.

mod lexer;
mod matcher;
mod parser;

use std::collections::{HashMap, HashSet};
use std::fmt;

use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::GrammarError;

pub use lexer::{Span, Token, TokenKind};
pub use matcher::{BindingSite, Expected, GrammarMatcher, Matcher, ReachablePosition};

pub(crate) use lexer::is_word;
use lexer::Lexicon;
use parser::Definition;

/// A case-insensitive regular-expression terminal.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    whole: Regex,
    prefix: Regex,
}

impl Pattern {
    pub(crate) fn compile(rule: &str, source: &str) -> Result<Self, GrammarError> {
        let build = |anchored: String| {
            RegexBuilder::new(&anchored)
                .case_insensitive(true)
                .build()
                .map_err(|e| GrammarError::InvalidPattern {
                    rule: rule.to_string(),
                    pattern: source.to_string(),
                    message: e.to_string(),
                })
        };

        Ok(Self {
            source: source.to_string(),
            whole: build(format!("^(?:{source})$"))?,
            prefix: build(format!("^(?:{source})"))?,
        })
    }

    /// The regex source as written in the rule text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True if the pattern matches all of `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.whole.is_match(text)
    }

    /// Length in bytes of the match at the start of `text`, if any.
    pub(crate) fn prefix_len(&self, text: &str) -> Option<usize> {
        self.prefix.find(text).map(|m| m.end()).filter(|len| *len > 0)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

/// A grammar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(String),
    Pattern(Pattern),
    Rule(String),
    Seq(Vec<Expr>),
    Choice(Vec<Expr>),
    Repeat {
        expr: Box<Expr>,
        min: usize,
        max: Option<usize>,
    },
    Bind {
        name: String,
        repeatable: bool,
        expr: Box<Expr>,
    },
}

impl Expr {
    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        match self {
            Self::Seq(items) | Self::Choice(items) => {
                for item in items {
                    item.visit(f);
                }
            }
            Self::Repeat { expr, .. } | Self::Bind { expr, .. } => expr.visit(f),
            Self::Literal(_) | Self::Pattern(_) | Self::Rule(_) => {}
        }
    }
}

/// A named production with its alternatives, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Expr>,
}

/// Kinds of terminals that may run to the end of the input without closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum UnterminatedKind {
    /// A string literal missing its closing quote.
    Literal,
    /// A quoted name missing its closing quote.
    Name,
    /// A block comment missing its terminator.
    Comment,
}

impl fmt::Display for UnterminatedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => write!(f, "literal"),
            Self::Name => write!(f, "name"),
            Self::Comment => write!(f, "comment"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UnterminatedTerminal {
    pub(crate) kind: UnterminatedKind,
    pub(crate) name: String,
    pub(crate) pattern: Pattern,
}

/// An immutable grammar. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct Grammar {
    start: String,
    rules: HashMap<String, Rule>,
    lexicon: Lexicon,
}

impl Grammar {
    /// Name of the start rule.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Look up a rule by name.
    pub fn lookup(&self, name: &str) -> Result<&Rule, GrammarError> {
        self.rules
            .get(name)
            .ok_or_else(|| GrammarError::UnknownRule(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Kinds and names of the terminals that may stay open at the end of input.
    pub fn unterminated(&self) -> impl Iterator<Item = (UnterminatedKind, &str)> {
        self.lexicon
            .unterminated
            .iter()
            .map(|terminal| (terminal.kind, terminal.name.as_str()))
    }

    /// Split `input` into tokens, including skip tokens.
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        self.lexicon.tokenize(input)
    }

    pub(crate) fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }
}

/// Collects rule fragments and freezes them into a [`Grammar`].
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    fragments: Vec<(String, Vec<Expr>)>,
    skip: Vec<Expr>,
    unterminated: Vec<UnterminatedTerminal>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `body` and append its alternatives to `rule_name`.
    pub fn register(&mut self, rule_name: &str, body: &str) -> Result<&mut Self, GrammarError> {
        let alternatives = parser::parse_body(rule_name, body)?;
        self.fragments.push((rule_name.to_string(), alternatives));
        Ok(self)
    }

    /// Parse a block of `<name> ::= body ;` definitions.
    pub fn register_text(&mut self, text: &str) -> Result<&mut Self, GrammarError> {
        for definition in parser::parse_definitions(text)? {
            match definition {
                Definition::Rule { name, alternatives } => {
                    self.fragments.push((name, alternatives));
                }
                Definition::Skip { alternatives } => self.skip.extend(alternatives),
            }
        }
        Ok(self)
    }

    /// Register the inter-token skip production.
    pub fn skip(&mut self, body: &str) -> Result<&mut Self, GrammarError> {
        let alternatives = parser::parse_body("JUNK", body)?;
        self.skip.extend(alternatives);
        Ok(self)
    }

    /// Register a terminal that may run to the end of the input. `body` must be a
    /// single `/pattern/`.
    pub fn unterminated(
        &mut self,
        kind: UnterminatedKind,
        name: &str,
        body: &str,
    ) -> Result<&mut Self, GrammarError> {
        let mut alternatives = parser::parse_body(name, body)?;
        let pattern = match (alternatives.pop(), alternatives.is_empty()) {
            (Some(Expr::Pattern(pattern)), true) => pattern,
            _ => {
                return Err(GrammarError::Syntax {
                    rule: name.to_string(),
                    offset: 0,
                    message: "unterminated terminal must be a single pattern".to_string(),
                })
            }
        };
        self.unterminated.push(UnterminatedTerminal {
            kind,
            name: name.to_string(),
            pattern,
        });
        Ok(self)
    }

    /// Assemble the fragments into a grammar starting at `start_rule`.
    pub fn build(&self, start_rule: &str) -> Result<Grammar, GrammarError> {
        let mut rules: HashMap<String, Rule> = HashMap::new();
        for (name, alternatives) in &self.fragments {
            rules
                .entry(name.clone())
                .or_insert_with(|| Rule {
                    name: name.clone(),
                    alternatives: Vec::new(),
                })
                .alternatives
                .extend(alternatives.iter().cloned());
        }

        if !rules.contains_key(start_rule) {
            return Err(GrammarError::UnknownRule(start_rule.to_string()));
        }

        let mut missing: Option<String> = None;
        for (_, alternatives) in &self.fragments {
            for alternative in alternatives {
                alternative.visit(&mut |expr| {
                    if let Expr::Rule(name) = expr {
                        if missing.is_none() && !rules.contains_key(name) {
                            missing = Some(name.clone());
                        }
                    }
                });
            }
        }
        if let Some(name) = missing {
            return Err(GrammarError::UnknownRule(name));
        }

        Ok(Grammar {
            start: start_rule.to_string(),
            rules,
            lexicon: self.lexicon(),
        })
    }

    fn lexicon(&self) -> Lexicon {
        let mut lexicon = Lexicon::default();

        let mut seen_patterns = HashSet::new();
        let mut seen_literals = HashSet::new();
        for (_, alternatives) in &self.fragments {
            for alternative in alternatives {
                alternative.visit(&mut |expr| match expr {
                    Expr::Pattern(pattern) => {
                        if seen_patterns.insert(pattern.source.clone()) {
                            lexicon.patterns.push(pattern.clone());
                        }
                    }
                    Expr::Literal(text) => {
                        if seen_literals.insert(text.to_ascii_lowercase()) {
                            if lexer::is_word(text) {
                                lexicon.words.push(text.clone());
                            } else {
                                lexicon.punctuation.push(text.clone());
                            }
                        }
                    }
                    _ => {}
                });
            }
        }

        for alternative in &self.skip {
            alternative.visit(&mut |expr| match expr {
                Expr::Pattern(pattern) => lexicon.skip_patterns.push(pattern.clone()),
                Expr::Literal(text) => lexicon.skip_literals.push(text.clone()),
                _ => {}
            });
        }

        lexicon.unterminated = self.unterminated.clone();
        lexicon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grammar() -> Grammar {
        let mut builder = GrammarBuilder::new();
        builder
            .register_text(
                r#"
                JUNK ::= /[ \t\n]+/ ;
                <statement> ::= "USE" ks=<name> ;
                <name> ::= /[a-z][a-z0-9_]*/ ;
                "#,
            )
            .unwrap();
        builder.build("statement").unwrap()
    }

    #[test]
    fn test_lookup_known_rule() {
        let grammar = small_grammar();
        let rule = grammar.lookup("statement").unwrap();
        assert_eq!(rule.alternatives.len(), 1);
        assert_eq!(grammar.start(), "statement");
    }

    #[test]
    fn test_lookup_unknown_rule() {
        let grammar = small_grammar();
        assert_eq!(
            grammar.lookup("missing"),
            Err(GrammarError::UnknownRule("missing".to_string()))
        );
    }

    #[test]
    fn test_fragments_are_concatenated_in_order() {
        let mut builder = GrammarBuilder::new();
        builder
            .register("statement", r#" "A" "#)
            .unwrap()
            .register("other", r#" "B" "#)
            .unwrap()
            .register("statement", r#" "C" | "D" "#)
            .unwrap();
        let grammar = builder.build("statement").unwrap();
        let rule = grammar.lookup("statement").unwrap();
        assert_eq!(
            rule.alternatives,
            vec![
                Expr::Literal("A".to_string()),
                Expr::Literal("C".to_string()),
                Expr::Literal("D".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_rejects_dangling_reference() {
        let mut builder = GrammarBuilder::new();
        builder.register("statement", "<nowhere>").unwrap();
        assert_eq!(
            builder.build("statement").unwrap_err(),
            GrammarError::UnknownRule("nowhere".to_string())
        );
    }

    #[test]
    fn test_build_rejects_unknown_start() {
        let builder = GrammarBuilder::new();
        assert!(matches!(
            builder.build("statement"),
            Err(GrammarError::UnknownRule(name)) if name == "statement"
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut builder = GrammarBuilder::new();
        let err = builder.register("broken", "/[a-/").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidPattern { rule, .. } if rule == "broken"));
    }

    #[test]
    fn test_unterminated_requires_pattern() {
        let mut builder = GrammarBuilder::new();
        let err = builder
            .unterminated(UnterminatedKind::Literal, "unclosed", r#" "x" "#)
            .unwrap_err();
        assert!(matches!(err, GrammarError::Syntax { .. }));
    }

    #[test]
    fn test_pattern_matches_whole_token_case_insensitively() {
        let pattern = Pattern::compile("t", "[a-z]+").unwrap();
        assert!(pattern.matches("Users"));
        assert!(!pattern.matches("users1"));
        assert_eq!(pattern.prefix_len("users1"), Some(5));
        assert_eq!(pattern.prefix_len("1users"), None);
    }

    #[test]
    fn test_grammar_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grammar>();
    }
}
