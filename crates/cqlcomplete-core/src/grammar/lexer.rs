//! Tokenizer driven by the terminals of a grammar.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Pattern, UnterminatedKind, UnterminatedTerminal};

/// A byte range in the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Byte offset from start of input (inclusive)
    pub start: usize,
    /// Byte offset from start of input (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Whitespace or a comment.
    Skip,
    /// Matched by a `/pattern/` terminal.
    Pattern,
    /// Matched by a word literal that no pattern covers.
    Keyword,
    /// Punctuation or an operator literal.
    Punctuation,
    /// A literal, quoted name or comment left open at the end of the input.
    Unterminated(UnterminatedKind),
    /// A character no terminal accepts.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// True for identifier-like text (letters, digits and underscores).
    pub fn is_word_like(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| c.is_alphanumeric() || c == '_')
    }
}

/// Returns true for literals that look like keywords rather than punctuation.
pub(crate) fn is_word(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Terminals of a grammar, in lexing priority order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Lexicon {
    pub(crate) skip_patterns: Vec<Pattern>,
    pub(crate) skip_literals: Vec<String>,
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) punctuation: Vec<String>,
    pub(crate) words: Vec<String>,
    pub(crate) unterminated: Vec<UnterminatedTerminal>,
}

impl Lexicon {
    pub(crate) fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < input.len() {
            let rest = &input[pos..];
            let (kind, len) = self
                .longest_match(rest)
                .or_else(|| self.unterminated_match(rest))
                .unwrap_or_else(|| {
                    let len = rest.chars().next().map_or(1, char::len_utf8);
                    (TokenKind::Error, len)
                });

            tokens.push(Token {
                kind,
                text: rest[..len].to_string(),
                span: Span::new(pos, pos + len),
            });
            pos += len;
        }

        tokens
    }

    /// Longest match among the regular terminals. Earlier candidates win ties.
    fn longest_match(&self, rest: &str) -> Option<(TokenKind, usize)> {
        let candidates = self
            .skip_patterns
            .iter()
            .map(|p| (TokenKind::Skip, p.prefix_len(rest)))
            .chain(
                self.skip_literals
                    .iter()
                    .map(|l| (TokenKind::Skip, literal_len(l, rest))),
            )
            .chain(
                self.patterns
                    .iter()
                    .map(|p| (TokenKind::Pattern, p.prefix_len(rest))),
            )
            .chain(
                self.punctuation
                    .iter()
                    .map(|l| (TokenKind::Punctuation, literal_len(l, rest))),
            )
            .chain(
                self.words
                    .iter()
                    .map(|w| (TokenKind::Keyword, word_len(w, rest))),
            );

        let mut best: Option<(TokenKind, usize)> = None;
        for (kind, len) in candidates {
            let Some(len) = len else { continue };
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((kind, len));
            }
        }
        best
    }

    fn unterminated_match(&self, rest: &str) -> Option<(TokenKind, usize)> {
        self.unterminated.iter().find_map(|terminal| {
            terminal
                .pattern
                .prefix_len(rest)
                .map(|len| (TokenKind::Unterminated(terminal.kind), len))
        })
    }
}

fn literal_len(literal: &str, rest: &str) -> Option<usize> {
    if is_word(literal) {
        word_len(literal, rest)
    } else {
        rest.starts_with(literal).then_some(literal.len())
    }
}

/// Case-insensitive keyword match that does not stop inside a longer word.
fn word_len(word: &str, rest: &str) -> Option<usize> {
    let head = rest.get(..word.len())?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }
    let continues = rest[word.len()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    (!continues).then_some(word.len())
}
