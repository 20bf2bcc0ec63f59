//! Completion resolution: maps the grammar positions reachable at the cursor to
//! candidate strings through the registered completers.

mod context;
mod registry;

pub use context::BindingContext;
pub use registry::{CompleterEntry, CompleterFn, CompleterKey, CompleterRegistry};

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::config::CompletionOptions;
use crate::error::GrammarError;
use crate::escape::escape_name;
use crate::grammar::{
    is_word, Expected, Grammar, GrammarMatcher, Matcher, ReachablePosition, Token, TokenKind,
    UnterminatedKind,
};
use crate::schema::SchemaAccessor;

/// Result of resolving completions for a partial statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Completions {
    /// Literal texts that may follow the input, sorted and deduplicated.
    pub candidates: Vec<String>,

    /// Placeholder guidance such as `<value>`. Never inserted as text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// The partially typed token the candidates were filtered by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Completions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// True when there are neither candidates nor hints.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.hints.is_empty()
    }
}

/// Resolves completions against a frozen grammar and completer registry.
pub struct CompletionEngine {
    grammar: Grammar,
    registry: CompleterRegistry,
    options: CompletionOptions,
    matcher: Box<dyn Matcher>,
}

impl fmt::Debug for CompletionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionEngine")
            .field("start", &self.grammar.start())
            .field("completers", &self.registry.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CompletionEngine {
    /// Fails with [`GrammarError::UnknownRule`] if a completer is registered for a
    /// production the grammar does not define.
    pub fn new(
        grammar: Grammar,
        registry: CompleterRegistry,
        options: CompletionOptions,
    ) -> Result<Self, GrammarError> {
        let mut productions: Vec<&str> = registry
            .keys()
            .map(|key| key.production.as_str())
            .collect();
        productions.sort_unstable();
        if let Some(missing) = productions.into_iter().find(|p| !grammar.contains(p)) {
            return Err(GrammarError::UnknownRule(missing.to_string()));
        }

        Ok(Self {
            grammar,
            registry,
            options,
            matcher: Box::new(GrammarMatcher),
        })
    }

    /// Replace the default matcher.
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn registry(&self) -> &CompleterRegistry {
        &self.registry
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Compute what may follow `input`, which ends at the cursor.
    ///
    /// Completer failures only empty their own branch.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(len = input.len())))]
    pub fn resolve(&self, input: &str, schema: &dyn SchemaAccessor) -> Completions {
        if input.len() > self.options.max_input_length {
            return Completions::from_error(format!(
                "Input exceeds maximum length of {} bytes",
                self.options.max_input_length
            ));
        }

        let mut tokens = self.grammar.tokenize(input);
        if tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Unterminated(UnterminatedKind::Comment))
        {
            return Completions::empty();
        }
        tokens.retain(|t| t.kind != TokenKind::Skip);

        let partial = match tokens.last() {
            Some(last) if last.span.end == input.len() && is_partial(last) => {
                tokens.pop().map(|t| t.text)
            }
            _ => None,
        };

        let statement = current_statement(&tokens);
        if statement.len() > self.options.max_statement_tokens {
            return Completions::from_error(format!(
                "Statement exceeds maximum of {} tokens",
                self.options.max_statement_tokens
            ));
        }
        let positions = self.matcher.reachable(&self.grammar, statement);

        #[cfg(feature = "tracing")]
        debug!(
            tokens = statement.len(),
            positions = positions.len(),
            "matched statement under cursor"
        );

        let mut names = Vec::new();
        let mut keywords = Vec::new();
        let mut hints = Vec::new();
        for position in &positions {
            if self.inside_registered_site(position) {
                continue;
            }
            match &position.expected {
                Expected::Binding => self.complete_binding(
                    position,
                    schema,
                    &mut names,
                    &mut keywords,
                    &mut hints,
                ),
                Expected::Literal(text) => keywords.push(text.clone()),
                Expected::Pattern(_) => {}
            }
        }

        let partial_text = partial.as_deref();
        let mut candidates = filter_by_partial(names, partial_text);
        candidates.extend(
            filter_by_partial(keywords, partial_text)
                .into_iter()
                .map(|keyword| {
                    if is_word(&keyword) {
                        self.options.keyword_case.apply(&keyword, partial_text)
                    } else {
                        keyword
                    }
                }),
        );
        candidates.sort();
        candidates.dedup();

        if self.options.include_hints {
            hints.sort();
            hints.dedup();
        } else {
            hints.clear();
        }

        Completions {
            candidates,
            hints,
            partial,
            error: None,
        }
    }

    fn inside_registered_site(&self, position: &ReachablePosition) -> bool {
        position
            .within
            .iter()
            .any(|site| self.registry.lookup(&site.production, &site.binding).is_some())
    }

    fn complete_binding(
        &self,
        position: &ReachablePosition,
        schema: &dyn SchemaAccessor,
        names: &mut Vec<String>,
        keywords: &mut Vec<String>,
        hints: &mut Vec<String>,
    ) {
        let Some(binding) = position.binding.as_deref() else {
            return;
        };
        let (completer, out) = match self.registry.lookup(&position.production, binding) {
            Some(CompleterEntry::Dynamic(completer)) => (completer, names),
            Some(CompleterEntry::Keywords(completer)) => (completer, keywords),
            Some(CompleterEntry::Hint(hint)) => {
                hints.push(hint.clone());
                return;
            }
            None => return,
        };
        match completer(&position.context, schema) {
            Ok(values) => out.extend(values),
            Err(error) => {
                #[cfg(feature = "tracing")]
                debug!(
                    production = %position.production,
                    binding,
                    %error,
                    "completer failed; skipping branch"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = error;
            }
        }
    }
}

/// The last token is completed in place when it touches the cursor and could
/// still grow.
fn is_partial(token: &Token) -> bool {
    match token.kind {
        TokenKind::Unterminated(kind) => kind != UnterminatedKind::Comment,
        _ => token.is_word_like(),
    }
}

/// Tokens of the statement under the cursor. Statements end at `;`, except
/// inside a `BEGIN … APPLY BATCH` block.
fn current_statement(tokens: &[Token]) -> &[Token] {
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.text != ";" {
            continue;
        }
        let statement = &tokens[start..i];
        if opens_batch(statement) && !closes_batch(statement) {
            continue;
        }
        start = i + 1;
    }
    &tokens[start..]
}

fn opens_batch(statement: &[Token]) -> bool {
    statement
        .first()
        .is_some_and(|t| t.text.eq_ignore_ascii_case("BEGIN"))
}

fn closes_batch(statement: &[Token]) -> bool {
    matches!(
        statement,
        [.., apply, batch] if apply.text.eq_ignore_ascii_case("APPLY")
            && batch.text.eq_ignore_ascii_case("BATCH")
    )
}

/// Keep the candidates that extend `partial`.
///
/// Matching ignores case unless the partial starts with a quote. A partial
/// opening a quoted name is compared against quoted candidates.
fn filter_by_partial(candidates: Vec<String>, partial: Option<&str>) -> Vec<String> {
    let Some(partial) = partial else {
        return candidates;
    };

    if partial.starts_with('"') {
        candidates
            .into_iter()
            .map(|candidate| quoted_form(&candidate))
            .filter(|candidate| candidate.starts_with(partial))
            .collect()
    } else if partial.starts_with('\'') {
        candidates
            .into_iter()
            .filter(|candidate| candidate.starts_with(partial))
            .collect()
    } else {
        let prefix = partial.to_lowercase();
        candidates
            .into_iter()
            .filter(|candidate| candidate.to_lowercase().starts_with(&prefix))
            .collect()
    }
}

fn quoted_form(candidate: &str) -> String {
    if candidate.starts_with('"') {
        return candidate.to_string();
    }
    match candidate.strip_suffix('.') {
        Some(stem) if !stem.is_empty() => format!("{}.", escape_name(stem)),
        _ => escape_name(candidate),
    }
}
