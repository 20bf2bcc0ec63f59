//! Enumerates the grammar positions reachable at the end of a token stream.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::completion::BindingContext;

use super::{Expr, Grammar, Token};

/// A binding entered at the cursor on the way to a reachable position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingSite {
    pub production: String,
    pub binding: String,
}

/// What the grammar expects at a reachable position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "text")]
pub enum Expected {
    /// A binding site begins here.
    Binding,
    /// A literal token.
    Literal(String),
    /// A token matching the pattern with this source.
    Pattern(String),
}

/// A place in the grammar where parsing stopped because the tokens ran out.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReachablePosition {
    /// Rule whose body holds the expected element.
    pub production: String,
    /// Binding name, for [`Expected::Binding`] positions.
    pub binding: Option<String>,
    /// Bindings completed on the way here.
    pub context: BindingContext,
    pub expected: Expected,
    /// Binding sites entered at the cursor, outermost first.
    pub within: Vec<BindingSite>,
}

/// Finds the positions a grammar can reach after consuming a token stream.
pub trait Matcher: Send + Sync {
    fn reachable(&self, grammar: &Grammar, tokens: &[Token]) -> Vec<ReachablePosition>;
}

/// Default matcher: explores every alternative of every rule.
///
/// Paths that fail to match a token are pruned. Paths that consume every token
/// report what they expect next. Left-recursive rules are cut off rather than
/// looped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarMatcher;

impl Matcher for GrammarMatcher {
    fn reachable(&self, grammar: &Grammar, tokens: &[Token]) -> Vec<ReachablePosition> {
        let Some(start) = grammar.rule(grammar.start()) else {
            return Vec::new();
        };

        let mut walk = Walk {
            grammar,
            tokens,
            reached: BTreeSet::new(),
            active: Vec::new(),
        };
        let state = State {
            pos: 0,
            context: BindingContext::new(),
        };
        walk.rule(&start.name, state, &[]);

        walk.reached.into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct State {
    pos: usize,
    context: BindingContext,
}

type States = BTreeSet<State>;

struct Walk<'a> {
    grammar: &'a Grammar,
    tokens: &'a [Token],
    reached: BTreeSet<ReachablePosition>,
    /// Rules being expanded, with the token position they started at.
    active: Vec<(&'a str, usize)>,
}

impl<'a> Walk<'a> {
    fn at_end(&self, state: &State) -> bool {
        state.pos >= self.tokens.len()
    }

    fn report(
        &mut self,
        production: &str,
        binding: Option<&str>,
        state: &State,
        expected: Expected,
        within: &[BindingSite],
    ) {
        self.reached.insert(ReachablePosition {
            production: production.to_string(),
            binding: binding.map(str::to_string),
            context: state.context.clone(),
            expected,
            within: within.to_vec(),
        });
    }

    fn rule(&mut self, name: &'a str, state: State, within: &[BindingSite]) -> States {
        let grammar = self.grammar;
        let Some(rule) = grammar.rule(name) else {
            return States::new();
        };
        if self.active.contains(&(name, state.pos)) {
            return States::new();
        }

        self.active.push((name, state.pos));
        let mut out = States::new();
        for alternative in &rule.alternatives {
            out.extend(self.expr(alternative, &rule.name, state.clone(), within));
        }
        self.active.pop();
        out
    }

    fn terminal(
        &mut self,
        production: &str,
        state: State,
        within: &[BindingSite],
        expected: Expected,
        accepts: impl Fn(&Token) -> bool,
    ) -> States {
        match self.tokens.get(state.pos) {
            None => {
                self.report(production, None, &state, expected, within);
                States::new()
            }
            Some(token) if accepts(token) => States::from([State {
                pos: state.pos + 1,
                context: state.context,
            }]),
            Some(_) => States::new(),
        }
    }

    fn expr(
        &mut self,
        expr: &'a Expr,
        production: &'a str,
        state: State,
        within: &[BindingSite],
    ) -> States {
        match expr {
            Expr::Literal(text) => self.terminal(
                production,
                state,
                within,
                Expected::Literal(text.clone()),
                |token| literal_accepts(text, token),
            ),
            Expr::Pattern(pattern) => self.terminal(
                production,
                state,
                within,
                Expected::Pattern(pattern.source().to_string()),
                |token| pattern.matches(&token.text),
            ),
            Expr::Rule(name) => self.rule(name, state, within),
            Expr::Seq(items) => {
                let mut states = States::from([state]);
                for item in items {
                    let mut next = States::new();
                    for state in states {
                        next.extend(self.expr(item, production, state, within));
                    }
                    if next.is_empty() {
                        return next;
                    }
                    states = next;
                }
                states
            }
            Expr::Choice(alternatives) => {
                let mut out = States::new();
                for alternative in alternatives {
                    out.extend(self.expr(alternative, production, state.clone(), within));
                }
                out
            }
            Expr::Repeat { expr, min, max } => {
                let mut out = States::new();
                let mut frontier = States::from([state]);
                let mut count = 0;
                loop {
                    if count >= *min {
                        out.extend(frontier.iter().cloned());
                    }
                    if frontier.is_empty() || max.is_some_and(|max| count >= max) {
                        break;
                    }
                    let mut next = States::new();
                    for state in &frontier {
                        for after in self.expr(expr, production, state.clone(), within) {
                            // An iteration that consumes nothing cannot make progress.
                            if after.pos > state.pos || count < *min {
                                next.insert(after);
                            }
                        }
                    }
                    frontier = next;
                    count += 1;
                }
                out
            }
            Expr::Bind {
                name,
                repeatable,
                expr,
            } => {
                let start = state.pos;
                let states = if self.at_end(&state) {
                    self.report(production, Some(name), &state, Expected::Binding, within);
                    let mut inner = within.to_vec();
                    inner.push(BindingSite {
                        production: production.to_string(),
                        binding: name.clone(),
                    });
                    self.expr(expr, production, state, &inner)
                } else {
                    self.expr(expr, production, state, within)
                };

                states
                    .into_iter()
                    .map(|mut after| {
                        if after.pos > start {
                            let text = self.tokens[start..after.pos]
                                .iter()
                                .map(|token| token.text.as_str())
                                .collect::<Vec<_>>()
                                .join(" ");
                            after.context.bind(name, text, *repeatable);
                        } else if !repeatable {
                            // A skipped optional binding forgets any earlier value.
                            after.context.unbind(name);
                        }
                        after
                    })
                    .collect()
            }
        }
    }
}

fn literal_accepts(literal: &str, token: &Token) -> bool {
    if super::lexer::is_word(literal) {
        token.text.eq_ignore_ascii_case(literal)
    } else {
        token.text == literal
    }
}
