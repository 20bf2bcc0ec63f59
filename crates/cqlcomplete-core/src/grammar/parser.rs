//! Parser for rule text, built from nom combinators.
//!
//! Rule text is parsed into an intermediate tree first. Patterns are compiled
//! while lowering that tree into [`Expr`]s, so a bad regex reports its rule.

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, anychar, char, multispace1, one_of},
    combinator::{cut, map, opt, peek, recognize, value, verify},
    error::{context, VerboseError, VerboseErrorKind},
    multi::{fold_many0, many0, many0_count, many1, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
    Finish, IResult, Parser,
};

use crate::error::GrammarError;

use super::{Expr, Pattern};

type PResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// One `::=` definition from a block of rule text.
#[derive(Debug)]
pub(crate) enum Definition {
    Rule {
        name: String,
        alternatives: Vec<Expr>,
    },
    Skip {
        alternatives: Vec<Expr>,
    },
}

const SKIP_RULE: &str = "JUNK";

const BARE_WORD: &str = "bare word; quote literals and bracket rule names";

/// Parse the alternatives of a single rule body.
pub(crate) fn parse_body(rule: &str, body: &str) -> Result<Vec<Expr>, GrammarError> {
    let (rest, alternatives) = terminated(alternatives, trivia)(body)
        .finish()
        .map_err(|error| syntax_error(rule, body, &error))?;
    if !rest.is_empty() {
        return Err(GrammarError::Syntax {
            rule: rule.to_string(),
            offset: body.len() - rest.len(),
            message: "unexpected character".to_string(),
        });
    }
    lower_all(alternatives, rule)
}

/// Parse a block of `<name> ::= body ;` and `JUNK ::= body ;` definitions.
pub(crate) fn parse_definitions(text: &str) -> Result<Vec<Definition>, GrammarError> {
    let mut definitions = Vec::new();
    let mut input = text;

    loop {
        let (rest, ()) = trivia(input)
            .finish()
            .map_err(|error| syntax_error("", text, &error))?;
        if rest.is_empty() {
            break;
        }

        let (rest, name) = header(rest)
            .finish()
            .map_err(|error| syntax_error("", text, &error))?;
        let rule = name.as_deref().unwrap_or(SKIP_RULE);
        let (rest, raw) = body(rest)
            .finish()
            .map_err(|error| syntax_error(rule, text, &error))?;
        let alternatives = lower_all(raw, rule)?;

        definitions.push(match name {
            Some(name) => Definition::Rule { name, alternatives },
            None => Definition::Skip { alternatives },
        });
        input = rest;
    }

    Ok(definitions)
}

/// Parsed rule text before patterns are compiled.
#[derive(Debug)]
enum Raw {
    Literal(String),
    Pattern(String),
    Rule(String),
    Seq(Vec<Raw>),
    Choice(Vec<Raw>),
    Repeat {
        raw: Box<Raw>,
        min: usize,
        max: Option<usize>,
    },
    Bind {
        name: String,
        repeatable: bool,
        raw: Box<Raw>,
    },
}

impl Raw {
    fn choice(mut alternatives: Vec<Raw>) -> Raw {
        if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            Raw::Choice(alternatives)
        }
    }

    fn lower(self, rule: &str) -> Result<Expr, GrammarError> {
        Ok(match self {
            Raw::Literal(text) => Expr::Literal(text),
            Raw::Pattern(source) => Expr::Pattern(Pattern::compile(rule, &source)?),
            Raw::Rule(name) => Expr::Rule(name),
            Raw::Seq(items) => Expr::Seq(lower_all(items, rule)?),
            Raw::Choice(alternatives) => Expr::Choice(lower_all(alternatives, rule)?),
            Raw::Repeat { raw, min, max } => Expr::Repeat {
                expr: Box::new(raw.lower(rule)?),
                min,
                max,
            },
            Raw::Bind {
                name,
                repeatable,
                raw,
            } => Expr::Bind {
                name,
                repeatable,
                expr: Box::new(raw.lower(rule)?),
            },
        })
    }
}

fn lower_all(raws: Vec<Raw>, rule: &str) -> Result<Vec<Expr>, GrammarError> {
    raws.into_iter().map(|raw| raw.lower(rule)).collect()
}

/// The innermost error position, labelled with the nearest context.
fn syntax_error(rule: &str, text: &str, error: &VerboseError<&str>) -> GrammarError {
    let first = error.errors.first();
    let rest = first.map_or("", |(rest, _)| *rest);
    let context = error.errors.iter().find_map(|(_, kind)| match kind {
        VerboseErrorKind::Context(message) => Some(message.to_string()),
        _ => None,
    });
    let message = context.unwrap_or_else(|| match first {
        Some((rest, _)) if rest.is_empty() => "unexpected end of rule".to_string(),
        Some((_, VerboseErrorKind::Char(expected))) => format!("expected '{expected}'"),
        _ => "unexpected character".to_string(),
    });

    GrammarError::Syntax {
        rule: rule.to_string(),
        offset: text.len() - rest.len(),
        message,
    }
}

/// Whitespace and `#` line comments.
fn trivia(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(pair(char('#'), opt(is_not("\n")))),
        ))),
    )(input)
}

fn lexeme<'a, O, P>(parser: P) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    P: Parser<&'a str, O, VerboseError<&'a str>>,
{
    preceded(trivia, parser)
}

fn ident(input: &str) -> PResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// `<name> ::=` or `JUNK ::=`. Yields `None` for the skip rule.
fn header(input: &str) -> PResult<'_, Option<String>> {
    terminated(
        context(
            "expected <rule> or JUNK",
            alt((
                map(
                    delimited(char('<'), lexeme(ident), lexeme(char('>'))),
                    |name: &str| Some(name.to_string()),
                ),
                value(None, verify(ident, |word: &str| word == SKIP_RULE)),
            )),
        ),
        cut(context("expected '::='", lexeme(tag("::=")))),
    )(input)
}

/// Alternatives up to the closing `;` of a definition.
fn body(input: &str) -> PResult<'_, Vec<Raw>> {
    terminated(
        alternatives,
        cut(context("expected ';'", lexeme(char(';')))),
    )(input)
}

fn alternatives(input: &str) -> PResult<'_, Vec<Raw>> {
    separated_list1(lexeme(char('|')), cut(sequence))(input)
}

fn sequence(input: &str) -> PResult<'_, Raw> {
    map(many1(item), |mut items| {
        if items.len() == 1 {
            items.remove(0)
        } else {
            Raw::Seq(items)
        }
    })(input)
}

fn item(input: &str) -> PResult<'_, Raw> {
    alt((bound, repeated, bare_word))(input)
}

/// `name=item` or `[name]=item`. The binding wraps any suffixes of its item.
fn bound(input: &str) -> PResult<'_, Raw> {
    map(
        pair(lexeme(binding), cut(context("expected an atom", repeated))),
        |((name, repeatable), raw)| Raw::Bind {
            name,
            repeatable,
            raw: Box::new(raw),
        },
    )(input)
}

fn binding(input: &str) -> PResult<'_, (String, bool)> {
    alt((
        map(
            delimited(
                char('['),
                cut(context("expected binding name", lexeme(ident))),
                cut(pair(
                    context("expected ']'", lexeme(char(']'))),
                    context("expected '='", lexeme(char('='))),
                )),
            ),
            |name: &str| (name.to_string(), true),
        ),
        map(terminated(ident, lexeme(char('='))), |name: &str| {
            (name.to_string(), false)
        }),
    ))(input)
}

/// A word that is neither a binding nor inside brackets.
fn bare_word(input: &str) -> PResult<'_, Raw> {
    let (rest, ()) = trivia(input)?;
    let _ = ident(rest)?;
    Err(nom::Err::Failure(VerboseError {
        errors: vec![(rest, VerboseErrorKind::Context(BARE_WORD))],
    }))
}

fn repeated(input: &str) -> PResult<'_, Raw> {
    map(
        pair(atom, many0(lexeme(one_of("?*+")))),
        |(atom, suffixes)| {
            suffixes.into_iter().fold(atom, |raw, suffix| {
                let (min, max) = match suffix {
                    '?' => (0, Some(1)),
                    '*' => (0, None),
                    _ => (1, None),
                };
                Raw::Repeat {
                    raw: Box::new(raw),
                    min,
                    max,
                }
            })
        },
    )(input)
}

fn atom(input: &str) -> PResult<'_, Raw> {
    preceded(trivia, alt((rule_ref, literal, pattern, group)))(input)
}

fn rule_ref(input: &str) -> PResult<'_, Raw> {
    map(
        preceded(
            char('<'),
            cut(terminated(
                context("expected rule name", lexeme(ident)),
                context("expected '>'", lexeme(char('>'))),
            )),
        ),
        |name: &str| Raw::Rule(name.to_string()),
    )(input)
}

fn literal(input: &str) -> PResult<'_, Raw> {
    map(
        preceded(
            peek(char('"')),
            cut(context(
                "empty literal",
                verify(delimited_text('"', "\"\\", "\"\\", "unclosed \""), |text: &str| {
                    !text.is_empty()
                }),
            )),
        ),
        Raw::Literal,
    )(input)
}

fn pattern(input: &str) -> PResult<'_, Raw> {
    map(delimited_text('/', "/\\", "/", "unclosed /"), Raw::Pattern)(input)
}

fn group(input: &str) -> PResult<'_, Raw> {
    map(
        preceded(
            char('('),
            cut(terminated(
                alternatives,
                context("expected ')'", lexeme(char(')'))),
            )),
        ),
        Raw::choice,
    )(input)
}

/// Text between two `delimiter`s. Runs stop at any character of `stop`. A
/// backslash before a character of `unescaped` is dropped; other backslashes
/// are kept.
fn delimited_text<'a>(
    delimiter: char,
    stop: &'static str,
    unescaped: &'static str,
    unclosed: &'static str,
) -> impl FnMut(&'a str) -> PResult<'a, String> {
    move |input: &'a str| {
        let escape = map(preceded(char('\\'), anychar), |c: char| {
            if unescaped.contains(c) {
                c.to_string()
            } else {
                format!("\\{c}")
            }
        });
        let text = fold_many0(
            alt((map(is_not(stop), |run: &str| run.to_string()), escape)),
            String::new,
            |mut text, piece| {
                text.push_str(&piece);
                text
            },
        );
        preceded(
            char(delimiter),
            cut(terminated(text, context(unclosed, char(delimiter)))),
        )(input)
    }
}
