use super::builder::Builder;
use super::token::BinaryOp;
use combine::error::{ParseError, StreamError};
use combine::parser::char::digit;
use combine::parser::choice::or;
use combine::parser::Parser;
use combine::stream::{Stream, StreamErrorFor};
use combine::{attempt, many, many1, one_of, optional, satisfy, token};
use log::debug;

/// Tests whether one token grammar starts exactly at `offset`.
///
/// On success yields the builder for the token and the offset just past it;
/// on failure nothing is consumed.
pub(crate) type Acceptor = fn(&str, usize) -> Option<(Builder, usize)>;

/// Which operator table the resolver scans with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    Standard,
    /// Subtract acceptor matches `+` and sits behind Add, so it never fires.
    Legacy,
}

impl Default for Grammar {
    fn default() -> Grammar {
        Grammar::Standard
    }
}

impl Grammar {
    pub(crate) fn operators(self) -> &'static [Acceptor] {
        match self {
            Grammar::Standard => OPERATORS,
            Grammar::Legacy => LEGACY_OPERATORS,
        }
    }
}

pub(crate) static ATOMS: &[Acceptor] = &[accept_constant, accept_variable];

static OPERATORS: &[Acceptor] = &[accept_add, accept_subtract, accept_multiply];

static LEGACY_OPERATORS: &[Acceptor] = &[accept_add, accept_legacy_subtract, accept_multiply];

/// `[+-]?(\d*\.)?\d+`
fn constant<Input>() -> impl Parser<Input, Output = f64>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let fraction = attempt((
        many::<String, _, _>(digit()),
        token('.'),
        many1::<String, _, _>(digit()),
    ))
    .map(|(whole, _, frac)| format!("{}.{}", whole, frac));
    let integer = many1::<String, _, _>(digit());

    (optional(one_of("+-".chars())), or(fraction, integer)).and_then(
        |(sign, digits): (Option<char>, String)| {
            let text = match sign {
                Some(sign) => format!("{}{}", sign, digits),
                None => digits,
            };
            text.parse::<f64>().map_err(StreamErrorFor::<Input>::other)
        },
    )
}

/// `[a-z][a-z0-9]*`
fn variable<Input>() -> impl Parser<Input, Output = String>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    (
        satisfy(|c: char| c.is_ascii_lowercase()),
        many::<String, _, _>(satisfy(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())),
    )
        .map(|(head, tail)| format!("{}{}", head, tail))
}

fn operator<Input>(symbol: char) -> impl Parser<Input, Output = char>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    token(symbol)
}

fn accept_with<'a, P, F>(mut parser: P, expr: &'a str, offset: usize, build: F) -> Option<(Builder, usize)>
where
    P: Parser<&'a str>,
    F: FnOnce(P::Output) -> Builder,
{
    let rest = expr.get(offset..)?;
    let (output, remaining) = parser.parse(rest).ok()?;
    let end = expr.len() - remaining.len();
    let builder = build(output);
    debug!("accepted {:?} at {}..{}", builder, offset, end);
    Some((builder, end))
}

fn accept_constant(expr: &str, offset: usize) -> Option<(Builder, usize)> {
    accept_with(constant(), expr, offset, Builder::Constant)
}

fn accept_variable(expr: &str, offset: usize) -> Option<(Builder, usize)> {
    accept_with(variable(), expr, offset, Builder::Variable)
}

fn accept_operator(expr: &str, offset: usize, symbol: char, op: BinaryOp) -> Option<(Builder, usize)> {
    accept_with(operator(symbol), expr, offset, |_| Builder::binary(op))
}

fn accept_add(expr: &str, offset: usize) -> Option<(Builder, usize)> {
    accept_operator(expr, offset, '+', BinaryOp::Add)
}

fn accept_subtract(expr: &str, offset: usize) -> Option<(Builder, usize)> {
    accept_operator(expr, offset, '-', BinaryOp::Subtract)
}

fn accept_legacy_subtract(expr: &str, offset: usize) -> Option<(Builder, usize)> {
    accept_operator(expr, offset, '+', BinaryOp::Subtract)
}

fn accept_multiply(expr: &str, offset: usize) -> Option<(Builder, usize)> {
    accept_operator(expr, offset, '*', BinaryOp::Multiply)
}

/// Runs `acceptors` in order at `offset` and returns the first match.
pub(crate) fn accept_first(
    acceptors: &[Acceptor],
    expr: &str,
    offset: usize,
) -> Option<(Builder, usize)> {
    acceptors.iter().find_map(|accept| accept(expr, offset))
}
