//! Single-pass precedence resolver.
//!
//! Acceptors are applied left to right, alternating between the atom set and
//! the operator set. Each operator is attached as soon as it is recognized:
//! additive operators (and the first operator seen) become the new root, a
//! multiplicative operator following an additive one opens a product chain in
//! that operator's right slot, and further multiplicative operators extend the
//! open chain. No operator stack is kept; two precedence tiers only ever need
//! one open chain.

use super::builder::{Arena, Builder, NodeId};
use super::error::{Error, ErrorKind, Result};
use super::eval::{self, Bindings};
use super::lexer::{accept_first, Grammar, ATOMS};
use super::token::Token;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    ExpectAtom,
    ExpectOperator,
}

/// A finalized tree together with the variables it mentions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    root: Token,
    variables: Vec<String>,
}

impl ParsedExpression {
    pub fn token(&self) -> &Token {
        &self.root
    }

    /// Distinct variable names in first-seen order.
    pub fn variable_names(&self) -> &[String] {
        &self.variables
    }

    pub fn evaluate(&self, bindings: &Bindings) -> Result<f64> {
        eval::evaluate(&self.root, bindings)
    }

    pub fn into_token(self) -> Token {
        self.root
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    grammar: Grammar,
}

impl Parser {
    pub fn new(grammar: Grammar) -> Parser {
        Parser { grammar }
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn parse(&self, expr: &str) -> Result<ParsedExpression> {
        let mut resolver = Resolver::default();
        let mut offset = 0;
        let mut mode = Mode::ExpectAtom;

        while offset < expr.len() {
            let acceptors = match mode {
                Mode::ExpectAtom => ATOMS,
                Mode::ExpectOperator => self.grammar.operators(),
            };
            let (builder, next) = match accept_first(acceptors, expr, offset) {
                Some(found) => found,
                None => return Err(self.unrecognized(expr, offset, resolver.root.is_none())),
            };
            offset = next;
            mode = match mode {
                Mode::ExpectAtom => {
                    resolver.push_atom(builder);
                    Mode::ExpectOperator
                }
                Mode::ExpectOperator => {
                    resolver.push_operator(builder);
                    Mode::ExpectAtom
                }
            };
        }

        if mode == Mode::ExpectAtom {
            return Err(ErrorKind::Syntax {
                position: expr.len(),
                character: None,
            }
            .into());
        }
        resolver.finish()
    }

    fn unrecognized(&self, expr: &str, offset: usize, at_start: bool) -> Error {
        let character = expr[offset..].chars().next();
        if at_start {
            if let (Some(character), Some(_)) =
                (character, accept_first(self.grammar.operators(), expr, offset))
            {
                return ErrorKind::LeadingOperator {
                    position: offset,
                    character,
                }
                .into();
            }
        }
        ErrorKind::Syntax {
            position: offset,
            character,
        }
        .into()
    }
}

/// Parses `expr` with the standard operator table.
pub fn parse(expr: &str) -> Result<ParsedExpression> {
    Parser::default().parse(expr)
}

#[derive(Debug, Default)]
struct Resolver {
    arena: Arena,
    root: Option<NodeId>,
    last_binary: Option<NodeId>,
    pending: Option<NodeId>,
    /// Additive node whose right slot holds the open product chain.
    chain_parent: Option<NodeId>,
    variables: Vec<String>,
}

impl Resolver {
    fn push_atom(&mut self, builder: Builder) {
        if let Builder::Variable(name) = &builder {
            if !self.variables.contains(name) {
                self.variables.push(name.clone());
            }
        }
        let id = self.arena.push(builder);
        self.pending = Some(id);
        if self.root.is_none() {
            self.root = Some(id);
        }
    }

    fn push_operator(&mut self, builder: Builder) {
        let is_multiply = builder.op().map_or(false, |op| op.is_multiply());
        let op = self.arena.push(builder);

        match (self.last_binary, self.chain_parent) {
            (Some(last), _) if is_multiply && !self.arena.is_multiply(last) => {
                debug!("opening product chain below {:?}", last);
                self.arena.set_left(op, self.pending);
                self.arena.set_right(last, Some(op));
                self.chain_parent = Some(last);
            }
            (Some(last), Some(parent)) if is_multiply => {
                debug!("extending product chain below {:?}", parent);
                self.arena.set_right(last, self.pending);
                let chain = self.arena.right(parent);
                self.arena.set_left(op, chain);
                self.arena.set_right(parent, Some(op));
            }
            (last, _) => {
                debug!("attaching {:?} at root", op);
                if let Some(last) = last {
                    self.arena.set_right(last, self.pending);
                }
                self.arena.set_left(op, self.root);
                self.root = Some(op);
                self.chain_parent = None;
            }
        }

        self.last_binary = Some(op);
        self.pending = None;
    }

    fn finish(mut self) -> Result<ParsedExpression> {
        if let (Some(last), Some(pending)) = (self.last_binary, self.pending) {
            self.arena.set_right(last, Some(pending));
        }
        let root = self.root.ok_or(ErrorKind::Syntax {
            position: 0,
            character: None,
        })?;
        Ok(ParsedExpression {
            root: self.arena.finalize(root)?,
            variables: self.variables,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use super::super::token::BinaryOp;
    use proptest::prelude::*;
    use rstest::rstest;

    fn c(n: f64) -> Token {
        Token::Constant(n)
    }

    fn v(name: &str) -> Token {
        Token::Variable(name.to_owned())
    }

    fn add(l: Token, r: Token) -> Token {
        Token::binary(BinaryOp::Add, l, r)
    }

    fn sub(l: Token, r: Token) -> Token {
        Token::binary(BinaryOp::Subtract, l, r)
    }

    fn mul(l: Token, r: Token) -> Token {
        Token::binary(BinaryOp::Multiply, l, r)
    }

    fn tree(expr: &str) -> Token {
        parse(expr).expect("parse").into_token()
    }

    fn parse_error(expr: &str) -> ErrorKind {
        parse(expr).expect_err("parse error").kind().clone()
    }

    #[rstest]
    #[case("1+2", add(c(1.), c(2.)), 3.)]
    #[case("1+2*3", add(c(1.), mul(c(2.), c(3.))), 7.)]
    #[case("1*2+3", add(mul(c(1.), c(2.)), c(3.)), 5.)]
    #[case("1*2*3", mul(mul(c(1.), c(2.)), c(3.)), 6.)]
    #[case("1+2*3*4", add(c(1.), mul(mul(c(2.), c(3.)), c(4.))), 25.)]
    #[case("1+2*3+4", add(add(c(1.), mul(c(2.), c(3.))), c(4.)), 11.)]
    #[case("1*2+3*4", add(mul(c(1.), c(2.)), mul(c(3.), c(4.))), 14.)]
    #[case("8-2-1", sub(sub(c(8.), c(2.)), c(1.)), 5.)]
    #[case("2*3-4*5*2", sub(mul(c(2.), c(3.)), mul(mul(c(4.), c(5.)), c(2.))), -34.)]
    #[case("1--2", sub(c(1.), c(-2.)), 3.)]
    #[case("-1.5*.5", mul(c(-1.5), c(0.5)), -0.75)]
    #[case("42", c(42.), 42.)]
    fn test_precedence(#[case] expr: &str, #[case] expected: Token, #[case] value: f64) {
        let parsed = parse(expr).expect("parse");
        assert_eq!(parsed.token(), &expected);
        assert_eq!(parsed.evaluate(&Bindings::new()).ok(), Some(value));
    }

    #[test]
    fn test_long_product_chain() {
        let mut expr = String::from("1");
        for _ in 0..100_000 {
            expr.push_str("*1");
        }
        let parsed = parse(&expr).expect("parse");
        assert_eq!(parsed.evaluate(&Bindings::new()).ok(), Some(1.0));
    }

    #[test]
    fn test_long_mixed_chain() {
        let mut expr = String::from("a");
        for _ in 0..50_000 {
            expr.push_str("+2*a*3-a");
        }
        let parsed = parse(&expr).expect("parse");
        let mut bindings = Bindings::new();
        bindings.insert("a".to_owned(), 1.0);
        assert_eq!(parsed.evaluate(&bindings).ok(), Some(250_001.0));
    }

    #[test]
    fn test_variables() {
        let parsed = parse("a+1").expect("parse");
        assert_eq!(parsed.token(), &add(v("a"), c(1.)));
        assert_eq!(parsed.variable_names(), &["a".to_owned()][..]);

        let mut bindings = Bindings::new();
        bindings.insert("a".to_owned(), 5.0);
        assert_eq!(parsed.evaluate(&bindings).ok(), Some(6.0));
    }

    #[test]
    fn test_variable_names_first_seen() {
        let parsed = parse("b*a+b1-a*b").expect("parse");
        assert_eq!(
            parsed.variable_names(),
            &["b".to_owned(), "a".to_owned(), "b1".to_owned()][..]
        );
    }

    #[test]
    fn test_missing_variable() {
        let parsed = parse("2*a").expect("parse");
        assert_eq!(
            parsed.evaluate(&Bindings::new()).map_err(|e| e.kind().clone()),
            Err(ErrorKind::MissingVariable("a".to_owned()))
        );
    }

    #[test]
    fn test_leading_operator() {
        assert_eq!(
            parse_error("*1"),
            ErrorKind::LeadingOperator {
                position: 0,
                character: '*'
            }
        );
        let err = parse("*1").expect_err("parse error");
        assert_eq!(err.position(), Some(0));
        assert_eq!(err.character(), Some('*'));
    }

    #[test]
    fn test_unknown_character() {
        assert_eq!(
            parse_error("1$2"),
            ErrorKind::Syntax {
                position: 1,
                character: Some('$')
            }
        );
        assert_eq!(
            parse_error("1+2 "),
            ErrorKind::Syntax {
                position: 3,
                character: Some(' ')
            }
        );
        assert_eq!(
            parse_error("a+B"),
            ErrorKind::Syntax {
                position: 2,
                character: Some('B')
            }
        );
        assert_eq!(
            parse_error("1a"),
            ErrorKind::Syntax {
                position: 1,
                character: Some('a')
            }
        );
    }

    #[test]
    fn test_input_ends_early() {
        assert_eq!(
            parse_error(""),
            ErrorKind::Syntax {
                position: 0,
                character: None
            }
        );
        assert_eq!(
            parse_error("1+2*"),
            ErrorKind::Syntax {
                position: 4,
                character: None
            }
        );
    }

    #[test]
    fn test_legacy_grammar() {
        let legacy = Parser::new(Grammar::Legacy);
        assert_eq!(
            legacy.parse("1-2").map_err(|e| e.kind().clone()),
            Err(ErrorKind::Syntax {
                position: 1,
                character: Some('-')
            })
        );
        assert_eq!(
            legacy
                .parse("1+a*3")
                .map(ParsedExpression::into_token)
                .map_err(|e| e.kind().clone()),
            Ok(add(c(1.), mul(v("a"), c(3.))))
        );
        assert_eq!(tree("1-2"), sub(c(1.), c(2.)));
    }

    fn reference(operands: &[u32], ops: &[char]) -> f64 {
        // sum of left-associated products, one term per additive operator
        let mut total = 0.0;
        let mut sign = 1.0;
        let mut term = f64::from(operands[0]);
        for (op, n) in ops.iter().zip(&operands[1..]) {
            let n = f64::from(*n);
            match op {
                '*' => term *= n,
                _ => {
                    total += sign * term;
                    sign = if *op == '-' { -1.0 } else { 1.0 };
                    term = n;
                }
            }
        }
        total + sign * term
    }

    fn expression() -> impl Strategy<Value = (Vec<u32>, Vec<char>)> {
        (1usize..10).prop_flat_map(|len| {
            (
                prop::collection::vec(0u32..10, len),
                prop::collection::vec(prop::sample::select(vec!['+', '-', '*']), len - 1),
            )
        })
    }

    proptest! {
        #[test]
        fn test_matches_conventional_precedence((operands, ops) in expression()) {
            let mut expr = operands[0].to_string();
            for (op, n) in ops.iter().zip(&operands[1..]) {
                expr.push(*op);
                expr.push_str(&n.to_string());
            }
            let value = parse(&expr).and_then(|p| p.evaluate(&Bindings::new()));
            prop_assert_eq!(value.ok(), Some(reference(&operands, &ops)));
        }
    }
}
