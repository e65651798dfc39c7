use super::error::{ErrorKind, Result};
use super::token::{BinaryOp, Token};
use std::collections::HashMap;

/// Variable name to value.
pub type Bindings = HashMap<String, f64>;

enum Step<'a> {
    Visit(&'a Token),
    Apply(BinaryOp),
}

/// Computes the value of `token`, left operand first.
///
/// Stops at the first variable missing from `bindings`.
pub fn evaluate(token: &Token, bindings: &Bindings) -> Result<f64> {
    let mut work = vec![Step::Visit(token)];
    let mut values: Vec<f64> = Vec::new();

    while let Some(step) = work.pop() {
        match step {
            Step::Visit(Token::Constant(n)) => values.push(*n),
            Step::Visit(Token::Variable(name)) => match bindings.get(name) {
                Some(value) => values.push(*value),
                None => return Err(ErrorKind::MissingVariable(name.clone()).into()),
            },
            Step::Visit(token) => {
                if let Some((op, lhs, rhs)) = token.as_binary() {
                    work.push(Step::Apply(op));
                    work.push(Step::Visit(rhs));
                    work.push(Step::Visit(lhs));
                }
            }
            Step::Apply(op) => {
                let rhs = values.pop();
                let lhs = values.pop();
                if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
                    values.push(op.apply(lhs, rhs));
                }
            }
        }
    }

    values.pop().ok_or_else(|| ErrorKind::IncompleteNode.into())
}
