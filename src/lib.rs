//! Parser and evaluator for flat arithmetic expressions such as `1+a*3`.
//!
//! Input holds numeric literals, lowercase variables and the operators `+`,
//! `-` and `*`, with no whitespace and no parentheses. [`parse`] builds the
//! tree in one left-to-right pass; [`ParsedExpression::evaluate`] computes it
//! against a set of variable bindings.

mod builder;
pub mod config;
mod error;
mod eval;
mod lexer;
mod parser;
mod token;
pub mod toplevel;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::eval::{evaluate, Bindings};
pub use crate::lexer::Grammar;
pub use crate::parser::{parse, ParsedExpression, Parser};
pub use crate::token::{BinaryOp, Token};
