use failure::{Backtrace, Context, Fail};
use std::fmt;

#[derive(Debug)]
pub struct Error {
    inner: Context<ErrorKind>,
}

#[derive(Clone, Debug, PartialEq, Fail)]
pub enum ErrorKind {
    #[fail(display = "cannot determine token {:?} at {}", character, position)]
    Syntax {
        position: usize,
        character: Option<char>,
    },
    #[fail(
        display = "expression cannot start with operator '{}' at {}",
        character, position
    )]
    LeadingOperator { position: usize, character: char },
    /// A binary builder reached finalization with an empty slot. Never caused by input.
    #[fail(display = "internal error: incomplete node in expression tree")]
    IncompleteNode,
    #[fail(display = "no value bound for variable '{}'", _0)]
    MissingVariable(String),
    #[fail(display = "invalid binding '{}', expected NAME=VALUE", _0)]
    InvalidBinding(String),
    #[fail(display = "input closed")]
    InputClosed,
    #[fail(display = "i/o error")]
    Io,
}

impl Fail for Error {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.inner.get_context()
    }

    /// Offset of a parse failure.
    pub fn position(&self) -> Option<usize> {
        match self.kind() {
            ErrorKind::Syntax { position, .. } | ErrorKind::LeadingOperator { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }

    /// Offending character of a parse failure, `None` when the input ran out.
    pub fn character(&self) -> Option<char> {
        match self.kind() {
            ErrorKind::Syntax { character, .. } => *character,
            ErrorKind::LeadingOperator { character, .. } => Some(*character),
            _ => None,
        }
    }

    pub fn is_parse_error(&self) -> bool {
        self.position().is_some()
    }

    /// Message followed by every underlying cause, `: `-separated.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        for cause in (self as &dyn Fail).iter_causes() {
            message.push_str(": ");
            message.push_str(&cause.to_string());
        }
        message
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ErrorKind>> for Error {
    fn from(inner: Context<ErrorKind>) -> Error {
        Error { inner }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
