use std::fmt;
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
}

impl BinaryOp {
    /// Multiplicative operators bind tighter than additive ones.
    pub const fn is_multiply(self) -> bool {
        match self {
            BinaryOp::Multiply => true,
            BinaryOp::Add | BinaryOp::Subtract => false,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Subtract => "Subtract",
            BinaryOp::Multiply => "Multiply",
        }
    }

    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Subtract => lhs - rhs,
            BinaryOp::Multiply => lhs * rhs,
        }
    }
}

/// Finalized expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Constant(f64),
    Variable(String),
    Add(Box<Token>, Box<Token>),
    Subtract(Box<Token>, Box<Token>),
    Multiply(Box<Token>, Box<Token>),
}

impl Token {
    pub(crate) fn binary(op: BinaryOp, lhs: Token, rhs: Token) -> Token {
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
        match op {
            BinaryOp::Add => Token::Add(lhs, rhs),
            BinaryOp::Subtract => Token::Subtract(lhs, rhs),
            BinaryOp::Multiply => Token::Multiply(lhs, rhs),
        }
    }

    /// Splits a binary node into its operator and operands.
    pub fn as_binary(&self) -> Option<(BinaryOp, &Token, &Token)> {
        match self {
            Token::Add(l, r) => Some((BinaryOp::Add, l, r)),
            Token::Subtract(l, r) => Some((BinaryOp::Subtract, l, r)),
            Token::Multiply(l, r) => Some((BinaryOp::Multiply, l, r)),
            Token::Constant(_) | Token::Variable(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        enum Piece<'a> {
            Node(&'a Token),
            Text(&'static str),
        }

        let mut pieces = vec![Piece::Node(self)];
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(Token::Constant(n)) => write!(f, "{}", n)?,
                Piece::Node(Token::Variable(name)) => f.write_str(name)?,
                Piece::Node(token) => {
                    if let Some((op, l, r)) = token.as_binary() {
                        let infix = match op {
                            BinaryOp::Add => " + ",
                            BinaryOp::Subtract => " - ",
                            BinaryOp::Multiply => " * ",
                        };
                        pieces.push(Piece::Text(")"));
                        pieces.push(Piece::Node(r));
                        pieces.push(Piece::Text(infix));
                        pieces.push(Piece::Node(l));
                        pieces.push(Piece::Text("("));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Drop for Token {
    // Unlinks binary children onto a heap stack so dropping a deep chain
    // does not recurse once per level.
    fn drop(&mut self) {
        let mut stack = Vec::new();
        detach_children(self, &mut stack);
        while let Some(mut child) = stack.pop() {
            detach_children(&mut child, &mut stack);
        }
    }
}

fn detach_children(token: &mut Token, stack: &mut Vec<Box<Token>>) {
    if let Token::Add(l, r) | Token::Subtract(l, r) | Token::Multiply(l, r) = token {
        for child in [l, r].iter_mut() {
            if child.as_binary().is_some() {
                stack.push(mem::replace(&mut **child, Box::new(Token::Constant(0.0))));
            }
        }
    }
}
