//! Staging nodes for the tree under construction.
//!
//! Builders live in an [`Arena`] and refer to each other by [`NodeId`], so the
//! resolver can rewire child slots while the tree is still growing. Once the
//! scan is over the arena is consumed by [`Arena::finalize`].

use super::error::{ErrorKind, Result};
use super::token::{BinaryOp, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Builder {
    Constant(f64),
    Variable(String),
    Binary {
        op: BinaryOp,
        left: Option<NodeId>,
        right: Option<NodeId>,
    },
}

impl Builder {
    pub(crate) fn binary(op: BinaryOp) -> Builder {
        Builder::Binary {
            op,
            left: None,
            right: None,
        }
    }

    pub(crate) fn op(&self) -> Option<BinaryOp> {
        match self {
            Builder::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    nodes: Vec<Option<Builder>>,
}

impl Arena {
    pub(crate) fn push(&mut self, builder: Builder) -> NodeId {
        self.nodes.push(Some(builder));
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn is_multiply(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(Builder::op)
            .map_or(false, BinaryOp::is_multiply)
    }

    pub(crate) fn right(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id) {
            Some(Builder::Binary { right, .. }) => *right,
            _ => None,
        }
    }

    pub(crate) fn set_left(&mut self, id: NodeId, child: Option<NodeId>) {
        if let Some(Builder::Binary { left, .. }) = self.get_mut(id) {
            *left = child;
        }
    }

    pub(crate) fn set_right(&mut self, id: NodeId, child: Option<NodeId>) {
        if let Some(Builder::Binary { right, .. }) = self.get_mut(id) {
            *right = child;
        }
    }

    fn get(&self, id: NodeId) -> Option<&Builder> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Builder> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Turns the subtree under `root` into an immutable [`Token`].
    ///
    /// Every binary builder must have both slots set, and no builder may be
    /// reachable twice. Walks the arena with explicit stacks, so tree depth
    /// is bounded by memory only.
    pub(crate) fn finalize(mut self, root: NodeId) -> Result<Token> {
        let mut work = vec![Step::Enter(root)];
        let mut built: Vec<Token> = Vec::new();

        while let Some(step) = work.pop() {
            match step {
                Step::Enter(id) => match self.take(id)? {
                    Builder::Constant(n) => built.push(Token::Constant(n)),
                    Builder::Variable(name) => built.push(Token::Variable(name)),
                    Builder::Binary {
                        op,
                        left: Some(left),
                        right: Some(right),
                    } => {
                        work.push(Step::Combine(op));
                        work.push(Step::Enter(right));
                        work.push(Step::Enter(left));
                    }
                    Builder::Binary { .. } => return Err(ErrorKind::IncompleteNode.into()),
                },
                Step::Combine(op) => {
                    let rhs = built.pop().ok_or(ErrorKind::IncompleteNode)?;
                    let lhs = built.pop().ok_or(ErrorKind::IncompleteNode)?;
                    built.push(Token::binary(op, lhs, rhs));
                }
            }
        }

        match (built.pop(), built.is_empty()) {
            (Some(token), true) => Ok(token),
            _ => Err(ErrorKind::IncompleteNode.into()),
        }
    }

    fn take(&mut self, id: NodeId) -> Result<Builder> {
        let builder = self
            .nodes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(ErrorKind::IncompleteNode)?;
        Ok(builder)
    }
}

enum Step {
    Enter(NodeId),
    Combine(BinaryOp),
}
