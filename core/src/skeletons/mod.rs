//! Skeleton trees
//!
//! Skeletons are the user-facing control patterns. They carry no execution
//! state; [`compile`] turns a tree into the master instruction stack that
//! every execution copies.

pub mod compile;

pub use compile::{compile, Program};

use crate::interpreter::types::{Condition, Execute, Merge, SkeletonId, SkeletonKind, Split};

/// A node of a skeleton tree
#[derive(Debug, Clone)]
pub struct Skeleton {
    id: SkeletonId,
    node: Node,
}

#[derive(Debug, Clone)]
pub enum Node {
    Seq(Execute),
    Pipe(Box<Skeleton>, Box<Skeleton>),
    If {
        condition: Condition,
        true_case: Box<Skeleton>,
        false_case: Box<Skeleton>,
    },
    While {
        condition: Condition,
        body: Box<Skeleton>,
    },
    For {
        times: u64,
        body: Box<Skeleton>,
    },
    Map {
        split: Split,
        body: Box<Skeleton>,
        merge: Merge,
    },
    Fork {
        split: Split,
        branches: Vec<Skeleton>,
        merge: Merge,
    },
    DaC {
        condition: Condition,
        split: Split,
        solve: Box<Skeleton>,
        merge: Merge,
    },
}

impl Skeleton {
    fn new(node: Node) -> Self {
        Self {
            id: SkeletonId::next(),
            node,
        }
    }

    pub fn id(&self) -> SkeletonId {
        self.id
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn kind(&self) -> SkeletonKind {
        match self.node {
            Node::Seq(_) => SkeletonKind::Seq,
            Node::Pipe(..) => SkeletonKind::Pipe,
            Node::If { .. } => SkeletonKind::If,
            Node::While { .. } => SkeletonKind::While,
            Node::For { .. } => SkeletonKind::For,
            Node::Map { .. } => SkeletonKind::Map,
            Node::Fork { .. } => SkeletonKind::Fork,
            Node::DaC { .. } => SkeletonKind::DaC,
        }
    }

    /* ===================== Builders ===================== */

    pub fn seq(execute: Execute) -> Self {
        Self::new(Node::Seq(execute))
    }

    /// Run `first`, then feed its result to `second`
    pub fn pipe(first: Skeleton, second: Skeleton) -> Self {
        Self::new(Node::Pipe(Box::new(first), Box::new(second)))
    }

    /// Left-nested pipe of several stages; `None` when `stages` is empty
    pub fn pipeline(stages: Vec<Skeleton>) -> Option<Self> {
        stages.into_iter().reduce(Skeleton::pipe)
    }

    pub fn if_else(condition: Condition, true_case: Skeleton, false_case: Skeleton) -> Self {
        Self::new(Node::If {
            condition,
            true_case: Box::new(true_case),
            false_case: Box::new(false_case),
        })
    }

    pub fn while_loop(condition: Condition, body: Skeleton) -> Self {
        Self::new(Node::While {
            condition,
            body: Box::new(body),
        })
    }

    pub fn for_loop(times: u64, body: Skeleton) -> Self {
        Self::new(Node::For {
            times,
            body: Box::new(body),
        })
    }

    /// Split, run `body` on every part, merge
    pub fn map(split: Split, body: Skeleton, merge: Merge) -> Self {
        Self::new(Node::Map {
            split,
            body: Box::new(body),
            merge,
        })
    }

    /// Split, run branch `i` on part `i`, merge
    pub fn fork(split: Split, branches: Vec<Skeleton>, merge: Merge) -> Self {
        Self::new(Node::Fork {
            split,
            branches,
            merge,
        })
    }

    /// Divide while `condition` holds, solve the leaves with `solve`, merge back up
    pub fn dac(condition: Condition, split: Split, solve: Skeleton, merge: Merge) -> Self {
        Self::new(Node::DaC {
            condition,
            split,
            solve: Box::new(solve),
            merge,
        })
    }
}
