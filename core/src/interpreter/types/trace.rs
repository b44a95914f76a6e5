//! Branch-trace identity
//!
//! A [`BranchTrace`] is the path of nested skeleton instantiations an
//! instruction belongs to. It is immutable: every change produces a new
//! trace, so a trace captured by one task can be shared freely with others.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/* ===================== Skeleton identity ===================== */

static NEXT_SKELETON_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one skeleton node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkeletonId(pub u64);

impl SkeletonId {
    pub fn next() -> Self {
        SkeletonId(NEXT_SKELETON_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SkeletonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Composition type of a skeleton node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkeletonKind {
    Seq,
    Pipe,
    If,
    While,
    For,
    Map,
    Fork,
    DaC,
}

/* ===================== Trace ===================== */

/// One step of a branch trace: which skeleton, and which instance of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceElement {
    pub skeleton: SkeletonId,
    pub kind: SkeletonKind,
    pub instance: u64,
}

impl TraceElement {
    pub fn new(skeleton: SkeletonId, kind: SkeletonKind) -> Self {
        Self {
            skeleton,
            kind,
            instance: 0,
        }
    }
}

/// Immutable, append-only path of trace elements
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchTrace(Arc<[TraceElement]>);

impl Default for BranchTrace {
    fn default() -> Self {
        BranchTrace(Arc::from(Vec::new()))
    }
}

impl BranchTrace {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[TraceElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Innermost element (the skeleton an instruction was compiled for)
    pub fn last(&self) -> Option<&TraceElement> {
        self.0.last()
    }

    /// New trace extended by one nested skeleton
    pub fn push(&self, element: TraceElement) -> Self {
        let mut elements = self.0.to_vec();
        elements.push(element);
        BranchTrace(elements.into())
    }

    /// New trace with the instance id at `depth` replaced
    pub fn with_instance_at(&self, depth: usize, instance: u64) -> Result<Self, ConfigurationError> {
        if depth >= self.0.len() {
            return Err(ConfigurationError::MalformedTrace(format!(
                "no trace element at depth {} (trace has {})",
                depth,
                self.0.len()
            )));
        }
        let mut elements = self.0.to_vec();
        elements[depth].instance = instance;
        Ok(BranchTrace(elements.into()))
    }

    /// New trace with the trailing instance id replaced
    pub fn with_last_instance(&self, instance: u64) -> Result<Self, ConfigurationError> {
        let depth = self
            .0
            .len()
            .checked_sub(1)
            .ok_or_else(|| ConfigurationError::MalformedTrace("trace is empty".to_string()))?;
        self.with_instance_at(depth, instance)
    }
}

impl fmt::Debug for BranchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for BranchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " / ")?;
            }
            write!(f, "{:?}{}:{}", e.kind, e.skeleton, e.instance)?;
        }
        write!(f, "]")
    }
}

/* ===================== Recursion path ===================== */

/// Child indices from a divide-and-conquer root down to one recursion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RecursionPath(Vec<u64>);

impl RecursionPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[u64] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, index: u64) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        RecursionPath(indices)
    }

    /// Deterministic numeric id of this path
    ///
    /// First 8 bytes of SHA-256 over the length and every index, all as
    /// big-endian u64. The length prefix keeps `[]` and `[0]` apart.
    pub fn id(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update((self.0.len() as u64).to_be_bytes());
        for index in &self.0 {
            hasher.update(index.to_be_bytes());
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(head)
    }
}

impl From<Vec<u64>> for RecursionPath {
    fn from(indices: Vec<u64>) -> Self {
        RecursionPath(indices)
    }
}
