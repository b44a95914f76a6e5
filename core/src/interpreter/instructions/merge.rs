//! Merge instruction: combine the ordered child results of a split

use crate::error::{SkeletonError, SkeletonResult};
use crate::interpreter::types::{BranchTrace, Merge, Val};
use tracing::debug;

#[derive(Debug)]
pub struct MergeInst {
    pub merge: Merge,
    pub trace: BranchTrace,
}

impl MergeInst {
    pub fn new(merge: Merge, trace: BranchTrace) -> Self {
        Self { merge, trace }
    }

    /// `input` must be the child results in original split order
    pub fn interpret(self, input: Val) -> SkeletonResult<Val> {
        let results = input.into_list().map_err(|other| {
            SkeletonError::structural(format!(
                "merge '{}' expects the ordered child results, got {}",
                self.merge.name(),
                other.type_name()
            ))
        })?;
        debug!(merge = self.merge.name(), results = results.len(), trace = %self.trace, "merging");
        self.merge.call(results)
    }

    pub fn copy(&self) -> Self {
        Self {
            merge: self.merge.clone(),
            trace: self.trace.clone(),
        }
    }
}
