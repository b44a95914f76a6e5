//! Sequential instruction: apply a transformation muscle

use crate::error::SkeletonResult;
use crate::interpreter::types::{BranchTrace, Execute, Val};

#[derive(Debug)]
pub struct SeqInst {
    pub execute: Execute,
    pub trace: BranchTrace,
}

impl SeqInst {
    pub fn new(execute: Execute, trace: BranchTrace) -> Self {
        Self { execute, trace }
    }

    pub fn interpret(self, input: Val) -> SkeletonResult<Val> {
        self.execute.call(input)
    }

    pub fn copy(&self) -> Self {
        Self {
            execute: self.execute.clone(),
            trace: self.trace.clone(),
        }
    }
}
