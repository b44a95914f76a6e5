//! Divide and conquer
//!
//! A conditional split whose single template is the instruction itself.
//! Each recursion carries its [`RecursionPath`] and an instance id derived
//! from it, so otherwise identical branches stay distinguishable.

use super::event::event;
use super::{path_payload, Instruction, SeqInst, SplitInst, Stack};
use crate::error::SkeletonResult;
use crate::interpreter::types::{
    BranchTrace, Condition, Merge, RecursionPath, Split, Val, When, Where,
};

#[derive(Debug)]
pub struct DaCInst {
    pub condition: Condition,
    pub split: Split,
    pub merge: Merge,
    /// Compiled conquer branch, run once division stops
    pub solve: Stack,
    pub trace: BranchTrace,
    pub path: RecursionPath,
}

impl DaCInst {
    pub fn new(
        condition: Condition,
        split: Split,
        merge: Merge,
        solve: Stack,
        trace: BranchTrace,
    ) -> Self {
        Self {
            condition,
            split,
            merge,
            solve,
            trace,
            path: RecursionPath::root(),
        }
    }

    /// When the condition holds: AFTER/CONDITION, split muscle, recursive split.
    /// Otherwise: AFTER/CONDITION, then the solve branch wrapped in
    /// BEFORE/AFTER NESTED_SKELETON events.
    pub fn interpret(self, input: Val, stack: &mut Stack) -> SkeletonResult<Val> {
        let cond = self.condition.call(&input)?;
        let trace = self.trace.clone();

        if cond {
            let split = SeqInst::new(self.split.as_execute(), trace.clone());
            let merge = self.merge.clone();
            let path = self.path.clone();
            let template = Stack::from_program(vec![Instruction::DaC(self)]);

            stack.push(Instruction::Split(SplitInst::recursive(
                template,
                merge,
                trace.clone(),
                path,
            )));
            stack.push(Instruction::Seq(split));
        } else {
            let payload = path_payload(&self.path);
            stack.push(event(When::After, Where::NestedSkeleton, &trace, payload.clone()));
            stack.push_stack(self.solve);
            stack.push(event(When::Before, Where::NestedSkeleton, &trace, payload));
        }
        stack.push(event(When::After, Where::Condition, &trace, Val::Bool(cond)));

        Ok(input)
    }

    pub fn copy(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            split: self.split.clone(),
            merge: self.merge.clone(),
            solve: self.solve.copy(),
            trace: self.trace.clone(),
            path: self.path.clone(),
        }
    }
}
