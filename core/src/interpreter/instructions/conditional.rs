//! Conditional branching: If and the Choice it defers to

use super::event::event;
use super::{Instruction, Stack};
use crate::error::SkeletonResult;
use crate::interpreter::types::{BranchTrace, Condition, Val, When, Where};

/// Evaluates a condition and schedules the chosen branch
///
/// Both branch stacks belong to this instance; the compiled template
/// holds its own pair, which `copy` duplicates.
#[derive(Debug)]
pub struct IfInst {
    pub condition: Condition,
    pub true_case: Stack,
    pub false_case: Stack,
    pub trace: BranchTrace,
}

impl IfInst {
    pub fn new(condition: Condition, true_case: Stack, false_case: Stack, trace: BranchTrace) -> Self {
        Self {
            condition,
            true_case,
            false_case,
            trace,
        }
    }

    /// Runs: AFTER/CONDITION, BEFORE/NESTED_SKELETON, branch, AFTER/NESTED_SKELETON
    pub fn interpret(self, input: Val, stack: &mut Stack) -> SkeletonResult<Val> {
        let cond = self.condition.call(&input)?;
        let trace = self.trace;

        stack.push(event(When::After, Where::NestedSkeleton, &trace, Val::Bool(cond)));
        stack.push(Instruction::Choice(ChoiceInst {
            cond,
            true_case: self.true_case,
            false_case: self.false_case,
            trace: trace.clone(),
        }));
        stack.push(event(When::Before, Where::NestedSkeleton, &trace, Val::Bool(cond)));
        stack.push(event(When::After, Where::Condition, &trace, Val::Bool(cond)));

        Ok(input)
    }

    pub fn copy(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            true_case: self.true_case.copy(),
            false_case: self.false_case.copy(),
            trace: self.trace.clone(),
        }
    }
}

/// Substitutes the chosen branch's instructions in place of itself
#[derive(Debug)]
pub struct ChoiceInst {
    pub cond: bool,
    pub true_case: Stack,
    pub false_case: Stack,
    pub trace: BranchTrace,
}

impl ChoiceInst {
    pub fn interpret(self, input: Val, stack: &mut Stack) -> SkeletonResult<Val> {
        let chosen = if self.cond {
            self.true_case
        } else {
            self.false_case
        };
        stack.push_stack(chosen);
        Ok(input)
    }

    pub fn copy(&self) -> Self {
        Self {
            cond: self.cond,
            true_case: self.true_case.copy(),
            false_case: self.false_case.copy(),
            trace: self.trace.clone(),
        }
    }
}
