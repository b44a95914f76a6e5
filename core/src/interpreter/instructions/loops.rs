//! Loop instructions: While and For
//!
//! Each iteration runs a fresh copy of the body, retagged with the
//! iteration number, between BEFORE/AFTER NESTED_SKELETON events.

use super::event::event;
use super::{Instruction, Stack};
use crate::error::SkeletonResult;
use crate::interpreter::types::{BranchTrace, Condition, Val, When, Where};

#[derive(Debug)]
pub struct WhileInst {
    pub condition: Condition,
    pub body: Stack,
    pub trace: BranchTrace,
    pub iteration: u64,
}

impl WhileInst {
    pub fn new(condition: Condition, body: Stack, trace: BranchTrace) -> Self {
        Self {
            condition,
            body,
            trace,
            iteration: 0,
        }
    }

    pub fn interpret(self, input: Val, stack: &mut Stack) -> SkeletonResult<Val> {
        let cond = self.condition.call(&input)?;
        let trace = self.trace.clone();

        if cond {
            let payload = Val::Num(self.iteration as f64);
            let mut body = self.body.copy();
            body.retag(trace.len(), self.iteration)?;

            stack.push(Instruction::While(WhileInst {
                iteration: self.iteration + 1,
                ..self
            }));
            stack.push(event(When::Before, Where::Condition, &trace, Val::Null));
            stack.push(event(When::After, Where::NestedSkeleton, &trace, payload.clone()));
            stack.push_stack(body);
            stack.push(event(When::Before, Where::NestedSkeleton, &trace, payload));
        }
        stack.push(event(When::After, Where::Condition, &trace, Val::Bool(cond)));

        Ok(input)
    }

    pub fn copy(&self) -> Self {
        Self {
            condition: self.condition.clone(),
            body: self.body.copy(),
            trace: self.trace.clone(),
            iteration: self.iteration,
        }
    }
}

#[derive(Debug)]
pub struct ForInst {
    pub times: u64,
    pub body: Stack,
    pub trace: BranchTrace,
    pub iteration: u64,
}

impl ForInst {
    pub fn new(times: u64, body: Stack, trace: BranchTrace) -> Self {
        Self {
            times,
            body,
            trace,
            iteration: 0,
        }
    }

    pub fn interpret(self, input: Val, stack: &mut Stack) -> SkeletonResult<Val> {
        if self.iteration >= self.times {
            return Ok(input);
        }

        let trace = self.trace.clone();
        let payload = Val::Num(self.iteration as f64);
        let mut body = self.body.copy();
        body.retag(trace.len(), self.iteration)?;

        stack.push(Instruction::For(ForInst {
            iteration: self.iteration + 1,
            ..self
        }));
        stack.push(event(When::After, Where::NestedSkeleton, &trace, payload.clone()));
        stack.push_stack(body);
        stack.push(event(When::Before, Where::NestedSkeleton, &trace, payload));

        Ok(input)
    }

    pub fn copy(&self) -> Self {
        Self {
            times: self.times,
            body: self.body.copy(),
            trace: self.trace.clone(),
            iteration: self.iteration,
        }
    }
}
