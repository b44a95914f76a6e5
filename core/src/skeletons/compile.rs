//! Skeleton compiler
//!
//! Walks a skeleton tree and emits the master stack. Every instruction
//! captures the branch trace of the skeleton it was emitted for.

use super::{Node, Skeleton};
use crate::interpreter::instructions::event::event;
use crate::interpreter::instructions::{
    DaCInst, ForInst, IfInst, Instruction, SeqInst, SplitInst, Stack, WhileInst,
};
use crate::interpreter::types::{BranchTrace, SkeletonId, TraceElement, Val, When, Where};
use std::sync::Arc;

/// Compile a skeleton tree into its master stack
pub fn compile(skeleton: &Skeleton) -> Stack {
    compile_at(skeleton, &BranchTrace::root())
}

fn compile_at(skeleton: &Skeleton, parent: &BranchTrace) -> Stack {
    let trace = parent.push(TraceElement::new(skeleton.id(), skeleton.kind()));

    match skeleton.node() {
        Node::Seq(execute) => Stack::from_program(vec![Instruction::Seq(SeqInst::new(
            execute.clone(),
            trace,
        ))]),

        Node::Pipe(first, second) => {
            // Each stage runs between BEFORE/AFTER NESTED_SKELETON events
            // carrying its stage index; the second stage is pushed first
            let mut stack = Stack::new();
            for (index, stage) in [(1u8, second), (0u8, first)] {
                let payload = Val::Num(f64::from(index));
                stack.push(event(When::After, Where::NestedSkeleton, &trace, payload.clone()));
                stack.push_stack(compile_at(stage, &trace));
                stack.push(event(When::Before, Where::NestedSkeleton, &trace, payload));
            }
            stack
        }

        Node::If {
            condition,
            true_case,
            false_case,
        } => Stack::from_program(vec![
            event(When::Before, Where::Condition, &trace, Val::Null),
            Instruction::If(IfInst::new(
                condition.clone(),
                compile_at(true_case, &trace),
                compile_at(false_case, &trace),
                trace,
            )),
        ]),

        Node::While { condition, body } => Stack::from_program(vec![
            event(When::Before, Where::Condition, &trace, Val::Null),
            Instruction::While(WhileInst::new(
                condition.clone(),
                compile_at(body, &trace),
                trace,
            )),
        ]),

        Node::For { times, body } => Stack::from_program(vec![Instruction::For(ForInst::new(
            *times,
            compile_at(body, &trace),
            trace,
        ))]),

        Node::Map { split, body, merge } => Stack::from_program(vec![
            Instruction::Seq(SeqInst::new(split.as_execute(), trace.clone())),
            Instruction::Split(SplitInst::new(
                vec![compile_at(body, &trace)],
                merge.clone(),
                trace,
            )),
        ]),

        Node::Fork {
            split,
            branches,
            merge,
        } => Stack::from_program(vec![
            Instruction::Seq(SeqInst::new(split.as_execute(), trace.clone())),
            Instruction::Split(SplitInst::new(
                branches.iter().map(|b| compile_at(b, &trace)).collect(),
                merge.clone(),
                trace,
            )),
        ]),

        Node::DaC {
            condition,
            split,
            solve,
            merge,
        } => Stack::from_program(vec![
            event(When::Before, Where::Condition, &trace, Val::List(Vec::new())),
            Instruction::DaC(DaCInst::new(
                condition.clone(),
                split.clone(),
                merge.clone(),
                compile_at(solve, &trace),
                trace,
            )),
        ]),
    }
}

/* ===================== Program ===================== */

/// A compiled skeleton: a shared, read-only template
///
/// Cheap to clone; every execution runs on its own [`Program::instantiate`].
#[derive(Debug, Clone)]
pub struct Program {
    root: SkeletonId,
    template: Arc<Stack>,
}

impl Program {
    pub fn compile(skeleton: &Skeleton) -> Self {
        Self {
            root: skeleton.id(),
            template: Arc::new(compile(skeleton)),
        }
    }

    pub fn root(&self) -> SkeletonId {
        self.root
    }

    pub fn template(&self) -> &Stack {
        &self.template
    }

    /// Fresh working copy for one execution
    pub fn instantiate(&self) -> Stack {
        self.template.copy()
    }
}
