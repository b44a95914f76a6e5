//! Core execution loop
//!
//! This module contains the step() function - the heart of the interpreter.
//! It pops one instruction at a time, interprets it against the task value
//! and feeds the result to whatever runs next.
//!
//! ## Function Organization
//! 1. run_until_done() - Top-level driver (calls step repeatedly)
//! 2. step() - Pop and interpret one instruction
//! 3. run_inline() - Sequential scheduler, runs children depth-first

use super::task::{Context, Step, Task};
use super::types::Val;
use super::instructions::Stack;
use crate::error::{SkeletonError, SkeletonResult};
use tracing::trace;

/* ===================== Public API ===================== */

/// Run the task until its stack empties or it produces children
///
/// Returns `Step::Done` or `Step::Split`; on `Split` the scheduler takes the
/// children, runs them and calls [`Task::resume`].
pub fn run_until_done(task: &mut Task, ctx: &Context) -> SkeletonResult<Step> {
    loop {
        match step(task, ctx)? {
            Step::Continue => continue,
            other => return Ok(other),
        }
    }
}

/// Execute one step of the task
///
/// 1. Refuse to run past unresolved children
/// 2. Pop the top instruction (none left means done)
/// 3. Interpret it with the current value as input
/// 4. Report whether children were produced or the stack emptied
pub fn step(task: &mut Task, ctx: &Context) -> SkeletonResult<Step> {
    if !task.children.is_empty() {
        return Err(SkeletonError::structural(format!(
            "task {} stepped with {} unresolved children",
            task.id,
            task.children.len()
        )));
    }

    let Some(instruction) = task.stack.pop() else {
        return Ok(Step::Done);
    };

    trace!(
        task_id = %task.id,
        instruction = instruction.kind_name(),
        trace = %instruction.trace(),
        "interpret"
    );

    let input = std::mem::replace(&mut task.value, Val::Null);
    task.value = instruction.interpret(input, &mut task.stack, &mut task.children, ctx)?;

    if !task.children.is_empty() {
        Ok(Step::Split)
    } else if task.stack.is_empty() {
        Ok(Step::Done)
    } else {
        Ok(Step::Continue)
    }
}

/// Run a stack to completion on the current thread
///
/// Children are run depth-first in index order; the first failure aborts
/// the whole computation.
pub fn run_inline(stack: Stack, input: Val, ctx: &Context) -> SkeletonResult<Val> {
    let mut task = Task::new(stack, input);
    loop {
        match run_until_done(&mut task, ctx)? {
            Step::Done => return Ok(task.into_value()),
            Step::Split => {
                let results = task
                    .take_children()
                    .into_iter()
                    .map(|child| run_inline(child.stack, child.input, ctx))
                    .collect::<SkeletonResult<Vec<_>>>()?;
                if !task.resume(results) {
                    return Err(SkeletonError::structural(format!(
                        "task {} could not be resumed",
                        task.id
                    )));
                }
            }
            Step::Continue => continue,
        }
    }
}
