//! Task state
//!
//! A task holds everything needed to drive one stack:
//! - stack: the remaining instructions
//! - value: the input of the next instruction (the result once done)
//! - children: sub-tasks produced by a split, waiting to be scheduled

use super::instructions::Stack;
use super::types::{Event, Val};
use crate::events::ListenerRegistry;
use std::sync::Arc;
use uuid::Uuid;

/// Default bound on split nesting (plain nesting plus recursion depth)
pub const DEFAULT_MAX_DEPTH: usize = 64;

/* ===================== Context ===================== */

/// Read-only state shared by every task of one engine
#[derive(Debug, Clone)]
pub struct Context {
    pub listeners: Arc<ListenerRegistry>,
    pub max_depth: usize,
}

impl Context {
    pub fn new(listeners: Arc<ListenerRegistry>, max_depth: usize) -> Self {
        Self {
            listeners,
            max_depth,
        }
    }

    pub fn notify(&self, event: Event) {
        self.listeners.notify(&event);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Arc::new(ListenerRegistry::new()), DEFAULT_MAX_DEPTH)
    }
}

/* ===================== Task ===================== */

/// Independently schedulable sub-computation produced by a split
#[derive(Debug)]
pub struct ChildTask {
    /// Position in the split; the merge sees results in this order
    pub index: usize,
    pub stack: Stack,
    pub input: Val,
}

#[derive(Debug)]
pub struct Task {
    pub id: Uuid,
    pub stack: Stack,
    pub value: Val,
    pub children: Vec<ChildTask>,
}

impl Task {
    /// Create a task that owns `stack` and starts from `input`
    pub fn new(stack: Stack, input: Val) -> Self {
        Task {
            id: Uuid::new_v4(),
            stack,
            value: input,
            children: Vec::new(),
        }
    }

    pub fn from_child(child: ChildTask) -> Self {
        Self::new(child.stack, child.input)
    }

    /// Hand the pending children over to the scheduler
    pub fn take_children(&mut self) -> Vec<ChildTask> {
        std::mem::take(&mut self.children)
    }

    /// Resume after a split with the child results in index order
    ///
    /// Returns false if the task still holds unscheduled children, in which
    /// case nothing is changed.
    pub fn resume(&mut self, results: Vec<Val>) -> bool {
        if !self.children.is_empty() {
            return false;
        }
        self.value = Val::List(results);
        true
    }

    pub fn is_done(&self) -> bool {
        self.stack.is_empty() && self.children.is_empty()
    }

    /// Consume the task, yielding its final value
    pub fn into_value(self) -> Val {
        self.value
    }
}

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Continue to next step
    Continue,
    /// Children were produced; the task waits for their results
    Split,
    /// Stack is empty; `value` is the result
    Done,
}
