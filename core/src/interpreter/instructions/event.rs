//! Event instruction: notify listeners and pass the input through

use crate::error::SkeletonResult;
use crate::interpreter::task::Context;
use crate::interpreter::types::{BranchTrace, Event, Val, When, Where};
use tracing::trace;

#[derive(Debug)]
pub struct EventInst {
    pub when: When,
    pub location: Where,
    pub trace: BranchTrace,
    pub payload: Val,
}

impl EventInst {
    pub fn new(when: When, location: Where, trace: BranchTrace, payload: Val) -> Self {
        Self {
            when,
            location,
            trace,
            payload,
        }
    }

    pub fn interpret(self, input: Val, ctx: &Context) -> SkeletonResult<Val> {
        trace!(
            when = ?self.when,
            location = ?self.location,
            trace = %self.trace,
            "event"
        );
        ctx.notify(Event::new(self.when, self.location, self.trace, self.payload));
        Ok(input)
    }

    pub fn copy(&self) -> Self {
        Self {
            when: self.when,
            location: self.location,
            trace: self.trace.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// Shorthand used by the other instructions to build event instructions
pub(crate) fn event(
    when: When,
    location: Where,
    trace: &BranchTrace,
    payload: Val,
) -> super::Instruction {
    super::Instruction::Event(EventInst::new(when, location, trace.clone(), payload))
}
