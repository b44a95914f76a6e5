//! Notification records emitted by event instructions

use super::trace::BranchTrace;
use super::values::Val;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the event fires before or after the observed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum When {
    Before,
    After,
}

/// Which control-flow point is observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Where {
    Condition,
    NestedSkeleton,
    Merge,
}

/// Notification delivered to listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub when: When,
    #[serde(rename = "where")]
    pub location: Where,
    pub trace: BranchTrace,
    /// Condition outcome, child index, iteration or recursion path
    pub payload: Val,
    pub at: DateTime<Utc>,
}

impl Event {
    pub fn new(when: When, location: Where, trace: BranchTrace, payload: Val) -> Self {
        Self {
            when,
            location,
            trace,
            payload,
            at: Utc::now(),
        }
    }

    pub fn is(&self, when: When, location: Where) -> bool {
        self.when == when && self.location == location
    }
}
