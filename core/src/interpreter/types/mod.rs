//! Type definitions for the interpreter
//!
//! - Runtime values (Val)
//! - Muscles (Condition, Execute, Split, Merge)
//! - Branch-trace identity (BranchTrace, RecursionPath)
//! - Event records (Event, When, Where)

pub mod event;
pub mod muscles;
pub mod trace;
pub mod values;

pub use event::{Event, When, Where};
pub use muscles::{Condition, Execute, Merge, Split};
pub use trace::{BranchTrace, RecursionPath, SkeletonId, SkeletonKind, TraceElement};
pub use values::Val;
