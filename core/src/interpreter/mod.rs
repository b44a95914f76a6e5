//! # Interpreter - Stack-Driven Continuation Machine
//!
//! Runs compiled skeleton programs one instruction at a time.
//!
//! ## Core Principles
//!
//! 1. **Stack-driven execution**: All remaining work is the task's `Stack`, no recursion
//! 2. **Instructions consume themselves**: interpreting pops and takes ownership, so the
//!    compiled template is only ever read and copied
//! 3. **Splits hand off**: a split appends child tasks and the parent waits for a merge
//! 4. **Pure interpreter**: no threads, no async - the engine decides where tasks run

pub mod exec_loop;
pub mod instructions;
pub mod task;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use exec_loop::{run_inline, run_until_done, step};
pub use instructions::{Instruction, Stack};
pub use task::{ChildTask, Context, Step, Task};
pub use types::{Event, Val, When, Where};
