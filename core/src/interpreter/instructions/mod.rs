//! Instruction set and execution stack
//!
//! A compiled skeleton is a [`Stack`] of [`Instruction`]s. The top of the
//! stack is the last element. Interpreting an instruction consumes it; the
//! instruction may push follow-on instructions and may append child tasks.
//!
//! The master stack produced by the compiler is a shared template and is
//! never interpreted directly. Every task works on a [`Stack::copy`] of it.

pub mod conditional;
pub mod dac;
pub mod event;
pub mod loops;
pub mod merge;
pub mod seq;
pub mod split;

pub use conditional::{ChoiceInst, IfInst};
pub use dac::DaCInst;
pub use event::EventInst;
pub use loops::{ForInst, WhileInst};
pub use merge::MergeInst;
pub use seq::SeqInst;
pub use split::SplitInst;

use super::task::{ChildTask, Context};
use super::types::{BranchTrace, RecursionPath, Val};
use crate::error::{ConfigurationError, SkeletonResult};

/* ===================== Instruction ===================== */

/// One interpretable step of a compiled skeleton program
#[derive(Debug)]
pub enum Instruction {
    Seq(SeqInst),
    If(IfInst),
    Choice(ChoiceInst),
    Split(SplitInst),
    DaC(DaCInst),
    Merge(MergeInst),
    Event(EventInst),
    While(WhileInst),
    For(ForInst),
}

impl Instruction {
    /// Interpret this instruction against `input`
    ///
    /// Called with the instruction already popped from `stack`. Pushed
    /// instructions run before whatever was below; appended children are
    /// scheduled independently and feed a pending merge.
    pub fn interpret(
        self,
        input: Val,
        stack: &mut Stack,
        children: &mut Vec<ChildTask>,
        ctx: &Context,
    ) -> SkeletonResult<Val> {
        match self {
            Instruction::Seq(inst) => inst.interpret(input),
            Instruction::If(inst) => inst.interpret(input, stack),
            Instruction::Choice(inst) => inst.interpret(input, stack),
            Instruction::Split(inst) => inst.interpret(input, stack, children, ctx),
            Instruction::DaC(inst) => inst.interpret(input, stack),
            Instruction::Merge(inst) => inst.interpret(input),
            Instruction::Event(inst) => inst.interpret(input, ctx),
            Instruction::While(inst) => inst.interpret(input, stack),
            Instruction::For(inst) => inst.interpret(input, stack),
        }
    }

    /// Structurally independent clone; nested stacks are copied element by element
    pub fn copy(&self) -> Instruction {
        match self {
            Instruction::Seq(inst) => Instruction::Seq(inst.copy()),
            Instruction::If(inst) => Instruction::If(inst.copy()),
            Instruction::Choice(inst) => Instruction::Choice(inst.copy()),
            Instruction::Split(inst) => Instruction::Split(inst.copy()),
            Instruction::DaC(inst) => Instruction::DaC(inst.copy()),
            Instruction::Merge(inst) => Instruction::Merge(inst.copy()),
            Instruction::Event(inst) => Instruction::Event(inst.copy()),
            Instruction::While(inst) => Instruction::While(inst.copy()),
            Instruction::For(inst) => Instruction::For(inst.copy()),
        }
    }

    /// Branch trace captured when this instruction was created
    pub fn trace(&self) -> &BranchTrace {
        match self {
            Instruction::Seq(inst) => &inst.trace,
            Instruction::If(inst) => &inst.trace,
            Instruction::Choice(inst) => &inst.trace,
            Instruction::Split(inst) => &inst.trace,
            Instruction::DaC(inst) => &inst.trace,
            Instruction::Merge(inst) => &inst.trace,
            Instruction::Event(inst) => &inst.trace,
            Instruction::While(inst) => &inst.trace,
            Instruction::For(inst) => &inst.trace,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Instruction::Seq(_) => "seq",
            Instruction::If(_) => "if",
            Instruction::Choice(_) => "choice",
            Instruction::Split(_) => "split",
            Instruction::DaC(_) => "dac",
            Instruction::Merge(_) => "merge",
            Instruction::Event(_) => "event",
            Instruction::While(_) => "while",
            Instruction::For(_) => "for",
        }
    }

    /// Rewrite the instance id at `depth` of this instruction's trace and of
    /// every instruction in its nested stacks
    ///
    /// Instructions whose trace does not reach `depth` are left alone.
    pub(crate) fn retag(&mut self, depth: usize, instance: u64) -> Result<(), ConfigurationError> {
        fn patch(trace: &mut BranchTrace, depth: usize, instance: u64) -> Result<(), ConfigurationError> {
            if trace.len() > depth {
                *trace = trace.with_instance_at(depth, instance)?;
            }
            Ok(())
        }

        match self {
            Instruction::Seq(inst) => patch(&mut inst.trace, depth, instance),
            Instruction::If(inst) => {
                patch(&mut inst.trace, depth, instance)?;
                inst.true_case.retag(depth, instance)?;
                inst.false_case.retag(depth, instance)
            }
            Instruction::Choice(inst) => {
                patch(&mut inst.trace, depth, instance)?;
                inst.true_case.retag(depth, instance)?;
                inst.false_case.retag(depth, instance)
            }
            Instruction::Split(inst) => {
                patch(&mut inst.trace, depth, instance)?;
                for template in &mut inst.templates {
                    template.retag(depth, instance)?;
                }
                Ok(())
            }
            Instruction::DaC(inst) => {
                patch(&mut inst.trace, depth, instance)?;
                inst.solve.retag(depth, instance)
            }
            Instruction::Merge(inst) => patch(&mut inst.trace, depth, instance),
            Instruction::Event(inst) => patch(&mut inst.trace, depth, instance),
            Instruction::While(inst) => {
                patch(&mut inst.trace, depth, instance)?;
                inst.body.retag(depth, instance)
            }
            Instruction::For(inst) => {
                patch(&mut inst.trace, depth, instance)?;
                inst.body.retag(depth, instance)
            }
        }
    }
}

/// Payload describing a recursion path as a list of numbers
pub(crate) fn path_payload(path: &RecursionPath) -> Val {
    Val::List(path.indices().iter().map(|i| Val::Num(*i as f64)).collect())
}

/* ===================== Stack ===================== */

/// Execution stack: the reified continuation of one task
///
/// The top of the stack is the last element.
#[derive(Debug, Default)]
pub struct Stack(Vec<Instruction>);

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stack from instructions listed in execution order
    pub fn from_program(program: Vec<Instruction>) -> Self {
        let mut instructions = program;
        instructions.reverse();
        Stack(instructions)
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.0.push(instruction);
    }

    pub fn pop(&mut self) -> Option<Instruction> {
        self.0.pop()
    }

    pub fn peek(&self) -> Option<&Instruction> {
        self.0.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut Instruction> {
        self.0.last_mut()
    }

    /// Place a whole stack above the current top, so it runs next
    pub fn push_stack(&mut self, other: Stack) {
        self.0.extend(other.0);
    }

    /// Place an instruction below everything else, so it runs last
    pub fn push_bottom(&mut self, instruction: Instruction) {
        self.0.insert(0, instruction);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Instructions from bottom to top
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.0.iter()
    }

    /// Deep copy: every instruction, and every stack nested in it, is cloned
    pub fn copy(&self) -> Stack {
        Stack(self.0.iter().map(Instruction::copy).collect())
    }

    pub(crate) fn retag(&mut self, depth: usize, instance: u64) -> Result<(), ConfigurationError> {
        for instruction in &mut self.0 {
            instruction.retag(depth, instance)?;
        }
        Ok(())
    }
}
