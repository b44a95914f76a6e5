//! Parallel split
//!
//! Decomposes a list input into one child task per element. The parent
//! keeps BEFORE/MERGE, Merge and AFTER/MERGE on its own stack; they run
//! once the scheduler resumes it with every child result in index order.

use super::event::event;
use super::{path_payload, Instruction, MergeInst, Stack};
use crate::error::{ConfigurationError, SkeletonError, SkeletonResult};
use crate::interpreter::task::{ChildTask, Context};
use crate::interpreter::types::{BranchTrace, Merge, RecursionPath, Val, When, Where};
use tracing::debug;

#[derive(Debug)]
pub struct SplitInst {
    /// Either one template replicated per element, or one per element
    pub templates: Vec<Stack>,
    pub merge: Merge,
    pub trace: BranchTrace,
    /// Set when this split is a divide-and-conquer recursion
    pub path: Option<RecursionPath>,
}

impl SplitInst {
    pub fn new(templates: Vec<Stack>, merge: Merge, trace: BranchTrace) -> Self {
        Self {
            templates,
            merge,
            trace,
            path: None,
        }
    }

    /// Split produced by a divide-and-conquer step at `path`
    pub fn recursive(template: Stack, merge: Merge, trace: BranchTrace, path: RecursionPath) -> Self {
        Self {
            templates: vec![template],
            merge,
            trace,
            path: Some(path),
        }
    }

    pub fn interpret(
        self,
        input: Val,
        stack: &mut Stack,
        children: &mut Vec<ChildTask>,
        ctx: &Context,
    ) -> SkeletonResult<Val> {
        let params = input
            .into_list()
            .map_err(|other| ConfigurationError::NotASequence(other.type_name().to_string()))?;

        let depth = self.trace.len() + self.path.as_ref().map_or(0, RecursionPath::depth);
        if depth > ctx.max_depth {
            return Err(ConfigurationError::DepthExceeded(ctx.max_depth).into());
        }

        // Every child is built before any is handed over, so an arity or
        // trace error leaves `children` untouched.
        let spawned = match &self.path {
            None => self.spawn_children(params)?,
            Some(path) => self.spawn_recursions(params, path)?,
        };
        debug!(children = spawned.len(), trace = %self.trace, "split");
        children.extend(spawned);

        let payload = self.path.as_ref().map_or(Val::Null, path_payload);
        stack.push(event(When::After, Where::Merge, &self.trace, payload.clone()));
        stack.push(Instruction::Merge(MergeInst::new(self.merge, self.trace.clone())));
        stack.push(event(When::Before, Where::Merge, &self.trace, payload));

        // Replaced by the child results on resume; with no children this
        // empty list is what the merge receives
        Ok(Val::List(Vec::new()))
    }

    fn spawn_children(&self, params: Vec<Val>) -> SkeletonResult<Vec<ChildTask>> {
        let single = self.templates.len() == 1;
        if !single && params.len() != self.templates.len() {
            return Err(ConfigurationError::ArityMismatch {
                expected: self.templates.len(),
                actual: params.len(),
            }
            .into());
        }

        // Instructions of the nested skeleton sit one level below the split
        let nested_depth = self.trace.len();
        let mut spawned = Vec::with_capacity(params.len());
        for (index, input) in params.into_iter().enumerate() {
            let template = if single {
                &self.templates[0]
            } else {
                &self.templates[index]
            };
            let mut stack = template.copy();
            stack.retag(nested_depth, index as u64)?;

            let payload = Val::Num(index as f64);
            stack.push_bottom(event(When::After, Where::NestedSkeleton, &self.trace, payload.clone()));
            stack.push(event(When::Before, Where::NestedSkeleton, &self.trace, payload));

            spawned.push(ChildTask { index, stack, input });
        }
        Ok(spawned)
    }

    fn spawn_recursions(&self, params: Vec<Val>, path: &RecursionPath) -> SkeletonResult<Vec<ChildTask>> {
        let [template] = self.templates.as_slice() else {
            return Err(SkeletonError::structural(format!(
                "recursive split needs exactly one template, has {}",
                self.templates.len()
            )));
        };

        let mut spawned = Vec::with_capacity(params.len());
        for (index, input) in params.into_iter().enumerate() {
            let sub_path = path.child(index as u64);
            let mut stack = template.copy();

            let Some(Instruction::DaC(dac)) = stack.peek_mut() else {
                return Err(SkeletonError::structural(
                    "recursive split template must start with a divide-and-conquer instruction",
                ));
            };
            dac.path = sub_path.clone();
            let dac_depth = dac.trace.len().checked_sub(1).ok_or_else(|| {
                ConfigurationError::MalformedTrace("divide-and-conquer trace is empty".to_string())
            })?;

            // The recursion's own id replaces the DaC element, in the DaC and
            // everything nested in it
            stack.retag(dac_depth, sub_path.id())?;
            let trace = stack
                .peek()
                .map(|top| top.trace().clone())
                .unwrap_or_default();
            stack.push(event(When::Before, Where::Condition, &trace, path_payload(&sub_path)));

            spawned.push(ChildTask { index, stack, input });
        }
        Ok(spawned)
    }

    pub fn copy(&self) -> Self {
        Self {
            templates: self.templates.iter().map(Stack::copy).collect(),
            merge: self.merge.clone(),
            trace: self.trace.clone(),
            path: self.path.clone(),
        }
    }
}
