//! Engine: runs compiled programs over a bounded worker pool
//!
//! The interpreter itself is synchronous (muscles are plain functions), so
//! each stretch of interpretation runs on the blocking pool while holding a
//! worker permit. A task that splits gives its permit back, spawns one task
//! per child and waits; once every child has a result it resumes with the
//! results in split order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{SkeletonError, SkeletonResult};
use crate::events::ListenerRegistry;
use crate::interpreter::{run_until_done, ChildTask, Context, Step, Task, Val};
use crate::skeletons::Program;

type TaskFuture = Pin<Box<dyn Future<Output = SkeletonResult<Val>> + Send>>;

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    ctx: Context,
    permits: Arc<Semaphore>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let workers = config.workers.max(1);
        Self {
            ctx: Context::new(Arc::new(ListenerRegistry::new()), config.max_depth),
            permits: Arc::new(Semaphore::new(workers)),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Listener registry for programs run on this engine
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.ctx.listeners
    }

    /// Run one execution of `program` on `input`
    ///
    /// Many executions of the same program may run at once; each works on
    /// its own copy of the template.
    pub async fn run(&self, program: &Program, input: Val) -> SkeletonResult<Val> {
        let task = Task::new(program.instantiate(), input);
        info!(task_id = %task.id, skeleton = %program.root(), "execution started");

        let result = run_task(self.ctx.clone(), self.permits.clone(), task).await;
        match &result {
            Ok(_) => info!(skeleton = %program.root(), "execution completed"),
            Err(err) => warn!(skeleton = %program.root(), error = %err, "execution failed"),
        }
        result
    }
}

/// Drive one task, recursively scheduling its children
///
/// Uses `Box::pin` for async recursion.
fn run_task(ctx: Context, permits: Arc<Semaphore>, mut task: Task) -> TaskFuture {
    Box::pin(async move {
        loop {
            let permit = permits
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| SkeletonError::structural("worker pool is closed"))?;

            let worker_ctx = ctx.clone();
            let (returned, step) = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let step = run_until_done(&mut task, &worker_ctx);
                (task, step)
            })
            .await?;
            task = returned;

            match step {
                Ok(Step::Done) => return Ok(task.into_value()),
                Ok(Step::Split) => {
                    let children = task.take_children();
                    debug!(task_id = %task.id, children = children.len(), "waiting on children");

                    let results = run_children(&ctx, &permits, children).await?;
                    if !task.resume(results) {
                        return Err(SkeletonError::structural(format!(
                            "task {} could not be resumed",
                            task.id
                        )));
                    }
                }
                Ok(Step::Continue) => continue,
                Err(err) => {
                    debug!(task_id = %task.id, error = %err, "task failed");
                    return Err(err);
                }
            }
        }
    })
}

/// Run every child concurrently and return their results in index order
///
/// The first failure aborts the remaining siblings and is returned as is.
async fn run_children(
    ctx: &Context,
    permits: &Arc<Semaphore>,
    children: Vec<ChildTask>,
) -> SkeletonResult<Vec<Val>> {
    let count = children.len();
    let mut set = JoinSet::new();
    for child in children {
        let index = child.index;
        let future = run_task(ctx.clone(), permits.clone(), Task::from_child(child));
        set.spawn(async move { (index, future.await) });
    }

    let mut results: Vec<Option<Val>> = vec![None; count];
    while let Some(joined) = set.join_next().await {
        let (index, result) = joined?;
        match result {
            Ok(value) => {
                let slot = results.get_mut(index).ok_or_else(|| {
                    SkeletonError::structural(format!("child index {} out of range {}", index, count))
                })?;
                *slot = Some(value);
            }
            Err(err) => {
                set.abort_all();
                return Err(err);
            }
        }
    }

    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.ok_or_else(|| {
                SkeletonError::structural(format!("child {} finished without a result", index))
            })
        })
        .collect()
}
