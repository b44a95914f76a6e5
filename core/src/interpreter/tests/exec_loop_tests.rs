//! Tests for the step loop and task lifecycle

use super::helpers::{dac_sum, elements, list, run, seq, shape, sum};
use crate::error::SkeletonError;
use crate::events::ListenerRegistry;
use crate::interpreter::instructions::{Instruction, SeqInst, Stack};
use crate::interpreter::types::{BranchTrace, Event, Execute, Val, When, Where};
use crate::interpreter::{run_inline, run_until_done, step, Context, Step, Task};
use crate::skeletons::{Program, Skeleton};
use std::sync::{Arc, Mutex};

#[test]
fn test_pipe_double_then_increment() {
    let pipe = Skeleton::pipe(seq("double", |x| x * 2.0), seq("increment", |x| x + 1.0));
    assert_eq!(run(&pipe, Val::Num(3.0)).unwrap(), Val::Num(7.0));
}

#[test]
fn test_pipe_listener_sees_each_stage() {
    let pipe = Skeleton::pipe(seq("double", |x| x * 2.0), seq("increment", |x| x + 1.0));

    let registry = ListenerRegistry::new();
    let heard = Arc::new(Mutex::new(Vec::new()));
    let sink = heard.clone();
    registry
        .add_listener(&pipe, move |e: &Event| sink.lock().unwrap().push(e.clone()))
        .unwrap();
    let ctx = Context::new(Arc::new(registry), 8);

    let program = Program::compile(&pipe);
    assert_eq!(run_inline(program.instantiate(), Val::Num(3.0), &ctx).unwrap(), Val::Num(7.0));

    let heard = heard.lock().unwrap();
    assert_eq!(
        shape(&heard),
        vec![
            (When::Before, Where::NestedSkeleton, Val::Num(0.0)),
            (When::After, Where::NestedSkeleton, Val::Num(0.0)),
            (When::Before, Where::NestedSkeleton, Val::Num(1.0)),
            (When::After, Where::NestedSkeleton, Val::Num(1.0)),
        ]
    );
    assert!(heard
        .iter()
        .all(|e| e.trace.last().map(|el| el.skeleton) == Some(pipe.id())));
}

#[test]
fn test_pipeline_runs_stages_in_order() {
    let pipeline = Skeleton::pipeline(vec![
        seq("increment", |x| x + 1.0),
        seq("double", |x| x * 2.0),
        seq("square", |x| x * x),
    ])
    .unwrap();

    // ((1 + 1) * 2)^2
    assert_eq!(run(&pipeline, Val::Num(1.0)).unwrap(), Val::Num(16.0));
    assert!(Skeleton::pipeline(Vec::new()).is_none());
}

#[test]
fn test_empty_stack_is_done_with_input() {
    let mut task = Task::new(Stack::new(), Val::Num(1.0));
    let step = run_until_done(&mut task, &Context::default()).unwrap();

    assert_eq!(step, Step::Done);
    assert_eq!(task.value, Val::Num(1.0));
    assert!(task.is_done());
}

#[test]
fn test_step_reports_continue_until_last_instruction() {
    let inc = || {
        Instruction::Seq(SeqInst::new(
            Execute::new("inc", |v| Ok(Val::Num(v.as_num().unwrap_or(0.0) + 1.0))),
            BranchTrace::root(),
        ))
    };
    let mut task = Task::new(Stack::from_program(vec![inc(), inc()]), Val::Num(0.0));
    let ctx = Context::default();

    assert_eq!(step(&mut task, &ctx).unwrap(), Step::Continue);
    assert_eq!(task.value, Val::Num(1.0));
    assert_eq!(step(&mut task, &ctx).unwrap(), Step::Done);
    assert_eq!(task.value, Val::Num(2.0));
}

#[test]
fn test_split_hands_off_children_and_resumes_with_merge() {
    let map = Skeleton::map(elements(), seq("square", |x| x * x), sum());
    let program = Program::compile(&map);
    let ctx = Context::default();
    let mut task = Task::new(program.instantiate(), list(&[1.0, 2.0, 3.0]));

    assert_eq!(run_until_done(&mut task, &ctx).unwrap(), Step::Split);
    assert!(!task.is_done());

    // The parent cannot move on while children are outstanding
    let err = step(&mut task, &ctx).unwrap_err();
    assert!(matches!(err, SkeletonError::Structural(_)));
    assert!(!task.resume(vec![]));

    let children = task.take_children();
    assert_eq!(children.len(), 3);
    assert!(task.resume(vec![Val::Num(1.0), Val::Num(4.0), Val::Num(9.0)]));

    assert_eq!(run_until_done(&mut task, &ctx).unwrap(), Step::Done);
    assert_eq!(task.into_value(), Val::Num(14.0));
}

#[test]
fn test_muscle_error_aborts_task() {
    let failing = Skeleton::pipe(
        seq("double", |x| x * 2.0),
        Skeleton::seq(Execute::new("reject", |_| Err("rejected".into()))),
    );

    let err = run(&failing, Val::Num(1.0)).unwrap_err();
    let SkeletonError::Muscle { muscle, source } = err else {
        unreachable!("Expected muscle error, got {:?}", err);
    };
    assert_eq!(muscle, "reject");
    assert_eq!(source.to_string(), "rejected");
}

#[test]
fn test_child_failure_propagates_unchanged() {
    // A non-number inside the list fails the leaf of one recursion
    let input = Val::List(vec![Val::Num(1.0), Val::Str("x".into()), Val::Num(3.0)]);
    let err = run(&dac_sum(), input).unwrap_err();

    let SkeletonError::Muscle { muscle, .. } = err else {
        unreachable!("Expected muscle error, got {:?}", err);
    };
    assert_eq!(muscle, "leaf");
}
