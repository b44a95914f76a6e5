//! Tests for Map and Fork splits, merges and child tagging

use super::helpers::{collect, elements, list, num, run, run_recording, seq, shape, sum};
use crate::error::{ConfigurationError, SkeletonError};
use crate::events::ListenerRegistry;
use crate::interpreter::instructions::{SplitInst, Stack};
use crate::interpreter::types::{BranchTrace, Condition, Event, Execute, Split, Val, When, Where};
use crate::interpreter::{run_inline, Context};
use crate::skeletons::{Program, Skeleton};
use std::sync::{Arc, Mutex};

fn squares() -> Skeleton {
    Skeleton::map(elements(), seq("square", |x| x * x), sum())
}

#[test]
fn test_map_sums_squares() {
    assert_eq!(run(&squares(), list(&[1.0, 2.0, 3.0])).unwrap(), Val::Num(14.0));
}

#[test]
fn test_map_over_empty_list_merges_nothing() {
    let (result, events) = run_recording(&squares(), list(&[]));
    assert_eq!(result.unwrap(), Val::Num(0.0));

    assert_eq!(
        shape(&events),
        vec![
            (When::Before, Where::Merge, Val::Null),
            (When::After, Where::Merge, Val::Null),
        ]
    );
}

#[test]
fn test_split_of_empty_list_leaves_empty_list_for_merge() {
    let split = SplitInst::new(vec![Stack::new()], collect(), BranchTrace::root());
    let mut stack = Stack::new();
    let mut children = Vec::new();

    let out = split
        .interpret(list(&[]), &mut stack, &mut children, &Context::default())
        .unwrap();

    assert_eq!(out, Val::List(Vec::new()));
    assert!(children.is_empty());
    assert_eq!(stack.len(), 3);
}

#[test]
fn test_fork_runs_one_branch_per_element() {
    let fork = Skeleton::fork(
        elements(),
        vec![
            seq("double", |x| x * 2.0),
            seq("negate", |x| -x),
            seq("square", |x| x * x),
        ],
        collect(),
    );

    let result = run(&fork, list(&[1.0, 2.0, 3.0])).unwrap();
    assert_eq!(result, list(&[2.0, -2.0, 9.0]));
}

#[test]
fn test_fork_arity_mismatch_is_configuration_error() {
    let fork = Skeleton::fork(
        elements(),
        vec![seq("a", |x| x), seq("b", |x| x), seq("c", |x| x)],
        collect(),
    );

    let err = run(&fork, list(&[1.0, 2.0])).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(
        err,
        SkeletonError::Configuration(ConfigurationError::ArityMismatch {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn test_arity_mismatch_spawns_no_children() {
    let identity = || Stack::new();
    let split = SplitInst::new(vec![identity(), identity(), identity()], collect(), BranchTrace::root());
    let mut stack = Stack::new();
    let mut children = Vec::new();

    let err = split
        .interpret(list(&[1.0, 2.0]), &mut stack, &mut children, &Context::default())
        .unwrap_err();

    assert_eq!(err.to_string(), "Configuration error: Invalid number of divisions. Expected 3 but was 2");
    assert!(children.is_empty());
    assert!(stack.is_empty());
}

#[test]
fn test_split_of_non_list_is_rejected() {
    let split = SplitInst::new(vec![Stack::new()], collect(), BranchTrace::root());
    let mut children = Vec::new();

    let err = split
        .interpret(Val::Num(4.0), &mut Stack::new(), &mut children, &Context::default())
        .unwrap_err();

    assert!(matches!(
        err,
        SkeletonError::Configuration(ConfigurationError::NotASequence(ref t)) if t == "number"
    ));
}

#[test]
fn test_merge_sees_results_in_split_order() {
    // Children finish in order here, but the merge must rely on index only
    let map = Skeleton::map(elements(), seq("increment", |x| x + 1.0), collect());
    let result = run(&map, list(&[5.0, 1.0, 3.0])).unwrap();
    assert_eq!(result, list(&[6.0, 2.0, 4.0]));
}

#[test]
fn test_split_events_per_child_then_merge() {
    let (result, events) = run_recording(&squares(), list(&[2.0, 3.0]));
    assert_eq!(result.unwrap(), Val::Num(13.0));

    assert_eq!(
        shape(&events),
        vec![
            (When::Before, Where::NestedSkeleton, Val::Num(0.0)),
            (When::After, Where::NestedSkeleton, Val::Num(0.0)),
            (When::Before, Where::NestedSkeleton, Val::Num(1.0)),
            (When::After, Where::NestedSkeleton, Val::Num(1.0)),
            (When::Before, Where::Merge, Val::Null),
            (When::After, Where::Merge, Val::Null),
        ]
    );
}

#[test]
fn test_children_are_tagged_with_their_index() {
    let abs = Skeleton::if_else(
        Condition::new("negative", |v| Ok(num(v)? < 0.0)),
        seq("negate", |x| -x),
        Skeleton::seq(Execute::new("identity", Ok)),
    );
    let map = Skeleton::map(elements(), abs, collect());

    let (result, events) = run_recording(&map, list(&[-1.0, 2.0, -3.0]));
    assert_eq!(result.unwrap(), list(&[1.0, 2.0, 3.0]));

    // Events raised inside each child carry the child index at the If level
    let if_instances: Vec<u64> = events
        .iter()
        .filter(|e| e.trace.len() == 2 && e.is(When::After, Where::Condition))
        .map(|e| e.trace.elements()[1].instance)
        .collect();
    assert_eq!(if_instances, vec![0, 1, 2]);

    // The map's own events keep the untouched map trace
    assert!(events
        .iter()
        .filter(|e| e.trace.len() == 1)
        .all(|e| e.trace.elements()[0].instance == 0));
}

#[test]
fn test_template_is_not_retagged_by_execution() {
    let map = Skeleton::map(elements(), seq("square", |x| x * x), sum());
    let program = Program::compile(&map);
    let before = format!("{:?}", program.template());

    let ctx = Context::default();
    run_inline(program.instantiate(), list(&[1.0, 2.0, 3.0]), &ctx).unwrap();

    assert_eq!(format!("{:?}", program.template()), before);
}

#[test]
fn test_nested_splits_beyond_max_depth_fail() {
    let inner = Skeleton::map(elements(), seq("square", |x| x * x), sum());
    let outer = Skeleton::map(elements(), inner, sum());
    let program = Program::compile(&outer);
    let input = Val::List(vec![list(&[1.0, 2.0]), list(&[3.0])]);

    let shallow = Context::new(Arc::new(ListenerRegistry::new()), 1);
    let err = run_inline(program.instantiate(), input.clone(), &shallow).unwrap_err();
    assert!(matches!(
        err,
        SkeletonError::Configuration(ConfigurationError::DepthExceeded(1))
    ));

    let deep = Context::new(Arc::new(ListenerRegistry::new()), 2);
    assert_eq!(
        run_inline(program.instantiate(), input, &deep).unwrap(),
        Val::Num(14.0)
    );
}

#[test]
fn test_split_muscle_error_propagates() {
    let map = Skeleton::map(
        Split::new("refuse", |_| Err("cannot split".into())),
        seq("square", |x| x * x),
        sum(),
    );

    let err = run(&map, list(&[1.0])).unwrap_err();
    assert!(matches!(err, SkeletonError::Muscle { ref muscle, .. } if muscle == "refuse"));
}

#[test]
fn test_scoped_listener_only_hears_its_skeleton() {
    let body = Skeleton::if_else(
        Condition::new("positive", |v| Ok(num(v)? > 0.0)),
        seq("keep", |x| x),
        seq("zero", |_| 0.0),
    );
    let body_id = body.id();
    let map = Skeleton::map(elements(), body, sum());

    let registry = ListenerRegistry::new();
    let heard = Arc::new(Mutex::new(Vec::new()));
    let sink = heard.clone();
    registry
        .add_listener(&map, move |e: &Event| sink.lock().unwrap().push(e.clone()))
        .unwrap();
    let ctx = Context::new(Arc::new(registry), 8);

    let program = Program::compile(&map);
    let result = run_inline(program.instantiate(), list(&[1.0, -1.0]), &ctx).unwrap();
    assert_eq!(result, Val::Num(1.0));

    let heard = heard.lock().unwrap();
    // Two children, each wrapped in BEFORE/AFTER, plus the merge pair
    assert_eq!(heard.len(), 6);
    assert!(heard
        .iter()
        .all(|e| e.trace.last().map(|el| el.skeleton) != Some(body_id)));
}
