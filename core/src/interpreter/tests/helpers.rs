//! Test helpers for interpreter tests
//!
//! Common muscles, and runners that record every event

use crate::error::{MuscleError, SkeletonResult};
use crate::events::ListenerRegistry;
use crate::interpreter::task::DEFAULT_MAX_DEPTH;
use crate::interpreter::types::{Condition, Event, Execute, Merge, Split, Val, When, Where};
use crate::interpreter::{run_inline, Context};
use crate::skeletons::{Program, Skeleton};
use std::sync::{Arc, Mutex};

pub fn num(v: &Val) -> Result<f64, MuscleError> {
    v.as_num()
        .ok_or_else(|| format!("expected a number, got {}", v.type_name()).into())
}

pub fn list(xs: &[f64]) -> Val {
    Val::List(xs.iter().copied().map(Val::Num).collect())
}

/// Seq skeleton applying `f` to a number
pub fn seq(name: &str, f: fn(f64) -> f64) -> Skeleton {
    Skeleton::seq(Execute::new(name, move |v| Ok(Val::Num(f(num(&v)?)))))
}

pub fn below(limit: f64) -> Condition {
    Condition::new("below", move |v| Ok(num(v)? < limit))
}

/// Split a list value into its elements
pub fn elements() -> Split {
    Split::new("elements", |v| {
        v.into_list()
            .map_err(|other| format!("expected a list, got {}", other.type_name()).into())
    })
}

pub fn sum() -> Merge {
    Merge::new("sum", |parts| {
        Ok(Val::Num(parts.iter().map(num).sum::<Result<f64, _>>()?))
    })
}

/// Merge that keeps the child results as they arrive
pub fn collect() -> Merge {
    Merge::new("collect", |parts| Ok(Val::List(parts)))
}

/// Divide-and-conquer sum: halve lists longer than one element
pub fn dac_sum() -> Skeleton {
    Skeleton::dac(
        Condition::new("longer-than-one", |v| {
            Ok(v.as_list().map_or(false, |xs| xs.len() > 1))
        }),
        Split::new("halve", |v| {
            let mut left = v.into_list().map_err(|_| "expected a list")?;
            let right = left.split_off(left.len() / 2);
            Ok(vec![Val::List(left), Val::List(right)])
        }),
        Skeleton::seq(Execute::new("leaf", |v| {
            let xs = v.into_list().map_err(|_| "expected a list")?;
            Ok(Val::Num(xs.iter().map(num).sum::<Result<f64, _>>()?))
        })),
        sum(),
    )
}

/// Context whose registry records every event
pub fn recording_context() -> (Context, Arc<Mutex<Vec<Event>>>) {
    let registry = ListenerRegistry::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    registry.add_generic_listener(move |e: &Event| sink.lock().unwrap().push(e.clone()));
    (Context::new(Arc::new(registry), DEFAULT_MAX_DEPTH), events)
}

pub fn run(skeleton: &Skeleton, input: Val) -> SkeletonResult<Val> {
    let program = Program::compile(skeleton);
    run_inline(program.instantiate(), input, &Context::default())
}

pub fn run_recording(skeleton: &Skeleton, input: Val) -> (SkeletonResult<Val>, Vec<Event>) {
    let (ctx, events) = recording_context();
    let program = Program::compile(skeleton);
    let result = run_inline(program.instantiate(), input, &ctx);
    let events = events.lock().unwrap().clone();
    (result, events)
}

/// (when, where, payload) of each event, for order assertions
pub fn shape(events: &[Event]) -> Vec<(When, Where, Val)> {
    events
        .iter()
        .map(|e| (e.when, e.location, e.payload.clone()))
        .collect()
}
