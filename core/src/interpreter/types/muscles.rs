//! Muscles: the user-supplied sequential logic plugged into skeletons
//!
//! Each muscle is a named, immutable callback. Cloning a muscle shares the
//! callback, which is safe because a muscle is never mutated after
//! construction.

use super::values::Val;
use crate::error::{MuscleError, SkeletonError};
use std::fmt;
use std::sync::Arc;

type ConditionFn = dyn Fn(&Val) -> Result<bool, MuscleError> + Send + Sync;
type ExecuteFn = dyn Fn(Val) -> Result<Val, MuscleError> + Send + Sync;
type SplitFn = dyn Fn(Val) -> Result<Vec<Val>, MuscleError> + Send + Sync;
type MergeFn = dyn Fn(Vec<Val>) -> Result<Val, MuscleError> + Send + Sync;

macro_rules! muscle {
    ($(#[$doc:meta])* $name:ident, $fn_ty:ty) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            name: Arc<str>,
            f: Arc<$fn_ty>,
        }

        impl $name {
            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.name)
            }
        }
    };
}

muscle!(
    /// Predicate deciding a branch, loop iteration or further division
    Condition,
    ConditionFn
);
muscle!(
    /// Transformation of one value into another
    Execute,
    ExecuteFn
);
muscle!(
    /// Decomposition of one value into an ordered list of sub-values
    Split,
    SplitFn
);
muscle!(
    /// Combination of ordered sub-results into one value
    Merge,
    MergeFn
);

impl Condition {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&Val) -> Result<bool, MuscleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn call(&self, input: &Val) -> Result<bool, SkeletonError> {
        (self.f)(input).map_err(|e| SkeletonError::muscle(&self.name, e))
    }
}

impl Execute {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(Val) -> Result<Val, MuscleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn call(&self, input: Val) -> Result<Val, SkeletonError> {
        (self.f)(input).map_err(|e| SkeletonError::muscle(&self.name, e))
    }
}

impl Split {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(Val) -> Result<Vec<Val>, MuscleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn call(&self, input: Val) -> Result<Vec<Val>, SkeletonError> {
        (self.f)(input).map_err(|e| SkeletonError::muscle(&self.name, e))
    }

    /// View this split as an execute muscle producing a list value
    pub fn as_execute(&self) -> Execute {
        let split = self.clone();
        Execute {
            name: self.name.clone(),
            f: Arc::new(move |input| (split.f)(input).map(Val::List)),
        }
    }
}

impl Merge {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(Vec<Val>) -> Result<Val, MuscleError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn call(&self, results: Vec<Val>) -> Result<Val, SkeletonError> {
        (self.f)(results).map_err(|e| SkeletonError::muscle(&self.name, e))
    }
}
