use crate::core::{Callback, Completion, Outputs};
use std::fmt;
use std::sync::Arc;

type StepFn = dyn Fn(Outputs, Callback) + Send + Sync + 'static;

/// A unit of asynchronous work following the error-first completion contract.
///
/// A step receives its positional inputs plus a [`Callback`] and must, at some
/// point, call that callback with either its outputs or a [`StepError`](crate::StepError).
/// When and on which thread it does so is up to the step. The library never
/// inspects a step's body, only what it reports.
///
/// Steps are cheap to clone: clones share the same underlying function.
#[derive(Clone)]
pub struct Step {
    behaviour: Arc<StepFn>,
}

impl Step {
    /// Creates a step from a function in the raw callback style.
    ///
    /// ```rust
    /// use tessera::prelude::*;
    /// use serde_json::json;
    ///
    /// let add_one = Step::new(|inputs, done| {
    ///     let n = inputs[0].as_i64().unwrap_or_default();
    ///     done(Ok(vec![json!(n + 1)]));
    /// });
    /// add_one.call(vec![json!(1)], Box::new(|res: Completion| {
    ///     assert_eq!(res, Ok(vec![json!(2)]));
    /// }));
    /// ```
    pub fn new<F>(behaviour: F) -> Self
    where
        F: Fn(Outputs, Callback) + Send + Sync + 'static,
    {
        Step {
            behaviour: Arc::new(behaviour),
        }
    }

    /// Creates a step that completes before returning, from a plain function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Outputs) -> Completion + Send + Sync + 'static,
    {
        Step::new(move |inputs, done| done(f(inputs)))
    }

    /// Invokes the step with the given inputs and completion callback.
    pub fn call(&self, inputs: Outputs, done: Callback) {
        (self.behaviour)(inputs, done)
    }

    /// Chains `next` after this step, the two-step form of [`compose`](crate::compose).
    pub fn then(&self, next: Step) -> Step {
        crate::core::sync_impl::compose::compose([self.clone(), next])
    }

    /// Returns true if both handles share the same underlying function.
    pub fn ptr_eq(&self, other: &Step) -> bool {
        Arc::ptr_eq(&self.behaviour, &other.behaviour)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("behaviour", &Arc::as_ptr(&self.behaviour))
            .finish()
    }
}
