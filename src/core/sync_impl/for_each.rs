use crate::core::error::JoinError;
use crate::core::sync_impl::finalizer::{JoinPolicy, Joiner};
use crate::core::sync_impl::step::Step;
use crate::core::NodeValue;
use std::num::NonZeroUsize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForEachOptions {
    /// Report the first failure immediately (`true`, the default) or wait for
    /// every operation and report all failures together (`false`).
    #[cfg_attr(feature = "serde", serde(alias = "breakOnError"))]
    pub break_on_error: bool,
}

impl Default for ForEachOptions {
    fn default() -> Self {
        ForEachOptions {
            break_on_error: true,
        }
    }
}

impl ForEachOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn break_on_error(self, break_on_error: bool) -> Self {
        ForEachOptions { break_on_error }
    }

    /// The join policy these options select.
    pub fn policy(&self) -> JoinPolicy {
        if self.break_on_error {
            JoinPolicy::BreakOnError
        } else {
            JoinPolicy::AccumulateAll
        }
    }

    /// A driver bound to these options.
    pub fn driver(self) -> ForEach {
        ForEach::new(self)
    }
}

impl From<JoinPolicy> for ForEachOptions {
    fn from(policy: JoinPolicy) -> Self {
        ForEachOptions {
            break_on_error: policy == JoinPolicy::BreakOnError,
        }
    }
}

/// A fan-out driver with its options baked in, for reuse across many collections.
///
/// ```rust
/// use tessera::prelude::*;
/// use serde_json::json;
///
/// let collect_everything = ForEach::new(ForEachOptions::new().break_on_error(false));
/// let parse = Step::from_fn(|inputs| {
///     match inputs[0].as_str().and_then(|s| s.parse::<i64>().ok()) {
///         Some(n) => Ok(vec![json!(n)]),
///         None => Err(StepError::msg("not a number")),
///     }
/// });
///
/// collect_everything.run(vec![json!("1"), json!("x"), json!("3")], parse, |outcome| {
///     let err = outcome.unwrap_err();
///     assert_eq!(err.results(), &[json!(1), json!(3)]);
///     assert_eq!(err.errors().len(), 1);
/// });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForEach {
    options: ForEachOptions,
}

impl ForEach {
    pub fn new(options: ForEachOptions) -> Self {
        ForEach { options }
    }

    pub fn options(&self) -> ForEachOptions {
        self.options
    }

    /// Runs `operation` over `elements` under this driver's options.
    /// See [`for_each_with`].
    pub fn run<F>(&self, elements: Vec<NodeValue>, operation: Step, callback: F)
    where
        F: FnOnce(Result<Vec<NodeValue>, JoinError>) + Send + 'static,
    {
        for_each_with(elements, operation, callback, self.options)
    }
}

/// Runs `operation` over every element with the default options (break on error).
pub fn for_each<F>(elements: Vec<NodeValue>, operation: Step, callback: F)
where
    F: FnOnce(Result<Vec<NodeValue>, JoinError>) + Send + 'static,
{
    for_each_with(elements, operation, callback, ForEachOptions::default())
}

/// Runs `operation` over every element and joins on the completions.
///
/// Every element is dispatched as `operation(vec![element], done)` before this
/// function returns, without waiting on any completion. The results handed to
/// `callback` are in the order the operations *finished*, not the order of
/// `elements`; which failures are reported is decided by
/// [`ForEachOptions::break_on_error`].
///
/// An empty collection calls `callback(Ok(vec![]))` right away and dispatches
/// nothing. Operations still running when the callback fires early are left to
/// finish on their own; their completions are ignored.
pub fn for_each_with<F>(
    elements: Vec<NodeValue>,
    operation: Step,
    callback: F,
    options: ForEachOptions,
) where
    F: FnOnce(Result<Vec<NodeValue>, JoinError>) + Send + 'static,
{
    // Job ids only tag debug records.
    let job = log::log_enabled!(log::Level::Debug).then(|| uuid::Uuid::new_v4().simple());

    let Some(count) = NonZeroUsize::new(elements.len()) else {
        if let Some(job) = job {
            log::debug!("for_each[{}]: no elements, completing immediately", job);
        }
        return callback(Ok(Vec::new()));
    };

    let policy = options.policy();
    let joiner = Joiner::with_expected(count, policy, callback);

    if let Some(job) = job {
        log::debug!(
            "for_each[{}]: dispatching {} operation(s) with {:?}",
            job,
            count,
            policy
        );
    }
    for element in elements {
        operation.call(vec![element], joiner.callback());
    }
}
