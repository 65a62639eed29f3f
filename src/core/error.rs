use crate::core::NodeValue;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The failure reported by a step or fan-out operation.
///
/// A `StepError` is an opaque, shared handle: the library only routes it from
/// the failing step to whoever is waiting on the outcome, it never looks inside.
/// Cloning is cheap and two handles compare equal only if they point at the
/// same error instance.
#[derive(Clone, Error)]
#[error(transparent)]
pub struct StepError(Arc<dyn StdError + Send + Sync + 'static>);

impl StepError {
    /// Wraps any error produced by a step.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        StepError(Arc::new(error))
    }

    /// Creates an error carrying only a message.
    pub fn msg(message: impl Into<String>) -> Self {
        StepError::new(Message(message.into()))
    }

    /// Returns true if both handles refer to the same underlying error.
    pub fn ptr_eq(&self, other: &StepError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Attempts to view the wrapped error as a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl fmt::Debug for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StepError").field(&self.0).finish()
    }
}

impl PartialEq for StepError {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for StepError {}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

/// The failure delivered to a fan-out's final callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// Break-on-error: the first failure, plus whatever succeeded before it arrived.
    #[error("operation failed after {} completion(s): {error}", .results.len())]
    Broken {
        #[source]
        error: StepError,
        results: Vec<NodeValue>,
    },

    /// Accumulate-all: every failure and every success, each in arrival order.
    /// The two lists are independent; positions do not line up per element.
    #[error("{} operation(s) failed, {} succeeded", .errors.len(), .results.len())]
    Accumulated {
        errors: Vec<StepError>,
        results: Vec<NodeValue>,
    },
}

impl JoinError {
    /// The values collected from successful completions.
    pub fn results(&self) -> &[NodeValue] {
        match self {
            JoinError::Broken { results, .. } => results,
            JoinError::Accumulated { results, .. } => results,
        }
    }

    /// Every failure carried by this error, in arrival order.
    pub fn errors(&self) -> Vec<StepError> {
        match self {
            JoinError::Broken { error, .. } => vec![error.clone()],
            JoinError::Accumulated { errors, .. } => errors.clone(),
        }
    }
}

/// Errors surfaced by the library's own entry points.
///
/// The future-returning adapters fold step and join failures into this type so
/// a single `?` covers them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error("a joiner must expect at least one completion")]
    EmptyJoin,

    #[error("the completion callback was dropped without being called")]
    Dropped,

    #[error("async steps must be invoked from within a tokio runtime")]
    NoRuntime,
}
