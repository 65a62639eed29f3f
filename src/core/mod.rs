pub mod async_impl;
pub mod error;
pub mod sync_impl;

use error::StepError;

/// The Alias for serde_json::Value since every step speaks it
pub type NodeValue = serde_json::Value;

/// The positional values a step passes on. Steps may emit any number of them.
pub type Outputs = Vec<NodeValue>;

/// What a step reports when it finishes: its outputs, or the reason it failed.
pub type Completion = Result<Outputs, StepError>;

/// The error-first completion handler handed to every step.
///
/// It is `FnOnce`, so a step can report at most one completion per invocation.
pub type Callback = Box<dyn FnOnce(Completion) + Send + 'static>;
