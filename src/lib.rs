//! # Tessera
//!
//! Control flow for error-first async steps: chain steps into one composite
//! step, or fan an operation out over a collection and join on the completions.
//!
//! ## Features
//!
//! - **Sequential chaining**: [`compose`] turns a stack of steps into one step that
//!   runs them in order and stops at the first error
//! - **Fan-out joins**: [`for_each`] dispatches an operation over every element at once
//!   and reports through a single callback, either on the first failure or after
//!   collecting every failure and success
//! - **Fire-once delivery**: a [`Joiner`] invokes its final callback exactly once, no
//!   matter how completions interleave across threads
//! - **Async interop**: steps can be written as async functions and any step or fan-out
//!   can be awaited (tokio)
//!
//! ## Quick Start
//!
//! ```rust
//! use tessera::prelude::*;
//! use serde_json::json;
//!
//! let add_one = Step::from_fn(|inputs| Ok(vec![json!(inputs[0].as_i64().unwrap_or(0) + 1)]));
//! let duplicate = Step::from_fn(|inputs| Ok(vec![inputs[0].clone(), inputs[0].clone()]));
//! let multiply = Step::from_fn(|inputs| {
//!     Ok(vec![json!(inputs[0].as_i64().unwrap_or(0) * inputs[1].as_i64().unwrap_or(0))])
//! });
//!
//! let pipeline = compose([add_one.clone(), add_one, duplicate, multiply]);
//! pipeline.call(vec![json!(3)], Box::new(|outcome: Completion| {
//!     assert_eq!(outcome, Ok(vec![json!(25)]));
//! }));
//!
//! let double = Step::from_fn(|inputs| Ok(vec![json!(inputs[0].as_i64().unwrap_or(0) * 2)]));
//! for_each(vec![json!(1), json!(2)], double, |outcome| {
//!     assert_eq!(outcome, Ok(vec![json!(2), json!(4)]));
//! });
//! ```
//!
//! ## Module Organization
//!
//! - [`sync_impl`]: the callback-driven core (steps, compose, joiner, fan-out)
//! - [`async_impl`]: async steps and awaitable adapters
//! - [`error`]: [`StepError`], [`JoinError`] and [`FlowError`]
//! - [`prelude`]: Commonly used types and functions (import with `use tessera::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

pub use crate::core::async_impl;
pub use crate::core::error;
pub use crate::core::sync_impl;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

// Core types
pub use crate::core::{Callback, Completion, NodeValue, Outputs};

// Errors
pub use crate::core::error::{FlowError, JoinError, StepError};

// Callback-driven implementations
pub use crate::core::sync_impl::{
    compose, for_each, for_each_with, make_joiner, FinalCallback, ForEach, ForEachOptions,
    JoinPolicy, Joiner, Step,
};

// Asynchronous implementations
pub use crate::core::async_impl::{for_each_async, AsyncStepLogic};

// ============================================================================
// Prelude Module - Convenient Bulk Imports
// ============================================================================

/// The main prelude: imports everything needed to compose steps and fan out work.
///
/// # Example
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Steps
        compose,
        // Fan-out
        for_each,
        for_each_async,
        for_each_with,
        make_joiner,
        AsyncStepLogic,
        Callback,
        Completion,
        // Errors
        FlowError,
        ForEach,
        ForEachOptions,
        JoinError,
        JoinPolicy,
        Joiner,
        NodeValue,
        Outputs,
        Step,
        StepError,
    };
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
