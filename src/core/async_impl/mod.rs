//! Async/await surface over the callback core.
//!
//! - [`AsyncStepLogic`] and [`Step::from_async`](crate::Step::from_async) for steps
//!   written as async functions
//! - [`Step::run`](crate::Step::run) to await a single step or composite
//! - [`for_each_async`] and [`ForEach::run_async`](crate::ForEach::run_async) to await a fan-out
//!
//! Async steps are spawned onto the ambient tokio runtime.

pub mod async_for_each;
pub mod async_step;

pub use async_for_each::for_each_async;
pub use async_step::AsyncStepLogic;
