//! Callback-driven core of the crate.
//!
//! Everything here follows the error-first completion contract and needs no
//! runtime of its own:
//! - [`Step`] wraps a unit of work that reports through a [`Callback`](crate::Callback)
//! - [`compose`] chains steps into one composite step
//! - [`make_joiner`] and [`Joiner`] fold many completions into one final callback
//! - [`for_each`], [`for_each_with`] and [`ForEach`] fan an operation out over a collection

pub mod compose;
pub mod finalizer;
pub mod for_each;
pub mod step;

pub use compose::compose;
pub use finalizer::{make_joiner, FinalCallback, JoinPolicy, Joiner};
pub use for_each::{for_each, for_each_with, ForEach, ForEachOptions};
pub use step::Step;
