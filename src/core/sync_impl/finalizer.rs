use crate::core::error::{FlowError, JoinError, StepError};
use crate::core::{Callback, Completion, NodeValue};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a [`Joiner`] treats failed completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum JoinPolicy {
    /// Report the first failure right away, with whatever succeeded before it.
    #[default]
    BreakOnError,
    /// Wait for every completion, then report all failures and all successes.
    AccumulateAll,
}

/// The callback a [`Joiner`] fires once all expected completions are in
/// (or, under [`JoinPolicy::BreakOnError`], on the first failure).
pub type FinalCallback = Box<dyn FnOnce(Result<Vec<NodeValue>, JoinError>) + Send + 'static>;

struct JoinState {
    remaining: usize,
    received: usize,
    results: Vec<NodeValue>,
    errors: Vec<StepError>,
    fired: bool,
    callback: Option<FinalCallback>,
}

type Firing = (FinalCallback, Result<Vec<NodeValue>, JoinError>);

impl JoinState {
    fn record_break_on_error(&mut self, completion: Completion) -> Option<Firing> {
        match completion {
            Err(error) => {
                log::debug!(
                    "joiner: failure after {} result(s), firing early",
                    self.results.len()
                );
                let results = std::mem::take(&mut self.results);
                self.fire(Err(JoinError::Broken { error, results }))
            }
            Ok(outputs) => {
                self.remaining -= 1;
                self.results
                    .push(outputs.into_iter().next().unwrap_or(NodeValue::Null));
                if self.remaining > 0 {
                    return None;
                }
                let results = std::mem::take(&mut self.results);
                self.fire(Ok(results))
            }
        }
    }

    fn record_accumulate_all(&mut self, completion: Completion) -> Option<Firing> {
        self.remaining -= 1;
        match completion {
            Err(error) => self.errors.push(error),
            // A completion with no outputs contributes nothing to `results`.
            Ok(outputs) => self.results.extend(outputs.into_iter().next()),
        }
        if self.remaining > 0 {
            return None;
        }

        let errors = std::mem::take(&mut self.errors);
        let results = std::mem::take(&mut self.results);
        log::debug!(
            "joiner: all completions in, {} failure(s), {} result(s)",
            errors.len(),
            results.len()
        );
        if errors.is_empty() {
            self.fire(Ok(results))
        } else {
            self.fire(Err(JoinError::Accumulated { errors, results }))
        }
    }

    fn fire(&mut self, outcome: Result<Vec<NodeValue>, JoinError>) -> Option<Firing> {
        self.fired = true;
        self.callback.take().map(|callback| (callback, outcome))
    }
}

/// Collects the completions of a group of operations into a single final callback.
///
/// A `Joiner` is created for a known number of expected completions and a
/// [`JoinPolicy`]. Feed it one completion per operation, in whatever order the
/// operations happen to finish, through [`complete`](Joiner::complete) or a
/// [`callback`](Joiner::callback) handed to the operation. The final callback
/// fires exactly once; anything that arrives afterwards is ignored.
///
/// Clones share the same state, so a joiner can be handed to operations running
/// on other threads.
#[derive(Clone)]
pub struct Joiner {
    policy: JoinPolicy,
    expected: usize,
    state: Arc<Mutex<JoinState>>,
}

/// Builds a [`Joiner`] expecting `expected_count` completions.
///
/// Fails with [`FlowError::EmptyJoin`] when `expected_count` is zero: a joiner
/// with nothing to wait for could never fire, so callers must handle empty
/// groups themselves (as [`for_each`](crate::for_each) does).
pub fn make_joiner<F>(
    expected_count: usize,
    policy: JoinPolicy,
    callback: F,
) -> Result<Joiner, FlowError>
where
    F: FnOnce(Result<Vec<NodeValue>, JoinError>) + Send + 'static,
{
    let expected = NonZeroUsize::new(expected_count).ok_or(FlowError::EmptyJoin)?;
    Ok(Joiner::with_expected(expected, policy, callback))
}

impl Joiner {
    /// Builds a joiner for a group already known to be non-empty.
    pub(crate) fn with_expected<F>(
        expected: NonZeroUsize,
        policy: JoinPolicy,
        callback: F,
    ) -> Self
    where
        F: FnOnce(Result<Vec<NodeValue>, JoinError>) + Send + 'static,
    {
        Joiner {
            policy,
            expected: expected.get(),
            state: Arc::new(Mutex::new(JoinState {
                remaining: expected.get(),
                received: 0,
                results: Vec::new(),
                errors: Vec::new(),
                fired: false,
                callback: Some(Box::new(callback)),
            })),
        }
    }

    /// Records one completion and fires the final callback if this completion
    /// settles the group.
    ///
    /// The final callback runs after the internal lock is released, so it may
    /// freely start new work, including feeding this same joiner.
    pub fn complete(&self, completion: Completion) {
        let firing = {
            let mut state = self.lock();
            state.received += 1;

            if state.received > self.expected {
                log::warn!(
                    "joiner: completion {} exceeds the {} expected, ignoring it",
                    state.received,
                    self.expected
                );
                return;
            }
            if state.fired {
                log::trace!("joiner: late completion after firing, dropped");
                return;
            }

            log::trace!(
                "joiner: completion {}/{} ({})",
                state.received,
                self.expected,
                if completion.is_ok() { "ok" } else { "error" }
            );
            match self.policy {
                JoinPolicy::BreakOnError => state.record_break_on_error(completion),
                JoinPolicy::AccumulateAll => state.record_accumulate_all(completion),
            }
        };

        if let Some((callback, outcome)) = firing {
            callback(outcome);
        }
    }

    /// A one-shot completion callback feeding this joiner, for one dispatched operation.
    pub fn callback(&self) -> Callback {
        let joiner = self.clone();
        Box::new(move |completion| joiner.complete(completion))
    }

    pub fn policy(&self) -> JoinPolicy {
        self.policy
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// How many completions are still awaited before the group settles.
    ///
    /// Under [`JoinPolicy::AccumulateAll`] every completion counts down; under
    /// [`JoinPolicy::BreakOnError`] only successes do, since a failure fires at once.
    pub fn remaining(&self) -> usize {
        self.lock().remaining
    }

    /// Whether the final callback has already been invoked.
    pub fn is_fired(&self) -> bool {
        self.lock().fired
    }

    fn lock(&self) -> MutexGuard<'_, JoinState> {
        // Poisoning is recovered from: the state is plain counters and vectors.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
