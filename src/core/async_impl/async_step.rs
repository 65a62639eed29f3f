use crate::core::error::{FlowError, StepError};
use crate::core::sync_impl::step::Step;
use crate::core::{Completion, Outputs};

use async_trait::async_trait;
use futures::channel::oneshot;
use std::future::Future;
use std::sync::Arc;

/// Defines a step as an async function over its inputs.
///
/// Implement this trait when a step carries its own configuration or clients,
/// then turn it into a [`Step`] with [`Step::from_logic`].
#[async_trait]
pub trait AsyncStepLogic: Send + Sync + 'static {
    /// Runs the step. `Ok` carries the outputs handed to whatever comes next.
    async fn exec(&self, inputs: Outputs) -> Completion;
}

impl Step {
    /// Creates a step from an async function.
    ///
    /// Each invocation spawns the returned future onto the current tokio
    /// runtime and reports its result through the step's callback. Invoked
    /// outside a runtime, the step fails with [`FlowError::NoRuntime`].
    pub fn from_async<F, Fut>(f: F) -> Step
    where
        F: Fn(Outputs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Completion> + Send + 'static,
    {
        Step::new(move |inputs, done| {
            let handle = match tokio::runtime::Handle::try_current() {
                Ok(handle) => handle,
                Err(err) => {
                    log::error!("async step invoked without a runtime: {}", err);
                    return done(Err(StepError::new(FlowError::NoRuntime)));
                }
            };
            let work = f(inputs);
            handle.spawn(async move { done(work.await) });
        })
    }

    /// Creates a step from an [`AsyncStepLogic`] implementation.
    pub fn from_logic<L: AsyncStepLogic>(logic: L) -> Step {
        let logic = Arc::new(logic);
        Step::from_async(move |inputs| {
            let logic = Arc::clone(&logic);
            async move { logic.exec(inputs).await }
        })
    }

    /// Invokes the step and waits for its completion.
    ///
    /// A step failure comes back as [`FlowError::Step`]; a step that drops its
    /// callback without calling it yields [`FlowError::Dropped`].
    pub async fn run(&self, inputs: Outputs) -> Result<Outputs, FlowError> {
        let (tx, rx) = oneshot::channel();
        self.call(
            inputs,
            Box::new(move |completion: Completion| {
                // Nobody is listening any more if the caller stopped awaiting.
                let _ = tx.send(completion);
            }),
        );

        match rx.await {
            Ok(completion) => Ok(completion?),
            Err(oneshot::Canceled) => Err(FlowError::Dropped),
        }
    }
}
