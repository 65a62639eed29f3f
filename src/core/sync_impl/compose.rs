use crate::core::sync_impl::step::Step;
use crate::core::{Callback, Outputs};
use std::sync::Arc;

/// Builds one step that runs every step of `stack` in order.
///
/// Each step receives the outputs of the step before it; the first one receives
/// the composite's own inputs. The first error stops the chain: later steps are
/// never invoked and the caller's callback gets that error. Otherwise the caller
/// gets the last step's outputs exactly as emitted.
///
/// The composite keeps its own copy of the stack and every invocation walks it
/// with its own cursor, so one composite can be invoked many times, even
/// concurrently. Being a [`Step`] itself, it nests inside other stacks.
pub fn compose<I>(stack: I) -> Step
where
    I: IntoIterator<Item = Step>,
{
    let stack: Arc<[Step]> = stack.into_iter().collect();
    Step::new(move |inputs, done| advance(Arc::clone(&stack), 0, inputs, done))
}

fn advance(stack: Arc<[Step]>, position: usize, inputs: Outputs, done: Callback) {
    // Past the last step: hand the outputs back untouched.
    let Some(step) = stack.get(position).cloned() else {
        return done(Ok(inputs));
    };

    log::trace!("compose: invoking step {}/{}", position + 1, stack.len());
    step.call(
        inputs,
        Box::new(move |completion| match completion {
            Ok(outputs) => advance(stack, position + 1, outputs, done),
            Err(error) => {
                log::trace!("compose: step {} failed, skipping the rest", position + 1);
                done(Err(error))
            }
        }),
    );
}
