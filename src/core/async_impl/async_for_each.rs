use crate::core::error::FlowError;
use crate::core::sync_impl::for_each::{for_each_with, ForEach, ForEachOptions};
use crate::core::sync_impl::step::Step;
use crate::core::NodeValue;

use futures::channel::oneshot;

/// Fans `operation` out over `elements` and waits for the joined result.
///
/// Same dispatch and join semantics as [`for_each_with`]; the outcome of the
/// final callback is delivered as the future's output, with a failed join
/// surfacing as [`FlowError::Join`]. If any operation drops its callback
/// without calling it before the join settles, the join can never settle and
/// the future resolves to [`FlowError::Dropped`].
pub async fn for_each_async(
    elements: Vec<NodeValue>,
    operation: Step,
    options: ForEachOptions,
) -> Result<Vec<NodeValue>, FlowError> {
    let (tx, rx) = oneshot::channel();
    for_each_with(
        elements,
        operation,
        move |outcome| {
            let _ = tx.send(outcome);
        },
        options,
    );

    match rx.await {
        Ok(outcome) => Ok(outcome?),
        Err(oneshot::Canceled) => Err(FlowError::Dropped),
    }
}

impl ForEach {
    /// Awaitable form of [`ForEach::run`].
    pub async fn run_async(
        &self,
        elements: Vec<NodeValue>,
        operation: Step,
    ) -> Result<Vec<NodeValue>, FlowError> {
        for_each_async(elements, operation, self.options()).await
    }
}
