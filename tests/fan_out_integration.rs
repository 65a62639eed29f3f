//! Integration tests for fan-out joins, including completions racing on a
//! multi-threaded runtime.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tessera::prelude::*;
use tokio::time::{sleep, Duration};

type Outcomes = Arc<Mutex<Vec<Result<Vec<NodeValue>, JoinError>>>>;

fn elements() -> Vec<NodeValue> {
    vec![json!(1), json!(3), json!(5), json!(7), json!(9)]
}

/// An operation that finishes after `delay(element)` ms with `element + 1`,
/// failing for the elements listed in `fail_on`.
fn timed_sum_one(
    delay: fn(i64) -> u64,
    fail_on: Vec<i64>,
    dispatched: Arc<AtomicUsize>,
) -> Step {
    let fail_on = Arc::new(fail_on);
    Step::from_async(move |inputs| {
        dispatched.fetch_add(1, Ordering::SeqCst);
        let fail_on = Arc::clone(&fail_on);
        async move {
            let n = inputs[0].as_i64().unwrap();
            sleep(Duration::from_millis(delay(n))).await;
            if fail_on.contains(&n) {
                Err(StepError::msg(format!("error{}", n)))
            } else {
                Ok(vec![json!(n + 1)])
            }
        }
    })
}

#[tokio::test]
async fn test_reverse_completion_yields_reverse_results() {
    let dispatched = Arc::new(AtomicUsize::new(0));
    let op = timed_sum_one(|n| (22 - n * 2) as u64 * 4, vec![], Arc::clone(&dispatched));

    let outcome = for_each_async(elements(), op, ForEachOptions::default()).await;

    assert_eq!(outcome, Ok(vec![json!(10), json!(8), json!(6), json!(4), json!(2)]));
    assert_eq!(dispatched.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_break_on_error_delivers_once_and_ignores_late_results() {
    let dispatched = Arc::new(AtomicUsize::new(0));
    let op = timed_sum_one(|n| n as u64 * 10, vec![5], Arc::clone(&dispatched));
    let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outcomes);

    for_each(elements(), op, move |outcome| sink.lock().unwrap().push(outcome));
    assert_eq!(dispatched.load(Ordering::SeqCst), 5);

    // Long enough for 7 and 9 to finish after the failure.
    sleep(Duration::from_millis(200)).await;

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        Err(JoinError::Broken { error, results }) => {
            assert_eq!(error.to_string(), "error5");
            assert_eq!(results, &vec![json!(2), json!(4)]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_accumulate_all_reports_errors_and_results_separately() {
    let dispatched = Arc::new(AtomicUsize::new(0));
    let op = timed_sum_one(|n| n as u64 * 10, vec![5, 9], Arc::clone(&dispatched));

    let outcome = ForEach::new(ForEachOptions::new().break_on_error(false))
        .run_async(elements(), op)
        .await;

    match outcome {
        Err(FlowError::Join(JoinError::Accumulated { errors, results })) => {
            let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
            assert_eq!(errors, vec!["error5", "error9"]);
            assert_eq!(results, vec![json!(2), json!(4), json!(8)]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(dispatched.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_empty_collection_never_dispatches() {
    let dispatched = Arc::new(AtomicUsize::new(0));
    let op = timed_sum_one(|_| 1, vec![], Arc::clone(&dispatched));
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    for_each(vec![], op, move |outcome| {
        assert_eq!(outcome, Ok(vec![]));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(dispatched.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_final_callback_fires_once_under_parallel_completions() {
    const ELEMENTS: i64 = 200;

    for break_on_error in [true, false] {
        let fired = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = futures::channel::oneshot::channel();

        let finished = Arc::clone(&completed);
        let op = Step::from_async(move |inputs| {
            let finished = Arc::clone(&finished);
            async move {
                let n = inputs[0].as_i64().unwrap();
                tokio::task::yield_now().await;
                finished.fetch_add(1, Ordering::SeqCst);
                if n % 10 == 0 {
                    Err(StepError::msg(format!("error{}", n)))
                } else {
                    Ok(vec![json!(n)])
                }
            }
        });

        let counter = Arc::clone(&fired);
        ForEachOptions::new()
            .break_on_error(break_on_error)
            .driver()
            .run((0..ELEMENTS).map(|n| json!(n)).collect(), op, move |outcome| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(outcome);
            });

        let outcome = rx.await.unwrap();
        match (break_on_error, outcome) {
            (true, Err(JoinError::Broken { results, .. })) => {
                assert!(results.len() < ELEMENTS as usize);
            }
            (false, Err(JoinError::Accumulated { errors, results })) => {
                assert_eq!(errors.len(), 20);
                assert_eq!(results.len(), 180);
            }
            (mode, other) => panic!("break_on_error={} gave {:?}", mode, other),
        }

        // Let every straggler report before counting deliveries.
        while completed.load(Ordering::SeqCst) < ELEMENTS as usize {
            sleep(Duration::from_millis(5)).await;
        }
        sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_custom_fan_out_with_joiner() {
    let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outcomes);
    let joiner = make_joiner(3, JoinPolicy::AccumulateAll, move |outcome| {
        sink.lock().unwrap().push(outcome)
    })
    .unwrap();

    let workers: Vec<_> = (0..3)
        .map(|i| {
            let done = joiner.callback();
            std::thread::spawn(move || done(Ok(vec![json!(i * 100)])))
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    let mut results = outcomes[0].clone().unwrap();
    results.sort_by_key(|v| v.as_i64());
    assert_eq!(results, vec![json!(0), json!(100), json!(200)]);
    assert!(joiner.is_fired());
}
