//! A walkthrough of chaining steps and fanning work out with Tessera.
//!
//! This demo shows:
//! - Writing steps as plain functions and as async functions
//! - Chaining them with `compose`
//! - Fanning a pipeline out over a collection under both error policies

use serde_json::json;
use tessera::prelude::*;
use tokio::time::{sleep, Duration};

// ============================================================================
// Steps
// ============================================================================

/// Parses a string into a number, failing on anything else.
fn parse() -> Step {
    Step::from_fn(|inputs| match inputs[0].as_str().map(str::parse::<i64>) {
        Some(Ok(n)) => Ok(vec![json!(n)]),
        _ => Err(StepError::msg(format!("cannot parse {}", inputs[0]))),
    })
}

/// Pretends to look the number up somewhere slow.
fn lookup() -> Step {
    Step::from_async(|inputs| async move {
        let n = inputs[0].as_i64().unwrap_or_default();
        sleep(Duration::from_millis((10 - n.clamp(0, 9)) as u64 * 5)).await;
        Ok(vec![json!(format!("item-{}", n))])
    })
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), FlowError> {
    let pipeline = compose([parse(), lookup()]);

    let single = pipeline.run(vec![json!("4")]).await?;
    println!("[compose] \"4\" -> {:?}", single);

    let inputs = vec![json!("1"), json!("7"), json!("oops"), json!("3")];

    match for_each_async(inputs.clone(), pipeline.clone(), ForEachOptions::default()).await {
        Ok(results) => println!("[break] all succeeded: {:?}", results),
        Err(err) => println!("[break] stopped early: {}", err),
    }

    let collect_all = ForEachOptions::new().break_on_error(false).driver();
    match collect_all.run_async(inputs, pipeline).await {
        Ok(results) => println!("[accumulate] all succeeded: {:?}", results),
        Err(FlowError::Join(join)) => {
            println!("[accumulate] results (completion order): {:?}", join.results());
            for error in join.errors() {
                println!("[accumulate] error: {}", error);
            }
        }
        Err(other) => return Err(other),
    }

    Ok(())
}
