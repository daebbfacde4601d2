//! Fan-out over a list of work items with per-item outcomes.
//!
//! A failing item never stops the others. Output order always matches input
//! order, whatever the concurrency.

use futures_util::{stream, StreamExt};
use kaizen_core::error::KaizenError;
use std::future::Future;

/// Result of processing one item, tagged with the item's key.
#[derive(Debug)]
pub struct ItemOutcome<T> {
    pub key: String,
    pub result: Result<T, KaizenError>,
}

impl<T> ItemOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run `processor` over `items`.
///
/// `concurrency <= 1` awaits items one after another. Larger values keep up
/// to `concurrency` items in flight at once.
pub async fn run_batch<I, R, F, Fut>(items: Vec<I>, concurrency: usize, processor: F) -> Vec<R>
where
    F: FnMut(I) -> Fut,
    Fut: Future<Output = R>,
{
    if concurrency <= 1 {
        let mut processor = processor;
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            out.push(processor(item).await);
        }
        return out;
    }

    stream::iter(items)
        .map(processor)
        .buffered(concurrency)
        .collect()
        .await
}
