// src/scheduler.rs
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::tracker::Tracker;

/// Drive the tracker on a fixed period. The first tick of
/// `tokio::time::interval` fires immediately, which gives the eager
/// start-up cycle.
///
/// Cycles run back to back on this one task, so two cycles never overlap
/// (single-flight by construction). Dispatch batches spawned by a cycle may
/// still be draining when the next cycle runs; the cursor already advanced
/// when the batch was scheduled, so nothing is announced twice.
pub fn spawn(mut tracker: Tracker, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            // Fire-and-forget: the dispatch handle is dropped, not awaited.
            let _ = tracker.run_cycle().await;
        }
    })
}
