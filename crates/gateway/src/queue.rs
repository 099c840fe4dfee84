//! Ordered buffer of diverted requests
//!
//! The queue is owned exclusively by the episode driver, so it needs no
//! internal locking. Insertion order is arrival order; draining replays
//! head-first and awaits each replay before starting the next, preserving
//! the causal ordering of side-effecting requests.

use std::collections::VecDeque;
use std::future::Future;

use tracing::debug;

use crate::errors::GatewayError;
use crate::request::{ApiRequest, GatewayResult, PendingEntry};

/// FIFO buffer of requests awaiting credential resolution
///
/// Capacity-unbounded: backpressure is the caller awaiting its diverted
/// future, not a queue limit.
pub(crate) struct RequestQueue {
    entries: VecDeque<PendingEntry>,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        Self { entries: VecDeque::new() }
    }

    /// Append an entry at the tail
    pub(crate) fn enqueue(&mut self, entry: PendingEntry) {
        self.entries.push_back(entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Replay entries head-first, awaiting each outcome before the next
    ///
    /// `intake` is polled before every pop so that requests diverted while
    /// the drain is in progress join the tail of the same pass instead of
    /// starting a second episode. The drain ends only when both the queue
    /// and the intake are empty.
    pub(crate) async fn drain_in_order<R, F, I>(&mut self, mut replay: R, mut intake: I)
    where
        R: FnMut(ApiRequest) -> F,
        F: Future<Output = GatewayResult>,
        I: FnMut() -> Vec<PendingEntry>,
    {
        loop {
            for late in intake() {
                debug!(path = %late.request().path(), "request joined drain in progress");
                self.enqueue(late);
            }
            let Some(entry) = self.entries.pop_front() else { break };
            let result = replay(entry.request().clone()).await;
            entry.complete(result);
        }
    }

    /// Empty the queue, rejecting every entry with the same terminal error
    pub(crate) fn reject_all(&mut self, error: &GatewayError) {
        while let Some(entry) = self.entries.pop_front() {
            entry.complete(Err(error.clone()));
        }
    }
}
