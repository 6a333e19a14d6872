// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Deduplicating work queue for string keys.
//!
//! The queue follows the usual controller semantics:
//!
//! - A key is stored at most once while waiting, however often it is added.
//! - A key handed to a worker is "processing" until [`WorkQueue::done`]. Adding
//!   it again in the meantime marks it dirty, and `done` puts it back.
//! - [`WorkQueue::add_rate_limited`] re-adds a key after a per-key exponential
//!   delay; [`WorkQueue::forget`] resets that key's failure count.
//!
//! # Example
//!
//! ```rust
//! use polaris_controller::work_queue::WorkQueue;
//!
//! # async fn example() {
//! let queue = WorkQueue::new();
//! queue.add("Service~ns1/svcA");
//! queue.add("Service~ns1/svcA");
//! assert_eq!(queue.len(), 1);
//!
//! if let Some(key) = queue.get().await {
//!     // ... process key ...
//!     queue.done(&key);
//! }
//! # }
//! ```

use crate::backoff::ItemBackoff;
use std::collections::{HashMap, HashSet, VecDeque};
use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

#[derive(Default)]
struct QueueState {
    queue: VecDeque<String>,
    dirty: HashSet<String>,
    processing: HashSet<String>,
    failures: HashMap<String, u32>,
    shutting_down: bool,
}

/// A deduplicating FIFO of queue keys with per-key rate-limited retry.
pub struct WorkQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    backoff: ItemBackoff,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::with_backoff(ItemBackoff::default())
    }
}

impl WorkQueue {
    /// Create an empty queue with the default requeue backoff.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue with a custom requeue backoff.
    #[must_use]
    pub fn with_backoff(backoff: ItemBackoff) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            backoff,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a key. No-op if it is already waiting or the queue is shut down.
    pub fn add(&self, key: impl Into<String>) {
        let key = key.into();
        let mut state = self.lock();
        if state.shutting_down || state.dirty.contains(&key) {
            return;
        }

        state.dirty.insert(key.clone());
        if state.processing.contains(&key) {
            return;
        }

        state.queue.push_back(key);
        drop(state);
        self.notify.notify_one();
    }

    /// Wait for the next key.
    ///
    /// Returns `None` once the queue is shut down and drained.
    pub async fn get(&self) -> Option<String> {
        loop {
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(key) = state.queue.pop_front() {
                    state.dirty.remove(&key);
                    state.processing.insert(key.clone());
                    return Some(key);
                }
                if state.shutting_down {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Mark a key as finished. Re-queues it if it was added while processing.
    pub fn done(&self, key: &str) {
        let mut state = self.lock();
        state.processing.remove(key);
        if state.dirty.contains(key) {
            state.queue.push_back(key.to_string());
            drop(state);
            self.notify.notify_one();
        }
    }

    /// Add a key after `delay`.
    pub fn add_after(self: &Arc<Self>, key: impl Into<String>, delay: Duration) {
        let key = key.into();
        if self.is_shutting_down() {
            return;
        }
        if delay.is_zero() {
            self.add(key);
            return;
        }

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(key);
        });
    }

    /// Add a key after its per-key backoff delay and count the failure.
    pub fn add_rate_limited(self: &Arc<Self>, key: impl Into<String>) {
        let key = key.into();
        let failures = {
            let mut state = self.lock();
            let count = state.failures.entry(key.clone()).or_insert(0);
            let previous = *count;
            *count = count.saturating_add(1);
            previous
        };

        let delay = self.backoff.delay(failures);
        debug!(key = %key, failures = failures + 1, delay = ?delay, "Requeueing key with backoff");
        self.add_after(key, delay);
    }

    /// Reset the failure count of a key.
    pub fn forget(&self, key: &str) {
        self.lock().failures.remove(key);
    }

    /// Number of rate-limited requeues recorded for a key.
    #[must_use]
    pub fn num_requeues(&self, key: &str) -> u32 {
        self.lock().failures.get(key).copied().unwrap_or(0)
    }

    /// Number of keys waiting (not counting keys being processed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Whether no keys are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting keys and wake every waiting worker.
    pub fn shut_down(&self) {
        self.lock().shutting_down = true;
        self.notify.notify_waiters();
    }

    /// Whether [`WorkQueue::shut_down`] has been called.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.lock().shutting_down
    }
}

#[cfg(test)]
#[path = "work_queue_tests.rs"]
mod work_queue_tests;
