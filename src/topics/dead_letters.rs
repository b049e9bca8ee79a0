//! # Bounded failure buffer ("dead letters").
//!
//! Best-effort store of failed deliveries for debugging. Bounded by a fixed
//! capacity decided at topic construction; insertion is non-blocking and
//! **drop-on-full**: once the buffer is full, new failures are silently
//! discarded and already-buffered entries are never evicted. Publishers never
//! feel backpressure from failure capture.

use std::collections::VecDeque;
use std::time::SystemTime;

use tokio::sync::Mutex;

use crate::error::TopicError;
use crate::messages::Payload;

/// One captured failure: the error, the payload it concerned, and when.
#[derive(Clone, Debug)]
pub struct DeadLetter {
    /// The captured error.
    pub error: TopicError,
    /// Payload of the failed delivery; absent for failures with no payload in
    /// scope (e.g. registration conflicts).
    pub payload: Option<Payload>,
    /// Capture time.
    pub at: SystemTime,
}

/// Fixed-capacity FIFO-in buffer of captured failures.
#[derive(Debug)]
pub struct DeadLetters {
    entries: Mutex<VecDeque<DeadLetter>>,
    capacity: usize,
}

impl DeadLetters {
    /// Creates a buffer holding at most `capacity` entries (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Inserts a failure if there is room; silently drops it otherwise.
    pub async fn push(&self, error: TopicError, payload: Option<Payload>) {
        let mut entries = self.entries.lock().await;
        if entries.len() < self.capacity {
            entries.push_back(DeadLetter {
                error,
                payload,
                at: SystemTime::now(),
            });
        }
    }

    /// Copies out the buffered failures, oldest first.
    pub async fn entries(&self) -> Vec<DeadLetter> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// Number of buffered failures.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// True if nothing has been captured (or everything was dropped).
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
