use async_channel::Sender;
use tokio::time::Instant;
use tracing::trace;

use crate::types::{EnumerationCursor, ProgressSnapshot};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounters {
    pub succeeded: u64,
    pub failed: u64,
    pub bytes_transferred: u64,
}

/// Owns the run counters. Only the control loop mutates them, so no locking is needed.
/// Snapshots go out over an unbounded channel and never block the loop.
pub struct ProgressTracker {
    started: Instant,
    counters: ProgressCounters,
    sender: Sender<ProgressSnapshot>,
}

impl ProgressTracker {
    pub fn new(sender: Sender<ProgressSnapshot>) -> Self {
        Self {
            started: Instant::now(),
            counters: ProgressCounters::default(),
            sender,
        }
    }

    pub fn record_success(&mut self, size_bytes: u64) {
        self.counters.succeeded += 1;
        self.counters.bytes_transferred += size_bytes;
    }

    pub fn record_failure(&mut self) {
        self.counters.failed += 1;
    }

    pub fn counters(&self) -> ProgressCounters {
        self.counters
    }

    pub fn snapshot(
        &self,
        queue_depth: usize,
        in_flight: usize,
        cursor: &EnumerationCursor,
        is_final: bool,
    ) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed: self.started.elapsed(),
            queue_depth,
            in_flight,
            succeeded: self.counters.succeeded,
            failed: self.counters.failed,
            bytes_transferred: self.counters.bytes_transferred,
            cursor: cursor.clone(),
            is_final,
        }
    }

    pub fn publish(&self, snapshot: ProgressSnapshot) {
        // Nobody listening is not an error.
        if self.sender.try_send(snapshot).is_err() {
            trace!("progress receiver has been closed.");
        }
    }

    pub fn close(&self) {
        self.sender.close();
    }
}
