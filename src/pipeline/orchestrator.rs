use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_channel::Sender;
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace};

use crate::Config;
use crate::pipeline::enumerator::SourceEnumerator;
use crate::pipeline::executor::{TransferExecutor, TransferOutcome};
use crate::pipeline::governor::ConcurrencyGovernor;
use crate::pipeline::progress::ProgressTracker;
use crate::pipeline::queue::WorkQueue;
use crate::types::error::BulkCopyError;
use crate::types::token::PipelineCancellationToken;
use crate::types::{EnumeratedBatch, ProgressSnapshot};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

enum LoopEvent {
    Completed(Result<TransferOutcome, JoinError>),
    Enumerated(Result<EnumeratedBatch>),
    Tick,
    Cancelled,
}

/// The single control task of a run.
///
/// Queue, governor and counters are owned here and mutated only by the control loop.
/// Transfers and enumeration fetches run as separate tasks and report back as events.
pub struct Orchestrator {
    queue: WorkQueue,
    governor: ConcurrencyGovernor,
    executor: Arc<TransferExecutor>,
    tracker: ProgressTracker,
    enumerator: SourceEnumerator,
    transfers: JoinSet<TransferOutcome>,
    max_list_buffer_size: usize,
    cancellation_token: PipelineCancellationToken,
}

impl Orchestrator {
    pub fn new(
        config: &Config,
        executor: TransferExecutor,
        enumerator: SourceEnumerator,
        progress_sender: Sender<ProgressSnapshot>,
        cancellation_token: PipelineCancellationToken,
    ) -> Self {
        Self {
            queue: WorkQueue::new(),
            governor: ConcurrencyGovernor::new(config.max_requests, config.admission_boundary),
            executor: Arc::new(executor),
            tracker: ProgressTracker::new(progress_sender),
            enumerator,
            transfers: JoinSet::new(),
            max_list_buffer_size: config.max_list_buffer_size,
            cancellation_token,
        }
    }

    /// Runs until the enumeration is exhausted and every admitted transfer has finished.
    ///
    /// A fatal enumeration error or cancellation aborts in-flight transfers. The final
    /// snapshot is published in every case.
    pub async fn run(mut self) -> Result<ProgressSnapshot> {
        trace!("orchestrator has started.");

        let result = self.drive().await;
        if result.is_err() {
            self.transfers.shutdown().await;
        }
        self.enumerator.shutdown();

        let snapshot = self.snapshot(true);
        self.tracker.publish(snapshot.clone());
        self.tracker.close();

        debug!(
            total_enqueued = self.queue.total_pushed(),
            queue_high_water_mark = self.queue.high_water_mark(),
            "orchestrator has been stopped."
        );

        result.map(|_| snapshot)
    }

    async fn drive(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        self.pump()?;

        loop {
            if self.is_quiescent() {
                info!(
                    succeeded = self.tracker.counters().succeeded,
                    failed = self.tracker.counters().failed,
                    "all objects have been processed."
                );
                return Ok(());
            }

            let event = tokio::select! {
                _ = self.cancellation_token.cancelled() => LoopEvent::Cancelled,
                Some(joined) = self.transfers.join_next(), if !self.transfers.is_empty() => {
                    LoopEvent::Completed(joined)
                }
                batch = self.enumerator.next_batch(), if self.enumerator.is_fetch_outstanding() => {
                    LoopEvent::Enumerated(batch)
                }
                _ = ticker.tick() => LoopEvent::Tick,
            };

            match event {
                LoopEvent::Completed(joined) => self.complete(joined),
                LoopEvent::Enumerated(batch) => {
                    let tasks = self.enumerator.accept(batch?);
                    self.queue.extend(tasks);
                }
                LoopEvent::Tick => {
                    self.tracker.publish(self.snapshot(false));
                    continue;
                }
                LoopEvent::Cancelled => {
                    trace!("orchestrator has been cancelled.");
                    return Err(anyhow!(BulkCopyError::Cancelled));
                }
            }

            self.pump()?;
        }
    }

    /// Requests more work if the queue has room, then admits transfers while the
    /// governor has capacity.
    fn pump(&mut self) -> Result<()> {
        self.enumerator
            .pull_if_capacity_allows(self.queue.len(), self.max_list_buffer_size)?;

        while !self.queue.is_empty() && self.governor.try_acquire() {
            if let Some(task) = self.queue.pop() {
                let executor = self.executor.clone();
                self.transfers
                    .spawn(async move { executor.execute(task).await });
            }
        }

        Ok(())
    }

    fn complete(&mut self, joined: Result<TransferOutcome, JoinError>) {
        self.governor.release();

        match joined {
            Ok(outcome) if outcome.is_success() => {
                self.tracker.record_success(outcome.task.size_bytes)
            }
            Ok(_) => self.tracker.record_failure(),
            Err(e) => {
                error!(error = e.to_string(), "transfer task terminated unexpectedly.");
                self.tracker.record_failure();
            }
        }
    }

    fn is_quiescent(&self) -> bool {
        self.enumerator.is_exhausted()
            && !self.enumerator.is_fetch_outstanding()
            && self.queue.is_empty()
            && self.transfers.is_empty()
    }

    fn snapshot(&self, is_final: bool) -> ProgressSnapshot {
        self.tracker.snapshot(
            self.queue.len(),
            self.governor.in_flight(),
            self.enumerator.cursor(),
            is_final,
        )
    }
}
