use anyhow::{Result, anyhow};
use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::pipeline::key_filter::KeyFilter;
use crate::types::error::BulkCopyError;
use crate::types::{EnumeratedBatch, EnumerationCursor, TransferTask};

pub use lister::RemoteLister;
pub use reader::ListReader;

mod lister;
mod reader;

/// A producer of candidate keys. Each call yields one batch and the cursor to resume from.
#[async_trait]
pub trait EnumerationSource: Send {
    async fn next_batch(&mut self, cursor: &EnumerationCursor) -> Result<EnumeratedBatch>;
}

pub type BoxedEnumerationSource = Box<dyn EnumerationSource>;

/// Control-side handle of the enumeration worker.
///
/// The worker owns the [`EnumerationSource`] and performs at most one fetch at a time.
/// The handle owns the cursor, the outstanding-fetch flag and the key filter, and
/// decides when the next fetch may start.
pub struct SourceEnumerator {
    request_sender: Sender<EnumerationCursor>,
    batch_receiver: Receiver<Result<EnumeratedBatch>>,
    worker: JoinHandle<()>,
    cursor: EnumerationCursor,
    fetch_outstanding: bool,
    key_filter: KeyFilter,
}

impl SourceEnumerator {
    pub fn spawn(
        source: BoxedEnumerationSource,
        initial_cursor: EnumerationCursor,
        key_filter: KeyFilter,
    ) -> Self {
        let (request_sender, request_receiver) = async_channel::unbounded();
        let (batch_sender, batch_receiver) = async_channel::unbounded();

        let worker = tokio::spawn(serve(source, request_receiver, batch_sender));

        Self {
            request_sender,
            batch_receiver,
            worker,
            cursor: initial_cursor,
            fetch_outstanding: false,
            key_filter,
        }
    }

    /// Starts a fetch when none is outstanding, enumeration is not exhausted and
    /// fewer than `cap` tasks are buffered. Returns whether a fetch was started.
    pub fn pull_if_capacity_allows(&mut self, buffered: usize, cap: usize) -> Result<bool> {
        if self.fetch_outstanding || self.cursor.is_exhausted() || cap <= buffered {
            return Ok(false);
        }

        self.request_sender
            .try_send(self.cursor.clone())
            .map_err(|_| anyhow!(BulkCopyError::EnumerationTaskTerminated))?;
        self.fetch_outstanding = true;

        trace!(cursor = %self.cursor, buffered = buffered, "enumeration fetch requested.");

        Ok(true)
    }

    /// Waits for the outstanding fetch. Cancel safe.
    pub async fn next_batch(&self) -> Result<EnumeratedBatch> {
        self.batch_receiver
            .recv()
            .await
            .map_err(|_| anyhow!(BulkCopyError::EnumerationTaskTerminated))?
    }

    /// Advances the cursor and returns the candidates admitted by the key filter.
    pub fn accept(&mut self, batch: EnumeratedBatch) -> Vec<TransferTask> {
        self.fetch_outstanding = false;
        self.cursor = batch.next_cursor;

        let candidates = batch.candidates.len();
        let admitted = self.key_filter.apply(batch.candidates);

        debug!(
            candidates = candidates,
            admitted = admitted.len(),
            cursor = %self.cursor,
            "enumeration batch received."
        );

        admitted
    }

    pub fn is_fetch_outstanding(&self) -> bool {
        self.fetch_outstanding
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    pub fn cursor(&self) -> &EnumerationCursor {
        &self.cursor
    }

    pub fn shutdown(&self) {
        self.request_sender.close();
        self.worker.abort();
    }
}

impl Drop for SourceEnumerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn serve(
    mut source: BoxedEnumerationSource,
    requests: Receiver<EnumerationCursor>,
    batches: Sender<Result<EnumeratedBatch>>,
) {
    while let Ok(cursor) = requests.recv().await {
        let result = source.next_batch(&cursor).await;
        let is_fatal = result.is_err();

        if batches.send(result).await.is_err() || is_fatal {
            break;
        }
    }

    trace!("enumeration worker has been stopped.");
}
