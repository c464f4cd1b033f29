use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Error, Result};
use async_channel::{Receiver, Sender};
use tracing::{debug, error, trace};

use crate::Config;
use crate::config::ListSource;
use crate::pipeline::enumerator::{
    BoxedEnumerationSource, ListReader, RemoteLister, SourceEnumerator,
};
use crate::pipeline::executor::TransferExecutor;
use crate::pipeline::key_filter::KeyFilter;
use crate::pipeline::orchestrator::Orchestrator;
use crate::storage::s3::S3StorageFactory;
use crate::storage::{Storage, StorageFactory};
use crate::types::ProgressSnapshot;
use crate::types::error::is_cancelled_error;
use crate::types::token::PipelineCancellationToken;

pub mod enumerator;
pub mod executor;
pub mod governor;
pub mod key_filter;
pub mod orchestrator;
pub mod progress;
pub mod queue;

/// One bulk copy run from the source bucket into the target bucket.
pub struct Pipeline {
    config: Config,
    storage: Storage,
    cancellation_token: PipelineCancellationToken,
    progress_sender: Sender<ProgressSnapshot>,
    progress_receiver: Receiver<ProgressSnapshot>,
    has_error: Arc<AtomicBool>,
    errors: Arc<Mutex<VecDeque<Error>>>,
    ready: bool,
    final_snapshot: Option<ProgressSnapshot>,
}

impl Pipeline {
    pub async fn new(config: Config, cancellation_token: PipelineCancellationToken) -> Self {
        let storage = S3StorageFactory::create(config.clone(), cancellation_token.clone()).await;

        Self::with_storage(config, storage, cancellation_token)
    }

    /// Builds a pipeline over an already created storage.
    pub fn with_storage(
        config: Config,
        storage: Storage,
        cancellation_token: PipelineCancellationToken,
    ) -> Self {
        let (progress_sender, progress_receiver) = async_channel::unbounded();

        Self {
            config,
            storage,
            cancellation_token,
            progress_sender,
            progress_receiver,
            has_error: Arc::new(AtomicBool::new(false)),
            errors: Arc::new(Mutex::new(VecDeque::<Error>::new())),
            ready: true,
            final_snapshot: None,
        }
    }

    pub async fn run(&mut self) {
        if !self.ready {
            panic!("it can be executed only once.")
        }
        self.ready = false;

        trace!("bulk copy pipeline has started.");

        let source = match self.build_enumeration_source().await {
            Ok(source) => source,
            Err(e) => {
                self.progress_sender.close();
                log_error(
                    self.has_error.clone(),
                    self.errors.clone(),
                    e,
                    "failed to open the source enumeration.",
                );
                return;
            }
        };

        let enumerator = SourceEnumerator::spawn(
            source,
            self.config.initial_cursor(),
            KeyFilter::new(self.config.key_match.clone()),
        );
        let executor = TransferExecutor::new(dyn_clone::clone_box(&*self.storage), &self.config);
        let orchestrator = Orchestrator::new(
            &self.config,
            executor,
            enumerator,
            self.progress_sender.clone(),
            self.cancellation_token.clone(),
        );

        match orchestrator.run().await {
            Ok(snapshot) => {
                trace!(
                    succeeded = snapshot.succeeded,
                    failed = snapshot.failed,
                    "bulk copy pipeline has been completed."
                );
                self.final_snapshot = Some(snapshot);
            }
            Err(e) if is_cancelled_error(&e) => {
                debug!("bulk copy pipeline has been cancelled.");
            }
            Err(e) => {
                log_error(
                    self.has_error.clone(),
                    self.errors.clone(),
                    e,
                    "source enumeration failed.",
                );
            }
        }
    }

    async fn build_enumeration_source(&self) -> Result<BoxedEnumerationSource> {
        let chunk_size = self.config.max_keys as usize;

        match &self.config.list_source {
            None => Ok(RemoteLister::boxed_new(
                dyn_clone::clone_box(&*self.storage),
                self.config.max_keys,
            )),
            Some(ListSource::Stdin) => Ok(ListReader::boxed_from_stdin(chunk_size)),
            Some(ListSource::File(path)) => ListReader::boxed_from_file(path, chunk_size).await,
        }
    }

    pub fn get_progress_receiver(&self) -> Receiver<ProgressSnapshot> {
        self.progress_receiver.clone()
    }

    /// The final snapshot of a run that reached quiescence.
    pub fn get_final_snapshot(&self) -> Option<ProgressSnapshot> {
        self.final_snapshot.clone()
    }

    pub fn has_error(&self) -> bool {
        self.has_error.load(Ordering::SeqCst)
    }

    pub fn get_errors_and_consume(&self) -> Option<Vec<Error>> {
        if !self.has_error() {
            return None;
        }

        let mut error_list = self.errors.lock().unwrap();
        Some(error_list.drain(..).collect())
    }
}

fn log_error(
    has_error: Arc<AtomicBool>,
    errors: Arc<Mutex<VecDeque<Error>>>,
    e: Error,
    message: &str,
) {
    has_error.store(true, Ordering::SeqCst);

    let error = e.to_string();
    let source = e.source();

    error!(error = error, source = source, message);

    let mut error_list = errors.lock().unwrap();
    error_list.push_back(e);
}
