use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::copy_object::CopyObjectError;
use aws_sdk_s3::types::StorageClass;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use tracing::{error, trace};

use crate::Config;
use crate::storage::Storage;
use crate::types::TransferTask;
use crate::types::error::BulkCopyError;

/// Result of one copy, handed back to the control loop.
#[derive(Debug)]
pub struct TransferOutcome {
    pub task: TransferTask,
    pub result: Result<()>,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Issues one server-side copy per task. Never retries and never aborts the run;
/// failures are returned to the caller to be counted.
pub struct TransferExecutor {
    storage: Storage,
    storage_class_override: Option<StorageClass>,
    transfer_timeout: Option<Duration>,
    no_error_output: bool,
}

impl TransferExecutor {
    pub fn new(storage: Storage, config: &Config) -> Self {
        Self {
            storage,
            storage_class_override: config.storage_class.clone(),
            transfer_timeout: config
                .transfer_timeout_milliseconds
                .map(Duration::from_millis),
            no_error_output: config.no_error_output,
        }
    }

    /// The configured override wins over the class the object was listed with.
    pub fn resolve_storage_class(&self, task: &TransferTask) -> Option<StorageClass> {
        self.storage_class_override.clone().or_else(|| {
            task.storage_class_hint
                .as_deref()
                .map(StorageClass::from)
        })
    }

    pub async fn execute(&self, task: TransferTask) -> TransferOutcome {
        let result = self.copy(&task).await;

        match &result {
            Ok(()) => {
                trace!(
                    key = task.key.as_str(),
                    size = task.size_bytes,
                    "copy object completed."
                );
            }
            Err(e) => self.report_failure(&task, e),
        }

        TransferOutcome { task, result }
    }

    async fn copy(&self, task: &TransferTask) -> Result<()> {
        let storage_class = self.resolve_storage_class(task);
        let copy = self.storage.copy_object(task, storage_class);

        let Some(transfer_timeout) = self.transfer_timeout else {
            return copy.await.map(|_| ());
        };

        match tokio::time::timeout(transfer_timeout, copy).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(anyhow!(BulkCopyError::TransferTimeout {
                timeout_milliseconds: transfer_timeout.as_millis() as u64,
            })),
        }
    }

    fn report_failure(&self, task: &TransferTask, e: &Error) {
        if self.no_error_output {
            return;
        }

        let error = e.to_string();
        let source = e.source();
        let code = error_code(e);

        error!(
            key = task.key.as_str(),
            code = code.as_deref(),
            error = error,
            source = source,
            "copy object failed."
        );
    }
}

fn error_code(e: &Error) -> Option<String> {
    if let Some(SdkError::ServiceError(service_error)) =
        e.downcast_ref::<SdkError<CopyObjectError, HttpResponse>>()
    {
        return service_error.err().code().map(|code| code.to_string());
    }

    None
}
