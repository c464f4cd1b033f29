use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::copy_object::CopyObjectOutput;
use aws_sdk_s3::types::{MetadataDirective, ObjectCannedAcl, StorageClass};
use tokio::sync::Semaphore;
use tracing::trace;

use crate::Config;
use crate::storage::{Storage, StorageFactory, StorageTrait, generate_copy_source};
use crate::types::error::BulkCopyError;
use crate::types::token::PipelineCancellationToken;
use crate::types::{ObjectPage, TransferTask};

mod client_builder;

pub struct S3StorageFactory {}

#[async_trait]
impl StorageFactory for S3StorageFactory {
    async fn create(config: Config, cancellation_token: PipelineCancellationToken) -> Storage {
        let client = Arc::new(config.client_config.create_client().await);
        S3Storage::boxed_new(config, cancellation_token, client)
    }
}

#[derive(Clone)]
struct S3Storage {
    source_bucket: String,
    target_bucket: String,
    canned_acl: ObjectCannedAcl,
    connection_semaphore: Arc<Semaphore>,
    cancellation_token: PipelineCancellationToken,
    client: Arc<Client>,
}

impl S3Storage {
    fn boxed_new(
        config: Config,
        cancellation_token: PipelineCancellationToken,
        client: Arc<Client>,
    ) -> Storage {
        let storage = S3Storage {
            source_bucket: config.source_bucket,
            target_bucket: config.target_bucket,
            canned_acl: config.canned_acl,
            connection_semaphore: config.client_config.connection_semaphore,
            cancellation_token,
            client,
        };

        Box::new(storage)
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    async fn list_objects(&self, start_after: Option<&str>, max_keys: i32) -> Result<ObjectPage> {
        if self.cancellation_token.is_cancelled() {
            trace!("list_objects() canceled.");
            return Err(anyhow!(BulkCopyError::Cancelled));
        }

        let _permit = self
            .connection_semaphore
            .acquire()
            .await
            .context("connection semaphore closed.")?;

        let list_objects_output = self
            .client
            .list_objects_v2()
            .bucket(&self.source_bucket)
            .set_start_after(start_after.map(|key| key.to_string()))
            .max_keys(max_keys)
            .send()
            .await
            .context("aws_sdk_s3::client::list_objects_v2() failed.")?;

        let objects = list_objects_output
            .contents()
            .iter()
            .filter_map(TransferTask::from_listed_object)
            .collect::<Vec<_>>();

        trace!(
            start_after = start_after,
            count = objects.len(),
            is_truncated = list_objects_output.is_truncated(),
            "list_objects_v2() page received."
        );

        Ok(ObjectPage {
            objects,
            is_truncated: list_objects_output.is_truncated().unwrap_or(false),
        })
    }

    async fn copy_object(
        &self,
        task: &TransferTask,
        storage_class: Option<StorageClass>,
    ) -> Result<CopyObjectOutput> {
        let _permit = self
            .connection_semaphore
            .acquire()
            .await
            .context("connection semaphore closed.")?;

        self.client
            .copy_object()
            .bucket(&self.target_bucket)
            .key(&task.key)
            .copy_source(generate_copy_source(&self.source_bucket, &task.key))
            .acl(self.canned_acl.clone())
            .metadata_directive(MetadataDirective::Copy)
            .set_storage_class(storage_class)
            .send()
            .await
            .context("aws_sdk_s3::client::copy_object() failed.")
    }
}
