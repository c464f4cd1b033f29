use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::operation::copy_object::CopyObjectOutput;
use aws_sdk_s3::types::StorageClass;
use dyn_clone::DynClone;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::Config;
use crate::types::token::PipelineCancellationToken;
use crate::types::{ObjectPage, TransferTask};

pub mod s3;

pub type Storage = Box<dyn StorageTrait + Send + Sync>;

// RFC 3986 unreserved characters plus the path separator.
const COPY_SOURCE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

#[async_trait]
pub trait StorageFactory {
    async fn create(config: Config, cancellation_token: PipelineCancellationToken) -> Storage;
}

/// Object storage seen from the copy engine: one bucket is listed, objects are copied
/// server-side from the source bucket into the target bucket.
#[async_trait]
pub trait StorageTrait: DynClone {
    /// Lists one page of the source bucket, strictly after `start_after` when given.
    async fn list_objects(&self, start_after: Option<&str>, max_keys: i32) -> Result<ObjectPage>;

    /// Copies `task.key` from the source bucket to the same key in the target bucket,
    /// keeping the source metadata.
    async fn copy_object(
        &self,
        task: &TransferTask,
        storage_class: Option<StorageClass>,
    ) -> Result<CopyObjectOutput>;
}

/// `x-amz-copy-source` value for `key` in `bucket`.
pub fn generate_copy_source(bucket: &str, key: &str) -> String {
    format!(
        "{}/{}",
        bucket,
        utf8_percent_encode(key, COPY_SOURCE_ENCODE_SET)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_source_plain_key() {
        init_dummy_tracing_subscriber();

        assert_eq!(
            generate_copy_source("source-bucket", "dir1/data1.dat"),
            "source-bucket/dir1/data1.dat"
        );
    }

    #[test]
    fn copy_source_keeps_slashes_and_unreserved() {
        init_dummy_tracing_subscriber();

        assert_eq!(
            generate_copy_source("source-bucket", "a-b_c.d~e/f/"),
            "source-bucket/a-b_c.d~e/f/"
        );
    }

    #[test]
    fn copy_source_encodes_reserved_and_multibyte() {
        init_dummy_tracing_subscriber();

        assert_eq!(
            generate_copy_source("source-bucket", "dir 1/a+b&c?.jpg"),
            "source-bucket/dir%201/a%2Bb%26c%3F.jpg"
        );
        assert_eq!(
            generate_copy_source("source-bucket", "データ/1.txt"),
            "source-bucket/%E3%83%87%E3%83%BC%E3%82%BF/1.txt"
        );
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
