use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tracing::trace;

use super::{BoxedEnumerationSource, EnumerationSource};
use crate::storage::Storage;
use crate::types::error::BulkCopyError;
use crate::types::{EnumeratedBatch, EnumerationCursor};

/// Pages through the source bucket, one `ListObjectsV2` call per batch.
pub struct RemoteLister {
    storage: Storage,
    max_keys: i32,
}

impl RemoteLister {
    pub fn new(storage: Storage, max_keys: i32) -> Self {
        Self { storage, max_keys }
    }

    pub fn boxed_new(storage: Storage, max_keys: i32) -> BoxedEnumerationSource {
        Box::new(Self::new(storage, max_keys))
    }
}

#[async_trait]
impl EnumerationSource for RemoteLister {
    async fn next_batch(&mut self, cursor: &EnumerationCursor) -> Result<EnumeratedBatch> {
        if cursor.is_exhausted() {
            return Ok(EnumeratedBatch {
                candidates: vec![],
                next_cursor: EnumerationCursor::Exhausted,
            });
        }

        let page = self
            .storage
            .list_objects(cursor.start_after(), self.max_keys)
            .await?;

        let next_cursor = if page.is_truncated {
            // The continuation is the last key of the raw page, before any filtering.
            let last = page
                .objects
                .last()
                .ok_or_else(|| anyhow!(BulkCopyError::TruncatedEmptyPage))?;
            EnumerationCursor::After(last.key.clone())
        } else {
            EnumerationCursor::Exhausted
        };

        trace!(
            start_after = cursor.start_after(),
            count = page.objects.len(),
            next_cursor = %next_cursor,
            "source page listed."
        );

        Ok(EnumeratedBatch {
            candidates: page.objects,
            next_cursor,
        })
    }
}
