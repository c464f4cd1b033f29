use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader, Split};
use tracing::{trace, warn};

use super::{BoxedEnumerationSource, EnumerationSource};
use crate::types::{EnumeratedBatch, EnumerationCursor, TransferTask};

/// Reads newline separated keys from a file or stdin, up to `chunk_size` keys per batch.
///
/// The stream only advances when a batch is requested, so an idle reader is a paused one.
/// Lines that are not valid UTF-8 are decoded lossily; only I/O errors fail a batch.
pub struct ListReader<R> {
    lines: Split<R>,
    chunk_size: usize,
}

impl<R: AsyncBufRead + Unpin + Send> ListReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            lines: reader.split(b'\n'),
            chunk_size: chunk_size.max(1),
        }
    }
}

impl ListReader<BufReader<tokio::fs::File>> {
    pub async fn boxed_from_file(path: &Path, chunk_size: usize) -> Result<BoxedEnumerationSource> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("failed to open the key list: {}", path.display()))?;

        Ok(Box::new(Self::new(BufReader::new(file), chunk_size)))
    }
}

impl ListReader<BufReader<tokio::io::Stdin>> {
    pub fn boxed_from_stdin(chunk_size: usize) -> BoxedEnumerationSource {
        boxed_from_reader(tokio::io::stdin(), chunk_size)
    }
}

pub fn boxed_from_reader<R>(reader: R, chunk_size: usize) -> BoxedEnumerationSource
where
    R: AsyncRead + Unpin + Send + 'static,
{
    Box::new(ListReader::new(BufReader::new(reader), chunk_size))
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EnumerationSource for ListReader<R> {
    async fn next_batch(&mut self, cursor: &EnumerationCursor) -> Result<EnumeratedBatch> {
        let mut candidates = Vec::with_capacity(self.chunk_size);

        while candidates.len() < self.chunk_size {
            let line = self
                .lines
                .next_segment()
                .await
                .context("failed to read the key list.")?;

            let Some(line) = line else {
                trace!(count = candidates.len(), "key list has been exhausted.");
                return Ok(EnumeratedBatch {
                    candidates,
                    next_cursor: EnumerationCursor::Exhausted,
                });
            };

            let line = match String::from_utf8(line) {
                Ok(line) => line,
                Err(e) => {
                    let line = String::from_utf8_lossy(e.as_bytes()).into_owned();
                    warn!(key = line.as_str(), "key list line is not valid UTF-8.");
                    line
                }
            };

            let key = line.trim_end_matches('\r');
            if key.is_empty() {
                continue;
            }

            candidates.push(TransferTask::from_list_line(key));
        }

        trace!(count = candidates.len(), "key list chunk read.");

        Ok(EnumeratedBatch {
            candidates,
            next_cursor: cursor.clone(),
        })
    }
}
