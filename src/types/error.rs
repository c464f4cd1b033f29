use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BulkCopyError {
    #[error("cancelled")]
    Cancelled,
    #[error("copy object did not complete within {timeout_milliseconds} milliseconds")]
    TransferTimeout { timeout_milliseconds: u64 },
    #[error("listing returned a truncated page without any object")]
    TruncatedEmptyPage,
    #[error("source enumeration task terminated unexpectedly")]
    EnumerationTaskTerminated,
}

pub fn is_cancelled_error(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<BulkCopyError>(),
        Some(BulkCopyError::Cancelled)
    )
}
