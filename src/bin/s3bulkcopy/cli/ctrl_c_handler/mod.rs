use tokio::task::JoinHandle;
use tokio::{select, signal};
use tracing::{debug, error, warn};

use s3bulkcopy::types::token::PipelineCancellationToken;

/// Cancels the run on the first ctrl-c. The handler stops when the token is cancelled elsewhere.
pub fn spawn_ctrl_c_handler(cancellation_token: PipelineCancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        select! {
            _ = cancellation_token.cancelled() => {
                debug!("cancellation_token canceled.")
            }
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        warn!("ctrl-c received, stopping the bulk copy.");
                        cancellation_token.cancel();
                    }
                    Err(e) => {
                        error!(error = e.to_string(), "failed to listen for ctrl-c signal.");
                    }
                }
            }
        }
    })
}
