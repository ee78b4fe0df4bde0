//! Bounded channels for batch progress and cancellation signalling.

use tokio::sync::{mpsc, watch};

use crate::config::BatchConfig;
use crate::types::BatchProgress;

/// Create a bounded progress channel with the configured buffer size.
///
/// When the buffer is full the batch collector waits for the consumer, so a
/// slow progress display applies backpressure instead of growing memory.
pub fn progress_channel(
    config: &BatchConfig,
) -> (mpsc::Sender<BatchProgress>, mpsc::Receiver<BatchProgress>) {
    mpsc::channel(config.progress_buffer)
}

/// Requests cancellation of a running batch.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Signal every token created from this handle.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Observed by batch workers before they start a variant.
#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    /// Create a linked handle/token pair.
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle(tx), CancelToken(rx))
    }

    /// A token that is never cancelled.
    pub fn never() -> Self {
        Self::pair().1
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}
