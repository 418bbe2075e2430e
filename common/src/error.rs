use thiserror::Error;

/// Failures that can surface from the signal lifecycle.
///
/// Market data and publish failures are normally absorbed where they occur
/// and only logged; storage failures propagate to the trigger.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    #[error("failed to publish notification: {0}")]
    PublishFailure(String),

    #[error("signal storage I/O failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("signal history is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type SignalResult<T> = Result<T, SignalError>;
