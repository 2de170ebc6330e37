use std::time::Duration;
use thiserror::Error;

/// Failures of a version.bind exchange
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The destination rejected the exchange or could not be reached
    /// (resolution, socket setup, send, or an ICMP refusal on receive).
    #[error("connection refused (bad address?): {0}")]
    ConnectionRefused(String),

    #[error("connection timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

impl ProbeError {
    pub fn is_refused(&self) -> bool {
        matches!(self, ProbeError::ConnectionRefused(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::TimedOut(_))
    }
}

/// Result type for probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;
