use std::io;
use thiserror::Error;

/// Failures surfaced by this crate
#[derive(Debug, Error)]
pub enum Error {
    /// The random source could not produce bytes for a correlation id
    #[error("entropy unavailable for correlation id: {0}")]
    EntropyUnavailable(getrandom::Error),

    /// The configured sink rejected or failed a write
    #[error("failed to write log record: {0}")]
    SinkWrite(#[from] io::Error),

    /// A record could not be rendered as JSON
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid timestamp format {0:?}")]
    InvalidTimestampFormat(String),

    #[error("unknown severity {0:?}")]
    UnknownSeverity(String),
}
