//! Error types for the ledger adapter boundary.

use thiserror::Error;

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors surfaced by a ledger adapter.
///
/// The client propagates these unchanged and never retries; retry and
/// backoff policy belong to the adapter implementation.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("ledger rejected the entry: {0}")]
    Rejected(String),
}
