//! Error types for the ledgerkv core.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by pure protocol computation.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("`limit` must be between 1024 and 4096, got {0}")]
    LimitOutOfRange(usize),

    #[error("envelope overhead {overhead} leaves no payload room under limit {limit}")]
    NoPayloadRoom { limit: usize, overhead: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid content id {0:?}: only lowercase alphanumerics, dashes and underscores")]
    InvalidContentId(String),

    #[error("value cannot be encoded: {0}")]
    EncodingError(String),

    #[error("payload is not a valid encoded value: {0}")]
    DecodingError(String),

    #[error("unsupported item in strict decode: {0}")]
    UnsupportedItem(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}
