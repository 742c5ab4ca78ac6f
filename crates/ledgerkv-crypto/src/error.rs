//! Error types for the crypto crate.

use thiserror::Error;

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors from sealing and opening payloads.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: wrong key or corrupted ciphertext")]
    DecryptionFailed,

    #[error("malformed sealed payload: {0}")]
    MalformedSealed(String),

    #[error("invalid key encoding: {0}")]
    InvalidKey(String),
}
