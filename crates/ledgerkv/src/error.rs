//! Error types for the ledgerkv client.

use thiserror::Error;

use ledgerkv_adapter::AdapterError;
use ledgerkv_core::CoreError;
use ledgerkv_crypto::CryptoError;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by write and read calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration, encoding and decoding errors from the protocol core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The version is encrypted but no key was supplied.
    #[error("version is encrypted and no key was supplied")]
    KeyRequired,

    /// Sealing failed, or decryption was rejected (wrong key or damage).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A fragment broadcast failed partway through a write.
    ///
    /// `succeeded` lists the seq values already on the ledger; the version
    /// is permanently partial there. Retry the whole write under a fresh
    /// version id, never resume this one.
    #[error("broadcast failed after {} of the version's fragments were appended", succeeded.len())]
    Write {
        succeeded: Vec<u32>,
        #[source]
        source: AdapterError,
    },

    /// Network or auth failure from the ledger adapter, unretried.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
