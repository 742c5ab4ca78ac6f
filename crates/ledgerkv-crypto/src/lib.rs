//! # ledgerkv Crypto
//!
//! Symmetric authenticated encryption for ledgerkv payloads.
//!
//! Encryption runs over the whole serialized payload before it is chunked,
//! so every write is sealed exactly once regardless of how many fragments
//! it ends up as. The construction is ChaCha20-Poly1305 with a random
//! 96-bit nonce per seal: decrypting with a wrong key fails the Poly1305
//! tag check deterministically instead of handing back garbage bytes.
//!
//! Keys are caller-owned. Nothing in this crate retains key material across
//! calls.

pub mod cipher;
pub mod error;

pub use cipher::{EncryptionKey, EncryptionNonce, Sealed};
pub use error::{CryptoError, Result};
