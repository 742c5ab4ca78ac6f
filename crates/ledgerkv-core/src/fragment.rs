//! Fragment and envelope: the units a write is cut into.
//!
//! One logical write produces one version: an ordered run of fragments that
//! all carry the same freshly generated [`VersionId`]. Each fragment is
//! wrapped in an [`Envelope`] before broadcast; the envelope is the wire
//! unit whose serialized size must stay under the ledger's per-entry cap.

use std::fmt;

use bytes::Bytes;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The current envelope schema version.
///
/// Envelopes carrying an unknown version are skipped on read, never
/// misinterpreted.
pub const PROTOCOL_VERSION: u8 = 0;

/// Caller-chosen name for one logical storage slot within an account.
///
/// Restricted to lowercase ASCII alphanumerics, dashes and underscores so
/// ids stay portable across ledger backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Validate and wrap a content id.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
        if !valid {
            return Err(CoreError::InvalidContentId(id));
        }
        Ok(Self(id))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 16-byte identifier shared by every fragment of one write.
///
/// Generated fresh for each write and never reused: a failed write is
/// retried under a new id, never resumed (resuming risks seq collisions
/// with a concurrent writer).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionId(pub [u8; 16]);

impl VersionId {
    /// Generate a fresh random version id.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionId({})", self.to_hex())
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// One size-bounded piece of a version's payload.
///
/// Invariants: `seq < total`, and concatenating a version's fragments in
/// `seq` order reproduces the serialized (and possibly encrypted) payload
/// byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// The slot this fragment belongs to.
    pub content_id: ContentId,
    /// The write this fragment belongs to.
    pub version_id: VersionId,
    /// Position within the version, 0-indexed.
    pub seq: u32,
    /// Total fragments in the version.
    pub total: u32,
    /// This fragment's slice of the payload.
    pub payload: Bytes,
}

/// The wire unit actually broadcast: one fragment plus routing metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope schema version (currently 0).
    pub version: u8,
    /// The slot this envelope addresses.
    pub content_id: ContentId,
    /// The write this envelope belongs to.
    pub version_id: VersionId,
    /// Fragment position within the version.
    pub seq: u32,
    /// Total fragments in the version.
    pub total: u32,
    /// Whether the reassembled payload is a sealed ciphertext.
    pub encrypted: bool,
    /// The fragment payload bytes.
    pub payload: Bytes,
}

impl Envelope {
    /// Wrap a fragment for broadcast.
    pub fn new(fragment: Fragment, encrypted: bool) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            content_id: fragment.content_id,
            version_id: fragment.version_id,
            seq: fragment.seq,
            total: fragment.total,
            encrypted,
            payload: fragment.payload,
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::MalformedEnvelope(e.to_string()))
    }

    /// Serialized size in bytes, as counted against the ledger's cap.
    pub fn encoded_len(&self) -> usize {
        self.to_bytes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_charset() {
        assert!(ContentId::new("store-integers_v1").is_ok());
        assert!(ContentId::new("a0").is_ok());
        for bad in ["", "Upper", "has space", "nul\0", "café"] {
            assert!(ContentId::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_version_id_unique_and_hex() {
        let a = VersionId::generate();
        let b = VersionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.to_hex().len(), 32);
    }

    #[test]
    fn test_envelope_roundtrip() {
        let env = Envelope {
            version: PROTOCOL_VERSION,
            content_id: ContentId::new("slot").unwrap(),
            version_id: VersionId::from_bytes([7; 16]),
            seq: 2,
            total: 5,
            encrypted: true,
            payload: Bytes::from_static(b"chunk bytes"),
        };

        let bytes = env.to_bytes();
        let back = Envelope::from_bytes(&bytes).unwrap();
        assert_eq!(back, env);
        assert_eq!(env.encoded_len(), bytes.len());
    }

    #[test]
    fn test_envelope_rejects_garbage() {
        assert!(Envelope::from_bytes(&[0x00, 0x01]).is_err());
    }
}
