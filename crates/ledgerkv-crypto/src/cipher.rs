//! ChaCha20-Poly1305 sealing of serialized payloads.
//!
//! A [`Sealed`] wraps one ciphertext with the nonce used to produce it,
//! CBOR-encoded so it can ride through the chunker like any other payload.
//! The AEAD tag inside the ciphertext is what makes wrong-key decryption a
//! deterministic failure.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};

/// A 256-bit symmetric key for ChaCha20-Poly1305.
#[derive(Clone)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encode for external storage by the caller.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a key from its hex encoding.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("key must be 32 bytes".to_string()))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("EncryptionKey(..)")
    }
}

/// A 96-bit nonce, unique per seal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionNonce(pub [u8; 12]);

impl EncryptionNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }
}

/// A sealed payload: nonce plus authenticated ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sealed {
    /// Nonce used for this seal.
    pub nonce: EncryptionNonce,
    /// Ciphertext with trailing Poly1305 tag.
    pub ciphertext: Vec<u8>,
}

impl Sealed {
    /// Seal plaintext under the given key.
    pub fn seal(plaintext: &[u8], key: &EncryptionKey) -> Result<Self> {
        let nonce = EncryptionNonce::generate();
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        Ok(Self { nonce, ciphertext })
    }

    /// Open with the given key.
    ///
    /// Fails with [`CryptoError::DecryptionFailed`] on a wrong key or any
    /// bit of ciphertext damage.
    pub fn open(&self, key: &EncryptionKey) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        cipher
            .decrypt(Nonce::from_slice(&self.nonce.0), self.ciphertext.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Serialize to CBOR bytes for chunking.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize a reassembled sealed payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CryptoError::MalformedSealed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let key = EncryptionKey::generate();
        let sealed = Sealed::seal(b"Hello, world!", &key).unwrap();
        assert_eq!(sealed.open(&key).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_wrong_key_is_detected() {
        let key = EncryptionKey::generate();
        let other = EncryptionKey::generate();
        let sealed = Sealed::seal(b"secret", &key).unwrap();

        assert!(matches!(
            sealed.open(&other).unwrap_err(),
            CryptoError::DecryptionFailed
        ));
    }

    #[test]
    fn test_ciphertext_damage_is_detected() {
        let key = EncryptionKey::generate();
        let mut sealed = Sealed::seal(b"secret", &key).unwrap();
        sealed.ciphertext[0] ^= 0x01;

        assert!(matches!(
            sealed.open(&key).unwrap_err(),
            CryptoError::DecryptionFailed
        ));
    }

    #[test]
    fn test_sealed_wire_roundtrip() {
        let key = EncryptionKey::generate();
        let sealed = Sealed::seal(b"payload", &key).unwrap();

        let bytes = sealed.to_bytes();
        let back = Sealed::from_bytes(&bytes).unwrap();
        assert_eq!(back, sealed);
        assert_eq!(back.open(&key).unwrap(), b"payload");
    }

    #[test]
    fn test_nonce_is_fresh_per_seal() {
        let key = EncryptionKey::generate();
        let a = Sealed::seal(b"same", &key).unwrap();
        let b = Sealed::seal(b"same", &key).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_key_hex_roundtrip() {
        let key = EncryptionKey::generate();
        let back = EncryptionKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(back.as_bytes(), key.as_bytes());

        assert!(EncryptionKey::from_hex("abc").is_err());
        assert!(EncryptionKey::from_hex("zz".repeat(32).as_str()).is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip_any_plaintext(plaintext in prop::collection::vec(any::<u8>(), 0..4096)) {
            let key = EncryptionKey::generate();
            let sealed = Sealed::seal(&plaintext, &key).unwrap();
            prop_assert_eq!(sealed.open(&key).unwrap(), plaintext);
        }
    }
}
