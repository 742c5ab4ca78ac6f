//! The client: write and read over a ledger adapter.
//!
//! One write fully sequences its fragment broadcasts before returning; one
//! read fully drains its history scan before returning. The client holds
//! no cursor state between calls: the caller records the marker a read
//! hands back and threads it into the next read, so independent readers
//! over the same content never interfere.

use std::collections::BTreeMap;

use tracing::debug;

use ledgerkv_adapter::{Account, LedgerAdapter};
use ledgerkv_core::{
    decode_value, encode_value, split, Assembler, CompleteVersion, ContentId, DecodeMode,
    Envelope, Marker, Value, VersionId,
};
use ledgerkv_crypto::{EncryptionKey, Sealed};

use crate::config::Config;
use crate::error::{ClientError, Result};

/// Generate a fresh encryption key for sealed writes.
///
/// The caller owns the key; the client never stores one.
pub fn generate_key() -> EncryptionKey {
    EncryptionKey::generate()
}

/// Which values a read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Only the value of the newest complete version.
    Latest,
    /// Every complete version from the start marker onward.
    History,
}

/// A read's result, shaped by its [`ReadMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReadResult {
    /// The newest complete value, if any complete version was found.
    Latest(Option<Value>),
    /// All complete versions, ascending by position.
    History(HistoryPage),
}

/// The versions found by a history read, plus where to resume.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    /// Decoded values keyed by the position of each version's final
    /// fragment, ascending.
    pub versions: BTreeMap<Marker, Value>,
    /// Position just past the last scanned entry. Reading from here skips
    /// everything this read already consumed.
    pub next_marker: Marker,
}

/// Key/value client over one ledger account.
pub struct Client<A: LedgerAdapter> {
    adapter: A,
    config: Config,
}

impl<A: LedgerAdapter> Client<A> {
    /// Create a client, validating the configuration up front.
    pub fn new(adapter: A, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { adapter, config })
    }

    /// The account this client operates on.
    pub fn account(&self) -> &Account {
        &self.config.account
    }

    /// Write a value as a new version of `content_id`.
    ///
    /// With a key, the serialized value is sealed before chunking and the
    /// envelopes carry the encrypted flag. Returns the ledger position of
    /// the version's final fragment.
    ///
    /// There is no atomicity across fragments: if a broadcast fails after
    /// earlier fragments landed, the version is permanently partial on the
    /// ledger (readers will suppress it) and the error reports which seqs
    /// made it out. Retry under a fresh write, never resume.
    pub async fn write(
        &self,
        content_id: &ContentId,
        value: &Value,
        key: Option<&EncryptionKey>,
    ) -> Result<Marker> {
        let encoded = encode_value(value)?;
        let (payload, encrypted) = match key {
            Some(key) => (Sealed::seal(&encoded, key)?.to_bytes(), true),
            None => (encoded, false),
        };

        let version_id = VersionId::generate();
        let fragments = split(content_id, version_id, &payload, self.config.limit)?;
        let total = fragments.len();

        let mut succeeded = Vec::with_capacity(total);
        let mut last = Marker::ORIGIN;
        for fragment in fragments {
            let seq = fragment.seq;
            let envelope = Envelope::new(fragment, encrypted);
            match self.adapter.broadcast(&self.config.account, &envelope).await {
                Ok(position) => {
                    last = position;
                    succeeded.push(seq);
                }
                Err(source) => return Err(ClientError::Write { succeeded, source }),
            }
        }

        debug!(
            content_id = %content_id,
            version_id = %version_id,
            fragments = total,
            encrypted,
            position = %last,
            "wrote version"
        );
        Ok(last)
    }

    /// Read `content_id` from `start`, in the given mode.
    ///
    /// Complete versions are decrypted (when their envelopes say so) and
    /// decoded; incomplete versions are suppressed, corrupt ones excluded
    /// with a warning. An encrypted version read without the right key is
    /// an error, never a garbage value.
    pub async fn read(
        &self,
        content_id: &ContentId,
        start: Marker,
        mode: ReadMode,
        key: Option<&EncryptionKey>,
    ) -> Result<ReadResult> {
        let (versions, next_marker) = self.scan(content_id, start).await?;

        match mode {
            ReadMode::Latest => {
                // Earlier complete versions are discarded undecoded.
                let value = match versions.last() {
                    Some(version) => Some(self.decode_version(version, key)?),
                    None => None,
                };
                Ok(ReadResult::Latest(value))
            }
            ReadMode::History => {
                let mut decoded = BTreeMap::new();
                for version in &versions {
                    decoded.insert(version.position, self.decode_version(version, key)?);
                }
                Ok(ReadResult::History(HistoryPage {
                    versions: decoded,
                    next_marker,
                }))
            }
        }
    }

    /// Shorthand for [`ReadMode::Latest`].
    pub async fn read_latest(
        &self,
        content_id: &ContentId,
        start: Marker,
        key: Option<&EncryptionKey>,
    ) -> Result<Option<Value>> {
        match self.read(content_id, start, ReadMode::Latest, key).await? {
            ReadResult::Latest(value) => Ok(value),
            ReadResult::History(_) => unreachable!("latest read returned history"),
        }
    }

    /// Shorthand for [`ReadMode::History`].
    pub async fn read_history(
        &self,
        content_id: &ContentId,
        start: Marker,
        key: Option<&EncryptionKey>,
    ) -> Result<HistoryPage> {
        match self.read(content_id, start, ReadMode::History, key).await? {
            ReadResult::History(page) => Ok(page),
            ReadResult::Latest(_) => unreachable!("history read returned latest"),
        }
    }

    /// A marker just past the newest ledger entry.
    ///
    /// Recording this before writing lets a later read pick up exactly the
    /// writes that follow.
    pub async fn current_marker(&self) -> Result<Marker> {
        Ok(self.adapter.head(&self.config.account).await?)
    }

    /// Drain history from `start` and reassemble complete versions.
    async fn scan(
        &self,
        content_id: &ContentId,
        start: Marker,
    ) -> Result<(Vec<CompleteVersion>, Marker)> {
        let mut assembler = Assembler::new(content_id.clone());
        let mut cursor = start;

        loop {
            let page = self
                .adapter
                .history(&self.config.account, cursor, self.config.page_limit)
                .await?;
            let drained = page.len() < self.config.page_limit;

            for (position, envelope) in page {
                assembler.observe(position, &envelope);
                cursor = position.next();
            }
            if drained {
                break;
            }
        }

        debug!(
            content_id = %content_id,
            tracked = assembler.tracked_versions(),
            next = %cursor,
            "history scan finished"
        );
        Ok((assembler.into_versions(), cursor))
    }

    fn decode_version(
        &self,
        version: &CompleteVersion,
        key: Option<&EncryptionKey>,
    ) -> Result<Value> {
        let mode = if self.config.strict_decode {
            DecodeMode::Strict
        } else {
            DecodeMode::Lossy
        };

        if version.encrypted {
            let key = key.ok_or(ClientError::KeyRequired)?;
            let plaintext = Sealed::from_bytes(&version.payload)?.open(key)?;
            Ok(decode_value(&plaintext, mode)?)
        } else {
            Ok(decode_value(&version.payload, mode)?)
        }
    }
}
