//! The LedgerAdapter trait: append and read over the underlying ledger.
//!
//! Implementations must preserve per-account broadcast order; reassembly
//! tolerates interleaving across writers but relies on a sequentially
//! appended ledger for the fragments of a single version.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ledgerkv_core::{Envelope, Marker};

use crate::error::Result;

/// An opaque account identity, passed through to the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account(String);

impl Account {
    /// Wrap an account name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Async interface to the append-only ledger.
///
/// All blocking in the system happens behind these methods; the protocol
/// core is pure and synchronous.
#[async_trait]
pub trait LedgerAdapter: Send + Sync {
    /// Append one envelope to the account's history.
    ///
    /// Returns the ledger position the entry landed at. No atomicity across
    /// calls: a multi-fragment write that fails partway leaves its earlier
    /// fragments on the ledger permanently.
    async fn broadcast(&self, account: &Account, envelope: &Envelope) -> Result<Marker>;

    /// Read a page of history at or after `start`, ascending by position.
    ///
    /// Never re-returns entries strictly before `start`. A page shorter
    /// than `page_limit` means the stream is drained.
    async fn history(
        &self,
        account: &Account,
        start: Marker,
        page_limit: usize,
    ) -> Result<Vec<(Marker, Envelope)>>;

    /// The position just past the newest entry.
    ///
    /// Usable as the `start` of a later read that should skip everything
    /// already on the ledger.
    async fn head(&self, account: &Account) -> Result<Marker>;
}

#[async_trait]
impl<A: LedgerAdapter + ?Sized> LedgerAdapter for std::sync::Arc<A> {
    async fn broadcast(&self, account: &Account, envelope: &Envelope) -> Result<Marker> {
        (**self).broadcast(account, envelope).await
    }

    async fn history(
        &self,
        account: &Account,
        start: Marker,
        page_limit: usize,
    ) -> Result<Vec<(Marker, Envelope)>> {
        (**self).history(account, start, page_limit).await
    }

    async fn head(&self, account: &Account) -> Result<Marker> {
        (**self).head(account).await
    }
}
