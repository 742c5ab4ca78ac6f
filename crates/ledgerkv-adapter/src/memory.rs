//! In-memory implementation of the LedgerAdapter trait.
//!
//! This is primarily for testing. It enforces the same per-entry size cap
//! a real ledger would and keeps every account's history in memory, with
//! positions starting at 1.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use ledgerkv_core::{Envelope, Marker};

use crate::error::{AdapterError, Result};
use crate::traits::{Account, LedgerAdapter};

/// An in-process append-only ledger.
///
/// Thread-safe via a mutex; all data is lost on drop.
pub struct MemoryLedger {
    limit: usize,
    inner: Mutex<MemoryLedgerInner>,
}

#[derive(Default)]
struct MemoryLedgerInner {
    /// Per-account entries; position of `entries[i]` is `i + 1`.
    accounts: HashMap<Account, Vec<Envelope>>,
    /// When set, allow this many more broadcasts before failing.
    broadcasts_before_failure: Option<usize>,
}

impl MemoryLedger {
    /// Create a ledger enforcing the given per-entry size cap.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            inner: Mutex::new(MemoryLedgerInner::default()),
        }
    }

    /// Make broadcasts start failing after `ok` more successes.
    ///
    /// Used by tests to exercise partially broadcast versions.
    pub fn fail_after(&self, ok: usize) {
        self.inner.lock().unwrap().broadcasts_before_failure = Some(ok);
    }

    /// Number of entries in an account's history.
    pub fn entry_count(&self, account: &Account) -> usize {
        self.inner
            .lock()
            .unwrap()
            .accounts
            .get(account)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl LedgerAdapter for MemoryLedger {
    async fn broadcast(&self, account: &Account, envelope: &Envelope) -> Result<Marker> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(remaining) = inner.broadcasts_before_failure {
            if remaining == 0 {
                return Err(AdapterError::Network("injected broadcast failure".into()));
            }
            inner.broadcasts_before_failure = Some(remaining - 1);
        }

        let size = envelope.encoded_len();
        if size > self.limit {
            return Err(AdapterError::Rejected(format!(
                "entry is {size} bytes, cap is {}",
                self.limit
            )));
        }

        let entries = inner.accounts.entry(account.clone()).or_default();
        entries.push(envelope.clone());
        let position = Marker::from_position(entries.len() as u64);
        debug!(%account, %position, size, "appended entry");
        Ok(position)
    }

    async fn history(
        &self,
        account: &Account,
        start: Marker,
        page_limit: usize,
    ) -> Result<Vec<(Marker, Envelope)>> {
        let inner = self.inner.lock().unwrap();
        let entries = match inner.accounts.get(account) {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        let page = entries
            .iter()
            .enumerate()
            .map(|(i, env)| (Marker::from_position(i as u64 + 1), env.clone()))
            .filter(|(pos, _)| *pos >= start)
            .take(page_limit)
            .collect();
        Ok(page)
    }

    async fn head(&self, account: &Account) -> Result<Marker> {
        let count = self.entry_count(account) as u64;
        Ok(Marker::from_position(count + 1))
    }
}
