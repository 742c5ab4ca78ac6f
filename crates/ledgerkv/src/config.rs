//! Client configuration.

use ledgerkv_adapter::Account;
use ledgerkv_core::CoreError;

use crate::error::Result;

/// Lowest accepted per-entry size cap.
pub const MIN_LIMIT: usize = 1024;
/// Highest accepted per-entry size cap.
pub const MAX_LIMIT: usize = 4096;
/// Default per-entry size cap.
pub const DEFAULT_LIMIT: usize = 4096;

/// Configuration for a [`crate::Client`].
#[derive(Debug, Clone)]
pub struct Config {
    /// The ledger account every write and read runs against. Opaque here;
    /// only the adapter interprets it.
    pub account: Account,
    /// Per-entry size cap enforced by the ledger, in bytes.
    pub limit: usize,
    /// History entries requested per adapter call.
    pub page_limit: usize,
    /// Fail on decoded items outside the closed type set, instead of
    /// downgrading them to the lossy opaque fallback.
    pub strict_decode: bool,
}

impl Config {
    /// Configuration with defaults for the given account.
    pub fn new(account: Account) -> Self {
        Self {
            account,
            limit: DEFAULT_LIMIT,
            page_limit: 1000,
            strict_decode: false,
        }
    }

    /// Set the per-entry size cap.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the history page size.
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Enable strict decoding.
    pub fn with_strict_decode(mut self, strict: bool) -> Self {
        self.strict_decode = strict;
        self
    }

    /// Validate the configuration. Fatal on failure; nothing retries this.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.limit) {
            return Err(CoreError::LimitOutOfRange(self.limit).into());
        }
        if self.page_limit == 0 {
            return Err(CoreError::InvalidConfig("page_limit must be nonzero".into()).into());
        }
        Ok(())
    }
}
