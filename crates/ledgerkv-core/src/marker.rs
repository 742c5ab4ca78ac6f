//! Marker: a resumable position in the per-account history stream.
//!
//! Markers are opaque to callers but totally ordered by ledger emission
//! order. The core never stores one; the caller records the marker after a
//! read and threads it into the next, so repeated reads skip everything
//! already consumed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in an account's append-only history.
///
/// Reading from a marker never re-returns entries strictly before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Marker(u64);

impl Marker {
    /// The very start of history.
    pub const ORIGIN: Self = Self(0);

    /// Create from a raw ledger position.
    pub const fn from_position(pos: u64) -> Self {
        Self(pos)
    }

    /// The raw ledger position.
    pub const fn position(&self) -> u64 {
        self.0
    }

    /// The marker just past this one; resuming here skips this entry.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
