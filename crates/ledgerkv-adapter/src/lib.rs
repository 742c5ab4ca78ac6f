//! # ledgerkv Adapter
//!
//! The boundary between ledgerkv and the underlying ledger.
//!
//! The client consumes two primitives: `broadcast` appends one envelope to
//! an account's history, `history` streams envelopes back from a resumable
//! position. Everything else about the ledger (signing, transport, retry,
//! consensus, fees) lives behind implementations of [`LedgerAdapter`] and
//! is invisible to the core protocol.
//!
//! [`MemoryLedger`] is an in-process implementation with the same
//! semantics, used by tests.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{AdapterError, Result};
pub use memory::MemoryLedger;
pub use traits::{Account, LedgerAdapter};
