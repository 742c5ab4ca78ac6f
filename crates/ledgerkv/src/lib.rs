//! # ledgerkv
//!
//! Key/value-like storage over an append-only, broadcast-based ledger with
//! a hard per-entry size cap.
//!
//! A logical write serializes a [`Value`], optionally seals it under a
//! caller-supplied key, splits the bytes into cap-sized fragments and
//! broadcasts one envelope per fragment. A read streams history back from
//! a caller-held [`Marker`], regroups fragments into complete versions and
//! returns either the latest value or the full version history.
//!
//! ## Example
//!
//! ```no_run
//! use ledgerkv::{Account, Client, Config, ContentId, Marker, MemoryLedger, Value};
//!
//! # async fn demo() -> ledgerkv::Result<()> {
//! let config = Config::new(Account::new("alice"));
//! let client = Client::new(MemoryLedger::new(config.limit), config)?;
//!
//! let cid = ContentId::new("store-integers-v1")?;
//! client.write(&cid, &Value::Int(1234567890), None).await?;
//!
//! let latest = client.read_latest(&cid, Marker::ORIGIN, None).await?;
//! assert_eq!(latest, Some(Value::Int(1234567890)));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{generate_key, Client, HistoryPage, ReadMode, ReadResult};
pub use config::{Config, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
pub use error::{ClientError, Result};

// The types callers hold.
pub use ledgerkv_adapter::{Account, AdapterError, LedgerAdapter, MemoryLedger};
pub use ledgerkv_core::{ContentId, Envelope, Marker, Value, VersionId};
pub use ledgerkv_crypto::EncryptionKey;
