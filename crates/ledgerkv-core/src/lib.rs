//! # ledgerkv Core
//!
//! Pure primitives for the ledgerkv protocol: values, the wire codec,
//! fragmentation, and version assembly.
//!
//! This crate contains no I/O, no networking, no key material. It is pure
//! computation over the data that flows through a size-capped, append-only
//! ledger.
//!
//! ## Key Types
//!
//! - [`Value`] - The closed set of natively round-tripped value shapes
//! - [`ContentId`] - Caller-chosen name for one logical storage slot
//! - [`VersionId`] - Identifier shared by all fragments of one write
//! - [`Envelope`] - The wire unit actually broadcast to the ledger
//! - [`Marker`] - Resumable position in the per-account history stream
//!
//! ## Protocol
//!
//! A write encodes a [`Value`] to CBOR, optionally encrypts it, then splits
//! the bytes into [`Fragment`]s sized so every [`Envelope`] fits under the
//! ledger's per-entry cap. A read streams envelopes back, groups them by
//! [`VersionId`] in the [`assembler`], and emits only complete versions.

pub mod assembler;
pub mod chunker;
pub mod codec;
pub mod error;
pub mod fragment;
pub mod marker;
pub mod value;

pub use assembler::{Assembler, CompleteVersion};
pub use chunker::{effective_payload_size, split};
pub use codec::{decode_value, encode_value, DecodeMode};
pub use error::{CoreError, Result};
pub use fragment::{ContentId, Envelope, Fragment, VersionId, PROTOCOL_VERSION};
pub use marker::Marker;
pub use value::Value;
