//! Chunker: cut a payload into fragments that fit under the ledger cap.
//!
//! The ledger rejects any entry over the configured limit, and the limit
//! applies to the whole serialized envelope, not just the payload slice. So
//! the room actually available per fragment is measured, not guessed: a
//! probe envelope with worst-case metadata and a cap-sized payload is
//! serialized once, and whatever it costs beyond the payload is the
//! overhead every real fragment must reserve.

use bytes::Bytes;

use crate::error::{CoreError, Result};
use crate::fragment::{ContentId, Envelope, Fragment, VersionId, PROTOCOL_VERSION};

/// Payload bytes available per fragment once envelope overhead is reserved.
///
/// Fails if the metadata alone eats the whole limit (pathologically long
/// content ids).
pub fn effective_payload_size(
    limit: usize,
    content_id: &ContentId,
    version_id: &VersionId,
) -> Result<usize> {
    // Worst-case fields: maximal seq/total widths and a payload long enough
    // to need the widest CBOR length header the limit allows.
    let probe = Envelope {
        version: PROTOCOL_VERSION,
        content_id: content_id.clone(),
        version_id: *version_id,
        seq: u32::MAX,
        total: u32::MAX,
        encrypted: true,
        payload: Bytes::from(vec![0u8; limit]),
    };
    let overhead = probe.encoded_len() - limit;
    if overhead >= limit {
        return Err(CoreError::NoPayloadRoom { limit, overhead });
    }
    Ok(limit - overhead)
}

/// Split a payload into an ordered run of fragments.
///
/// Deterministic: the same payload, ids and limit always produce the same
/// fragmentation. Every fragment holds `effective_payload_size` bytes
/// except the last; an empty payload still produces one (empty) fragment
/// so the write is observable on the ledger.
pub fn split(
    content_id: &ContentId,
    version_id: VersionId,
    payload: &[u8],
    limit: usize,
) -> Result<Vec<Fragment>> {
    let chunk = effective_payload_size(limit, content_id, &version_id)?;

    let total = payload.len().div_ceil(chunk).max(1);
    let total = u32::try_from(total)
        .map_err(|_| CoreError::EncodingError(format!("payload needs {total} fragments")))?;

    let mut fragments = Vec::with_capacity(total as usize);
    if payload.is_empty() {
        fragments.push(Fragment {
            content_id: content_id.clone(),
            version_id,
            seq: 0,
            total,
            payload: Bytes::new(),
        });
        return Ok(fragments);
    }

    for (seq, slice) in payload.chunks(chunk).enumerate() {
        fragments.push(Fragment {
            content_id: content_id.clone(),
            version_id,
            seq: seq as u32,
            total,
            payload: Bytes::copy_from_slice(slice),
        });
    }
    Ok(fragments)
}
