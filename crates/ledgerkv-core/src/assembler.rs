//! Assembler: regroup a history stream into complete versions.
//!
//! A read streams envelopes in ledger order. Envelopes for the wanted
//! content id are grouped by version id into buckets; a bucket is emitted
//! only once every fragment `0..total` has been observed. Buckets still
//! missing fragments at end of stream are indistinguishable from writes in
//! flight and stay suppressed. Buckets whose fragments contradict each
//! other (disagreeing totals, duplicate seq with different bytes) are
//! corruption: logged and excluded, never allowed to abort the read.

use std::collections::{BTreeMap, HashMap};

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use crate::fragment::{ContentId, Envelope, VersionId, PROTOCOL_VERSION};
use crate::marker::Marker;

/// A fully reassembled version, ready for decrypt/decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteVersion {
    /// The write this payload came from.
    pub version_id: VersionId,
    /// Ledger position of the version's final fragment.
    pub position: Marker,
    /// Whether `payload` is a sealed ciphertext.
    pub encrypted: bool,
    /// The concatenated payload bytes.
    pub payload: Bytes,
}

/// Accumulates fragments for one content id across a history scan.
pub struct Assembler {
    content_id: ContentId,
    buckets: HashMap<VersionId, Bucket>,
    arrival: u64,
}

struct Bucket {
    total: u32,
    encrypted: bool,
    fragments: BTreeMap<u32, Bytes>,
    /// Highest ledger position seen for this version.
    position: Marker,
    /// Stream observation index of the most recent fragment; breaks position
    /// ties for latest-selection.
    last_arrival: u64,
    corrupt: bool,
}

impl Assembler {
    /// Start assembling for one content id.
    pub fn new(content_id: ContentId) -> Self {
        Self {
            content_id,
            buckets: HashMap::new(),
            arrival: 0,
        }
    }

    /// Feed one history entry, in ascending ledger order.
    ///
    /// Envelopes for other content ids and envelopes from an unknown schema
    /// version are ignored.
    pub fn observe(&mut self, position: Marker, envelope: &Envelope) {
        if envelope.content_id != self.content_id {
            return;
        }
        if envelope.version != PROTOCOL_VERSION {
            warn!(
                version = envelope.version,
                version_id = %envelope.version_id,
                "skipping envelope with unknown schema version"
            );
            return;
        }

        self.arrival += 1;
        let arrival = self.arrival;

        let bucket = self
            .buckets
            .entry(envelope.version_id)
            .or_insert_with(|| Bucket {
                total: envelope.total,
                encrypted: envelope.encrypted,
                fragments: BTreeMap::new(),
                position,
                last_arrival: arrival,
                corrupt: false,
            });

        bucket.position = bucket.position.max(position);
        bucket.last_arrival = arrival;
        if bucket.corrupt {
            return;
        }

        if envelope.total != bucket.total || envelope.total == 0 {
            warn!(
                version_id = %envelope.version_id,
                declared = envelope.total,
                expected = bucket.total,
                "fragment total mismatch, excluding version"
            );
            bucket.corrupt = true;
            return;
        }
        if envelope.encrypted != bucket.encrypted {
            warn!(
                version_id = %envelope.version_id,
                "conflicting encryption flags, excluding version"
            );
            bucket.corrupt = true;
            return;
        }
        if envelope.seq >= envelope.total {
            warn!(
                version_id = %envelope.version_id,
                seq = envelope.seq,
                total = envelope.total,
                "fragment seq out of range, excluding version"
            );
            bucket.corrupt = true;
            return;
        }

        match bucket.fragments.get(&envelope.seq) {
            // Re-broadcast of the same fragment is idempotent.
            Some(existing) if *existing == envelope.payload => {}
            Some(_) => {
                warn!(
                    version_id = %envelope.version_id,
                    seq = envelope.seq,
                    "duplicate seq with differing payload, excluding version"
                );
                bucket.corrupt = true;
            }
            None => {
                bucket.fragments.insert(envelope.seq, envelope.payload.clone());
            }
        }
    }

    /// Number of versions currently tracked (including incomplete ones).
    pub fn tracked_versions(&self) -> usize {
        self.buckets.len()
    }

    /// Finish the scan and emit complete versions, ascending by position.
    ///
    /// Incomplete buckets are dropped silently; corrupt buckets were already
    /// warned about when detected.
    pub fn into_versions(self) -> Vec<CompleteVersion> {
        let mut complete = Vec::new();
        for (version_id, bucket) in self.buckets {
            if bucket.corrupt {
                continue;
            }
            if bucket.fragments.len() as u32 != bucket.total {
                debug!(
                    version_id = %version_id,
                    have = bucket.fragments.len(),
                    total = bucket.total,
                    "suppressing incomplete version"
                );
                continue;
            }

            let mut payload = BytesMut::new();
            for chunk in bucket.fragments.values() {
                payload.extend_from_slice(chunk);
            }
            complete.push((
                bucket.position,
                bucket.last_arrival,
                CompleteVersion {
                    version_id,
                    position: bucket.position,
                    encrypted: bucket.encrypted,
                    payload: payload.freeze(),
                },
            ));
        }

        complete.sort_by_key(|(position, last_arrival, _)| (*position, *last_arrival));
        complete.into_iter().map(|(_, _, v)| v).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Fragment;

    fn cid() -> ContentId {
        ContentId::new("asm-test").unwrap()
    }

    fn envelope(vid: u8, seq: u32, total: u32, payload: &[u8]) -> Envelope {
        Envelope::new(
            Fragment {
                content_id: cid(),
                version_id: VersionId::from_bytes([vid; 16]),
                seq,
                total,
                payload: Bytes::copy_from_slice(payload),
            },
            false,
        )
    }

    #[test]
    fn test_single_fragment_version() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(5), &envelope(1, 0, 1, b"hello"));

        let versions = asm.into_versions();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].payload.as_ref(), b"hello");
        assert_eq!(versions[0].position, Marker::from_position(5));
    }

    #[test]
    fn test_incomplete_version_is_suppressed() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(1), &envelope(1, 0, 3, b"aa"));
        asm.observe(Marker::from_position(2), &envelope(1, 1, 3, b"bb"));
        // seq 2 never arrives.
        assert!(asm.into_versions().is_empty());
    }

    #[test]
    fn test_out_of_order_fragments_reassemble() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(3), &envelope(1, 2, 3, b"cc"));
        asm.observe(Marker::from_position(1), &envelope(1, 0, 3, b"aa"));
        asm.observe(Marker::from_position(2), &envelope(1, 1, 3, b"bb"));

        let versions = asm.into_versions();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].payload.as_ref(), b"aabbcc");
        assert_eq!(versions[0].position, Marker::from_position(3));
    }

    #[test]
    fn test_interleaved_versions_disambiguate() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(1), &envelope(1, 0, 2, b"a1"));
        asm.observe(Marker::from_position(2), &envelope(2, 0, 2, b"b1"));
        asm.observe(Marker::from_position(3), &envelope(1, 1, 2, b"a2"));
        asm.observe(Marker::from_position(4), &envelope(2, 1, 2, b"b2"));

        let versions = asm.into_versions();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].payload.as_ref(), b"a1a2");
        assert_eq!(versions[1].payload.as_ref(), b"b1b2");
        assert!(versions[0].position < versions[1].position);
    }

    #[test]
    fn test_other_content_ids_filtered() {
        let mut asm = Assembler::new(cid());
        let mut foreign = envelope(1, 0, 1, b"not yours");
        foreign.content_id = ContentId::new("other-slot").unwrap();
        asm.observe(Marker::from_position(1), &foreign);

        assert_eq!(asm.tracked_versions(), 0);
        assert!(asm.into_versions().is_empty());
    }

    #[test]
    fn test_unknown_schema_version_skipped() {
        let mut asm = Assembler::new(cid());
        let mut env = envelope(1, 0, 1, b"future");
        env.version = PROTOCOL_VERSION + 1;
        asm.observe(Marker::from_position(1), &env);

        assert!(asm.into_versions().is_empty());
    }

    #[test]
    fn test_total_mismatch_excludes_version() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(1), &envelope(1, 0, 2, b"aa"));
        asm.observe(Marker::from_position(2), &envelope(1, 1, 3, b"bb"));
        asm.observe(Marker::from_position(3), &envelope(1, 1, 2, b"bb"));

        assert!(asm.into_versions().is_empty());
    }

    #[test]
    fn test_duplicate_identical_fragment_tolerated() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(1), &envelope(1, 0, 2, b"aa"));
        asm.observe(Marker::from_position(2), &envelope(1, 0, 2, b"aa"));
        asm.observe(Marker::from_position(3), &envelope(1, 1, 2, b"bb"));

        let versions = asm.into_versions();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].payload.as_ref(), b"aabb");
    }

    #[test]
    fn test_duplicate_differing_fragment_excludes_version() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(1), &envelope(1, 0, 2, b"aa"));
        asm.observe(Marker::from_position(2), &envelope(1, 0, 2, b"XX"));
        asm.observe(Marker::from_position(3), &envelope(1, 1, 2, b"bb"));

        assert!(asm.into_versions().is_empty());
    }

    #[test]
    fn test_corrupt_version_does_not_poison_others() {
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(1), &envelope(1, 0, 2, b"aa"));
        asm.observe(Marker::from_position(2), &envelope(1, 1, 3, b"bb"));
        asm.observe(Marker::from_position(3), &envelope(2, 0, 1, b"fine"));

        let versions = asm.into_versions();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].payload.as_ref(), b"fine");
    }

    #[test]
    fn test_conflicting_encrypted_flags_exclude() {
        let mut asm = Assembler::new(cid());
        let plain = envelope(1, 0, 2, b"aa");
        let mut sealed = envelope(1, 1, 2, b"bb");
        sealed.encrypted = true;
        asm.observe(Marker::from_position(1), &plain);
        asm.observe(Marker::from_position(2), &sealed);

        assert!(asm.into_versions().is_empty());
    }

    #[test]
    fn test_identical_position_tie_breaks_on_stream_order() {
        // Should not occur under a single writer, but the later-observed
        // final fragment must win.
        let mut asm = Assembler::new(cid());
        asm.observe(Marker::from_position(7), &envelope(1, 0, 1, b"first"));
        asm.observe(Marker::from_position(7), &envelope(2, 0, 1, b"second"));

        let versions = asm.into_versions();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions.last().unwrap().payload.as_ref(), b"second");
    }
}
