// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, each led by a one-byte tag. [`decode`]
//! reads them back as an iterator of [`RecordedEvent`].
//!
//! Property syncs are variable-length: a `u32` count followed by one
//! `(slot, status)` byte pair per property.

use stratum_core::schema::KindId;
use stratum_core::status::SyncStatus;
use stratum_core::trace::{
    NodeSyncEvent, PropertySync, RenderEvent, SyncFaultEvent, TickEvent, TickSummary, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_TICK: u8 = 1;
const TAG_NODE_SYNC: u8 = 2;
const TAG_SYNC_FAULT: u8 = 3;
const TAG_RENDER: u8 = 4;
const TAG_TICK_SUMMARY: u8 = 5;
const TAG_PROPERTY_SYNCS: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_status(&mut self, s: SyncStatus) {
        self.write_u8(s.bits());
    }

    fn write_kind(&mut self, k: KindId) {
        self.write_u16(k.index());
    }
}

impl TraceSink for RecorderSink {
    fn on_tick(&mut self, e: &TickEvent) {
        self.write_u8(TAG_TICK);
        self.write_u64(e.frame_index);
        self.write_bool(e.root_queued);
    }

    fn on_node_sync(&mut self, e: &NodeSyncEvent) {
        self.write_u8(TAG_NODE_SYNC);
        self.write_u64(e.frame_index);
        self.write_u32(e.node_index);
        self.write_kind(e.kind);
        self.write_status(e.status);
        self.write_u32(e.remaining);
    }

    fn on_sync_fault(&mut self, e: &SyncFaultEvent) {
        self.write_u8(TAG_SYNC_FAULT);
        self.write_u64(e.frame_index);
        self.write_u32(e.node_index);
        self.write_kind(e.kind);
        self.write_u8(e.slot);
    }

    fn on_render(&mut self, e: &RenderEvent) {
        self.write_u8(TAG_RENDER);
        self.write_u64(e.frame_index);
        self.write_bool(e.deferred);
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.write_u8(TAG_TICK_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.nodes_synced);
        self.write_u32(s.properties_synced);
        self.write_u32(s.faults);
        self.write_status(s.status);
        self.write_bool(s.rendered);
    }

    fn on_property_syncs(&mut self, frame_index: u64, node_index: u32, syncs: &[PropertySync]) {
        self.write_u8(TAG_PROPERTY_SYNCS);
        self.write_u64(frame_index);
        self.write_u32(node_index);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "a node has at most 256 properties"
        )]
        self.write_u32(syncs.len() as u32);
        for sync in syncs {
            self.write_u8(sync.slot);
            self.write_status(sync.status);
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`TickEvent`].
    Tick(TickEvent),
    /// A [`NodeSyncEvent`].
    NodeSync(NodeSyncEvent),
    /// A [`SyncFaultEvent`].
    SyncFault(SyncFaultEvent),
    /// A [`RenderEvent`].
    Render(RenderEvent),
    /// A [`TickSummary`].
    TickSummary(TickSummary),
    /// The properties one node drained.
    PropertySyncs {
        /// Tick counter.
        frame_index: u64,
        /// Slot index of the node.
        node_index: u32,
        /// Drained properties, in sync order.
        syncs: Vec<PropertySync>,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|b| b != 0)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.take().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_status(&mut self) -> Option<SyncStatus> {
        self.read_u8().map(SyncStatus::from_bits_truncate)
    }

    fn read_kind(&mut self) -> Option<KindId> {
        self.read_u16().map(KindId::from_index)
    }

    fn decode_tick(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Tick(TickEvent {
            frame_index: self.read_u64()?,
            root_queued: self.read_bool()?,
        }))
    }

    fn decode_node_sync(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodeSync(NodeSyncEvent {
            frame_index: self.read_u64()?,
            node_index: self.read_u32()?,
            kind: self.read_kind()?,
            status: self.read_status()?,
            remaining: self.read_u32()?,
        }))
    }

    fn decode_sync_fault(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SyncFault(SyncFaultEvent {
            frame_index: self.read_u64()?,
            node_index: self.read_u32()?,
            kind: self.read_kind()?,
            slot: self.read_u8()?,
        }))
    }

    fn decode_render(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Render(RenderEvent {
            frame_index: self.read_u64()?,
            deferred: self.read_bool()?,
        }))
    }

    fn decode_tick_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::TickSummary(TickSummary {
            frame_index: self.read_u64()?,
            nodes_synced: self.read_u32()?,
            properties_synced: self.read_u32()?,
            faults: self.read_u32()?,
            status: self.read_status()?,
            rendered: self.read_bool()?,
        }))
    }

    fn decode_property_syncs(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let node_index = self.read_u32()?;
        let count = self.read_u32()?;
        // Each record is two bytes; reject counts the buffer cannot hold.
        if (count as usize).checked_mul(2)? > self.data.len() - self.pos {
            return None;
        }
        let mut syncs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            syncs.push(PropertySync {
                slot: self.read_u8()?,
                status: self.read_status()?,
            });
        }
        Some(RecordedEvent::PropertySyncs {
            frame_index,
            node_index,
            syncs,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_TICK => self.decode_tick(),
            TAG_NODE_SYNC => self.decode_node_sync(),
            TAG_SYNC_FAULT => self.decode_sync_fault(),
            TAG_RENDER => self.decode_render(),
            TAG_TICK_SUMMARY => self.decode_tick_summary(),
            TAG_PROPERTY_SYNCS => self.decode_property_syncs(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node_sync() -> NodeSyncEvent {
        NodeSyncEvent {
            frame_index: 3,
            node_index: 12,
            kind: KindId::CONTAINER,
            status: SyncStatus::NEEDS_RENDER | SyncStatus::NOT_FINISHED,
            remaining: 2,
        }
    }

    fn sample_summary() -> TickSummary {
        TickSummary {
            frame_index: 3,
            nodes_synced: 5,
            properties_synced: 41,
            faults: 1,
            status: SyncStatus::NEEDS_RENDER,
            rendered: true,
        }
    }

    #[test]
    fn node_sync_keeps_kind_and_status() {
        let mut rec = RecorderSink::new();
        let orig = sample_node_sync();
        rec.on_node_sync(&orig);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 1, "one record in, one event out");
        match &events[0] {
            RecordedEvent::NodeSync(e) => {
                assert_eq!(e.frame_index, 3, "frame index");
                assert_eq!(e.node_index, 12, "node index");
                assert_eq!(e.kind, KindId::CONTAINER, "kind");
                assert!(e.status.is_unfinished(), "unfinished bit survives");
                assert_eq!(e.status, orig.status, "status bits");
                assert_eq!(e.remaining, 2, "remaining");
            }
            other => panic!("expected NodeSync, got {other:?}"),
        }
    }

    #[test]
    fn property_syncs_keep_every_record() {
        let mut rec = RecorderSink::new();
        let syncs = [
            PropertySync {
                slot: 0,
                status: SyncStatus::NEEDS_RENDER,
            },
            PropertySync {
                slot: 6,
                status: SyncStatus::SIZE_CHANGED | SyncStatus::NEEDS_RENDER,
            },
        ];
        rec.on_property_syncs(9, 4, &syncs);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::PropertySyncs {
                frame_index: 9,
                node_index: 4,
                syncs: decoded,
            }] => {
                let slots: Vec<u8> = decoded.iter().map(|s| s.slot).collect();
                assert_eq!(slots, [0, 6], "slots in sync order");
                assert_eq!(decoded[1].status, syncs[1].status, "status bits");
            }
            other => panic!("expected one PropertySyncs, got {other:?}"),
        }
    }

    #[test]
    fn a_tick_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_tick(&TickEvent {
            frame_index: 3,
            root_queued: true,
        });
        rec.on_node_sync(&sample_node_sync());
        rec.on_sync_fault(&SyncFaultEvent {
            frame_index: 3,
            node_index: 12,
            kind: KindId::CONTAINER,
            slot: 4,
        });
        rec.on_render(&RenderEvent {
            frame_index: 3,
            deferred: false,
        });
        rec.on_tick_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5, "all five records decode");
        assert!(
            matches!(events[0], RecordedEvent::Tick(TickEvent { root_queued: true, .. })),
            "tick first"
        );
        assert!(
            matches!(events[2], RecordedEvent::SyncFault(SyncFaultEvent { slot: 4, .. })),
            "fault keeps its slot"
        );
        assert!(
            matches!(events[3], RecordedEvent::Render(RenderEvent { deferred: false, .. })),
            "render"
        );
        match &events[4] {
            RecordedEvent::TickSummary(s) => assert_eq!(*s, sample_summary(), "summary"),
            other => panic!("expected TickSummary, got {other:?}"),
        }
    }

    #[test]
    fn truncated_buffer_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_render(&RenderEvent {
            frame_index: 1,
            deferred: true,
        });
        rec.on_tick_summary(&sample_summary());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];

        let events: Vec<_> = decode(cut).collect();
        assert_eq!(events.len(), 1, "only the complete record decodes");
    }

    #[test]
    fn oversized_property_count_is_rejected() {
        let mut bytes = vec![TAG_PROPERTY_SYNCS];
        bytes.extend_from_slice(&1_u64.to_le_bytes());
        bytes.extend_from_slice(&0_u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(decode(&bytes).count(), 0, "bogus count must not allocate");
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_render(&RenderEvent {
            frame_index: 1,
            deferred: false,
        });
        let mut bytes = rec.into_bytes();
        bytes.push(0xFF);
        bytes.extend_from_slice(&[0; 16]);
        assert_eq!(decode(&bytes).count(), 1, "decoding stops at the bad tag");
    }
}
