// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::fmt::Write as _;
use std::io::Write;

use stratum_core::status::SyncStatus;
use stratum_core::trace::{
    NodeSyncEvent, PropertySync, RenderEvent, SyncFaultEvent, TickEvent, TickSummary, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Formats a status as `|`-separated flag names, or `NOOP`.
pub(crate) fn status_names(status: SyncStatus) -> String {
    let mut out = String::new();
    for (name, _) in status.iter_names() {
        if !out.is_empty() {
            out.push('|');
        }
        out.push_str(name);
    }
    if out.is_empty() {
        out.push_str("NOOP");
    }
    out
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_tick(&mut self, e: &TickEvent) {
        let _ = writeln!(
            self.writer,
            "[tick] frame={} queued={}",
            e.frame_index, e.root_queued,
        );
    }

    fn on_node_sync(&mut self, e: &NodeSyncEvent) {
        let _ = writeln!(
            self.writer,
            "[sync] frame={} node={} kind={} status={} remaining={}",
            e.frame_index,
            e.node_index,
            e.kind.index(),
            status_names(e.status),
            e.remaining,
        );
    }

    fn on_sync_fault(&mut self, e: &SyncFaultEvent) {
        let _ = writeln!(
            self.writer,
            "[fault] frame={} node={} kind={} slot={}",
            e.frame_index,
            e.node_index,
            e.kind.index(),
            e.slot,
        );
    }

    fn on_render(&mut self, e: &RenderEvent) {
        let _ = writeln!(
            self.writer,
            "[render] frame={}{}",
            e.frame_index,
            if e.deferred { " (deferred)" } else { "" },
        );
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} nodes={} properties={} faults={} status={} rendered={}",
            s.frame_index,
            s.nodes_synced,
            s.properties_synced,
            s.faults,
            status_names(s.status),
            s.rendered,
        );
    }

    fn on_property_syncs(&mut self, frame_index: u64, node_index: u32, syncs: &[PropertySync]) {
        let mut slots = String::new();
        for sync in syncs {
            if !slots.is_empty() {
                slots.push(',');
            }
            let _ = write!(slots, "{}", sync.slot);
            if sync.status.is_unfinished() {
                slots.push('*');
            }
        }
        let _ = writeln!(
            self.writer,
            "[props] frame={frame_index} node={node_index} slots={slots}",
        );
    }
}
