// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Recordings carry no wall-clock time, so each event is stamped with its
//! ordinal in microseconds. A tick spans from its `Tick` record to its
//! summary; node syncs appear as instants on one track per node.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::pretty::status_names;
use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::Tick(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Tick",
                    "cat": "Canvas",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                        "root_queued": e.root_queued,
                    }
                }));
            }
            RecordedEvent::NodeSync(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "NodeSync",
                    "cat": "Sync",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.node_index,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "kind": e.kind.index(),
                        "status": status_names(e.status),
                        "remaining": e.remaining,
                    }
                }));
            }
            RecordedEvent::SyncFault(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "SyncFault",
                    "cat": "Sync",
                    "ts": ts,
                    "pid": 0,
                    "tid": e.node_index,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "kind": e.kind.index(),
                        "slot": e.slot,
                    }
                }));
            }
            RecordedEvent::Render(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Render",
                    "cat": "Canvas",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "deferred": e.deferred,
                    }
                }));
            }
            RecordedEvent::TickSummary(s) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Tick",
                    "cat": "Canvas",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": s.frame_index,
                        "nodes_synced": s.nodes_synced,
                        "properties_synced": s.properties_synced,
                        "faults": s.faults,
                        "status": status_names(s.status),
                        "rendered": s.rendered,
                    }
                }));
            }
            RecordedEvent::PropertySyncs {
                frame_index,
                node_index,
                syncs,
            } => {
                let slots: Vec<u8> = syncs.iter().map(|s| s.slot).collect();
                events.push(json!({
                    "ph": "i",
                    "name": "PropertySyncs",
                    "cat": "Rich",
                    "ts": ts,
                    "pid": 0,
                    "tid": node_index,
                    "s": "t",
                    "args": {
                        "frame_index": frame_index,
                        "slots": slots,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
