// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless canvas session that exercises the tracing and diagnostics
//! pipeline.
//!
//! Builds a small scene over a [`RecordingBackend`], drives it through a few
//! ticks while recording events to both a
//! [`PrettyPrintSink`](stratum_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](stratum_debug::recorder::RecorderSink), then exports a
//! Chrome trace JSON file.
//!
//! Run with `RUST_LOG=debug` to see engine logs next to the trace lines.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use kurbo::Size;
use stratum_core::backend::RecordingBackend;
use stratum_core::canvas::{Canvas, CanvasConfig};
use stratum_core::schema::KindId;
use stratum_core::trace::{
    NodeSyncEvent, PropertySync, RenderEvent, SyncFaultEvent, TickEvent, TickSummary, TraceSink,
    Tracer,
};
use stratum_core::tree::Computed;
use stratum_core::value::Value;

use stratum_debug::pretty::PrettyPrintSink;
use stratum_debug::recorder::RecorderSink;

/// Forwards every event to two sinks.
struct Tee<'a> {
    first: &'a mut dyn TraceSink,
    second: &'a mut dyn TraceSink,
}

impl TraceSink for Tee<'_> {
    fn on_tick(&mut self, e: &TickEvent) {
        self.first.on_tick(e);
        self.second.on_tick(e);
    }

    fn on_node_sync(&mut self, e: &NodeSyncEvent) {
        self.first.on_node_sync(e);
        self.second.on_node_sync(e);
    }

    fn on_sync_fault(&mut self, e: &SyncFaultEvent) {
        self.first.on_sync_fault(e);
        self.second.on_sync_fault(e);
    }

    fn on_render(&mut self, e: &RenderEvent) {
        self.first.on_render(e);
        self.second.on_render(e);
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.first.on_tick_summary(s);
        self.second.on_tick_summary(s);
    }

    fn on_property_syncs(&mut self, frame_index: u64, node_index: u32, syncs: &[PropertySync]) {
        self.first.on_property_syncs(frame_index, node_index, syncs);
        self.second.on_property_syncs(frame_index, node_index, syncs);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // -- sinks -------------------------------------------------------------
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let mut recorder = RecorderSink::new();

    // -- scene -------------------------------------------------------------
    let mut canvas = Canvas::new(RecordingBackend::new(), CanvasConfig::new(Size::new(640.0, 480.0)));
    let root = canvas.root();

    let panel = canvas.create_with(
        KindId::CONTAINER,
        [("x", Value::from("50%")), ("y", Value::from(20)), ("padding", Value::from(8))],
    )?;
    canvas.add_child(root, panel)?;

    // Passive first: it fills whatever the active children make room for.
    let backdrop = canvas.create_with(
        KindId::RECTANGLE,
        [
            ("passive", Value::from(true)),
            ("width", Value::from("100%")),
            ("height", Value::from("100%")),
            ("color", Value::from("#202830")),
        ],
    )?;
    canvas.add_child(panel, backdrop)?;

    let label = canvas.create_with(
        KindId::RECTANGLE,
        [("width", Value::from(180)), ("height", Value::from(24)), ("color", Value::from("#e0e0e0"))],
    )?;
    canvas.add_child(panel, label)?;

    let icon = canvas.create_with(
        KindId::IMAGE,
        [("y", Value::from(32)), ("height", Value::from(48)), ("opacity", Value::from(0.8))],
    )?;
    canvas.add_child(panel, icon)?;
    canvas.register_name("icon", icon)?;

    // -- ticks -------------------------------------------------------------
    let mut tee = Tee {
        first: &mut pretty,
        second: &mut recorder,
    };

    // The image has no intrinsic size yet, so the first tick leaves work
    // behind.
    let first = canvas.tick_traced(&mut Tracer::new(&mut tee));
    log::info!("tick {}: {:?}", first.frame_index, first.status);

    if let Some(handle) = canvas.handle(icon)? {
        canvas
            .backend_mut()
            .set_intrinsic_size(handle, Size::new(64.0, 32.0));
        canvas.invalidate_intrinsic(icon)?;
    }
    let second = canvas.tick_traced(&mut Tracer::new(&mut tee));
    log::info!("tick {}: {:?}", second.frame_index, second.status);

    canvas.set(label, "width", 240)?;
    let third = canvas.tick_traced(&mut Tracer::new(&mut tee));
    log::info!("tick {}: {:?}", third.frame_index, third.status);

    canvas.resize(Size::new(800.0, 600.0));
    let fourth = canvas.tick_traced(&mut Tracer::new(&mut tee));
    log::info!("tick {}: {:?}", fourth.frame_index, fourth.status);

    // An idle tick renders nothing.
    let idle = canvas.tick_traced(&mut Tracer::new(&mut tee));
    log::info!("tick {}: rendered={}", idle.frame_index, idle.rendered);

    for (name, id) in [("panel", panel), ("backdrop", backdrop), ("icon", icon)] {
        log::info!(
            "{name}: size={:?} pos={:?}",
            canvas.computed(id, Computed::Size)?,
            canvas.computed(id, Computed::PosAbs)?,
        );
    }
    log::info!("{} backend renders", canvas.backend().render_count());

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let mut writer = BufWriter::new(File::create(path)?);
    stratum_debug::chrome::export(recorder.as_bytes(), &mut writer)?;

    println!("Wrote {path} ({} ticks)", idle.frame_index + 1);
    Ok(())
}
