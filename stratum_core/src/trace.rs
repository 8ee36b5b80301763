// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the sync loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! scheduler calls as it drains dirty properties. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`PropertySync`] batches and the
//!   corresponding `TraceSink` method.

use crate::schema::KindId;
use crate::status::SyncStatus;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the host drives a tick.
#[derive(Clone, Copy, Debug)]
pub struct TickEvent {
    /// Monotonic tick counter.
    pub frame_index: u64,
    /// Whether the root had queued work when the tick began.
    pub root_queued: bool,
}

/// Emitted after one node finishes synchronizing (its own properties and,
/// for a container, both child passes).
#[derive(Clone, Copy, Debug)]
pub struct NodeSyncEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Slot index of the node.
    pub node_index: u32,
    /// Kind of the node.
    pub kind: KindId,
    /// Combined status the node reported.
    pub status: SyncStatus,
    /// Number of own properties still dirty.
    pub remaining: u32,
}

/// Emitted when a property's sync function fails.
#[derive(Clone, Copy, Debug)]
pub struct SyncFaultEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Slot index of the node.
    pub node_index: u32,
    /// Kind of the node.
    pub kind: KindId,
    /// Sync-order index of the failing property.
    pub slot: u8,
}

/// Emitted when the backend's redraw entry point is called.
#[derive(Clone, Copy, Debug)]
pub struct RenderEvent {
    /// Tick counter.
    pub frame_index: u64,
    /// Whether the redraw was requested outside the tick (e.g. by a detach).
    pub deferred: bool,
}

/// Per-tick summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick counter.
    pub frame_index: u64,
    /// Nodes whose synchronization ran.
    pub nodes_synced: u32,
    /// Property sync functions that completed.
    pub properties_synced: u32,
    /// Property sync functions that failed.
    pub faults: u32,
    /// Status the root reported.
    pub status: SyncStatus,
    /// Whether the backend redraw was called.
    pub rendered: bool,
}

/// A drained property (requires `trace-rich` feature).
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug)]
pub struct PropertySync {
    /// Sync-order index of the property.
    pub slot: u8,
    /// Status the sync function returned.
    pub status: SyncStatus,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the sync loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a tick begins.
    fn on_tick(&mut self, e: &TickEvent) {
        _ = e;
    }

    /// Called after a node synchronizes.
    fn on_node_sync(&mut self, e: &NodeSyncEvent) {
        _ = e;
    }

    /// Called when a property sync function fails.
    fn on_sync_fault(&mut self, e: &SyncFaultEvent) {
        _ = e;
    }

    /// Called when the backend redraw is issued.
    fn on_render(&mut self, e: &RenderEvent) {
        _ = e;
    }

    /// Called with the per-tick summary.
    fn on_tick_summary(&mut self, s: &TickSummary) {
        _ = s;
    }

    /// Called with the properties one node drained (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_property_syncs(&mut self, frame_index: u64, node_index: u32, syncs: &[PropertySync]) {
        _ = (frame_index, node_index, syncs);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`TickEvent`].
    #[inline]
    pub fn tick(&mut self, e: &TickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`NodeSyncEvent`].
    #[inline]
    pub fn node_sync(&mut self, e: &NodeSyncEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_sync(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SyncFaultEvent`].
    #[inline]
    pub fn sync_fault(&mut self, e: &SyncFaultEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sync_fault(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderEvent`].
    #[inline]
    pub fn render(&mut self, e: &RenderEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TickSummary`].
    #[inline]
    pub fn tick_summary(&mut self, s: &TickSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_tick_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits one node's drained properties (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn property_syncs(&mut self, frame_index: u64, node_index: u32, syncs: &[PropertySync]) {
        if let Some(s) = &mut self.sink {
            s.on_property_syncs(frame_index, node_index, syncs);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
