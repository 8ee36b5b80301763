// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered, multi-pass synchronization.
//!
//! Synchronizing a node drains its dirty properties in sync order. Each pass
//! walks the live dirty set in ascending order, so a property dirtied by an
//! earlier sync function in the same pass is still picked up. Passes repeat
//! until one makes no progress.
//!
//! A container then runs its children in two phases:
//!
//! ```text
//!   own properties
//!        │
//!        ▼
//!   pass 1: queued active children ── geometry changed and auto size?
//!        │                                 │ yes: dirty own size and
//!        │                                 │      every passive child's size
//!        ▼                                 ▼
//!   own properties again (if dirty) ◄──────┘
//!        │
//!        ▼
//!   pass 2: queued passive children
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Bound;

use kurbo::{Point, Size};

use super::cache::{Computed, Resolved};
use super::id::NodeId;
use super::store::Tree;
use crate::backend::{Backend, HandleId};
use crate::canvas::CanvasConfig;
use crate::color::Color;
use crate::schema::{Intrinsic, Schema, SyncGate};
use crate::status::SyncStatus;
use crate::trace::{NodeSyncEvent, SyncFaultEvent, Tracer};
use crate::value::Value;

/// Context handed to a property sync function.
///
/// Gives access to the node's raw values and cache, the values its parent
/// offers it, and deduplicated backend pushes.
pub struct SyncCx<'a> {
    pub(crate) tree: &'a mut Tree,
    pub(crate) backend: &'a mut dyn Backend,
    pub(crate) idx: u32,
    pub(crate) property: &'static str,
}

impl core::fmt::Debug for SyncCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyncCx")
            .field("idx", &self.idx)
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

impl SyncCx<'_> {
    /// The node being synchronized.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.tree.id_at(self.idx)
    }

    /// The property being synchronized.
    #[must_use]
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Raw value of a synchronized property of this node.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.tree.raw_at(self.idx, name)
    }

    /// Current cached value.
    #[must_use]
    pub fn cached(&self, key: Computed) -> Option<&Resolved> {
        self.tree.cache[self.idx as usize].get(key)
    }

    /// Value snapshotted when `key` was last evicted.
    #[must_use]
    pub fn last(&self, key: Computed) -> Option<&Resolved> {
        self.tree.cache[self.idx as usize].last(key)
    }

    /// Caches a resolved value.
    pub fn store(&mut self, key: Computed, value: Resolved) {
        self.tree.cache[self.idx as usize].insert(key, value);
    }

    /// Caches a resolved value and reports whether it differs from the
    /// value snapshotted at eviction.
    pub fn store_changed(&mut self, key: Computed, value: Resolved) -> bool {
        let cache = &mut self.tree.cache[self.idx as usize];
        let changed = cache.last(key) != Some(&value);
        cache.insert(key, value);
        changed
    }

    /// A value this node's parent offers it, if it has a parent.
    #[must_use]
    pub fn from_parent(&self, key: Computed) -> Option<&Resolved> {
        let p = self.tree.parent_of(self.idx)?;
        self.tree.computed_for_child(p, self.idx, key)
    }

    /// Returns `true` if this node is the canvas root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.idx == self.tree.canvas
    }

    /// Returns `true` if this node is attached under the canvas.
    #[must_use]
    pub fn is_rooted(&self) -> bool {
        self.tree.rooted[self.idx as usize]
    }

    /// The box this node resolves percentages against.
    #[must_use]
    pub fn extents(&self) -> Size {
        self.tree.extents_of(self.idx)
    }

    /// Which size axes fall back to content.
    #[must_use]
    pub fn auto_axes(&self) -> (bool, bool) {
        self.tree.auto_axes(self.idx)
    }

    /// Canvas configuration.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.tree.config
    }

    /// Natural content size for this node's kind.
    #[must_use]
    pub fn intrinsic_size(&self) -> Size {
        match self.tree.schema_at(self.idx).intrinsic() {
            Intrinsic::Empty => Size::ZERO,
            Intrinsic::Backend => self
                .handle()
                .map_or(Size::ZERO, |h| self.backend.intrinsic_size(h)),
            Intrinsic::Children => self.tree.children_extent(self.idx),
        }
    }

    /// Dirties another property of this node. Unknown names are ignored.
    ///
    /// Nothing cascades: a sync function that changes an absolute value
    /// dirties the children itself with [`SyncCx::dirty_every_child`].
    pub fn dirty(&mut self, name: &str) {
        if let Some(slot) = self.tree.schema_at(self.idx).slot(name) {
            self.tree.dirty_slot(self.idx, slot, false);
        }
    }

    /// Dirties properties of every active (or every passive) child.
    pub fn dirty_children(&mut self, passive: bool, names: &[&str]) {
        for c in self.tree.child_indices(self.idx) {
            if self.tree.is_passive(c) == passive {
                self.tree.dirty_names(c, names);
            }
        }
    }

    /// Dirties one property of every child.
    pub fn dirty_every_child(&mut self, name: &str) {
        for c in self.tree.child_indices(self.idx) {
            self.tree.dirty_names(c, &[name]);
        }
    }

    /// Registers `name` for this node in the canvas name registry.
    pub fn register_name(&mut self, name: String) {
        let id = self.node();
        self.tree.register_name(name, id);
    }

    /// Removes `name` from the registry if it points at this node.
    pub fn unregister_name(&mut self, name: &str) {
        let id = self.node();
        self.tree.unregister_name_for(name, id);
    }

    // -- Backend pushes --

    /// The node's backend handle, if attached.
    #[must_use]
    pub fn handle(&self) -> Option<HandleId> {
        self.tree.handle[self.idx as usize]
    }

    /// Moves the drawable. Returns `true` if a call was made.
    pub fn push_move(&mut self, pos: Point) -> bool {
        let Some(h) = self.handle() else {
            return false;
        };
        let pushed = &mut self.tree.pushed[self.idx as usize];
        if pushed.pos == Some(pos) {
            return false;
        }
        pushed.pos = Some(pos);
        self.backend.move_to(h, pos);
        true
    }

    /// Resizes the drawable. Returns `true` if a call was made.
    pub fn push_resize(&mut self, size: Size) -> bool {
        let Some(h) = self.handle() else {
            return false;
        };
        let pushed = &mut self.tree.pushed[self.idx as usize];
        if pushed.size == Some(size) {
            return false;
        }
        pushed.size = Some(size);
        self.backend.resize(h, size);
        true
    }

    /// Sets the drawable's color. Returns `true` if a call was made.
    pub fn push_color(&mut self, color: Color) -> bool {
        let Some(h) = self.handle() else {
            return false;
        };
        let pushed = &mut self.tree.pushed[self.idx as usize];
        if pushed.color == Some(color) {
            return false;
        }
        pushed.color = Some(color);
        self.backend.set_color(h, color);
        true
    }

    /// Shows or hides the drawable. Returns `true` if a call was made.
    pub fn push_shown(&mut self, shown: bool) -> bool {
        let Some(h) = self.handle() else {
            return false;
        };
        let pushed = &mut self.tree.pushed[self.idx as usize];
        if pushed.shown == Some(shown) {
            return false;
        }
        pushed.shown = Some(shown);
        if shown {
            self.backend.show(h);
        } else {
            self.backend.hide(h);
        }
        true
    }
}

impl Tree {
    /// Synchronizes one node and, for a container, its queued children.
    ///
    /// # Panics
    ///
    /// Panics if the node is already synchronizing.
    pub(crate) fn synchronize(
        &mut self,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        idx: u32,
    ) -> SyncStatus {
        let i = idx as usize;
        assert!(!self.syncing[i], "node {idx} is already synchronizing");
        self.syncing[i] = true;
        self.queued[i] = false;

        let schema = self.schema_at(idx);
        let size_before = self.size_snapshot(idx);

        let mut status = self.run_own(backend, tracer, idx, &schema);
        if schema.is_container() {
            status |= self.sync_children(backend, tracer, idx, &schema);
        }
        if self.size_snapshot(idx) != size_before {
            status |= SyncStatus::SIZE_CHANGED;
        }

        let remaining = self.dirty[i].len();
        let unfinished = remaining > 0 || !self.queued_children[i].is_empty();
        status.set(SyncStatus::NOT_FINISHED, unfinished);
        self.queued[i] = unfinished;
        self.syncing[i] = false;

        self.stats.nodes_synced += 1;
        log::trace!(
            "synchronized {} node {idx}: {status:?}, {remaining} dirty",
            schema.name()
        );
        tracer.node_sync(&NodeSyncEvent {
            frame_index: self.frame_index,
            node_index: idx,
            kind: self.kind[i],
            status,
            remaining: u32::try_from(remaining).unwrap_or(u32::MAX),
        });
        status
    }

    /// Drains the node's own dirty properties.
    fn run_own(
        &mut self,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        idx: u32,
        schema: &Schema,
    ) -> SyncStatus {
        let i = idx as usize;
        let mut status = SyncStatus::NOOP;
        #[cfg(feature = "trace-rich")]
        let mut drained = Vec::new();

        let mut passes = 0;
        while !self.dirty[i].is_empty() {
            if passes == self.config.max_sync_iterations {
                log::warn!(
                    "{} node {idx} still has {} dirty properties after {passes} passes",
                    schema.name(),
                    self.dirty[i].len()
                );
                break;
            }
            passes += 1;

            let mut progress = false;
            let mut cursor = Bound::Unbounded;
            while let Some(slot) = self.dirty[i].range((cursor, Bound::Unbounded)).next().copied() {
                cursor = Bound::Excluded(slot);
                let def = schema.property(slot);
                if def.gate == SyncGate::Handle && self.handle[i].is_none() {
                    continue;
                }

                let mut cx = SyncCx {
                    tree: self,
                    backend: &mut *backend,
                    idx,
                    property: def.name,
                };
                match (def.sync)(&mut cx) {
                    Ok(s) => {
                        status |= s.difference(SyncStatus::NOT_FINISHED);
                        if !s.is_unfinished() {
                            self.dirty[i].remove(&slot);
                            self.stats.properties_synced += 1;
                            progress = true;
                        }
                        #[cfg(feature = "trace-rich")]
                        drained.push(crate::trace::PropertySync { slot, status: s });
                    }
                    Err(e) => {
                        log::warn!(
                            "sync of `{}` on {} node {idx} failed: {e}",
                            def.name,
                            schema.name()
                        );
                        self.stats.faults += 1;
                        tracer.sync_fault(&SyncFaultEvent {
                            frame_index: self.frame_index,
                            node_index: idx,
                            kind: self.kind[i],
                            slot,
                        });
                    }
                }
            }
            if !progress {
                break;
            }
        }

        #[cfg(feature = "trace-rich")]
        if !drained.is_empty() {
            tracer.property_syncs(self.frame_index, idx, &drained);
        }

        if !self.dirty[i].is_empty() {
            status |= SyncStatus::NOT_FINISHED;
        }
        status
    }

    /// Runs the two child passes of a container.
    fn sync_children(
        &mut self,
        backend: &mut dyn Backend,
        tracer: &mut Tracer<'_>,
        idx: u32,
        schema: &Schema,
    ) -> SyncStatus {
        let i = idx as usize;
        let mut status = SyncStatus::NOOP;

        // Pass 1: active children.
        let mut geometry = false;
        for c in self.queued_in_order(idx, false) {
            let s = self.synchronize(backend, tracer, c);
            status |= s & SyncStatus::NEEDS_RENDER;
            geometry |= s.intersects(SyncStatus::GEOMETRY);
        }
        if geometry && self.has_auto_axis(idx) {
            if let Some(slot) = schema.slot("size") {
                self.dirty_slot(idx, slot, true);
            }
            for c in self.child_indices(idx) {
                if !self.is_passive(c) {
                    continue;
                }
                if let Some(slot) = self.schema_at(c).slot("size") {
                    self.dirty_slot(c, slot, true);
                }
            }
        }

        // Settle own size before passive children read it.
        if !self.dirty[i].is_empty() {
            let s = self.run_own(backend, tracer, idx, schema);
            status |= s.difference(SyncStatus::NOT_FINISHED);
        }

        // Pass 2: passive children.
        for c in self.queued_in_order(idx, true) {
            let s = self.synchronize(backend, tracer, c);
            status |= s & SyncStatus::NEEDS_RENDER;
        }

        let queued = &self.queued;
        self.queued_children[i].retain(|c| queued[*c as usize]);
        status
    }

    /// Queued children of `idx` with the given passive flag, in child order.
    fn queued_in_order(&self, idx: u32, passive: bool) -> Vec<u32> {
        let set = &self.queued_children[idx as usize];
        self.child_indices(idx)
            .into_iter()
            .filter(|c| set.contains(c) && self.queued[*c as usize] && self.is_passive(*c) == passive)
            .collect()
    }

    /// Runs the named properties of one node if they are dirty, outside the
    /// scheduler. Used to push a hide before a handle is released.
    pub(crate) fn sync_properties(&mut self, backend: &mut dyn Backend, idx: u32, names: &[&str]) {
        let i = idx as usize;
        let schema = self.schema_at(idx);
        for name in names {
            let Some(slot) = schema.slot(name) else {
                continue;
            };
            if !self.dirty[i].contains(&slot) {
                continue;
            }
            let def = schema.property(slot);
            if def.gate == SyncGate::Handle && self.handle[i].is_none() {
                continue;
            }
            let mut cx = SyncCx {
                tree: self,
                backend: &mut *backend,
                idx,
                property: def.name,
            };
            match (def.sync)(&mut cx) {
                Ok(s) if !s.is_unfinished() => {
                    self.dirty[i].remove(&slot);
                }
                Ok(_) => {}
                Err(e) => log::warn!("sync of `{}` on {} node {idx} failed: {e}", def.name, schema.name()),
            }
        }
    }

    /// Dirties the named properties of `idx` without cascading.
    fn dirty_names(&mut self, idx: u32, names: &[&str]) {
        let schema = self.schema_at(idx);
        for name in names {
            if let Some(slot) = schema.slot(name) {
                self.dirty_slot(idx, slot, false);
            }
        }
    }

    fn size_snapshot(&self, idx: u32) -> Option<Size> {
        self.cache[idx as usize]
            .current_or_last(Computed::Size)
            .and_then(Resolved::as_size)
    }
}
