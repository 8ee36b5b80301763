// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attaching, detaching, and destroying nodes.
//!
//! Attaching a node gives it a fresh resolution context: every property of
//! every node in the subtree is dirtied, and if the new parent is rooted each
//! node gets a backend handle. Detaching forces the subtree hidden, pushes
//! the hide, then releases the handles.

use alloc::sync::Arc;

use super::cache::{Computed, Resolved};
use super::id::{INVALID, NodeId};
use super::store::{Pushed, Tree};
use crate::backend::Backend;
use crate::dirty::Cascade;
use crate::error::TreeError;
use crate::schema::KindId;

impl Tree {
    /// Creates the canvas root: rooted, with a handle, fully dirty.
    pub(crate) fn create_root(&mut self, backend: &mut dyn Backend) -> NodeId {
        debug_assert!(self.canvas == INVALID, "the canvas root already exists");
        let schema = Arc::clone(&self.schemas[usize::from(KindId::CANVAS.0)]);
        let id = self.alloc(KindId::CANVAS, &schema);
        let i = id.idx as usize;
        self.canvas = id.idx;
        self.rooted[i] = true;
        self.handle[i] = Some(backend.create_handle(KindId::CANVAS));
        self.dirty_all(id.idx);
        self.request_sync(id.idx);
        id
    }

    /// Adopts `child` into `parent`, appended or before `before`.
    pub(crate) fn attach(
        &mut self,
        backend: &mut dyn Backend,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;
        let p = parent.idx;
        let c = child.idx;
        if c == self.canvas {
            return Err(TreeError::RootImmutable);
        }
        if !self.schema_at(p).is_container() {
            return Err(TreeError::NotAContainer(parent));
        }
        if self.parent[c as usize] != INVALID {
            return Err(TreeError::AlreadyParented(child));
        }
        if self.is_ancestor_or_self(c, p) {
            return Err(TreeError::WouldCycle(child));
        }
        let before = match before {
            Some(s) => {
                self.check(s)?;
                if self.parent[s.idx as usize] != p {
                    return Err(TreeError::NotAChild(s));
                }
                Some(s.idx)
            }
            None => None,
        };

        self.link(p, c, before);
        for cascade in Cascade::ALL {
            let _ = self.cascade.add_dependency(c, p, cascade.channel());
        }
        if let Some(slot) = self.schema_at(p).slot("size") {
            self.dirty_slot(p, slot, true);
        }

        let subtree = self.subtree(c);
        if self.rooted[p as usize] {
            for &n in &subtree {
                let i = n as usize;
                self.rooted[i] = true;
                self.handle[i] = Some(backend.create_handle(self.kind[i]));
                self.pushed[i] = Pushed::default();
            }
        }
        for &n in &subtree {
            self.dirty_all(n);
        }
        self.queued[c as usize] = false;
        self.request_sync(c);

        log::debug!(
            "attached {child:?} to {parent:?} ({} nodes, rooted: {})",
            subtree.len(),
            self.rooted[p as usize]
        );
        Ok(())
    }

    /// Removes `child` from its parent, hides it, and releases its handles.
    pub(crate) fn detach(&mut self, backend: &mut dyn Backend, child: NodeId) -> Result<(), TreeError> {
        self.check(child)?;
        let c = child.idx;
        if c == self.canvas {
            return Err(TreeError::RootImmutable);
        }
        let Some(p) = self.parent_of(c) else {
            return Ok(());
        };

        self.unlink(c);
        for cascade in Cascade::ALL {
            self.cascade.remove_dependency(c, p, cascade.channel());
        }
        self.queued_children[p as usize].remove(&c);
        self.queued[c as usize] = false;
        if let Some(slot) = self.schema_at(p).slot("size") {
            self.dirty_slot(p, slot, true);
        }

        let subtree = self.subtree(c);
        for &n in &subtree {
            self.rooted[n as usize] = false;
            self.unregister_names_of(n);
        }

        // With no parent, visible-abs resolves to false. Push it while the
        // handles still exist.
        if let Some(slot) = self.schema_at(c).slot("display") {
            self.dirty_slot(c, slot, true);
        }
        for &n in &subtree {
            if self.handle[n as usize].is_some() {
                self.sync_properties(backend, n, &["display", "visible"]);
            }
        }
        self.redraw_requested = true;

        let mut released = 0_usize;
        for &n in &subtree {
            let i = n as usize;
            if let Some(h) = self.handle[i].take() {
                backend.release_handle(h);
                released += 1;
            }
            self.pushed[i] = Pushed::default();
        }

        log::debug!("detached {child:?} ({released} handles released)");
        Ok(())
    }

    /// Destroys `id` and its whole subtree.
    pub(crate) fn destroy(&mut self, backend: &mut dyn Backend, id: NodeId) -> Result<(), TreeError> {
        self.check(id)?;
        if id.idx == self.canvas {
            return Err(TreeError::RootImmutable);
        }
        self.detach(backend, id)?;

        let subtree = self.subtree(id.idx);
        for &n in subtree.iter().rev() {
            let node = self.id_at(n);
            self.names.retain(|_, v| *v != node);
            if let Some(p) = self.parent_of(n) {
                self.unlink(n);
                for cascade in Cascade::ALL {
                    self.cascade.remove_dependency(n, p, cascade.channel());
                }
            }
            if let Some(h) = self.handle[n as usize].take() {
                backend.release_handle(h);
            }
            self.free(n);
        }

        log::debug!("destroyed {id:?} ({} nodes)", subtree.len());
        Ok(())
    }

    /// Drops the registry entry of the node in slot `n`, and dirties its
    /// `name` so it registers again once re-rooted.
    fn unregister_names_of(&mut self, n: u32) {
        let id = self.id_at(n);
        let name = match self.cache[n as usize].current_or_last(Computed::Name) {
            Some(Resolved::Name(Some(name))) => Some(name.clone()),
            _ => None,
        };
        if let Some(name) = name {
            self.unregister_name_for(&name, id);
        }
        if let Some(slot) = self.schema_at(n).slot("name") {
            self.dirty_slot(n, slot, false);
        }
    }
}
