// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw property storage and dirty marking.
//!
//! `set` runs the kind's setter, stores the value if it differs from the
//! stored one, and dirties the property. Dirtying is idempotent: it evicts
//! the property's cached values (snapshotting them as `last`), pushes the
//! cascade to descendants if the property has one, and requests
//! synchronization up the parent chain.

use alloc::vec::Vec;

use understory_dirty::EagerPolicy;

use super::id::{INVALID, NodeId};
use super::store::Tree;
use crate::dirty::Cascade;
use crate::error::PropertyError;
use crate::schema::Slot;
use crate::value::Value;

/// Context handed to a property setter.
///
/// A setter validates and normalizes the incoming value. A pseudo-property
/// setter rewrites a synchronized property through [`SetCx::set`] instead.
#[derive(Debug)]
pub struct SetCx<'a> {
    pub(crate) tree: &'a mut Tree,
    pub(crate) idx: u32,
    pub(crate) property: &'static str,
}

impl SetCx<'_> {
    /// Name the caller set.
    #[must_use]
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// The node being mutated.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.tree.id_at(self.idx)
    }

    /// Current raw value of a synchronized property of this node.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.tree.raw_at(self.idx, name)
    }

    /// Sets another property of this node through the generic path.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        self.tree.set_at(self.idx, name, value)
    }

    /// Dirties a property of this node's parent, if it has one and the
    /// property exists there.
    pub fn dirty_parent(&mut self, name: &str) {
        if let Some(p) = self.tree.parent_of(self.idx) {
            if let Some(slot) = self.tree.schema_at(p).slot(name) {
                self.tree.dirty_slot(p, slot, true);
            }
        }
    }

    /// An invalid-value error for the property being set.
    #[must_use]
    pub fn invalid(&self, reason: &'static str) -> PropertyError {
        PropertyError::InvalidValue {
            property: self.property,
            reason,
        }
    }
}

impl Tree {
    /// Sets a property by name.
    pub(crate) fn set_at(&mut self, idx: u32, name: &str, value: Value) -> Result<(), PropertyError> {
        let schema = self.schema_at(idx);
        match schema.lookup(name) {
            None => Err(PropertyError::Unknown {
                kind: schema.name(),
                property: name.into(),
            }),
            Some(Slot::Pseudo(i)) => {
                let def = *schema.pseudo(i);
                let mut cx = SetCx {
                    tree: self,
                    idx,
                    property: def.name,
                };
                (def.setter)(&mut cx, value).map(|_| ())
            }
            Some(Slot::Synced(slot)) => {
                let def = schema.property(slot);
                let value = match def.setter {
                    Some(setter) => {
                        let mut cx = SetCx {
                            tree: self,
                            idx,
                            property: def.name,
                        };
                        match setter(&mut cx, value)? {
                            Some(v) => v,
                            None => return Ok(()),
                        }
                    }
                    None => value,
                };
                self.store_raw(idx, slot, value);
                Ok(())
            }
        }
    }

    /// Stores a raw value and dirties the slot, unless the value is unchanged.
    pub(crate) fn store_raw(&mut self, idx: u32, slot: u8, value: Value) {
        let cell = &mut self.raw[idx as usize][usize::from(slot)];
        if *cell == value {
            return;
        }
        *cell = value;
        self.dirty_slot(idx, slot, true);
    }

    /// Dirties a synchronized property by name.
    pub(crate) fn dirty_named(&mut self, idx: u32, name: &str) -> Result<(), PropertyError> {
        let slot = self.synced_slot(idx, name)?;
        self.dirty_slot(idx, slot, true);
        Ok(())
    }

    /// Marks one property dirty.
    ///
    /// With `propagate`, a cascading property also dirties its descendant
    /// property in every node below `idx`.
    pub(crate) fn dirty_slot(&mut self, idx: u32, slot: u8, propagate: bool) {
        if !self.dirty[idx as usize].insert(slot) {
            return;
        }
        let schema = self.schema_at(idx);
        let def = schema.property(slot);
        let cache = &mut self.cache[idx as usize];
        cache.evict(def.primary);
        for key in def.derived {
            cache.evict(*key);
        }
        if propagate {
            if let Some(cascade) = def.cascade {
                self.cascade_from(idx, cascade);
            }
        }
        self.request_sync(idx);
    }

    /// Dirties every property of a node, without cascading.
    pub(crate) fn dirty_all(&mut self, idx: u32) {
        let count = u8::try_from(self.raw[idx as usize].len()).unwrap_or(u8::MAX);
        for slot in 0..count {
            self.dirty_slot(idx, slot, false);
        }
    }

    /// Pushes a cascade from `idx` to all of its descendants.
    fn cascade_from(&mut self, idx: u32, cascade: Cascade) {
        let channel = cascade.channel();
        self.cascade.mark_with(idx, channel, &EagerPolicy);
        let affected: Vec<u32> = self
            .cascade
            .drain(channel)
            .affected()
            .deterministic()
            .run()
            .filter(|&k| k != idx)
            .collect();
        let name = cascade.descendant_property();
        for d in affected {
            if let Some(slot) = self.schema_at(d).slot(name) {
                self.dirty_slot(d, slot, false);
            }
        }
    }

    /// Queues `idx` and records it as an interesting child up the parent
    /// chain, stopping at the first ancestor that is already queued.
    pub(crate) fn request_sync(&mut self, idx: u32) {
        let mut node = idx;
        loop {
            if self.queued[node as usize] {
                return;
            }
            self.queued[node as usize] = true;
            let p = self.parent[node as usize];
            if p == INVALID {
                return;
            }
            self.queued_children[p as usize].insert(node);
            node = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasConfig;
    use crate::schema::KindId;
    use crate::tree::{Computed, Resolved};

    fn tree() -> Tree {
        Tree::new(CanvasConfig::default())
    }

    fn slot(t: &Tree, idx: u32, name: &str) -> u8 {
        t.schema_at(idx).slot(name).unwrap()
    }

    #[test]
    fn set_is_idempotent() {
        let mut t = tree();
        let n = t.create(KindId::RECTANGLE).unwrap().idx;
        t.set_at(n, "opacity", Value::Number(0.5)).unwrap();
        let s = slot(&t, n, "opacity");
        assert!(t.dirty[n as usize].contains(&s));

        t.dirty[n as usize].clear();
        t.set_at(n, "opacity", Value::Number(0.5)).unwrap();
        assert!(t.dirty[n as usize].is_empty());
    }

    #[test]
    fn dirty_snapshots_cached_values() {
        let mut t = tree();
        let n = t.create(KindId::RECTANGLE).unwrap().idx;
        t.cache[n as usize].insert(Computed::Opacity, Resolved::Number(0.3));
        t.cache[n as usize].insert(Computed::OpacityAbs, Resolved::Number(0.3));
        t.dirty_named(n, "opacity").unwrap();

        let cache = &t.cache[n as usize];
        assert_eq!(cache.get(Computed::Opacity), None);
        assert_eq!(cache.get(Computed::OpacityAbs), None);
        assert_eq!(cache.last(Computed::OpacityAbs), Some(&Resolved::Number(0.3)));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut t = tree();
        let n = t.create(KindId::RECTANGLE).unwrap().idx;
        assert_eq!(
            t.set_at(n, "colour", Value::None),
            Err(PropertyError::Unknown {
                kind: "rectangle",
                property: "colour".into(),
            })
        );
        assert_eq!(
            t.dirty_named(n, "margin-top"),
            Err(PropertyError::NotSynced {
                property: "margin-top"
            })
        );
    }

    #[test]
    fn request_sync_walks_to_first_queued_ancestor() {
        let mut t = tree();
        let root = t.create(KindId::CONTAINER).unwrap().idx;
        let mid = t.create(KindId::CONTAINER).unwrap().idx;
        let leaf = t.create(KindId::RECTANGLE).unwrap().idx;
        t.link(root, mid, None);
        t.link(mid, leaf, None);

        t.request_sync(leaf);
        assert!(t.queued[leaf as usize] && t.queued[mid as usize] && t.queued[root as usize]);
        assert!(t.queued_children[mid as usize].contains(&leaf));
        assert!(t.queued_children[root as usize].contains(&mid));

        // A second request stops at the already queued leaf.
        t.queued_children[root as usize].clear();
        t.request_sync(leaf);
        assert!(t.queued_children[root as usize].is_empty());
    }
}
