// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and registries.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Point, Size};
use understory_dirty::{CycleHandling, DirtyTracker};

use super::cache::ComputedCache;
use super::id::{INVALID, NodeId};
use crate::backend::HandleId;
use crate::canvas::CanvasConfig;
use crate::color::Color;
use crate::error::{PropertyError, TreeError};
use crate::kinds;
use crate::schema::{KindId, Schema, Slot};
use crate::trace::TickSummary;
use crate::value::Value;

/// Last values pushed to a node's backend handle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Pushed {
    pub(crate) pos: Option<Point>,
    pub(crate) size: Option<Size>,
    pub(crate) color: Option<Color>,
    pub(crate) shown: Option<bool>,
}

/// Struct-of-arrays storage for every node of a canvas.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; destroyed nodes are recycled via a free list, and
/// generation counters prevent stale handle access.
#[derive(Debug)]
pub struct Tree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Identity --
    pub(crate) kind: Vec<KindId>,
    pub(crate) rooted: Vec<bool>,
    pub(crate) handle: Vec<Option<HandleId>>,

    // -- Properties --
    pub(crate) raw: Vec<Vec<Value>>,
    pub(crate) cache: Vec<ComputedCache>,
    pub(crate) dirty: Vec<BTreeSet<u8>>,

    // -- Scheduling --
    pub(crate) queued: Vec<bool>,
    pub(crate) syncing: Vec<bool>,
    pub(crate) queued_children: Vec<BTreeSet<u32>>,

    // -- Backend mirror --
    pub(crate) pushed: Vec<Pushed>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Cascade tracking --
    pub(crate) cascade: DirtyTracker<u32>,

    // -- Registries --
    pub(crate) schemas: Vec<Arc<Schema>>,
    pub(crate) names: BTreeMap<String, NodeId>,

    // -- Canvas state --
    pub(crate) canvas: u32,
    pub(crate) config: CanvasConfig,
    pub(crate) frame_index: u64,
    pub(crate) stats: TickSummary,
    pub(crate) redraw_requested: bool,
}

impl Tree {
    /// Creates an empty tree with the built-in kinds registered.
    pub(crate) fn new(config: CanvasConfig) -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            rooted: Vec::new(),
            handle: Vec::new(),
            raw: Vec::new(),
            cache: Vec::new(),
            dirty: Vec::new(),
            queued: Vec::new(),
            syncing: Vec::new(),
            queued_children: Vec::new(),
            pushed: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            cascade: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            schemas: kinds::builtin().into_iter().map(Arc::new).collect(),
            names: BTreeMap::new(),
            canvas: INVALID,
            config,
            frame_index: 0,
            stats: TickSummary::default(),
            redraw_requested: false,
        }
    }

    // -- Schemas --

    pub(crate) fn register_schema(&mut self, schema: Schema) -> Result<KindId, TreeError> {
        if schema.is_root() {
            return Err(TreeError::RootKind);
        }
        let id = u16::try_from(self.schemas.len()).unwrap_or(u16::MAX);
        assert!(id < u16::MAX, "too many node kinds");
        self.schemas.push(Arc::new(schema));
        Ok(KindId(id))
    }

    /// Returns the schema registered for `kind`.
    #[must_use]
    pub fn schema(&self, kind: KindId) -> Option<&Schema> {
        self.schemas.get(usize::from(kind.0)).map(|s| &**s)
    }

    /// Shared handle to the schema of the node in slot `idx`.
    pub(crate) fn schema_at(&self, idx: u32) -> Arc<Schema> {
        Arc::clone(&self.schemas[usize::from(self.kind[idx as usize].0)])
    }

    // -- Allocation --

    /// Creates a detached node of the given kind with default raw values.
    pub(crate) fn create(&mut self, kind: KindId) -> Result<NodeId, TreeError> {
        let schema = self
            .schemas
            .get(usize::from(kind.0))
            .cloned()
            .ok_or(TreeError::UnknownKind(kind))?;
        if schema.is_root() {
            return Err(TreeError::RootKind);
        }
        Ok(self.alloc(kind, &schema))
    }

    /// Allocates a slot for `kind`, reusing a freed one if possible.
    pub(crate) fn alloc(&mut self, kind: KindId, schema: &Schema) -> NodeId {
        let raw: Vec<Value> = schema.properties().iter().map(|p| p.default.clone()).collect();

        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.kind[i] = kind;
            self.raw[i] = raw;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.rooted.push(false);
            self.handle.push(None);
            self.raw.push(raw);
            self.cache.push(ComputedCache::default());
            self.dirty.push(BTreeSet::new());
            self.queued.push(false);
            self.syncing.push(false);
            self.queued_children.push(BTreeSet::new());
            self.pushed.push(Pushed::default());
            self.generation.push(0);
            idx
        };

        self.id_at(idx)
    }

    /// Frees a detached, handle-less slot for reuse.
    pub(crate) fn free(&mut self, idx: u32) {
        let i = idx as usize;
        debug_assert!(self.parent[i] == INVALID, "freeing an attached node");
        debug_assert!(self.handle[i].is_none(), "freeing a node with a handle");

        self.cascade.remove_key(idx);
        self.generation[i] += 1;
        self.first_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.rooted[i] = false;
        self.raw[i].clear();
        self.cache[i].clear();
        self.dirty[i].clear();
        self.queued[i] = false;
        self.syncing[i] = false;
        self.queued_children[i].clear();
        self.pushed[i] = Pushed::default();
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns `Ok(())` if the handle is live.
    pub(crate) fn check(&self, id: NodeId) -> Result<(), TreeError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(TreeError::StaleNode(id))
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Handle for the live node in slot `idx`.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    // -- Topology --

    /// Appends `c` to `p`'s child list, or inserts it before `before`.
    pub(crate) fn link(&mut self, p: u32, c: u32, before: Option<u32>) {
        self.parent[c as usize] = p;
        match before {
            Some(s) => {
                let prev = self.prev_sibling[s as usize];
                self.next_sibling[c as usize] = s;
                self.prev_sibling[c as usize] = prev;
                if prev == INVALID {
                    self.first_child[p as usize] = c;
                } else {
                    self.next_sibling[prev as usize] = c;
                }
                self.prev_sibling[s as usize] = c;
            }
            None => {
                self.next_sibling[c as usize] = INVALID;
                self.prev_sibling[c as usize] = INVALID;
                if self.first_child[p as usize] == INVALID {
                    self.first_child[p as usize] = c;
                } else {
                    let mut last = self.first_child[p as usize];
                    while self.next_sibling[last as usize] != INVALID {
                        last = self.next_sibling[last as usize];
                    }
                    self.next_sibling[last as usize] = c;
                    self.prev_sibling[c as usize] = last;
                }
            }
        }
    }

    /// Removes `idx` from its parent's child list without touching any other
    /// state.
    pub(crate) fn unlink(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Parent slot of `idx`, if any.
    pub(crate) fn parent_of(&self, idx: u32) -> Option<u32> {
        let p = self.parent[idx as usize];
        (p != INVALID).then_some(p)
    }

    // -- Raw property access --

    /// Raw value of a synchronized property, by name.
    pub(crate) fn raw_at(&self, idx: u32, name: &str) -> Option<&Value> {
        let schema = &self.schemas[usize::from(self.kind[idx as usize].0)];
        let slot = schema.slot(name)?;
        self.raw[idx as usize].get(usize::from(slot))
    }

    /// Resolves a name for reading, rejecting unknown names and
    /// pseudo-properties.
    pub(crate) fn synced_slot(&self, idx: u32, name: &str) -> Result<u8, PropertyError> {
        let schema = &self.schemas[usize::from(self.kind[idx as usize].0)];
        match schema.lookup(name) {
            Some(Slot::Synced(s)) => Ok(s),
            Some(Slot::Pseudo(i)) => Err(PropertyError::NotSynced {
                property: schema.pseudo(i).name,
            }),
            None => Err(PropertyError::Unknown {
                kind: schema.name(),
                property: name.into(),
            }),
        }
    }

    /// Whether the node in slot `idx` is laid out in its container's second
    /// pass.
    pub(crate) fn is_passive(&self, idx: u32) -> bool {
        self.raw_at(idx, "passive")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Whether the node in slot `idx` takes part in layout at all.
    pub(crate) fn is_displayed(&self, idx: u32) -> bool {
        self.raw_at(idx, "display")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    // -- Name registry --

    pub(crate) fn register_name(&mut self, name: String, id: NodeId) {
        self.names.insert(name, id);
    }

    /// Removes `name` if it currently maps to `id`.
    pub(crate) fn unregister_name_for(&mut self, name: &str, id: NodeId) {
        if self.names.get(name) == Some(&id) {
            self.names.remove(name);
        }
    }

    /// Looks up a live node by name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied().filter(|id| self.is_alive(*id))
    }
}
