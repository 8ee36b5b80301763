// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas root and its tick driver.
//!
//! [`Canvas`] owns the node tree and the backend. Hosts mutate nodes through
//! it and call [`Canvas::tick`] once per frame or idle signal; a tick drains
//! queued work top-down and issues at most one redraw.
//!
//! ```
//! use stratum_core::backend::RecordingBackend;
//! use stratum_core::canvas::{Canvas, CanvasConfig};
//! use stratum_core::schema::KindId;
//! use stratum_core::tree::{Computed, Resolved};
//! use kurbo::Size;
//!
//! let mut canvas = Canvas::new(RecordingBackend::new(), CanvasConfig::default());
//! let rect = canvas.create(KindId::RECTANGLE).unwrap();
//! canvas.set(rect, "width", 120).unwrap();
//! canvas.set(rect, "height", "50%").unwrap();
//! canvas.add_child(canvas.root(), rect).unwrap();
//!
//! let outcome = canvas.tick();
//! assert!(outcome.rendered);
//! assert_eq!(
//!     canvas.computed(rect, Computed::Size).unwrap(),
//!     Some(&Resolved::Size(Size::new(120.0, 300.0)))
//! );
//! ```

use kurbo::Size;

use crate::backend::{Backend, HandleId};
use crate::error::{Error, TreeError};
use crate::schema::{KindId, Schema};
use crate::status::SyncStatus;
use crate::trace::{RenderEvent, TickEvent, TickSummary, Tracer};
use crate::tree::{Children, Computed, NodeId, Resolved, Tree};
use crate::value::Value;

/// Canvas-wide settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasConfig {
    /// Size of the canvas; the root's border size and its children's extents.
    pub size: Size,
    /// Upper bound on the drain passes over one node's dirty properties in
    /// a single synchronization.
    pub max_sync_iterations: u32,
}

impl CanvasConfig {
    /// A configuration for a canvas of the given size.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            size,
            max_sync_iterations: 64,
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

/// What one [`Canvas::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    /// Tick counter, starting at 0.
    pub frame_index: u64,
    /// Status the root reported, or [`SyncStatus::NOOP`] if nothing was queued.
    pub status: SyncStatus,
    /// Whether [`Backend::render`] was called.
    pub rendered: bool,
}

/// A canvas: the root node, every node created for it, and the backend they
/// are pushed to.
#[derive(Debug)]
pub struct Canvas<B: Backend> {
    tree: Tree,
    backend: B,
}

impl<B: Backend> Canvas<B> {
    /// Creates a canvas with a rooted, fully dirty root node.
    pub fn new(mut backend: B, config: CanvasConfig) -> Self {
        let mut tree = Tree::new(config);
        let root = tree.create_root(&mut backend);
        log::debug!("canvas created: {root:?}, {}x{}", config.size.width, config.size.height);
        Self { tree, backend }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.id_at(self.tree.canvas)
    }

    // -- Nodes --

    /// Creates a detached node.
    pub fn create(&mut self, kind: KindId) -> Result<NodeId, Error> {
        Ok(self.tree.create(kind)?)
    }

    /// Creates a detached node and sets the given properties in order.
    ///
    /// If a property is rejected the node is destroyed again.
    pub fn create_with<'a, I>(&mut self, kind: KindId, properties: I) -> Result<NodeId, Error>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let id = self.tree.create(kind)?;
        for (name, value) in properties {
            if let Err(e) = self.tree.set_at(id.idx, name, value) {
                self.tree.destroy(&mut self.backend, id)?;
                return Err(e.into());
            }
        }
        Ok(id)
    }

    /// Registers a node kind built with [`Schema::builder`].
    ///
    /// Root schemas are rejected: the canvas is the only root.
    pub fn register_kind(&mut self, schema: Schema) -> Result<KindId, Error> {
        let kind = self.tree.register_schema(schema)?;
        log::debug!("registered kind {kind:?}");
        Ok(kind)
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.tree.is_alive(id)
    }

    // -- Properties --

    /// Sets a property or pseudo-property.
    ///
    /// Setting a value equal to the stored one is a no-op.
    pub fn set(&mut self, id: NodeId, name: &str, value: impl Into<Value>) -> Result<(), Error> {
        self.tree.check(id)?;
        Ok(self.tree.set_at(id.idx, name, value.into())?)
    }

    /// The raw value of a synchronized property.
    pub fn get(&self, id: NodeId, name: &str) -> Result<&Value, Error> {
        self.tree.check(id)?;
        let slot = self.tree.synced_slot(id.idx, name)?;
        Ok(&self.tree.raw[id.idx as usize][usize::from(slot)])
    }

    /// A resolved value, or `None` while it is dirty.
    pub fn computed(&self, id: NodeId, key: Computed) -> Result<Option<&Resolved>, Error> {
        self.tree.check(id)?;
        Ok(self.tree.cache[id.idx as usize].get(key))
    }

    /// The value a resolution had when it was last evicted.
    pub fn last(&self, id: NodeId, key: Computed) -> Result<Option<&Resolved>, Error> {
        self.tree.check(id)?;
        Ok(self.tree.cache[id.idx as usize].last(key))
    }

    /// Returns `true` if the property still has to be synchronized.
    pub fn is_dirty(&self, id: NodeId, name: &str) -> Result<bool, Error> {
        self.tree.check(id)?;
        let slot = self.tree.synced_slot(id.idx, name)?;
        Ok(self.tree.dirty[id.idx as usize].contains(&slot))
    }

    /// Marks a property dirty even though its raw value did not change.
    pub fn dirty(&mut self, id: NodeId, name: &str) -> Result<(), Error> {
        self.tree.check(id)?;
        Ok(self.tree.dirty_named(id.idx, name)?)
    }

    /// Tells the engine the backend's intrinsic size for `id` changed.
    pub fn invalidate_intrinsic(&mut self, id: NodeId) -> Result<(), Error> {
        self.tree.check(id)?;
        let schema = self.tree.schema_at(id.idx);
        for name in ["aspect", "size"] {
            if let Some(slot) = schema.slot(name) {
                self.tree.dirty_slot(id.idx, slot, true);
            }
        }
        Ok(())
    }

    // -- Structure --

    /// Appends `child` to `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        Ok(self.tree.attach(&mut self.backend, parent, child, None)?)
    }

    /// Inserts `child` into `parent` before the existing child `before`.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<(), Error> {
        Ok(self.tree.attach(&mut self.backend, parent, child, Some(before))?)
    }

    /// Removes `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        self.tree.check(parent)?;
        self.tree.check(child)?;
        if self.tree.parent_of(child.idx) != Some(parent.idx) {
            return Err(TreeError::NotAChild(child).into());
        }
        Ok(self.tree.detach(&mut self.backend, child)?)
    }

    /// Detaches `id` from whatever parent it has. A no-op if it has none.
    pub fn detach(&mut self, id: NodeId) -> Result<(), Error> {
        Ok(self.tree.detach(&mut self.backend, id)?)
    }

    /// Destroys `id` and every node below it.
    pub fn destroy(&mut self, id: NodeId) -> Result<(), Error> {
        Ok(self.tree.destroy(&mut self.backend, id)?)
    }

    /// The parent of `id`, if it has one.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, Error> {
        self.tree.check(id)?;
        Ok(self.tree.parent_of(id.idx).map(|p| self.tree.id_at(p)))
    }

    /// The children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Result<Children<'_>, Error> {
        self.tree.check(id)?;
        Ok(Children::new(&self.tree, self.tree.first_child[id.idx as usize]))
    }

    /// The backend handle of `id`, once it is rooted.
    pub fn handle(&self, id: NodeId) -> Result<Option<HandleId>, Error> {
        self.tree.check(id)?;
        Ok(self.tree.handle[id.idx as usize])
    }

    // -- Synchronization --

    /// Synchronizes one node and its queued descendants outside a tick.
    ///
    /// No redraw is issued; a redraw need is reported in the status.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly on a node that is synchronizing.
    pub fn synchronize(&mut self, id: NodeId) -> Result<SyncStatus, Error> {
        self.tree.check(id)?;
        Ok(self
            .tree
            .synchronize(&mut self.backend, &mut Tracer::none(), id.idx))
    }

    /// Runs one tick without tracing. See [`Canvas::tick_traced`].
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_traced(&mut Tracer::none())
    }

    /// Runs one tick.
    ///
    /// Synchronizes the root if it has queued work, then calls
    /// [`Backend::render`] once if anything needs a redraw, including redraws
    /// requested between ticks.
    pub fn tick_traced(&mut self, tracer: &mut Tracer<'_>) -> TickOutcome {
        let tree = &mut self.tree;
        let frame_index = tree.frame_index;
        tree.stats = TickSummary {
            frame_index,
            ..TickSummary::default()
        };

        let root = tree.canvas;
        let root_queued = tree.queued[root as usize];
        tracer.tick(&TickEvent {
            frame_index,
            root_queued,
        });

        let status = if root_queued {
            tree.synchronize(&mut self.backend, tracer, root)
        } else {
            SyncStatus::NOOP
        };

        let deferred = core::mem::take(&mut tree.redraw_requested);
        let needs_render = status.contains(SyncStatus::NEEDS_RENDER);
        let rendered = needs_render || deferred;
        if rendered {
            self.backend.render();
            tracer.render(&RenderEvent {
                frame_index,
                deferred: !needs_render,
            });
        }

        tree.stats.status = status;
        tree.stats.rendered = rendered;
        tracer.tick_summary(&tree.stats);
        log::trace!(
            "tick {frame_index}: {status:?}, {} nodes, {} faults",
            tree.stats.nodes_synced,
            tree.stats.faults
        );

        tree.frame_index += 1;
        TickOutcome {
            frame_index,
            status,
            rendered,
        }
    }

    /// Changes the canvas size.
    pub fn resize(&mut self, size: Size) {
        if self.tree.config.size == size {
            return;
        }
        self.tree.config.size = size;
        let root = self.tree.canvas;
        if let Some(slot) = self.tree.schema_at(root).slot("size") {
            self.tree.dirty_slot(root, slot, true);
        }
    }

    /// Returns `true` if the next tick has work or a redraw to issue.
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.tree.redraw_requested || self.tree.queued[self.tree.canvas as usize]
    }

    // -- Names --

    /// Maps `name` to `id`, replacing any previous mapping.
    pub fn register_name(&mut self, name: &str, id: NodeId) -> Result<(), Error> {
        self.tree.check(id)?;
        self.tree.register_name(name.into(), id);
        Ok(())
    }

    /// Removes the mapping for `name`.
    pub fn unregister_name(&mut self, name: &str) {
        self.tree.names.remove(name);
    }

    /// The live node registered under `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.tree.find_by_name(name)
    }

    // -- Accessors --

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The canvas configuration.
    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.tree.config
    }

    /// The node tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::Point;

    use super::*;
    use crate::backend::{BackendCall, RecordingBackend};
    use crate::color::Color;
    use crate::error::{PropertyError, SyncError};
    use crate::kinds::object::base;
    use crate::schema::PropertyDef;
    use crate::tree::SyncCx;
    use crate::value::{Edges, Length, Position};

    fn canvas() -> Canvas<RecordingBackend> {
        Canvas::new(RecordingBackend::new(), CanvasConfig::default())
    }

    fn rect(c: &mut Canvas<RecordingBackend>, parent: NodeId, w: f64, h: f64) -> NodeId {
        let id = c
            .create_with(KindId::RECTANGLE, [("width", Value::from(w)), ("height", Value::from(h))])
            .unwrap();
        c.add_child(parent, id).unwrap();
        id
    }

    fn size_of(c: &Canvas<RecordingBackend>, id: NodeId) -> Option<Size> {
        c.computed(id, Computed::Size).unwrap().and_then(Resolved::as_size)
    }

    fn abs_pos(c: &Canvas<RecordingBackend>, id: NodeId) -> Option<Point> {
        c.computed(id, Computed::PosAbs).unwrap().and_then(Resolved::as_point)
    }

    const SYNC_ORDER: [&str; 10] = [
        "name", "passive", "display", "visible", "margin", "padding", "size", "pos", "opacity",
        "color",
    ];

    #[test]
    fn first_tick_syncs_the_root() {
        let mut c = canvas();
        let root = c.root();
        assert!(c.needs_redraw());
        let out = c.tick();
        assert_eq!(out.frame_index, 0);
        assert!(out.rendered);
        assert!(!out.status.is_unfinished());
        assert_eq!(size_of(&c, root), Some(Size::new(800.0, 600.0)));
        assert_eq!(
            c.computed(root, Computed::VisibleAbs).unwrap(),
            Some(&Resolved::Bool(true))
        );
        assert!(!c.needs_redraw());
    }

    #[test]
    fn setting_an_equal_value_does_not_dirty() {
        let mut c = canvas();
        let r = rect(&mut c, c.root(), 10.0, 10.0);
        c.tick();

        c.set(r, "opacity", 0.5).unwrap();
        assert!(c.is_dirty(r, "opacity").unwrap());
        c.tick();
        assert!(!c.is_dirty(r, "opacity").unwrap());

        c.set(r, "opacity", 0.5).unwrap();
        assert!(!c.is_dirty(r, "opacity").unwrap());
        assert!(!c.needs_redraw());
    }

    #[test]
    fn finished_nodes_are_clean_with_fresh_values() {
        let mut c = canvas();
        let r = rect(&mut c, c.root(), 10.0, 10.0);
        let out = c.tick();
        assert!(!out.status.is_unfinished());
        for name in SYNC_ORDER {
            assert!(!c.is_dirty(r, name).unwrap(), "{name} is still dirty");
        }
        for key in [
            Computed::Name,
            Computed::VisibleAbs,
            Computed::Margin,
            Computed::Padding,
            Computed::Size,
            Computed::PosAbs,
            Computed::OpacityAbs,
            Computed::ColorAbs,
        ] {
            assert!(c.computed(r, key).unwrap().is_some(), "{key:?} is not cached");
        }
    }

    #[test]
    fn dirtying_keeps_the_last_value() {
        let mut c = canvas();
        let r = rect(&mut c, c.root(), 10.0, 20.0);
        c.tick();
        c.set(r, "width", 30).unwrap();
        assert_eq!(c.computed(r, Computed::Size).unwrap(), None);
        assert_eq!(
            c.last(r, Computed::Size).unwrap(),
            Some(&Resolved::Size(Size::new(10.0, 20.0)))
        );
        c.tick();
        assert_eq!(size_of(&c, r), Some(Size::new(30.0, 20.0)));
    }

    #[test]
    fn opacity_multiplies_down_the_chain() {
        let mut c = canvas();
        let a = c.create(KindId::CONTAINER).unwrap();
        c.set(a, "opacity", 0.5).unwrap();
        c.add_child(c.root(), a).unwrap();
        let b = rect(&mut c, a, 10.0, 10.0);
        c.set(b, "opacity", 0.4).unwrap();
        c.tick();
        assert_eq!(
            c.computed(b, Computed::OpacityAbs).unwrap(),
            Some(&Resolved::Number(0.2))
        );

        c.set(a, "opacity", 1.0).unwrap();
        assert!(c.is_dirty(b, "opacity").unwrap());
        c.tick();
        assert_eq!(
            c.computed(b, Computed::OpacityAbs).unwrap(),
            Some(&Resolved::Number(0.4))
        );
    }

    #[test]
    fn colors_blend_with_fixed_point_math() {
        let mut c = canvas();
        let root = c.root();
        c.set(root, "color", "#808080").unwrap();
        let r = rect(&mut c, root, 10.0, 10.0);
        c.tick();
        assert_eq!(
            c.computed(r, Computed::ColorAbs).unwrap(),
            Some(&Resolved::Color(Color::rgb(128, 128, 128)))
        );
        let h = c.handle(r).unwrap().unwrap();
        assert!(
            c.backend()
                .calls()
                .contains(&BackendCall::SetColor(h, Color::rgb(128, 128, 128)))
        );
    }

    #[test]
    fn percent_sizes_resolve_against_the_parent() {
        let mut c = canvas();
        let p = rect_container(&mut c, 200.0, 100.0);
        let child = c.create(KindId::RECTANGLE).unwrap();
        c.set(child, "size", vec![Value::from("50%"), Value::from("50%")])
            .unwrap();
        c.add_child(p, child).unwrap();
        c.tick();
        assert_eq!(size_of(&c, child), Some(Size::new(100.0, 50.0)));
    }

    fn rect_container(c: &mut Canvas<RecordingBackend>, w: f64, h: f64) -> NodeId {
        let id = c
            .create_with(KindId::CONTAINER, [("width", Value::from(w)), ("height", Value::from(h))])
            .unwrap();
        c.add_child(c.root(), id).unwrap();
        id
    }

    #[test]
    fn positions_compose_to_absolute() {
        let mut c = canvas();
        let p = rect_container(&mut c, 200.0, 100.0);
        c.set(p, "left", 10).unwrap();
        c.set(p, "top", 20).unwrap();
        c.set(p, "padding", 5).unwrap();
        let r = rect(&mut c, p, 20.0, 10.0);
        c.set(r, "right", "100%").unwrap();
        c.set(r, "margin-right", 4).unwrap();
        c.tick();
        // Inner origin (15, 25); inner width 190; outer width 24.
        assert_eq!(abs_pos(&c, r), Some(Point::new(15.0 + 190.0 - 24.0, 25.0)));
        assert_eq!(
            c.computed(r, Computed::Pos).unwrap(),
            Some(&Resolved::Point(Point::new(166.0, 0.0)))
        );
    }

    #[test]
    fn spanning_axis_overrides_the_size() {
        let mut c = canvas();
        let p = rect_container(&mut c, 200.0, 100.0);
        let r = rect(&mut c, p, 20.0, 10.0);
        c.set(r, "left", 10).unwrap();
        c.set(r, "right", 60).unwrap();
        c.set(r, "margin", vec![Value::from(0), Value::from(5)]).unwrap();
        c.tick();
        assert_eq!(size_of(&c, r), Some(Size::new(40.0, 10.0)));
        assert_eq!(abs_pos(&c, r), Some(Point::new(15.0, 0.0)));
    }

    #[test]
    fn centered_positions_round_down() {
        let mut c = canvas();
        let p = rect_container(&mut c, 200.0, 100.0);
        let r = rect(&mut c, p, 21.0, 10.0);
        c.set(r, "hcenter", "50%").unwrap();
        c.set(r, "vcenter", 50).unwrap();
        c.tick();
        assert_eq!(abs_pos(&c, r), Some(Point::new(90.0, 45.0)));
    }

    #[test]
    fn re_parenting_dirties_every_property() {
        let mut c = canvas();
        let a = rect_container(&mut c, 100.0, 100.0);
        let b = rect_container(&mut c, 100.0, 100.0);
        let r = rect(&mut c, a, 10.0, 10.0);
        c.tick();
        for name in SYNC_ORDER {
            assert!(!c.is_dirty(r, name).unwrap());
        }

        c.remove_child(a, r).unwrap();
        c.add_child(b, r).unwrap();
        for name in SYNC_ORDER {
            assert!(c.is_dirty(r, name).unwrap(), "{name} should be dirty");
        }
        assert_eq!(c.parent(r).unwrap(), Some(b));
        c.tick();
        assert!(!c.is_dirty(r, "pos").unwrap());
    }

    #[test]
    fn detaching_hides_before_releasing() {
        let mut c = canvas();
        let r = rect(&mut c, c.root(), 10.0, 10.0);
        c.tick();
        let h = c.handle(r).unwrap().unwrap();
        c.backend_mut().take_calls();

        c.detach(r).unwrap();
        assert_eq!(
            c.computed(r, Computed::VisibleAbs).unwrap(),
            Some(&Resolved::Bool(false))
        );
        assert_eq!(
            c.backend().calls(),
            &[BackendCall::Hide(h), BackendCall::Release(h)]
        );
        assert_eq!(c.handle(r).unwrap(), None);

        // The hide needs a redraw even though nothing is queued.
        let out = c.tick();
        assert!(out.rendered);
        assert_eq!(out.status, SyncStatus::NOOP);
    }

    #[test]
    fn detaching_a_subtree_hides_every_node_before_its_release() {
        let mut c = canvas();
        let a = rect_container(&mut c, 100.0, 100.0);
        let b = c.create(KindId::CONTAINER).unwrap();
        c.add_child(a, b).unwrap();
        let r = rect(&mut c, b, 10.0, 10.0);
        c.tick();
        let handles: Vec<_> = [a, b, r]
            .into_iter()
            .map(|id| c.handle(id).unwrap().unwrap())
            .collect();
        c.backend_mut().take_calls();

        c.detach(a).unwrap();
        let calls = c.backend().calls();
        assert_eq!(calls.len(), 6, "one hide and one release per node: {calls:?}");
        for h in handles {
            let hide = calls.iter().position(|call| *call == BackendCall::Hide(h));
            let release = calls.iter().position(|call| *call == BackendCall::Release(h));
            match (hide, release) {
                (Some(hide), Some(release)) => assert!(hide < release, "{h:?} released first"),
                _ => panic!("{h:?} missing a hide or a release: {calls:?}"),
            }
        }
        for id in [a, b, r] {
            assert_eq!(c.handle(id).unwrap(), None);
            assert_eq!(
                c.computed(id, Computed::VisibleAbs).unwrap(),
                Some(&Resolved::Bool(false))
            );
        }
    }

    #[test]
    fn canvas_kind_is_reserved_for_the_root() {
        let mut c = canvas();
        assert_eq!(
            c.create(KindId::CANVAS),
            Err(Error::Tree(TreeError::RootKind))
        );
        assert_eq!(
            c.register_kind(crate::kinds::canvas()),
            Err(Error::Tree(TreeError::RootKind))
        );
        assert!(c.register_kind(crate::kinds::container()).is_ok());
        assert_eq!(c.children(c.root()).unwrap().count(), 0);
    }

    #[test]
    fn detach_without_parent_is_a_no_op() {
        let mut c = canvas();
        let r = c.create(KindId::RECTANGLE).unwrap();
        c.detach(r).unwrap();
        assert_eq!(c.backend().calls().len(), 1);
    }

    fn always_fails(_: &mut SyncCx<'_>) -> Result<SyncStatus, SyncError> {
        Err(SyncError::Custom(String::from("boom")))
    }

    #[test]
    fn sync_faults_stay_local() {
        let mut c = canvas();
        let kind = c.register_kind(
            base("faulty")
                .insert_before("pos", PropertyDef::new("glitch", Value::None, always_fails))
                .build(),
        )
        .unwrap();
        let n = c.create(kind).unwrap();
        c.add_child(c.root(), n).unwrap();
        let sibling = rect(&mut c, c.root(), 10.0, 10.0);

        let out = c.tick();
        assert!(out.status.is_unfinished());
        assert!(out.rendered);
        assert!(c.is_dirty(n, "glitch").unwrap());
        for name in ["size", "pos", "opacity", "color"] {
            assert!(!c.is_dirty(n, name).unwrap(), "{name} should have synced");
        }
        assert!(!c.is_dirty(sibling, "pos").unwrap());

        // Retried on every tick.
        let out = c.tick();
        assert!(out.status.is_unfinished());
        assert!(c.is_dirty(n, "glitch").unwrap());
    }

    #[test]
    fn structural_errors() {
        let mut c = canvas();
        let root = c.root();
        let a = rect_container(&mut c, 10.0, 10.0);
        let b = c.create(KindId::CONTAINER).unwrap();
        c.add_child(a, b).unwrap();
        let r = c.create(KindId::RECTANGLE).unwrap();

        assert_eq!(
            c.add_child(root, b),
            Err(Error::Tree(TreeError::AlreadyParented(b)))
        );
        c.detach(a).unwrap();
        assert_eq!(c.add_child(b, a), Err(Error::Tree(TreeError::WouldCycle(a))));
        assert_eq!(c.add_child(r, a), Err(Error::Tree(TreeError::NotAContainer(r))));
        assert_eq!(c.add_child(a, root), Err(Error::Tree(TreeError::RootImmutable)));
        assert_eq!(c.destroy(root), Err(Error::Tree(TreeError::RootImmutable)));
        assert_eq!(
            c.insert_child(root, r, b),
            Err(Error::Tree(TreeError::NotAChild(b)))
        );

        c.destroy(a).unwrap();
        assert!(!c.is_alive(b));
        assert_eq!(c.set(b, "width", 1), Err(Error::Tree(TreeError::StaleNode(b))));
    }

    #[test]
    fn insert_child_keeps_order() {
        let mut c = canvas();
        let root = c.root();
        let a = rect(&mut c, root, 1.0, 1.0);
        let b = c.create(KindId::RECTANGLE).unwrap();
        c.insert_child(root, b, a).unwrap();
        let order: Vec<NodeId> = c.children(root).unwrap().collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn property_errors() {
        let mut c = canvas();
        let r = c.create(KindId::RECTANGLE).unwrap();
        assert!(matches!(
            c.set(r, "colour", "#fff"),
            Err(Error::Property(PropertyError::Unknown { .. }))
        ));
        assert!(matches!(
            c.set(r, "color", "#ggg"),
            Err(Error::Property(PropertyError::InvalidValue { property: "color", .. }))
        ));
        assert!(matches!(
            c.set(r, "width", "wide"),
            Err(Error::Property(PropertyError::InvalidValue { .. }))
        ));
        assert!(matches!(
            c.dirty(r, "width"),
            Err(Error::Property(PropertyError::NotSynced { property: "width" }))
        ));
        assert!(matches!(
            c.create_with(KindId::RECTANGLE, [("opacity", Value::from(2.0))]),
            Err(Error::Property(PropertyError::InvalidValue { property: "opacity", .. }))
        ));
    }

    #[test]
    fn non_finite_lengths_are_invalid() {
        let mut c = canvas();
        let r = rect(&mut c, c.root(), 10.0, 10.0);
        c.tick();

        let nan = Length::Px(f64::NAN);
        let rejected = [
            c.set(r, "width", nan),
            c.set(r, "size", Value::Size(Length::Px(1.0), Length::Percent(f64::INFINITY))),
            c.set(r, "margin", Edges::uniform(nan)),
            c.set(r, "left", nan),
            c.set(r, "pos", Position::at(Length::Px(0.0), nan)),
        ];
        for result in rejected {
            assert!(
                matches!(result, Err(Error::Property(PropertyError::InvalidValue { .. }))),
                "got {result:?}"
            );
        }
        for name in ["size", "margin", "pos"] {
            assert!(!c.is_dirty(r, name).unwrap(), "{name} must stay clean");
        }
        assert_eq!(size_of(&c, r), Some(Size::new(10.0, 10.0)));
    }

    #[test]
    fn hex_colors_are_stored_as_colors() {
        let mut c = canvas();
        let r = c.create(KindId::RECTANGLE).unwrap();
        c.set(r, "color", "#10203040").unwrap();
        assert_eq!(
            c.get(r, "color").unwrap(),
            &Value::Color(Color::rgba(0x10, 0x20, 0x30, 0x40))
        );
        c.set(r, "color", vec![Value::from(1), Value::from(2), Value::from(3)])
            .unwrap();
        assert_eq!(c.get(r, "color").unwrap(), &Value::Color(Color::rgb(1, 2, 3)));
    }

    #[test]
    fn names_register_once_rooted() {
        let mut c = canvas();
        let r = c
            .create_with(KindId::RECTANGLE, [("name", Value::from("hero"))])
            .unwrap();
        c.tick();
        assert_eq!(c.find_by_name("hero"), None);

        c.add_child(c.root(), r).unwrap();
        c.tick();
        assert_eq!(c.find_by_name("hero"), Some(r));

        c.set(r, "name", "villain").unwrap();
        c.tick();
        assert_eq!(c.find_by_name("hero"), None);
        assert_eq!(c.find_by_name("villain"), Some(r));

        c.destroy(r).unwrap();
        assert_eq!(c.find_by_name("villain"), None);
    }

    #[test]
    fn explicit_names_follow_liveness() {
        let mut c = canvas();
        let r = c.create(KindId::RECTANGLE).unwrap();
        c.register_name("manual", r).unwrap();
        assert_eq!(c.find_by_name("manual"), Some(r));
        c.unregister_name("manual");
        assert_eq!(c.find_by_name("manual"), None);

        c.register_name("manual", r).unwrap();
        c.destroy(r).unwrap();
        assert_eq!(c.find_by_name("manual"), None);
    }

    #[test]
    fn one_render_per_tick() {
        let mut c = canvas();
        let a = rect(&mut c, c.root(), 10.0, 10.0);
        let b = rect(&mut c, c.root(), 10.0, 10.0);
        c.tick();
        assert_eq!(c.backend().render_count(), 1);

        let out = c.tick();
        assert!(!out.rendered);
        assert_eq!(c.backend().render_count(), 1);

        c.set(a, "color", "#f00").unwrap();
        c.set(b, "left", 40).unwrap();
        let out = c.tick();
        assert!(out.rendered);
        assert_eq!(out.frame_index, 2);
        assert_eq!(c.backend().render_count(), 2);
    }

    #[test]
    fn pushes_are_deduplicated() {
        let mut c = canvas();
        let r = rect(&mut c, c.root(), 10.0, 10.0);
        c.tick();
        c.backend_mut().take_calls();

        // A forced re-sync of an unchanged value pushes nothing.
        c.dirty(r, "pos").unwrap();
        let out = c.tick();
        assert!(!out.rendered);
        assert!(c.backend().calls().is_empty());
    }

    #[test]
    fn hidden_parents_hide_children() {
        let mut c = canvas();
        let p = rect_container(&mut c, 50.0, 50.0);
        let r = rect(&mut c, p, 10.0, 10.0);
        c.tick();
        let h = c.handle(r).unwrap().unwrap();
        c.backend_mut().take_calls();

        c.set(p, "visible", false).unwrap();
        assert!(c.is_dirty(r, "visible").unwrap());
        c.tick();
        assert_eq!(
            c.computed(r, Computed::VisibleAbs).unwrap(),
            Some(&Resolved::Bool(false))
        );
        assert!(c.backend().calls().contains(&BackendCall::Hide(h)));
    }

    #[test]
    fn resizing_the_canvas_re_resolves_percentages() {
        let mut c = canvas();
        let r = c.create(KindId::RECTANGLE).unwrap();
        c.set(r, "size", vec![Value::from("50%"), Value::from("10%")])
            .unwrap();
        c.add_child(c.root(), r).unwrap();
        c.tick();
        assert_eq!(size_of(&c, r), Some(Size::new(400.0, 60.0)));

        c.resize(Size::new(200.0, 100.0));
        c.tick();
        assert_eq!(size_of(&c, c.root()), Some(Size::new(200.0, 100.0)));
        assert_eq!(size_of(&c, r), Some(Size::new(100.0, 10.0)));
    }

    #[test]
    #[should_panic(expected = "already synchronizing")]
    fn re_entrant_synchronize_panics() {
        let mut c = canvas();
        let root = c.root();
        c.tree.syncing[root.idx as usize] = true;
        let _ = c.synchronize(root);
    }

    /// Re-dirties `size`, which comes earlier in the sync order, the first
    /// time it runs.
    fn settle(cx: &mut SyncCx<'_>) -> Result<SyncStatus, SyncError> {
        let first = cx.last(Computed::Custom("settle")).is_none();
        cx.store(Computed::Custom("settle"), Resolved::Bool(true));
        if first {
            cx.dirty("size");
        }
        Ok(SyncStatus::NOOP)
    }

    fn settling_canvas(max_sync_iterations: u32) -> (Canvas<RecordingBackend>, NodeId) {
        let config = CanvasConfig {
            max_sync_iterations,
            ..CanvasConfig::default()
        };
        let mut c = Canvas::new(RecordingBackend::new(), config);
        let kind = c.register_kind(
            base("settling")
                .property(PropertyDef::new("settle", Value::None, settle))
                .build(),
        )
        .unwrap();
        let n = c.create(kind).unwrap();
        c.add_child(c.root(), n).unwrap();
        (c, n)
    }

    #[test]
    fn earlier_properties_are_drained_in_a_later_pass() {
        let (mut c, n) = settling_canvas(64);
        let out = c.tick();
        assert!(!out.status.is_unfinished());
        assert!(!c.is_dirty(n, "size").unwrap());
    }

    #[test]
    fn max_sync_iterations_bounds_the_drain() {
        let (mut c, n) = settling_canvas(1);
        let out = c.tick();
        assert!(out.status.is_unfinished());
        assert!(c.is_dirty(n, "size").unwrap());

        let out = c.tick();
        assert!(!out.status.is_unfinished());
        assert!(!c.is_dirty(n, "size").unwrap());
    }
}
