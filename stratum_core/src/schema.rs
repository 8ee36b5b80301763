// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable per-kind property schemas.
//!
//! A [`Schema`] is built once per node kind and never mutated afterwards. It
//! fixes the kind's **sync order** (the ordered, duplicate-free list of
//! synchronized properties) and maps every property name to its handlers:
//!
//! - an optional validating **setter** that normalizes loose input before it
//!   is stored, or stores something else itself (pseudo-properties);
//! - a **sync function** that drains the dirty property into resolved values
//!   and backend pushes, returning a [`SyncStatus`];
//! - a **gate** that says whether the sync function may run before the node
//!   has a backend handle;
//! - the [`Computed`] cache keys evicted when the property is dirtied;
//! - an optional [`Cascade`] that re-dirties descendants.
//!
//! Settable names that are not synchronized (e.g. `margin-top`, `width`)
//! are registered as pseudo-properties: they have a setter and nothing else.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::dirty::Cascade;
use crate::error::{PropertyError, SyncError};
use crate::status::SyncStatus;
use crate::tree::{Computed, SetCx, SyncCx};
use crate::value::Value;

/// Identifies a registered node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KindId(pub(crate) u16);

impl KindId {
    /// The canvas root.
    pub const CANVAS: Self = Self(0);
    /// A node that owns children.
    pub const CONTAINER: Self = Self(1);
    /// A plain colored rectangle.
    pub const RECTANGLE: Self = Self(2);
    /// An image whose intrinsic size comes from the backend.
    pub const IMAGE: Self = Self(3);

    /// Returns the raw registry index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u16 {
        self.0
    }

    /// Rebuilds an id from [`KindId::index`], e.g. when decoding a recording.
    ///
    /// The id is only meaningful to the canvas that issued it.
    #[inline]
    #[must_use]
    pub const fn from_index(index: u16) -> Self {
        Self(index)
    }
}

/// Validating setter.
///
/// Returns `Ok(Some(v))` to have the generic path store `v`, or `Ok(None)`
/// when the setter has handled storage itself.
pub type SetterFn = fn(&mut SetCx<'_>, Value) -> Result<Option<Value>, PropertyError>;

/// Per-property sync function.
pub type SyncFn = fn(&mut SyncCx<'_>) -> Result<SyncStatus, SyncError>;

/// When a property's sync function may run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncGate {
    /// Always; used for identity-like properties.
    Always,
    /// Only once the node has a backend handle.
    #[default]
    Handle,
}

/// Where a kind's intrinsic content size comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Intrinsic {
    /// No content: `(0, 0)`.
    #[default]
    Empty,
    /// Asked of the backend handle.
    Backend,
    /// The union of the active children's outer boxes.
    Children,
}

/// A synchronized property.
#[derive(Clone, Debug)]
pub struct PropertyDef {
    /// Property name.
    pub name: &'static str,
    /// Raw value before anything is set.
    pub default: Value,
    /// Optional validating setter.
    pub setter: Option<SetterFn>,
    /// Sync function.
    pub sync: SyncFn,
    /// Gate for the sync function.
    pub gate: SyncGate,
    /// Cache key holding this property's own resolved value.
    pub primary: Computed,
    /// Further cache keys derived from this property (e.g. its `-abs` value).
    pub derived: &'static [Computed],
    /// Cascade marked when this property is dirtied.
    pub cascade: Option<Cascade>,
}

impl PropertyDef {
    /// A handle-gated property with no setter, no cascade, and a
    /// [`Computed::Custom`] cache key named after it.
    #[must_use]
    pub fn new(name: &'static str, default: Value, sync: SyncFn) -> Self {
        Self {
            name,
            default,
            setter: None,
            sync,
            gate: SyncGate::Handle,
            primary: Computed::Custom(name),
            derived: &[],
            cascade: None,
        }
    }

    /// Sets the validating setter.
    #[must_use]
    pub fn with_setter(mut self, setter: SetterFn) -> Self {
        self.setter = Some(setter);
        self
    }

    /// Sets the gate.
    #[must_use]
    pub fn with_gate(mut self, gate: SyncGate) -> Self {
        self.gate = gate;
        self
    }

    /// Sets the cache keys evicted when the property is dirtied.
    #[must_use]
    pub fn caching(mut self, primary: Computed, derived: &'static [Computed]) -> Self {
        self.primary = primary;
        self.derived = derived;
        self
    }

    /// Sets the cascade marked when the property is dirtied.
    #[must_use]
    pub fn cascading(mut self, cascade: Cascade) -> Self {
        self.cascade = Some(cascade);
        self
    }
}

/// A settable name with no sync slot.
#[derive(Clone, Copy, Debug)]
pub struct PseudoDef {
    /// Pseudo-property name.
    pub name: &'static str,
    /// Setter; it rewrites a synchronized property and returns `Ok(None)`.
    pub setter: SetterFn,
}

/// Where a name lives in a schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Synced(u8),
    Pseudo(u8),
}

/// The immutable property schema of a node kind.
#[derive(Clone, Debug)]
pub struct Schema {
    name: &'static str,
    props: Vec<PropertyDef>,
    pseudo: Vec<PseudoDef>,
    index: BTreeMap<&'static str, Slot>,
    container: bool,
    root: bool,
    intrinsic: Intrinsic,
}

impl Schema {
    /// Starts building a schema for a kind named `name`.
    #[must_use]
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            props: Vec::new(),
            pseudo: Vec::new(),
            container: false,
            root: false,
            intrinsic: Intrinsic::Empty,
        }
    }

    /// Kind name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Synchronized properties in sync order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDef] {
        &self.props
    }

    /// Pseudo-properties.
    #[must_use]
    pub fn pseudo_properties(&self) -> &[PseudoDef] {
        &self.pseudo
    }

    /// Property names in sync order.
    pub fn sync_order(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.props.iter().map(|p| p.name)
    }

    /// Sync-order index of a synchronized property.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<u8> {
        match self.index.get(name) {
            Some(Slot::Synced(s)) => Some(*s),
            _ => None,
        }
    }

    /// Definition at a sync-order index.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    #[must_use]
    pub fn property(&self, slot: u8) -> &PropertyDef {
        &self.props[usize::from(slot)]
    }

    /// Whether nodes of this kind own children.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.container
    }

    /// Whether this is the canvas root kind.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Source of intrinsic content size.
    #[must_use]
    pub fn intrinsic(&self) -> Intrinsic {
        self.intrinsic
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Slot> {
        self.index.get(name).copied()
    }

    pub(crate) fn pseudo(&self, i: u8) -> &PseudoDef {
        &self.pseudo[usize::from(i)]
    }
}

/// Builder for [`Schema`].
#[derive(Clone, Debug)]
pub struct SchemaBuilder {
    name: &'static str,
    props: Vec<PropertyDef>,
    pseudo: Vec<PseudoDef>,
    container: bool,
    root: bool,
    intrinsic: Intrinsic,
}

impl SchemaBuilder {
    /// Appends a property to the sync order.
    #[must_use]
    pub fn property(mut self, def: PropertyDef) -> Self {
        self.props.push(def);
        self
    }

    /// Inserts a property immediately before `anchor` in the sync order.
    ///
    /// # Panics
    ///
    /// Panics if `anchor` is not in the sync order.
    #[must_use]
    pub fn insert_before(mut self, anchor: &str, def: PropertyDef) -> Self {
        let at = self.position(anchor);
        self.props.insert(at, def);
        self
    }

    /// Replaces the sync function of an existing property.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not in the sync order.
    #[must_use]
    pub fn override_sync(mut self, name: &str, sync: SyncFn) -> Self {
        let at = self.position(name);
        self.props[at].sync = sync;
        self
    }

    /// Adds a pseudo-property.
    #[must_use]
    pub fn pseudo(mut self, name: &'static str, setter: SetterFn) -> Self {
        self.pseudo.push(PseudoDef { name, setter });
        self
    }

    /// Marks the kind as owning children.
    #[must_use]
    pub fn container(mut self, container: bool) -> Self {
        self.container = container;
        self
    }

    /// Marks the kind as the canvas root.
    #[must_use]
    pub fn root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    /// Sets the intrinsic size source.
    #[must_use]
    pub fn intrinsic(mut self, intrinsic: Intrinsic) -> Self {
        self.intrinsic = intrinsic;
        self
    }

    /// Freezes the schema.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name or more than 255 properties of one sort.
    #[must_use]
    pub fn build(self) -> Schema {
        assert!(
            self.props.len() <= usize::from(u8::MAX) && self.pseudo.len() <= usize::from(u8::MAX),
            "schema `{}` has too many properties",
            self.name
        );
        let mut index = BTreeMap::new();
        let synced = self.props.iter().map(|p| p.name);
        let pseudo = self.pseudo.iter().map(|p| p.name);
        for (i, name) in synced.enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "length checked above")]
            let prev = index.insert(name, Slot::Synced(i as u8));
            assert!(prev.is_none(), "duplicate property `{name}` in `{}`", self.name);
        }
        for (i, name) in pseudo.enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "length checked above")]
            let prev = index.insert(name, Slot::Pseudo(i as u8));
            assert!(prev.is_none(), "duplicate property `{name}` in `{}`", self.name);
        }
        Schema {
            name: self.name,
            props: self.props,
            pseudo: self.pseudo,
            index,
            container: self.container,
            root: self.root,
            intrinsic: self.intrinsic,
        }
    }

    fn position(&self, name: &str) -> usize {
        match self.props.iter().position(|p| p.name == name) {
            Some(at) => at,
            None => panic!("no property `{name}` in `{}`", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn noop(_: &mut SyncCx<'_>) -> Result<SyncStatus, SyncError> {
        Ok(SyncStatus::NOOP)
    }

    fn handled(_: &mut SetCx<'_>, _: Value) -> Result<Option<Value>, PropertyError> {
        Ok(None)
    }

    #[test]
    fn builder_keeps_sync_order() {
        let schema = Schema::builder("thing")
            .property(PropertyDef::new("a", Value::None, noop))
            .property(PropertyDef::new("c", Value::None, noop))
            .insert_before("c", PropertyDef::new("b", Value::None, noop))
            .pseudo("a-alias", handled)
            .build();

        let order: Vec<_> = schema.sync_order().collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert_eq!(schema.slot("b"), Some(1));
        assert_eq!(schema.slot("a-alias"), None);
        assert_eq!(schema.lookup("a-alias"), Some(Slot::Pseudo(0)));
        assert_eq!(schema.lookup("zzz"), None);
    }

    #[test]
    #[should_panic(expected = "duplicate property `a`")]
    fn duplicate_names_are_rejected() {
        let _ = Schema::builder("thing")
            .property(PropertyDef::new("a", Value::None, noop))
            .pseudo("a", handled)
            .build();
    }

    #[test]
    #[should_panic(expected = "no property `missing`")]
    fn insert_before_needs_anchor() {
        let _ = Schema::builder("thing")
            .insert_before("missing", PropertyDef::new("a", Value::None, noop));
    }
}
