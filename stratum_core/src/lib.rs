// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained canvas-object tree with lazy layout resolution and ordered
//! backend synchronization.
//!
//! `stratum_core` keeps a tree of canvas objects (rectangles, images,
//! containers) under a single canvas root. Callers set raw property values;
//! the engine resolves them lazily into absolute geometry, visibility,
//! opacity, and color, and pushes only what changed to a rendering backend.
//! It is `no_std` compatible (with `alloc`) and stores nodes in
//! struct-of-arrays form behind generational handles.
//!
//! # Architecture
//!
//! ```text
//!   Canvas::set() ──► dirty(property) ──► request_sync() up the parent chain
//!                          │
//!                          └──► cascade to descendants (understory_dirty)
//!
//!   Canvas::tick()
//!       │
//!       ▼
//!   synchronize(root) ──► own properties, in sync order
//!       │
//!       ├──► pass 1: active children  ──► container re-sizes if needed
//!       └──► pass 2: passive children
//!                          │
//!                          ▼
//!   Backend::move_to / resize / set_color / show / hide ──► Backend::render()
//! ```
//!
//! **[`canvas`]**: The root driver. Owns the tree and the backend, runs
//! ticks, and keeps the name registry.
//!
//! **[`tree`]**: Struct-of-arrays node storage with generational
//! [`NodeId`](tree::NodeId) handles, per-property raw values, dirty sets,
//! computed caches, and the scheduler.
//!
//! **[`schema`]**: Immutable per-kind property tables: sync order, setters,
//! sync functions, and pseudo-properties. [`kinds`] builds the built-in ones.
//!
//! **[`layout`]**: Pure box-model resolution: relative values, border size,
//! and position.
//!
//! **[`dirty`]**: Cascade channels for invalidation that flows to
//! descendants.
//!
//! **[`backend`]**: The [`Backend`](backend::Backend) trait drawables are
//! pushed through, and a recording implementation.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! sync-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-property
//!   sync events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod canvas;
pub mod color;
pub mod dirty;
pub mod error;
pub mod kinds;
pub mod layout;
pub mod schema;
pub mod status;
pub mod trace;
pub mod tree;
pub mod value;
