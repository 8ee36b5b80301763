// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node tree.
//!
//! Every node stores, per synchronized property of its kind:
//!
//! - the **raw** value the caller set;
//! - whether the property is **dirty** (stale relative to the backend);
//! - the **computed** values resolved from it, plus the `last` snapshot
//!   taken when they were evicted.
//!
//! A dirty property is never cached and a cached property is never dirty:
//! dirtying evicts, and a successful sync removes the property from the
//! dirty set after caching its resolution.
//!
//! Nodes are addressed by generational [`NodeId`] handles. The tree owns all
//! nodes; parent links are plain slot indices, so a child never keeps its
//! parent alive.

mod cache;
mod cascade;
mod id;
mod lifecycle;
mod property;
mod store;
mod sync;
mod traverse;

pub use cache::{Computed, Resolved};
pub use id::NodeId;
pub use property::SetCx;
pub use store::Tree;
pub use sync::SyncCx;
pub use traverse::Children;
