// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronization outcome bitmask.

use bitflags::bitflags;

bitflags! {
    /// Outcome of synchronizing a property, a node, or a whole subtree.
    ///
    /// Statuses combine with `|`. The empty set is [`SyncStatus::NOOP`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SyncStatus: u8 {
        /// A value visible to the backend changed; a redraw is needed.
        const NEEDS_RENDER = 1 << 0;
        /// The node's border size changed.
        const SIZE_CHANGED = 1 << 1;
        /// The node's position relative to its parent changed.
        const POS_CHANGED = 1 << 2;
        /// Work remains; the caller must synchronize this node again later.
        const NOT_FINISHED = 1 << 3;
    }
}

impl SyncStatus {
    /// Nothing observable happened.
    pub const NOOP: Self = Self::empty();

    /// Bits that tell a container its auto size may be stale.
    pub const GEOMETRY: Self = Self::SIZE_CHANGED.union(Self::POS_CHANGED);

    /// Returns `true` if the node needs another synchronization pass.
    #[inline]
    #[must_use]
    pub const fn is_unfinished(self) -> bool {
        self.contains(Self::NOT_FINISHED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_is_empty() {
        assert!(SyncStatus::NOOP.is_empty());
        assert_eq!(SyncStatus::default(), SyncStatus::NOOP);
    }

    #[test]
    fn geometry_covers_size_and_pos() {
        assert!(SyncStatus::SIZE_CHANGED.intersects(SyncStatus::GEOMETRY));
        assert!(SyncStatus::POS_CHANGED.intersects(SyncStatus::GEOMETRY));
        assert!(!SyncStatus::NEEDS_RENDER.intersects(SyncStatus::GEOMETRY));
    }
}
