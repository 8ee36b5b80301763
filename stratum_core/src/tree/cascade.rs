// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values a node reads from its parent.
//!
//! A node never reads its parent's cache directly. It asks the parent for a
//! value *for a child*, which lets a container answer differently depending
//! on who asks: a passive child gets the container's final inner size as its
//! extents, an active child gets the extents computed for the first pass.

use kurbo::Size;

use super::cache::{Computed, Resolved};
use super::id::INVALID;
use super::store::Tree;
use crate::value::Value;

impl Tree {
    /// A parent's resolved value as seen by `child`.
    pub(crate) fn computed_for_child(&self, parent: u32, child: u32, key: Computed) -> Option<&Resolved> {
        let cache = &self.cache[parent as usize];
        match key {
            Computed::ChildExtents if self.is_passive(child) => {
                cache.current_or_last(Computed::InnerSize)
            }
            _ => cache.current_or_last(key),
        }
    }

    /// The box `idx` resolves percentages against.
    ///
    /// The canvas root gets the configured canvas size; a detached node gets
    /// nothing.
    pub(crate) fn extents_of(&self, idx: u32) -> Size {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return if idx == self.canvas {
                self.config.size
            } else {
                Size::ZERO
            };
        }
        self.computed_for_child(p, idx, Computed::ChildExtents)
            .and_then(Resolved::as_size)
            .unwrap_or(Size::ZERO)
    }

    /// Bottom-right corner of the union of the active children's outer
    /// boxes, relative to the content box of `idx`.
    ///
    /// Passive and non-displayed children are excluded, and so are children
    /// that have never resolved a position and size.
    pub(crate) fn children_extent(&self, idx: u32) -> Size {
        let mut extent = Size::ZERO;
        for c in self.child_indices(idx) {
            if self.is_passive(c) || !self.is_displayed(c) {
                continue;
            }
            let cache = &self.cache[c as usize];
            let pos = cache.current_or_last(Computed::Pos).and_then(Resolved::as_point);
            let size = cache.current_or_last(Computed::Size).and_then(Resolved::as_size);
            let (Some(pos), Some(size)) = (pos, size) else {
                continue;
            };
            let margin = cache
                .current_or_last(Computed::Margin)
                .and_then(Resolved::as_insets)
                .unwrap_or_default();
            extent.width = extent.width.max(pos.x + size.width + margin.x1);
            extent.height = extent.height.max(pos.y + size.height + margin.y1);
        }
        extent
    }

    /// Which axes of `idx` are sized by content rather than by a length or
    /// a span.
    pub(crate) fn auto_axes(&self, idx: u32) -> (bool, bool) {
        let (w, h) = self
            .raw_at(idx, "size")
            .and_then(Value::as_size)
            .unwrap_or_default();
        let pos = self
            .raw_at(idx, "pos")
            .and_then(Value::as_position)
            .unwrap_or_default();
        (w.is_auto() && !pos.x.is_span(), h.is_auto() && !pos.y.is_span())
    }

    /// Returns `true` if the size of `idx` depends on its content.
    pub(crate) fn has_auto_axis(&self, idx: u32) -> bool {
        let (w, h) = self.auto_axes(idx);
        w || h
    }
}
