// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The container kind: a node that owns children.
//!
//! A container's `size` sync also decides what it offers its children:
//!
//! - **Inner size** (border size minus padding) is what passive children
//!   resolve against, once the active children have been laid out.
//! - **Child extents** are what active children resolve against: the inner
//!   size on fixed axes, and the container's own extents minus its padding
//!   on auto axes, where the inner size is not known until the children are.

use kurbo::Size;

use super::object::{self, base};
use crate::error::SyncError;
use crate::layout::inner_size;
use crate::schema::{Intrinsic, Schema};
use crate::status::SyncStatus;
use crate::tree::{Computed, Resolved, SyncCx};

/// Properties re-dirtied on children when what they are offered changes.
const CHILD_LAYOUT: &[&str] = &["margin", "padding", "size", "pos"];

/// The container kind.
#[must_use]
pub fn container() -> Schema {
    base("container")
        .override_sync("size", sync_size)
        .container(true)
        .intrinsic(Intrinsic::Children)
        .build()
}

fn sync_size(cx: &mut SyncCx<'_>) -> Result<SyncStatus, SyncError> {
    let status = object::sync_size(cx)?;
    if status.is_unfinished() || !offer_children(cx) {
        return Ok(status | SyncStatus::NOT_FINISHED);
    }
    Ok(status)
}

/// Caches the inner size and the child extents, re-dirtying the children
/// whose offer changed. Returns `false` if size or padding are unresolved.
pub(crate) fn offer_children(cx: &mut SyncCx<'_>) -> bool {
    let size = cx.cached(Computed::Size).and_then(Resolved::as_size);
    let padding = cx.cached(Computed::Padding).and_then(Resolved::as_insets);
    let (Some(size), Some(padding)) = (size, padding) else {
        return false;
    };

    let inner = inner_size(size, padding);
    if cx.store_changed(Computed::InnerSize, Resolved::Size(inner)) {
        cx.dirty_children(true, CHILD_LAYOUT);
    }

    let extents = cx.extents();
    let (auto_w, auto_h) = cx.auto_axes();
    let offered = Size::new(
        if auto_w {
            (extents.width - padding.x_value()).max(0.0)
        } else {
            inner.width
        },
        if auto_h {
            (extents.height - padding.y_value()).max(0.0)
        } else {
            inner.height
        },
    );
    if cx.store_changed(Computed::ChildExtents, Resolved::Size(offered)) {
        cx.dirty_children(false, CHILD_LAYOUT);
    }
    true
}
