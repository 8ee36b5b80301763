// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas root kind.

use super::container::offer_children;
use super::object::{apply_size, base};
use crate::error::SyncError;
use crate::schema::{Intrinsic, Schema};
use crate::status::SyncStatus;
use crate::tree::SyncCx;

/// The canvas root: a container whose size is the configured canvas size.
#[must_use]
pub fn canvas() -> Schema {
    base("canvas")
        .override_sync("size", sync_size)
        .container(true)
        .root(true)
        .intrinsic(Intrinsic::Children)
        .build()
}

fn sync_size(cx: &mut SyncCx<'_>) -> Result<SyncStatus, SyncError> {
    let size = cx.config().size;
    let status = apply_size(cx, size);
    if !offer_children(cx) {
        return Ok(status | SyncStatus::NOT_FINISHED);
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;
    use crate::backend::{BackendCall, RecordingBackend};
    use crate::canvas::CanvasConfig;
    use crate::tree::{Computed, Resolved, Tree};

    #[test]
    fn unresolved_padding_keeps_the_size_outcome() {
        let mut backend = RecordingBackend::new();
        let mut tree = Tree::new(CanvasConfig::new(Size::new(320.0, 200.0)));
        let root = tree.create_root(&mut backend);

        // Padding is still dirty, so nothing can be offered to children yet.
        let mut cx = SyncCx {
            tree: &mut tree,
            backend: &mut backend,
            idx: root.idx,
            property: "size",
        };
        let status = sync_size(&mut cx).unwrap();
        assert!(status.is_unfinished(), "children were not offered a box");
        assert!(
            status.contains(SyncStatus::SIZE_CHANGED | SyncStatus::NEEDS_RENDER),
            "the resize already happened: {status:?}"
        );
        assert_eq!(
            cx.cached(Computed::Size),
            Some(&Resolved::Size(Size::new(320.0, 200.0)))
        );
        assert!(
            backend
                .calls()
                .iter()
                .any(|call| matches!(call, BackendCall::Resize(_, s) if *s == Size::new(320.0, 200.0))),
            "resize pushed"
        );
    }
}
