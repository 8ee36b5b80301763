// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in node kinds.
//!
//! Every kind starts from [`object::base`], which fixes the shared sync
//! order and pseudo-properties. Kinds then insert properties or override
//! sync functions before freezing the schema:
//!
//! | Kind        | [`KindId`]              | Differences from `base`                  |
//! |-------------|-------------------------|------------------------------------------|
//! | `canvas`    | [`KindId::CANVAS`]      | root; size is the configured canvas size |
//! | `container` | [`KindId::CONTAINER`]   | owns children; auto size from children   |
//! | `rectangle` | [`KindId::RECTANGLE`]   | none                                     |
//! | `image`     | [`KindId::IMAGE`]       | `aspect` before `size`; backend content  |
//!
//! Hosts can register further kinds built the same way with
//! [`Canvas::register_kind`](crate::canvas::Canvas::register_kind).
//!
//! [`KindId`]: crate::schema::KindId
//! [`KindId::CANVAS`]: crate::schema::KindId::CANVAS
//! [`KindId::CONTAINER`]: crate::schema::KindId::CONTAINER
//! [`KindId::RECTANGLE`]: crate::schema::KindId::RECTANGLE
//! [`KindId::IMAGE`]: crate::schema::KindId::IMAGE

mod canvas;
mod container;
mod image;
pub mod object;

pub use canvas::canvas;
pub use container::container;
pub use image::image;
pub use object::rectangle;

use crate::schema::Schema;

/// Built-in schemas, in [`KindId`](crate::schema::KindId) order.
pub(crate) fn builtin() -> [Schema; 4] {
    [canvas(), container(), rectangle(), image()]
}
