// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cascade channel constants.
//!
//! Stratum uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! push invalidation of inherited values down the tree. Each channel is one
//! absolute cascade; every attached child has a dependency edge to its
//! parent on every channel.
//!
//! # Propagation semantics
//!
//! Dirtying a cascading property marks its channel with
//! [`EagerPolicy`](understory_dirty::EagerPolicy) and drains it right away.
//! Every descendant in the drain output gets the cascade's
//! [descendant property](Cascade::descendant_property) dirtied, which evicts
//! its `-abs` value and queues it for synchronization.
//!
//! | Cascade                  | Marked by             | Dirtied in descendants |
//! |--------------------------|-----------------------|------------------------|
//! | [`Cascade::Visibility`]  | `display`, `visible`  | `visible`              |
//! | [`Cascade::Opacity`]     | `opacity`             | `opacity`              |
//! | [`Cascade::Color`]       | `color`               | `color`                |
//! | [`Cascade::Position`]    | `pos`                 | `pos`                  |
//!
//! Properties with no cascade (margin, padding, size, name, ...) only
//! invalidate the node itself; their sync functions re-dirty dependents
//! when a resolved value actually changes.

use understory_dirty::Channel;

/// Visibility or display changed: `visible-abs` of descendants is stale.
pub const VISIBILITY: Channel = Channel::new(0);

/// Opacity changed: `opacity-abs` of descendants is stale.
pub const OPACITY: Channel = Channel::new(1);

/// Color changed: `color-abs` of descendants is stale.
pub const COLOR: Channel = Channel::new(2);

/// Position changed: `pos-abs` of descendants is stale.
pub const POSITION: Channel = Channel::new(3);

/// An absolute value inherited from the parent chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cascade {
    /// `visible-abs`.
    Visibility,
    /// `opacity-abs`.
    Opacity,
    /// `color-abs`.
    Color,
    /// `pos-abs`.
    Position,
}

impl Cascade {
    /// Every cascade, in the order dependency edges are added.
    pub const ALL: [Self; 4] = [
        Self::Visibility,
        Self::Opacity,
        Self::Color,
        Self::Position,
    ];

    /// The dirty-tracking channel for this cascade.
    #[must_use]
    pub const fn channel(self) -> Channel {
        match self {
            Self::Visibility => VISIBILITY,
            Self::Opacity => OPACITY,
            Self::Color => COLOR,
            Self::Position => POSITION,
        }
    }

    /// The property dirtied in each descendant when this cascade is drained.
    #[must_use]
    pub const fn descendant_property(self) -> &'static str {
        match self {
            Self::Visibility => "visible",
            Self::Opacity => "opacity",
            Self::Color => "color",
            Self::Position => "pos",
        }
    }
}
