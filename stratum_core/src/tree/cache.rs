// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Memoized resolved values.

use alloc::collections::BTreeMap;
use alloc::string::String;

use kurbo::{Insets, Point, Size};

use crate::color::Color;

/// Key of a resolved value in a node's cache.
///
/// Most keys are the local resolution of a property; the `*Abs` keys are the
/// value composed with the ancestor chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Computed {
    /// Name currently registered with the canvas.
    Name,
    /// Whether the node is a passive child.
    Passive,
    /// Own `display` flag.
    Display,
    /// Own `visible` flag.
    Visible,
    /// `visible AND display AND parent visible-abs`.
    VisibleAbs,
    /// Resolved margin.
    Margin,
    /// Resolved padding.
    Padding,
    /// Content aspect ratio in effect, if any.
    Aspect,
    /// Border size.
    Size,
    /// Border size minus padding.
    InnerSize,
    /// Extents offered to active children.
    ChildExtents,
    /// Border position relative to the parent's content box.
    Pos,
    /// Border position in canvas coordinates.
    PosAbs,
    /// Content-box position in canvas coordinates.
    InnerPosAbs,
    /// Own opacity.
    Opacity,
    /// `opacity * parent opacity-abs`.
    OpacityAbs,
    /// Own color.
    Color,
    /// Own color blended over the parent's `color-abs`.
    ColorAbs,
    /// A value owned by a host-registered property.
    Custom(&'static str),
}

/// A resolved value.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    /// A flag.
    Bool(bool),
    /// A scalar.
    Number(f64),
    /// A registered name, if any.
    Name(Option<String>),
    /// An aspect ratio, if one applies.
    Ratio(Option<f64>),
    /// Four resolved edges.
    Insets(Insets),
    /// A size.
    Size(Size),
    /// A point.
    Point(Point),
    /// A color.
    Color(Color),
}

impl Resolved {
    /// Returns the flag, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the scalar, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the insets, if this is one.
    #[must_use]
    pub const fn as_insets(&self) -> Option<Insets> {
        match self {
            Self::Insets(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the size, if this is one.
    #[must_use]
    pub const fn as_size(&self) -> Option<Size> {
        match self {
            Self::Size(s) => Some(*s),
            _ => None,
        }
    }

    /// Returns the point, if this is one.
    #[must_use]
    pub const fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the color, if this is one.
    #[must_use]
    pub const fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the ratio, if this is a ratio entry.
    #[must_use]
    pub const fn as_ratio(&self) -> Option<Option<f64>> {
        match self {
            Self::Ratio(r) => Some(*r),
            _ => None,
        }
    }
}

/// Current and previous resolved values of one node.
///
/// Evicting a key moves its current value into the `last` snapshot, so a
/// sync function can tell whether its fresh result actually changed.
#[derive(Clone, Debug, Default)]
pub(crate) struct ComputedCache {
    current: BTreeMap<Computed, Resolved>,
    last: BTreeMap<Computed, Resolved>,
}

impl ComputedCache {
    pub(crate) fn get(&self, key: Computed) -> Option<&Resolved> {
        self.current.get(&key)
    }

    pub(crate) fn last(&self, key: Computed) -> Option<&Resolved> {
        self.last.get(&key)
    }

    /// Current value, or the snapshot taken when it was evicted.
    pub(crate) fn current_or_last(&self, key: Computed) -> Option<&Resolved> {
        self.current.get(&key).or_else(|| self.last.get(&key))
    }

    pub(crate) fn insert(&mut self, key: Computed, value: Resolved) {
        self.current.insert(key, value);
    }

    pub(crate) fn evict(&mut self, key: Computed) {
        if let Some(v) = self.current.remove(&key) {
            self.last.insert(key, v);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.current.clear();
        self.last.clear();
    }
}
