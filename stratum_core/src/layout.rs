// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box-model resolution.
//!
//! Pure functions that turn raw lengths into pixels against an *extents*
//! box, and compose margin, padding, size, and position into the border,
//! inner, and outer boxes of a node.
//!
//! ```text
//!  outer box ┌──────────────────────────────┐
//!            │ margin                       │
//!            │  border box ┌──────────────┐ │
//!            │             │ padding      │ │
//!            │             │  ┌────────┐  │ │
//!            │             │  │ inner  │  │ │
//!            │             │  └────────┘  │ │
//!            │             └──────────────┘ │
//!            └──────────────────────────────┘
//! ```
//!
//! `size` is the border size. Extents are the box an ancestor chain offers
//! for resolving percentages, already net of the ancestors' padding.

use kurbo::{Insets, Point, Size, Vec2};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::value::{AxisPos, Edges, Length, ParseLengthError, Position, Value};

/// Resolves a length against the matching extents axis.
///
/// Pixels pass through, percentages become `round(percent / 100 * max)`,
/// and `Auto` has no resolution.
#[must_use]
pub fn resolve(length: Length, max: f64) -> Option<f64> {
    match length {
        Length::Px(v) => Some(v),
        Length::Percent(p) => Some((p / 100.0 * max).round()),
        Length::Auto => None,
    }
}

/// Resolves a loose raw value against `max`.
///
/// Numbers are returned unchanged, numeric text is parsed, and percentage
/// text is scaled. Any other text is an error. `Ok(None)` means `auto`.
pub fn resolve_relative(value: &Value, max: f64) -> Result<Option<f64>, ParseLengthError> {
    Length::from_value(value).map(|l| resolve(l, max))
}

/// Resolves four edges: top and bottom against the extents height, left and
/// right against the extents width. `Auto` edges are zero.
#[must_use]
pub fn resolve_edges(edges: &Edges, extents: Size) -> Insets {
    let h = |l| resolve(l, extents.width).unwrap_or(0.0);
    let v = |l| resolve(l, extents.height).unwrap_or(0.0);
    Insets::new(h(edges.left), v(edges.top), h(edges.right), v(edges.bottom))
}

/// Inputs for [`compute_size`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeRequest {
    /// Raw width.
    pub width: Length,
    /// Raw height.
    pub height: Length,
    /// Raw position; a spanning axis overrides the explicit size.
    pub pos: Position,
    /// Extents box.
    pub extents: Size,
    /// Resolved margin.
    pub margin: Insets,
    /// Resolved padding.
    pub padding: Insets,
    /// Intrinsic content size, `(0, 0)` if unknown.
    pub intrinsic: Size,
    /// Content aspect ratio (width over height) to preserve, if any.
    pub aspect: Option<f64>,
}

impl SizeRequest {
    /// A request with no margin, padding, intrinsic content, or aspect.
    #[must_use]
    pub fn new(width: Length, height: Length, extents: Size) -> Self {
        Self {
            width,
            height,
            pos: Position::default(),
            extents,
            margin: Insets::ZERO,
            padding: Insets::ZERO,
            intrinsic: Size::ZERO,
            aspect: None,
        }
    }

    /// Which axes fall back to intrinsic content.
    #[must_use]
    pub fn auto_axes(&self) -> (bool, bool) {
        (
            self.width.is_auto() && !self.pos.x.is_span(),
            self.height.is_auto() && !self.pos.y.is_span(),
        )
    }
}

/// Computes the border size of a node.
///
/// Per axis, a spanning position wins over the explicit size; otherwise a
/// fixed or percentage size is resolved against the extents; otherwise the
/// axis is intrinsic content plus padding. An aspect ratio derives a single
/// auto axis from the other, or fits the content box inside two fixed axes.
#[must_use]
pub fn compute_size(req: &SizeRequest) -> Size {
    let mut w = span_length(req.pos.x, req.extents.width)
        .map(|outer| (outer - req.margin.x_value()).max(0.0))
        .or_else(|| resolve(req.width, req.extents.width));
    let mut h = span_length(req.pos.y, req.extents.height)
        .map(|outer| (outer - req.margin.y_value()).max(0.0))
        .or_else(|| resolve(req.height, req.extents.height));

    let pad_w = req.padding.x_value();
    let pad_h = req.padding.y_value();

    if let Some(ratio) = req.aspect.filter(|r| r.is_finite() && *r > 0.0) {
        match (w, h) {
            (Some(bw), None) => {
                let content = (bw - pad_w).max(0.0);
                h = Some((content / ratio).round() + pad_h);
            }
            (None, Some(bh)) => {
                let content = (bh - pad_h).max(0.0);
                w = Some((content * ratio).round() + pad_w);
            }
            (Some(bw), Some(bh)) => {
                let mut cw = (bw - pad_w).max(0.0);
                let mut ch = (bh - pad_h).max(0.0);
                if cw > ch * ratio {
                    cw = (ch * ratio).round();
                } else {
                    ch = (cw / ratio).round();
                }
                w = Some(cw + pad_w);
                h = Some(ch + pad_h);
            }
            (None, None) => {}
        }
    }

    Size::new(
        w.unwrap_or(req.intrinsic.width + pad_w),
        h.unwrap_or(req.intrinsic.height + pad_h),
    )
}

/// Computes the outer (margin-box) position of a node inside `extents`.
///
/// `outer` is the border size plus margins.
#[must_use]
pub fn compute_position(pos: &Position, extents: Size, outer: Size) -> Point {
    Point::new(
        axis_position(pos.x, extents.width, outer.width),
        axis_position(pos.y, extents.height, outer.height),
    )
}

fn axis_position(axis: AxisPos, max: f64, outer: f64) -> f64 {
    let r = |l| resolve(l, max).unwrap_or(0.0);
    match axis {
        AxisPos::Start(s) | AxisPos::Span(s, _) => r(s),
        AxisPos::End(e) => r(e) - outer,
        AxisPos::Center(c) => r(c) - (outer / 2.0).floor(),
    }
}

/// Outer size along a spanning axis.
fn span_length(axis: AxisPos, max: f64) -> Option<f64> {
    match axis {
        AxisPos::Span(s, e) => {
            let s = resolve(s, max).unwrap_or(0.0);
            let e = resolve(e, max).unwrap_or(0.0);
            Some((e - s).max(0.0))
        }
        _ => None,
    }
}

/// Border size plus margins.
#[must_use]
pub fn outer_size(border: Size, margin: Insets) -> Size {
    Size::new(
        border.width + margin.x_value(),
        border.height + margin.y_value(),
    )
}

/// Border size minus padding, never negative.
#[must_use]
pub fn inner_size(border: Size, padding: Insets) -> Size {
    Size::new(
        (border.width - padding.x_value()).max(0.0),
        (border.height - padding.y_value()).max(0.0),
    )
}

/// Leading offset of an inset box (left, top).
#[must_use]
pub fn leading(insets: Insets) -> Vec2 {
    Vec2::new(insets.x0, insets.y0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(v: f64) -> Length {
        Length::Px(v)
    }

    #[test]
    fn resolve_relative_forms() {
        assert_eq!(resolve_relative(&Value::Number(7.0), 100.0), Ok(Some(7.0)));
        assert_eq!(resolve_relative(&"7".into(), 100.0), Ok(Some(7.0)));
        assert_eq!(resolve_relative(&"25%".into(), 200.0), Ok(Some(50.0)));
        assert_eq!(resolve_relative(&"auto".into(), 200.0), Ok(None));
        assert_eq!(
            resolve_relative(&"half".into(), 200.0),
            Err(ParseLengthError)
        );
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(resolve(Length::Percent(50.0), 101.0), Some(51.0));
        assert_eq!(resolve(Length::Percent(33.0), 10.0), Some(3.0));
    }

    #[test]
    fn edges_resolve_per_axis() {
        let e = Edges {
            top: Length::Percent(10.0),
            right: px(1.0),
            bottom: Length::Auto,
            left: Length::Percent(10.0),
        };
        let i = resolve_edges(&e, Size::new(200.0, 100.0));
        assert_eq!(i, Insets::new(20.0, 10.0, 1.0, 0.0));
    }

    #[test]
    fn auto_size_is_intrinsic_plus_padding() {
        let req = SizeRequest {
            padding: Insets::uniform(5.0),
            intrinsic: Size::new(50.0, 50.0),
            ..SizeRequest::new(Length::Auto, Length::Auto, Size::new(400.0, 400.0))
        };
        assert_eq!(compute_size(&req), Size::new(60.0, 60.0));
    }

    #[test]
    fn percent_size_resolves_against_extents() {
        let req = SizeRequest::new(
            Length::Percent(50.0),
            Length::Percent(50.0),
            Size::new(200.0, 100.0),
        );
        assert_eq!(compute_size(&req), Size::new(100.0, 50.0));
    }

    #[test]
    fn span_overrides_explicit_size_on_its_axis_only() {
        let req = SizeRequest {
            pos: Position {
                x: AxisPos::Span(px(10.0), px(90.0)),
                y: AxisPos::Start(px(0.0)),
            },
            margin: Insets::new(5.0, 0.0, 5.0, 0.0),
            ..SizeRequest::new(px(500.0), px(30.0), Size::new(100.0, 100.0))
        };
        assert_eq!(compute_size(&req), Size::new(70.0, 30.0));
    }

    #[test]
    fn aspect_derives_missing_axis() {
        let req = SizeRequest {
            aspect: Some(2.0),
            ..SizeRequest::new(px(100.0), Length::Auto, Size::ZERO)
        };
        assert_eq!(compute_size(&req), Size::new(100.0, 50.0));

        let req = SizeRequest {
            aspect: Some(2.0),
            padding: Insets::uniform(2.0),
            ..SizeRequest::new(Length::Auto, px(24.0), Size::ZERO)
        };
        // Content height 20 -> content width 40, plus padding.
        assert_eq!(compute_size(&req), Size::new(44.0, 24.0));
    }

    #[test]
    fn aspect_fits_inside_fixed_box() {
        let req = SizeRequest {
            aspect: Some(2.0),
            ..SizeRequest::new(px(100.0), px(100.0), Size::ZERO)
        };
        assert_eq!(compute_size(&req), Size::new(100.0, 50.0));

        let req = SizeRequest {
            aspect: Some(0.5),
            ..SizeRequest::new(px(100.0), px(100.0), Size::ZERO)
        };
        assert_eq!(compute_size(&req), Size::new(50.0, 100.0));
    }

    #[test]
    fn position_anchors() {
        let extents = Size::new(200.0, 100.0);
        let outer = Size::new(21.0, 10.0);
        let pos = Position {
            x: AxisPos::End(px(200.0)),
            y: AxisPos::Center(Length::Percent(50.0)),
        };
        assert_eq!(
            compute_position(&pos, extents, outer),
            Point::new(179.0, 45.0)
        );

        let centered = Position {
            x: AxisPos::Center(px(100.0)),
            y: AxisPos::Span(px(3.0), px(40.0)),
        };
        // floor(21 / 2) = 10
        assert_eq!(
            compute_position(&centered, extents, outer),
            Point::new(90.0, 3.0)
        );
    }

    #[test]
    fn box_helpers() {
        let border = Size::new(60.0, 60.0);
        assert_eq!(
            inner_size(border, Insets::uniform(5.0)),
            Size::new(50.0, 50.0)
        );
        assert_eq!(
            outer_size(border, Insets::new(1.0, 2.0, 3.0, 4.0)),
            Size::new(64.0, 66.0)
        );
        assert_eq!(
            inner_size(Size::new(4.0, 4.0), Insets::uniform(5.0)),
            Size::ZERO
        );
    }
}
