// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Properties shared by every node kind.
//!
//! Sync order:
//!
//! | # | Property  | Caches                            | Re-dirties on change        |
//! |---|-----------|-----------------------------------|-----------------------------|
//! | 0 | `name`    | `Name`                            |                             |
//! | 1 | `passive` | `Passive`                         | own `margin..pos`           |
//! | 2 | `display` | `Display`                         | own `visible`               |
//! | 3 | `visible` | `Visible`, `VisibleAbs`           |                             |
//! | 4 | `margin`  | `Margin`                          | own `size`, `pos`           |
//! | 5 | `padding` | `Padding`                         | own `size`, `pos`           |
//! | 6 | `size`    | `Size`                            | own `pos`                   |
//! | 7 | `pos`     | `Pos`, `PosAbs`, `InnerPosAbs`    |                             |
//! | 8 | `opacity` | `Opacity`, `OpacityAbs`           |                             |
//! | 9 | `color`   | `Color`, `ColorAbs`               |                             |

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Insets, Point, Size};

use crate::color::Color;
use crate::dirty::Cascade;
use crate::error::{PropertyError, SyncError};
use crate::layout::{SizeRequest, compute_position, compute_size, leading, outer_size, resolve_edges};
use crate::schema::{PropertyDef, Schema, SchemaBuilder, SyncGate};
use crate::status::SyncStatus;
use crate::tree::{Computed, Resolved, SetCx, SyncCx};
use crate::value::{AxisPos, Edges, Length, Position, Value};

/// Starts a schema with the shared object properties and pseudo-properties.
#[must_use]
pub fn base(name: &'static str) -> SchemaBuilder {
    Schema::builder(name)
        .property(
            PropertyDef::new("name", Value::None, sync_name)
                .with_setter(set_name)
                .with_gate(SyncGate::Always)
                .caching(Computed::Name, &[]),
        )
        .property(
            PropertyDef::new("passive", Value::Bool(false), sync_passive)
                .with_setter(set_passive)
                .with_gate(SyncGate::Always)
                .caching(Computed::Passive, &[]),
        )
        .property(
            PropertyDef::new("display", Value::Bool(true), sync_display)
                .with_setter(set_bool)
                .caching(Computed::Display, &[])
                .cascading(Cascade::Visibility),
        )
        .property(
            PropertyDef::new("visible", Value::Bool(true), sync_visible)
                .with_setter(set_bool)
                .caching(Computed::Visible, &[Computed::VisibleAbs])
                .cascading(Cascade::Visibility),
        )
        .property(
            PropertyDef::new("margin", Value::Edges(Edges::default()), sync_margin)
                .with_setter(set_edges)
                .caching(Computed::Margin, &[]),
        )
        .property(
            PropertyDef::new("padding", Value::Edges(Edges::default()), sync_padding)
                .with_setter(set_edges)
                .caching(Computed::Padding, &[]),
        )
        .property(
            PropertyDef::new("size", Value::Size(Length::Auto, Length::Auto), sync_size)
                .with_setter(set_size)
                .caching(Computed::Size, &[Computed::InnerSize, Computed::ChildExtents]),
        )
        .property(
            PropertyDef::new("pos", Value::Position(Position::default()), sync_pos)
                .with_setter(set_pos)
                .caching(Computed::Pos, &[Computed::PosAbs, Computed::InnerPosAbs])
                .cascading(Cascade::Position),
        )
        .property(
            PropertyDef::new("opacity", Value::Number(1.0), sync_opacity)
                .with_setter(set_opacity)
                .caching(Computed::Opacity, &[Computed::OpacityAbs])
                .cascading(Cascade::Opacity),
        )
        .property(
            PropertyDef::new("color", Value::Color(Color::WHITE), sync_color)
                .with_setter(set_color)
                .caching(Computed::Color, &[Computed::ColorAbs])
                .cascading(Cascade::Color),
        )
        .pseudo("margin-top", set_margin_top)
        .pseudo("margin-right", set_margin_right)
        .pseudo("margin-bottom", set_margin_bottom)
        .pseudo("margin-left", set_margin_left)
        .pseudo("padding-top", set_padding_top)
        .pseudo("padding-right", set_padding_right)
        .pseudo("padding-bottom", set_padding_bottom)
        .pseudo("padding-left", set_padding_left)
        .pseudo("width", set_width)
        .pseudo("height", set_height)
        .pseudo("left", set_left)
        .pseudo("top", set_top)
        .pseudo("right", set_right)
        .pseudo("bottom", set_bottom)
        .pseudo("hcenter", set_hcenter)
        .pseudo("vcenter", set_vcenter)
}

/// The plain rectangle kind.
#[must_use]
pub fn rectangle() -> Schema {
    base("rectangle").build()
}

// ---------------------------------------------------------------------------
// Setters
// ---------------------------------------------------------------------------

type SetResult = Result<Option<Value>, PropertyError>;

fn set_bool(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    match value {
        Value::Bool(_) => Ok(Some(value)),
        _ => Err(cx.invalid("expected a boolean")),
    }
}

fn set_passive(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    let Value::Bool(passive) = value else {
        return Err(cx.invalid("expected a boolean"));
    };
    if cx.raw("passive").and_then(Value::as_bool) != Some(passive) {
        // Passive children do not count towards the parent's auto size.
        cx.dirty_parent("size");
    }
    Ok(Some(value))
}

fn set_name(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    match value {
        Value::Text(_) | Value::None => Ok(Some(value)),
        _ => Err(cx.invalid("expected text or nothing")),
    }
}

fn set_opacity(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    match value.as_number() {
        Some(n) if (0.0..=1.0).contains(&n) => Ok(Some(Value::Number(n))),
        _ => Err(cx.invalid("expected a number between 0 and 1")),
    }
}

fn set_color(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    let color = match &value {
        Value::Color(c) => Some(*c),
        Value::Text(hex) => Color::parse_hex(hex),
        Value::List(items) => numbers(items).and_then(|n| Color::from_channels(&n)),
        _ => None,
    };
    match color {
        Some(c) => Ok(Some(Value::Color(c))),
        None => Err(cx.invalid("expected a hex string or 3 to 4 channels in 0..=255")),
    }
}

fn set_edges(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    let edges = match &value {
        Value::Edges(e) => Some(*e).filter(Edges::is_finite),
        Value::List(items) => match items.as_slice() {
            [all] => length(all).map(Edges::uniform),
            [v, h] => length(v).zip(length(h)).map(|(v, h)| Edges::symmetric(v, h)),
            [t, r, b, l] => four_edges(t, r, b, l),
            _ => None,
        },
        single => length(single).map(Edges::uniform),
    };
    match edges {
        Some(e) => Ok(Some(Value::Edges(e))),
        None => Err(cx.invalid("expected one, two, or four lengths")),
    }
}

fn set_size(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    let size = match &value {
        Value::Size(w, h) => Some((*w, *h)).filter(|(w, h)| w.is_finite() && h.is_finite()),
        Value::List(items) => match items.as_slice() {
            [w, h] => length(w).zip(length(h)),
            _ => None,
        },
        single => length(single).map(|l| (l, l)),
    };
    match size {
        Some((w, h)) => Ok(Some(Value::Size(w, h))),
        None => Err(cx.invalid("expected a width and a height")),
    }
}

fn set_pos(cx: &mut SetCx<'_>, value: Value) -> SetResult {
    let pos = match &value {
        Value::Position(p) => Some(*p).filter(Position::is_finite),
        Value::List(items) => match items.as_slice() {
            [x, y] => length(x).zip(length(y)).map(|(x, y)| Position::at(x, y)),
            _ => None,
        },
        _ => None,
    };
    match pos {
        Some(p) => Ok(Some(Value::Position(p))),
        None => Err(cx.invalid("expected an x and a y")),
    }
}

fn four_edges(top: &Value, right: &Value, bottom: &Value, left: &Value) -> Option<Edges> {
    Some(Edges {
        top: length(top)?,
        right: length(right)?,
        bottom: length(bottom)?,
        left: length(left)?,
    })
}

/// A loose value as a finite length; `None` means `auto`.
fn length(value: &Value) -> Option<Length> {
    Length::from_value(value).ok()
}

fn numbers(items: &[Value]) -> Option<Vec<f64>> {
    items.iter().map(Value::as_number).collect()
}

// -- Pseudo-properties --

fn edit_edges(cx: &mut SetCx<'_>, composite: &str, value: Value, edit: fn(&mut Edges, Length)) -> SetResult {
    let Some(l) = length(&value) else {
        return Err(cx.invalid("expected a length"));
    };
    let mut edges = cx.raw(composite).and_then(Value::as_edges).unwrap_or_default();
    edit(&mut edges, l);
    cx.set(composite, Value::Edges(edges))?;
    Ok(None)
}

fn set_margin_top(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "margin", v, |e, l| e.top = l)
}

fn set_margin_right(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "margin", v, |e, l| e.right = l)
}

fn set_margin_bottom(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "margin", v, |e, l| e.bottom = l)
}

fn set_margin_left(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "margin", v, |e, l| e.left = l)
}

fn set_padding_top(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "padding", v, |e, l| e.top = l)
}

fn set_padding_right(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "padding", v, |e, l| e.right = l)
}

fn set_padding_bottom(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "padding", v, |e, l| e.bottom = l)
}

fn set_padding_left(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_edges(cx, "padding", v, |e, l| e.left = l)
}

fn edit_size(cx: &mut SetCx<'_>, value: Value, horizontal: bool) -> SetResult {
    let Some(l) = length(&value) else {
        return Err(cx.invalid("expected a length"));
    };
    let (w, h) = cx
        .raw("size")
        .and_then(Value::as_size)
        .unwrap_or((Length::Auto, Length::Auto));
    let size = if horizontal { (l, h) } else { (w, l) };
    cx.set("size", Value::Size(size.0, size.1))?;
    Ok(None)
}

fn set_width(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_size(cx, v, true)
}

fn set_height(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_size(cx, v, false)
}

/// Rewrites one axis of `pos`. `Value::None` unsets the coordinate.
fn edit_axis(
    cx: &mut SetCx<'_>,
    value: Value,
    horizontal: bool,
    edit: fn(AxisPos, Option<Length>) -> AxisPos,
) -> SetResult {
    let l = match value {
        Value::None => None,
        other => match length(&other) {
            Some(l) => Some(l),
            None => return Err(cx.invalid("expected a length or nothing")),
        },
    };
    let mut pos = cx
        .raw("pos")
        .and_then(Value::as_position)
        .unwrap_or_default();
    if horizontal {
        pos.x = edit(pos.x, l);
    } else {
        pos.y = edit(pos.y, l);
    }
    cx.set("pos", Value::Position(pos))?;
    Ok(None)
}

fn center(_: AxisPos, l: Option<Length>) -> AxisPos {
    l.map_or_else(AxisPos::default, AxisPos::Center)
}

fn set_left(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_axis(cx, v, true, AxisPos::with_start)
}

fn set_top(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_axis(cx, v, false, AxisPos::with_start)
}

fn set_right(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_axis(cx, v, true, AxisPos::with_end)
}

fn set_bottom(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_axis(cx, v, false, AxisPos::with_end)
}

fn set_hcenter(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_axis(cx, v, true, center)
}

fn set_vcenter(cx: &mut SetCx<'_>, v: Value) -> SetResult {
    edit_axis(cx, v, false, center)
}

// ---------------------------------------------------------------------------
// Sync functions
// ---------------------------------------------------------------------------

type SyncResult = Result<SyncStatus, SyncError>;

pub(crate) fn mismatch(property: &'static str, expected: &'static str) -> SyncError {
    SyncError::Mismatch { property, expected }
}

fn raw_bool(cx: &SyncCx<'_>, name: &'static str) -> Result<bool, SyncError> {
    cx.raw(name)
        .and_then(Value::as_bool)
        .ok_or_else(|| mismatch(name, "a boolean"))
}

fn cached_insets(cx: &SyncCx<'_>, key: Computed) -> Option<Insets> {
    cx.cached(key).and_then(Resolved::as_insets)
}

/// `NEEDS_RENDER` if a backend call was made.
pub(crate) fn render_if(pushed: bool) -> SyncStatus {
    if pushed {
        SyncStatus::NEEDS_RENDER
    } else {
        SyncStatus::NOOP
    }
}

fn sync_name(cx: &mut SyncCx<'_>) -> SyncResult {
    if !cx.is_rooted() {
        return Ok(SyncStatus::NOT_FINISHED);
    }
    let name: Option<String> = match cx.raw("name") {
        Some(Value::Text(s)) => Some(s.clone()),
        Some(Value::None) => None,
        _ => return Err(mismatch("name", "text")),
    };
    if let Some(Resolved::Name(Some(old))) = cx.last(Computed::Name).cloned() {
        cx.unregister_name(&old);
    }
    if let Some(n) = &name {
        cx.register_name(n.clone());
    }
    cx.store(Computed::Name, Resolved::Name(name));
    Ok(SyncStatus::NOOP)
}

fn sync_passive(cx: &mut SyncCx<'_>) -> SyncResult {
    let passive = raw_bool(cx, "passive")?;
    let seen = cx.last(Computed::Passive).is_some();
    if cx.store_changed(Computed::Passive, Resolved::Bool(passive)) && seen {
        // The extents offered by the parent depend on the phase.
        for name in ["margin", "padding", "size", "pos"] {
            cx.dirty(name);
        }
    }
    Ok(SyncStatus::NOOP)
}

fn sync_display(cx: &mut SyncCx<'_>) -> SyncResult {
    let display = raw_bool(cx, "display")?;
    let changed = cx.store_changed(Computed::Display, Resolved::Bool(display));
    cx.dirty("visible");
    Ok(if changed {
        SyncStatus::SIZE_CHANGED
    } else {
        SyncStatus::NOOP
    })
}

fn sync_visible(cx: &mut SyncCx<'_>) -> SyncResult {
    let own = raw_bool(cx, "visible")?;
    let display = raw_bool(cx, "display")?;
    let inherited = cx.is_root()
        || cx
            .from_parent(Computed::VisibleAbs)
            .and_then(Resolved::as_bool)
            .unwrap_or(false);
    let abs = own && display && inherited;
    cx.store(Computed::Visible, Resolved::Bool(own));
    if cx.store_changed(Computed::VisibleAbs, Resolved::Bool(abs)) {
        cx.dirty_every_child("visible");
    }
    Ok(render_if(cx.push_shown(abs)))
}

fn sync_edges(cx: &mut SyncCx<'_>, name: &'static str, key: Computed) -> SyncResult {
    let edges = cx
        .raw(name)
        .and_then(Value::as_edges)
        .ok_or_else(|| mismatch(name, "edges"))?;
    let insets = resolve_edges(&edges, cx.extents());
    if cx.store_changed(key, Resolved::Insets(insets)) {
        cx.dirty("size");
        cx.dirty("pos");
    }
    Ok(SyncStatus::NOOP)
}

fn sync_margin(cx: &mut SyncCx<'_>) -> SyncResult {
    sync_edges(cx, "margin", Computed::Margin)
}

fn sync_padding(cx: &mut SyncCx<'_>) -> SyncResult {
    sync_edges(cx, "padding", Computed::Padding)
}

/// Gathers the inputs of a size computation, or `None` if margin or padding
/// have not been resolved yet.
pub(crate) fn size_request(cx: &SyncCx<'_>) -> Result<Option<SizeRequest>, SyncError> {
    let (width, height) = cx
        .raw("size")
        .and_then(Value::as_size)
        .ok_or_else(|| mismatch("size", "a width and a height"))?;
    let pos = cx
        .raw("pos")
        .and_then(Value::as_position)
        .ok_or_else(|| mismatch("pos", "a position"))?;
    let (Some(margin), Some(padding)) = (
        cached_insets(cx, Computed::Margin),
        cached_insets(cx, Computed::Padding),
    ) else {
        return Ok(None);
    };
    let aspect = cx
        .cached(Computed::Aspect)
        .and_then(Resolved::as_ratio)
        .flatten();
    Ok(Some(SizeRequest {
        width,
        height,
        pos,
        extents: cx.extents(),
        margin,
        padding,
        intrinsic: cx.intrinsic_size(),
        aspect,
    }))
}

/// Caches a freshly computed border size and pushes it.
pub(crate) fn apply_size(cx: &mut SyncCx<'_>, size: Size) -> SyncStatus {
    let mut status = SyncStatus::NOOP;
    if cx.store_changed(Computed::Size, Resolved::Size(size)) {
        status |= SyncStatus::SIZE_CHANGED;
        cx.dirty("pos");
    }
    status | render_if(cx.push_resize(size))
}

pub(crate) fn sync_size(cx: &mut SyncCx<'_>) -> SyncResult {
    let Some(req) = size_request(cx)? else {
        return Ok(SyncStatus::NOT_FINISHED);
    };
    Ok(apply_size(cx, compute_size(&req)))
}

fn sync_pos(cx: &mut SyncCx<'_>) -> SyncResult {
    let position = cx
        .raw("pos")
        .and_then(Value::as_position)
        .ok_or_else(|| mismatch("pos", "a position"))?;
    let size = cx.cached(Computed::Size).and_then(Resolved::as_size);
    let margin = cached_insets(cx, Computed::Margin);
    let padding = cached_insets(cx, Computed::Padding);
    let (Some(size), Some(margin), Some(padding)) = (size, margin, padding) else {
        return Ok(SyncStatus::NOT_FINISHED);
    };

    let outer = outer_size(size, margin);
    let rel = compute_position(&position, cx.extents(), outer) + leading(margin);
    let origin = cx
        .from_parent(Computed::InnerPosAbs)
        .and_then(Resolved::as_point)
        .unwrap_or(Point::ORIGIN);
    let abs = origin + rel.to_vec2();

    let mut status = SyncStatus::NOOP;
    if cx.store_changed(Computed::Pos, Resolved::Point(rel)) {
        status |= SyncStatus::POS_CHANGED;
    }
    cx.store(Computed::PosAbs, Resolved::Point(abs));
    if cx.store_changed(Computed::InnerPosAbs, Resolved::Point(abs + leading(padding))) {
        cx.dirty_every_child("pos");
    }
    Ok(status | render_if(cx.push_move(abs)))
}

fn sync_opacity(cx: &mut SyncCx<'_>) -> SyncResult {
    let own = cx
        .raw("opacity")
        .and_then(Value::as_number)
        .ok_or_else(|| mismatch("opacity", "a number"))?;
    let inherited = if cx.is_root() {
        1.0
    } else {
        cx.from_parent(Computed::OpacityAbs)
            .and_then(Resolved::as_number)
            .unwrap_or(1.0)
    };
    let abs = own * inherited;
    cx.store(Computed::Opacity, Resolved::Number(own));
    if cx.store_changed(Computed::OpacityAbs, Resolved::Number(abs)) {
        cx.dirty_every_child("opacity");
    }

    // Recombine the already blended color with the new alpha.
    match cx.cached(Computed::ColorAbs).and_then(Resolved::as_color) {
        Some(color) => Ok(render_if(cx.push_color(color.with_opacity(abs)))),
        None => Ok(SyncStatus::NOOP),
    }
}

fn sync_color(cx: &mut SyncCx<'_>) -> SyncResult {
    let own = cx
        .raw("color")
        .and_then(Value::as_color)
        .ok_or_else(|| mismatch("color", "a color"))?;
    let parent = if cx.is_root() {
        None
    } else {
        cx.from_parent(Computed::ColorAbs).and_then(Resolved::as_color)
    };
    let abs = parent.map_or(own, |p| own.blend(p));
    cx.store(Computed::Color, Resolved::Color(own));
    if cx.store_changed(Computed::ColorAbs, Resolved::Color(abs)) {
        cx.dirty_every_child("color");
    }

    let Some(opacity) = cx.cached(Computed::OpacityAbs).and_then(Resolved::as_number) else {
        return Ok(SyncStatus::NOT_FINISHED);
    };
    Ok(render_if(cx.push_color(abs.with_opacity(opacity))))
}
