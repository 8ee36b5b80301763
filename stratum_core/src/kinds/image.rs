// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The image kind.
//!
//! An image's intrinsic size comes from its backend handle and may be
//! unknown (`(0, 0)`) until the content is decoded. Until then, any axis
//! that depends on it stays dirty and reports `NOT_FINISHED`, so the next
//! tick retries it.
//!
//! `aspect` is synchronized before `size`:
//!
//! - `auto` keeps the intrinsic width-to-height ratio;
//! - a positive number is a fixed ratio;
//! - nothing (or `false`) lets both axes size freely.

use super::object::{self, apply_size, base, mismatch};
use crate::error::{PropertyError, SyncError};
use crate::layout::compute_size;
use crate::schema::{Intrinsic, PropertyDef, Schema};
use crate::status::SyncStatus;
use crate::tree::{Computed, Resolved, SetCx, SyncCx};
use crate::value::{Length, Value};

/// The image kind.
#[must_use]
pub fn image() -> Schema {
    base("image")
        .insert_before(
            "size",
            PropertyDef::new("aspect", Value::Length(Length::Auto), sync_aspect)
                .with_setter(set_aspect)
                .caching(Computed::Aspect, &[]),
        )
        .override_sync("size", sync_size)
        .intrinsic(Intrinsic::Backend)
        .build()
}

fn set_aspect(cx: &mut SetCx<'_>, value: Value) -> Result<Option<Value>, PropertyError> {
    match &value {
        Value::Length(Length::Auto) => Ok(Some(value)),
        Value::Text(t) if t.trim() == "auto" => Ok(Some(Value::Length(Length::Auto))),
        Value::Number(r) if r.is_finite() && *r > 0.0 => Ok(Some(value)),
        Value::None | Value::Bool(false) => Ok(Some(Value::None)),
        _ => Err(cx.invalid("expected `auto`, a positive ratio, or nothing")),
    }
}

fn sync_aspect(cx: &mut SyncCx<'_>) -> Result<SyncStatus, SyncError> {
    let ratio = match cx.raw("aspect") {
        Some(Value::Length(Length::Auto)) => {
            let intrinsic = cx.intrinsic_size();
            if intrinsic.width <= 0.0 || intrinsic.height <= 0.0 {
                return Ok(SyncStatus::NOT_FINISHED);
            }
            Some(intrinsic.width / intrinsic.height)
        }
        Some(Value::Number(r)) => Some(*r),
        Some(Value::None) => None,
        _ => return Err(mismatch("aspect", "`auto`, a ratio, or nothing")),
    };
    if cx.store_changed(Computed::Aspect, Resolved::Ratio(ratio)) {
        cx.dirty("size");
    }
    Ok(SyncStatus::NOOP)
}

fn sync_size(cx: &mut SyncCx<'_>) -> Result<SyncStatus, SyncError> {
    if cx.cached(Computed::Aspect).is_none() {
        return Ok(SyncStatus::NOT_FINISHED);
    }
    let Some(req) = object::size_request(cx)? else {
        return Ok(SyncStatus::NOT_FINISHED);
    };
    let (auto_w, auto_h) = req.auto_axes();
    let needs_intrinsic = (auto_w && auto_h) || ((auto_w || auto_h) && req.aspect.is_none());
    if needs_intrinsic && (req.intrinsic.width <= 0.0 || req.intrinsic.height <= 0.0) {
        return Ok(SyncStatus::NOT_FINISHED);
    }
    Ok(apply_size(cx, compute_size(&req)))
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::Size;

    use crate::backend::RecordingBackend;
    use crate::canvas::{Canvas, CanvasConfig};
    use crate::error::{Error, PropertyError};
    use crate::schema::KindId;
    use crate::tree::{Computed, NodeId, Resolved};
    use crate::value::{Length, Value};

    type TestCanvas = Canvas<RecordingBackend>;

    fn image_in_root(props: Vec<(&'static str, Value)>) -> (TestCanvas, NodeId) {
        let mut c = Canvas::new(RecordingBackend::new(), CanvasConfig::default());
        let img = c.create_with(KindId::IMAGE, props).unwrap();
        c.add_child(c.root(), img).unwrap();
        (c, img)
    }

    fn decode(c: &mut TestCanvas, img: NodeId, w: f64, h: f64) {
        let handle = c.handle(img).unwrap().unwrap();
        c.backend_mut().set_intrinsic_size(handle, Size::new(w, h));
    }

    fn size_of(c: &TestCanvas, id: NodeId) -> Option<Size> {
        c.computed(id, Computed::Size).unwrap().and_then(Resolved::as_size)
    }

    #[test]
    fn auto_size_is_intrinsic_plus_padding() {
        let (mut c, img) = image_in_root(vec![("padding", Value::from(5))]);
        decode(&mut c, img, 50.0, 50.0);
        let out = c.tick();
        assert!(!out.status.is_unfinished());
        assert_eq!(size_of(&c, img), Some(Size::new(60.0, 60.0)));
        assert_eq!(
            c.computed(img, Computed::Aspect).unwrap(),
            Some(&Resolved::Ratio(Some(1.0)))
        );
    }

    #[test]
    fn unknown_intrinsic_size_is_retried() {
        let (mut c, img) = image_in_root(vec![]);
        let out = c.tick();
        assert!(out.status.is_unfinished());
        assert!(c.is_dirty(img, "aspect").unwrap());
        assert!(c.is_dirty(img, "size").unwrap());
        assert!(c.is_dirty(img, "pos").unwrap());
        // Properties that do not depend on the size still sync.
        assert!(!c.is_dirty(img, "color").unwrap());

        decode(&mut c, img, 40.0, 20.0);
        let out = c.tick();
        assert!(!out.status.is_unfinished());
        assert_eq!(size_of(&c, img), Some(Size::new(40.0, 20.0)));
    }

    #[test]
    fn one_fixed_axis_follows_the_ratio() {
        let (mut c, img) = image_in_root(vec![("width", Value::from(100))]);
        decode(&mut c, img, 50.0, 25.0);
        c.tick();
        assert_eq!(size_of(&c, img), Some(Size::new(100.0, 50.0)));
    }

    #[test]
    fn free_aspect_uses_intrinsic_axes() {
        let (mut c, img) = image_in_root(vec![("width", Value::from(100)), ("aspect", Value::None)]);
        decode(&mut c, img, 50.0, 25.0);
        c.tick();
        assert_eq!(size_of(&c, img), Some(Size::new(100.0, 25.0)));
    }

    #[test]
    fn fixed_ratio_fits_inside_a_fixed_box() {
        let (mut c, img) = image_in_root(vec![
            ("width", Value::from(100)),
            ("height", Value::from(100)),
            ("aspect", Value::from(2.0)),
        ]);
        // No intrinsic size needed.
        let out = c.tick();
        assert!(!out.status.is_unfinished());
        assert_eq!(size_of(&c, img), Some(Size::new(100.0, 50.0)));
    }

    #[test]
    fn invalidating_the_intrinsic_size_re_resolves() {
        let (mut c, img) = image_in_root(vec![]);
        decode(&mut c, img, 50.0, 50.0);
        c.tick();
        decode(&mut c, img, 80.0, 40.0);
        c.tick();
        assert_eq!(size_of(&c, img), Some(Size::new(50.0, 50.0)));

        c.invalidate_intrinsic(img).unwrap();
        c.tick();
        assert_eq!(size_of(&c, img), Some(Size::new(80.0, 40.0)));
    }

    #[test]
    fn aspect_values_are_validated() {
        let mut c = Canvas::new(RecordingBackend::new(), CanvasConfig::default());
        let img = c.create(KindId::IMAGE).unwrap();
        c.set(img, "aspect", "auto").unwrap();
        assert_eq!(c.get(img, "aspect").unwrap(), &Value::Length(Length::Auto));
        c.set(img, "aspect", false).unwrap();
        assert_eq!(c.get(img, "aspect").unwrap(), &Value::None);
        assert!(matches!(
            c.set(img, "aspect", -1.0),
            Err(Error::Property(PropertyError::InvalidValue { property: "aspect", .. }))
        ));

        let rect = c.create(KindId::RECTANGLE).unwrap();
        assert!(matches!(
            c.set(rect, "aspect", 1.0),
            Err(Error::Property(PropertyError::Unknown { .. }))
        ));
    }
}
