// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for rendering integrations.
//!
//! The engine never draws. It decides what values each backend object should
//! have and pushes them through the [`Backend`] trait:
//!
//! - **Handles**: [`create_handle`](Backend::create_handle) is called once
//!   per node when it becomes attached under the canvas, and
//!   [`release_handle`](Backend::release_handle) when it is detached or
//!   destroyed. A handle is owned by exactly one node.
//!
//! - **Pushes**: `move_to`, `resize`, `set_color`, `show` and `hide`. The
//!   engine deduplicates them per handle: a call is made only when the value
//!   differs from the last one pushed to that handle.
//!
//! - **Intrinsic size**: kinds that size themselves from content (images)
//!   ask [`intrinsic_size`](Backend::intrinsic_size), which returns `(0, 0)`
//!   while unknown.
//!
//! - **Redraw**: [`render`](Backend::render) is called at most once per
//!   [`Canvas::tick`](crate::canvas::Canvas::tick).
//!
//! [`RecordingBackend`] is a headless implementation that records every call,
//! for tests and demos.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::{Point, Size};

use crate::color::Color;
use crate::schema::KindId;

/// Opaque handle to a backend drawable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandleId(pub u32);

/// Applies resolved node values to an external drawing surface.
///
/// The trait is object safe; the engine reaches it as `&mut dyn Backend`.
pub trait Backend {
    /// Creates a drawable for a node of the given kind.
    fn create_handle(&mut self, kind: KindId) -> HandleId;

    /// Releases a drawable. The handle is not used again.
    fn release_handle(&mut self, handle: HandleId);

    /// Moves the drawable's top-left corner, in canvas coordinates.
    fn move_to(&mut self, handle: HandleId, pos: Point);

    /// Resizes the drawable's border box.
    fn resize(&mut self, handle: HandleId, size: Size);

    /// Sets the fill color. Alpha already includes the absolute opacity.
    fn set_color(&mut self, handle: HandleId, color: Color);

    /// Makes the drawable visible.
    fn show(&mut self, handle: HandleId);

    /// Hides the drawable.
    fn hide(&mut self, handle: HandleId);

    /// Natural content size, or `(0, 0)` if not yet known.
    fn intrinsic_size(&self, handle: HandleId) -> Size {
        _ = handle;
        Size::ZERO
    }

    /// Redraws the surface.
    fn render(&mut self);
}

/// A call recorded by [`RecordingBackend`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackendCall {
    /// [`Backend::create_handle`].
    Create(HandleId, KindId),
    /// [`Backend::release_handle`].
    Release(HandleId),
    /// [`Backend::move_to`].
    Move(HandleId, Point),
    /// [`Backend::resize`].
    Resize(HandleId, Size),
    /// [`Backend::set_color`].
    SetColor(HandleId, Color),
    /// [`Backend::show`].
    Show(HandleId),
    /// [`Backend::hide`].
    Hide(HandleId),
    /// [`Backend::render`].
    Render,
}

impl BackendCall {
    /// The handle the call targets, if any.
    #[must_use]
    pub fn handle(&self) -> Option<HandleId> {
        match *self {
            Self::Create(h, _)
            | Self::Release(h)
            | Self::Move(h, _)
            | Self::Resize(h, _)
            | Self::SetColor(h, _)
            | Self::Show(h)
            | Self::Hide(h) => Some(h),
            Self::Render => None,
        }
    }
}

/// Headless backend that records every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    next: u32,
    intrinsic: BTreeMap<HandleId, Size>,
    renders: u32,
}

impl RecordingBackend {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        core::mem::take(&mut self.calls)
    }

    /// Number of [`Backend::render`] calls so far.
    #[must_use]
    pub fn render_count(&self) -> u32 {
        self.renders
    }

    /// Sets the size [`Backend::intrinsic_size`] reports for `handle`.
    pub fn set_intrinsic_size(&mut self, handle: HandleId, size: Size) {
        self.intrinsic.insert(handle, size);
    }
}

impl Backend for RecordingBackend {
    fn create_handle(&mut self, kind: KindId) -> HandleId {
        let handle = HandleId(self.next);
        self.next += 1;
        self.calls.push(BackendCall::Create(handle, kind));
        handle
    }

    fn release_handle(&mut self, handle: HandleId) {
        self.intrinsic.remove(&handle);
        self.calls.push(BackendCall::Release(handle));
    }

    fn move_to(&mut self, handle: HandleId, pos: Point) {
        self.calls.push(BackendCall::Move(handle, pos));
    }

    fn resize(&mut self, handle: HandleId, size: Size) {
        self.calls.push(BackendCall::Resize(handle, size));
    }

    fn set_color(&mut self, handle: HandleId, color: Color) {
        self.calls.push(BackendCall::SetColor(handle, color));
    }

    fn show(&mut self, handle: HandleId) {
        self.calls.push(BackendCall::Show(handle));
    }

    fn hide(&mut self, handle: HandleId) {
        self.calls.push(BackendCall::Hide(handle));
    }

    fn intrinsic_size(&self, handle: HandleId) -> Size {
        self.intrinsic.get(&handle).copied().unwrap_or(Size::ZERO)
    }

    fn render(&mut self) {
        self.renders += 1;
        self.calls.push(BackendCall::Render);
    }
}
