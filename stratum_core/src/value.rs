// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw property values.
//!
//! A [`Value`] is what a caller hands to [`Canvas::set`](crate::canvas::Canvas::set).
//! Loose input forms (text, lists, bare numbers) are normalized once by the
//! node kind's validating setter into the typed forms ([`Length`],
//! [`Edges`], [`Position`], [`Color`]) so that resolution never re-parses
//! strings.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::color::Color;

/// A one-dimensional length that may be relative to an extents box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// An absolute number of pixels.
    Px(f64),
    /// A percentage of the corresponding extents axis.
    Percent(f64),
    /// Derived from intrinsic content.
    Auto,
}

impl Default for Length {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

/// A string could not be parsed as a [`Length`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseLengthError;

impl fmt::Display for ParseLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected a number, a percentage, or `auto`")
    }
}

impl core::error::Error for ParseLengthError {}

impl Length {
    /// Parses `"auto"`, `"12"`, `"-3.5"`, or `"50%"`.
    pub fn parse(s: &str) -> Result<Self, ParseLengthError> {
        let s = s.trim();
        if s == "auto" {
            return Ok(Self::Auto);
        }
        let (number, percent) = match s.strip_suffix('%') {
            Some(n) => (n, true),
            None => (s, false),
        };
        let v: f64 = number.trim_end().parse().map_err(|_| ParseLengthError)?;
        if !v.is_finite() {
            return Err(ParseLengthError);
        }
        Ok(if percent { Self::Percent(v) } else { Self::Px(v) })
    }

    /// Interprets a loose [`Value`] as a length.
    ///
    /// Numbers are pixels, text is parsed, and `None` is `Auto`.
    pub fn from_value(value: &Value) -> Result<Self, ParseLengthError> {
        match value {
            Value::Length(l) if l.is_finite() => Ok(*l),
            Value::Number(n) if n.is_finite() => Ok(Self::Px(*n)),
            Value::Text(s) => Self::parse(s),
            Value::None => Ok(Self::Auto),
            _ => Err(ParseLengthError),
        }
    }

    /// Returns `true` for [`Length::Auto`].
    #[inline]
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Returns `false` if the pixel or percentage amount is NaN or infinite.
    #[inline]
    #[must_use]
    pub const fn is_finite(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v.is_finite(),
            Self::Auto => true,
        }
    }
}

/// One axis of a position specification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisPos {
    /// Leading coordinate (left or top).
    Start(Length),
    /// Trailing coordinate (right or bottom). The axis size is subtracted.
    End(Length),
    /// Center coordinate. Half the axis size is subtracted.
    Center(Length),
    /// Both a leading and a trailing coordinate. The axis size is derived from
    /// the gap and the explicit size for this axis is ignored.
    Span(Length, Length),
}

/// No coordinate given: the leading edge sits at the origin.
impl Default for AxisPos {
    fn default() -> Self {
        Self::Start(Length::Auto)
    }
}

impl AxisPos {
    /// Returns `true` if this axis derives its size from a span.
    #[inline]
    #[must_use]
    pub const fn is_span(self) -> bool {
        matches!(self, Self::Span(..))
    }

    /// Returns `true` if every coordinate is finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        match self {
            Self::Start(l) | Self::End(l) | Self::Center(l) => l.is_finite(),
            Self::Span(s, e) => s.is_finite() && e.is_finite(),
        }
    }

    /// Replaces the leading coordinate, keeping a trailing one if present.
    #[must_use]
    pub fn with_start(self, start: Option<Length>) -> Self {
        match (self, start) {
            (Self::End(e) | Self::Span(_, e), Some(s)) => Self::Span(s, e),
            (Self::End(e) | Self::Span(_, e), None) => Self::End(e),
            (_, Some(s)) => Self::Start(s),
            (_, None) => Self::default(),
        }
    }

    /// Replaces the trailing coordinate, keeping a leading one if present.
    #[must_use]
    pub fn with_end(self, end: Option<Length>) -> Self {
        match (self, end) {
            (Self::Start(s) | Self::Span(s, _), Some(e)) if !s.is_auto() => Self::Span(s, e),
            (Self::Start(s) | Self::Span(s, _), None) if !s.is_auto() => Self::Start(s),
            (_, Some(e)) => Self::End(e),
            (_, None) => Self::default(),
        }
    }
}

/// Position of a node relative to its parent's content box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// Horizontal axis.
    pub x: AxisPos,
    /// Vertical axis.
    pub y: AxisPos,
}

impl Position {
    /// Leading coordinates on both axes.
    #[must_use]
    pub const fn at(x: Length, y: Length) -> Self {
        Self {
            x: AxisPos::Start(x),
            y: AxisPos::Start(y),
        }
    }

    /// Returns `true` if both axes are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Four edge lengths in CSS order: top, right, bottom, left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    /// Top edge, resolved against the extents height.
    pub top: Length,
    /// Right edge, resolved against the extents width.
    pub right: Length,
    /// Bottom edge, resolved against the extents height.
    pub bottom: Length,
    /// Left edge, resolved against the extents width.
    pub left: Length,
}

impl Edges {
    /// The same length on every edge.
    #[must_use]
    pub const fn uniform(l: Length) -> Self {
        Self {
            top: l,
            right: l,
            bottom: l,
            left: l,
        }
    }

    /// Vertical and horizontal lengths, as in a two-value CSS shorthand.
    #[must_use]
    pub const fn symmetric(vertical: Length, horizontal: Length) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Returns `true` if every edge is finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
            && self.left.is_finite()
    }
}

/// A raw property value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// No value.
    #[default]
    None,
    /// A boolean flag.
    Bool(bool),
    /// A plain number.
    Number(f64),
    /// Text; setters may parse it into a typed form.
    Text(String),
    /// A single length.
    Length(Length),
    /// Width and height.
    Size(Length, Length),
    /// A two-axis position.
    Position(Position),
    /// Four edges.
    Edges(Edges),
    /// An RGBA color.
    Color(Color),
    /// A list; setters may normalize it into a typed form.
    List(Vec<Self>),
}

impl Value {
    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `(width, height)`, if this is a size.
    #[must_use]
    pub const fn as_size(&self) -> Option<(Length, Length)> {
        match self {
            Self::Size(w, h) => Some((*w, *h)),
            _ => None,
        }
    }

    /// Returns the position, if this is one.
    #[must_use]
    pub const fn as_position(&self) -> Option<Position> {
        match self {
            Self::Position(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the edges, if this is one.
    #[must_use]
    pub const fn as_edges(&self) -> Option<Edges> {
        match self {
            Self::Edges(e) => Some(*e),
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
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Length> for Value {
    fn from(l: Length) -> Self {
        Self::Length(l)
    }
}

impl From<Position> for Value {
    fn from(p: Position) -> Self {
        Self::Position(p)
    }
}

impl From<Edges> for Value {
    fn from(e: Edges) -> Self {
        Self::Edges(e)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::List(v)
    }
}

impl<A: Into<Self>, B: Into<Self>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Self::List(alloc::vec![a.into(), b.into()])
    }
}

impl<A: Into<Self>, B: Into<Self>, C: Into<Self>, D: Into<Self>> From<(A, B, C, D)> for Value {
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        Self::List(alloc::vec![a.into(), b.into(), c.into(), d.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lengths() {
        assert_eq!(Length::parse("auto"), Ok(Length::Auto));
        assert_eq!(Length::parse("12"), Ok(Length::Px(12.0)));
        assert_eq!(Length::parse("-3.5"), Ok(Length::Px(-3.5)));
        assert_eq!(Length::parse("50%"), Ok(Length::Percent(50.0)));
        assert_eq!(Length::parse(" 25 %"), Ok(Length::Percent(25.0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Length::parse("wide"), Err(ParseLengthError));
        assert_eq!(Length::parse("%"), Err(ParseLengthError));
        assert_eq!(Length::parse("12px"), Err(ParseLengthError));
        assert_eq!(Length::parse("inf"), Err(ParseLengthError));
    }

    #[test]
    fn loose_values_become_lengths() {
        assert_eq!(Length::from_value(&Value::Number(4.0)), Ok(Length::Px(4.0)));
        assert_eq!(Length::from_value(&"10%".into()), Ok(Length::Percent(10.0)));
        assert_eq!(Length::from_value(&Value::None), Ok(Length::Auto));
        assert_eq!(
            Length::from_value(&Value::Bool(true)),
            Err(ParseLengthError)
        );
    }

    #[test]
    fn non_finite_lengths_are_rejected() {
        let nan = Value::Length(Length::Px(f64::NAN));
        assert_eq!(Length::from_value(&nan), Err(ParseLengthError));
        assert_eq!(
            Length::from_value(&Value::Length(Length::Percent(f64::INFINITY))),
            Err(ParseLengthError)
        );
        assert!(Length::Auto.is_finite());
        assert!(!AxisPos::Span(Length::Px(0.0), Length::Px(f64::NAN)).is_finite());
        assert!(!Edges::symmetric(Length::Px(1.0), Length::Percent(f64::NAN)).is_finite());
    }

    #[test]
    fn start_and_end_combine_into_span() {
        let a = AxisPos::Start(Length::Px(10.0)).with_end(Some(Length::Px(90.0)));
        assert_eq!(a, AxisPos::Span(Length::Px(10.0), Length::Px(90.0)));

        let b = AxisPos::End(Length::Px(90.0)).with_start(Some(Length::Px(5.0)));
        assert_eq!(b, AxisPos::Span(Length::Px(5.0), Length::Px(90.0)));

        // Dropping one side of a span keeps the other.
        assert_eq!(a.with_end(None), AxisPos::Start(Length::Px(10.0)));
        assert_eq!(a.with_start(None), AxisPos::End(Length::Px(90.0)));
    }

    #[test]
    fn unset_start_does_not_span() {
        let a = AxisPos::default().with_end(Some(Length::Percent(100.0)));
        assert_eq!(a, AxisPos::End(Length::Percent(100.0)));
        assert!(!a.is_span());
        assert_eq!(a.with_end(None), AxisPos::default());
    }

    #[test]
    fn center_is_replaced_by_start() {
        let c = AxisPos::Center(Length::Px(50.0));
        assert_eq!(
            c.with_start(Some(Length::Px(1.0))),
            AxisPos::Start(Length::Px(1.0))
        );
    }

    #[test]
    fn tuples_become_lists() {
        let v: Value = ("50%", 20).into();
        assert_eq!(
            v,
            Value::List(alloc::vec![Value::Text("50%".into()), Value::Number(20.0)])
        );
    }
}
