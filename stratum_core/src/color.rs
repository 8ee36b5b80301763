// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 8-bit RGBA color with fixed-point blending.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha (255 is opaque).
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white, the default color of every node.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with explicit alpha.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb`, or `#rrggbbaa`.
    ///
    /// Returns `None` for anything else.
    #[must_use]
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let bytes = hex.as_bytes();
        if bytes.first() != Some(&b'#') || !bytes[1..].iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
        let digits = &bytes[1..];
        match digits.len() {
            3 | 4 => {
                let c = |i: usize| hex_1_to_u8(digits[i]) * 17;
                let a = if digits.len() == 4 { c(3) } else { 255 };
                Some(Self::rgba(c(0), c(1), c(2), a))
            }
            6 | 8 => {
                let c = |i: usize| hex_2_to_u8(digits[i], digits[i + 1]);
                let a = if digits.len() == 8 { c(6) } else { 255 };
                Some(Self::rgba(c(0), c(2), c(4), a))
            }
            _ => None,
        }
    }

    /// Builds a color from three or four channel values in `0..=255`.
    ///
    /// Returns `None` for other lengths or out-of-range channels.
    #[must_use]
    pub fn from_channels(channels: &[f64]) -> Option<Self> {
        if !(3..=4).contains(&channels.len()) {
            return None;
        }
        let mut out = [255_u8; 4];
        for (slot, &v) in out.iter_mut().zip(channels) {
            if !(0.0..=255.0).contains(&v) || v.floor() != v {
                return None;
            }
            #[expect(
                clippy::cast_possible_truncation,
                reason = "range and integrality checked above"
            )]
            let byte = v as u8;
            *slot = byte;
        }
        Some(Self::rgba(out[0], out[1], out[2], out[3]))
    }

    /// Composes this color with a parent's absolute color.
    ///
    /// Red, green, and blue are multiplied channel-wise with the 8-bit
    /// fixed-point approximation `((a*b + 128) + ((a*b + 128) >> 8)) >> 8`.
    /// Alpha is this color's own alpha; inherited translucency travels
    /// through opacity instead.
    #[must_use]
    pub const fn blend(self, parent: Self) -> Self {
        Self {
            r: mul8(self.r, parent.r),
            g: mul8(self.g, parent.g),
            b: mul8(self.b, parent.b),
            a: self.a,
        }
    }

    /// Scales alpha by an absolute opacity, rounding to the nearest step.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "alpha is clamped to 0..=255 before the cast"
        )]
        let a = a.clamp(0.0, 255.0) as u8;
        Self { a, ..self }
    }
}

/// Fixed-point 8-bit multiply.
const fn mul8(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 128;
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the result of an 8-bit fixed-point multiply is at most 255"
    )]
    let out = ((t + (t >> 8)) >> 8) as u8;
    out
}

const fn hex_1_to_u8(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

const fn hex_2_to_u8(c1: u8, c2: u8) -> u8 {
    (hex_1_to_u8(c1) << 4) | hex_1_to_u8(c2)
}
