// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Straight-alpha RGBA colors.

/// A straight (non-premultiplied) RGBA color with `f32` channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);
    /// Opaque mid gray.
    pub const GRAY: Self = Self::new(0.5, 0.5, 0.5, 1.0);

    /// Creates a color from float channels.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from 8-bit channels.
    #[inline]
    #[must_use]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Unpacks a `0xAARRGGBB` value.
    #[must_use]
    pub fn from_argb_u32(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self::from_rgba8(r, g, b, a)
    }

    /// Quantizes each channel to 8 bits, clamping to `[0, 1]` first.
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }

    /// Packs the quantized channels as `0xAARRGGBB`.
    ///
    /// Two colors that quantize to the same 8-bit channels share a key.
    #[must_use]
    pub fn to_argb_u32(self) -> u32 {
        let [r, g, b, a] = self.to_rgba8();
        u32::from_be_bytes([a, r, g, b])
    }

    /// Returns this color with a replaced alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Returns this color with alpha multiplied by `factor`.
    #[inline]
    #[must_use]
    pub fn multiply_alpha(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }

    /// Channel-wise linear interpolation.
    #[must_use]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self::new(
            self.r + (to.r - self.r) * t,
            self.g + (to.g - self.g) * t,
            self.b + (to.b - self.b) * t,
            self.a + (to.a - self.a) * t,
        )
    }

    /// Parses `#RGB`, `#RRGGBB`, or `#AARRGGBB` (the leading `#` is optional),
    /// or one of a handful of named colors.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "transparent" => return Some(Self::TRANSPARENT),
            "black" => return Some(Self::BLACK),
            "white" => return Some(Self::WHITE),
            "red" => return Some(Self::RED),
            "green" => return Some(Self::GREEN),
            "blue" => return Some(Self::BLUE),
            "gray" | "grey" => return Some(Self::GRAY),
            _ => {}
        }
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let v = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            3 => {
                let expand = |n: u32| {
                    let n = u8::try_from(n & 0xf).unwrap_or(0);
                    n << 4 | n
                };
                Some(Self::from_rgba8(
                    expand(v >> 8),
                    expand(v >> 4),
                    expand(v),
                    255,
                ))
            }
            6 => Some(Self::from_argb_u32(0xff00_0000 | v)),
            8 => Some(Self::from_argb_u32(v)),
            _ => None,
        }
    }

    /// Formats as `#AARRGGBB`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:08X}", self.to_argb_u32())
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "value is clamped to [0, 255] before the cast"
)]
fn quantize(c: f32) -> u8 {
    let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
    (c * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argb_packing() {
        assert_eq!(Color::RED.to_argb_u32(), 0xffff_0000);
        assert_eq!(Color::new(0.0, 0.0, 1.0, 0.5).to_argb_u32(), 0x8000_00ff);
        assert_eq!(Color::from_argb_u32(0xff00_ff00), Color::GREEN);
    }

    #[test]
    fn quantization_merges_near_duplicates() {
        let a = Color::new(1.0, 0.0, 0.0, 1.0);
        let b = Color::new(0.9999, 0.0001, 0.0, 1.0);
        assert_eq!(a.to_argb_u32(), b.to_argb_u32());
        let c = Color::new(0.9, 0.0, 0.0, 1.0);
        assert_ne!(a.to_argb_u32(), c.to_argb_u32());
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        assert_eq!(Color::new(2.0, -1.0, f32::NAN, 1.0).to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn parse_forms() {
        assert_eq!(Color::parse("#ff0000"), Some(Color::RED));
        assert_eq!(Color::parse("80ff0000"), Some(Color::from_rgba8(255, 0, 0, 128)));
        assert_eq!(Color::parse("#0f0"), Some(Color::GREEN));
        assert_eq!(Color::parse("White"), Some(Color::WHITE));
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("nope"), None);
    }

    #[test]
    fn hex_round_trip() {
        let c = Color::from_rgba8(1, 2, 3, 4);
        assert_eq!(c.to_hex(), "#04010203");
        assert_eq!(Color::parse(&c.to_hex()), Some(c));
    }

    #[test]
    fn lerp_midpoint() {
        let c = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(c, Color::new(0.5, 0.5, 0.5, 1.0));
    }
}
