// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric value types.
//!
//! Points, sizes, rectangles, and the 2-D affine transform come straight from
//! `kurbo`. [`Affine`] is the 3×2 matrix used by render contexts; composition
//! follows the row-vector convention, so `current * incoming` applies
//! `incoming` first.
//!
//! [`Thickness`] (margins and padding) and [`CornerRadius`] are UI-specific
//! and live here.

pub use kurbo::{Affine, Point, Rect, RoundedRectRadii, Size, Vec2};

/// Clamps a layout length into the non-negative range.
///
/// NaN and negative values become `0.0`. Positive infinity is preserved since
/// it means "unconstrained" for available sizes.
#[inline]
#[must_use]
pub fn sanitize_length(v: f64) -> f64 {
    if v.is_nan() || v < 0.0 { 0.0 } else { v }
}

/// Applies [`sanitize_length`] to both dimensions of a size.
#[inline]
#[must_use]
pub fn sanitize_size(size: Size) -> Size {
    Size::new(sanitize_length(size.width), sanitize_length(size.height))
}

/// Normalizes a rectangle so that it has a finite origin and non-negative,
/// finite extent.
#[must_use]
pub fn sanitize_rect(rect: Rect) -> Rect {
    let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
    let x = finite(rect.x0);
    let y = finite(rect.y0);
    let w = finite(sanitize_length(rect.width()));
    let h = finite(sanitize_length(rect.height()));
    Rect::new(x, y, x + w, y + h)
}

/// Edge lengths for margins, padding, and border widths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Thickness {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
}

impl Thickness {
    /// All edges zero.
    pub const ZERO: Self = Self::uniform(0.0);

    /// Creates a thickness from four edges.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a thickness with every edge set to `v`.
    #[inline]
    #[must_use]
    pub const fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    /// Sum of the left and right edges.
    #[inline]
    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of the top and bottom edges.
    #[inline]
    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Shrinks a size by this thickness, never going below zero.
    #[must_use]
    pub fn deflate_size(&self, size: Size) -> Size {
        Size::new(
            sanitize_length(size.width - self.horizontal()),
            sanitize_length(size.height - self.vertical()),
        )
    }

    /// Grows a size by this thickness.
    #[must_use]
    pub fn inflate_size(&self, size: Size) -> Size {
        Size::new(
            size.width + self.horizontal(),
            size.height + self.vertical(),
        )
    }

    /// Shrinks a rectangle inwards by this thickness.
    ///
    /// The result never has negative extent; an over-deflated rectangle
    /// collapses to zero size at its shifted origin.
    #[must_use]
    pub fn deflate_rect(&self, rect: Rect) -> Rect {
        let x0 = rect.x0 + self.left;
        let y0 = rect.y0 + self.top;
        let w = sanitize_length(rect.width() - self.horizontal());
        let h = sanitize_length(rect.height() - self.vertical());
        Rect::new(x0, y0, x0 + w, y0 + h)
    }

    /// Parses `"v"`, `"h,v"`, or `"l,t,r,b"` (comma or whitespace separated).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [v] => Some(Self::uniform(*v)),
            [h, v] => Some(Self::new(*h, *v, *h, *v)),
            [l, t, r, b] => Some(Self::new(*l, *t, *r, *b)),
            _ => None,
        }
    }
}

/// Per-corner radii for rounded rectangles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CornerRadius {
    /// Top-left radius.
    pub top_left: f64,
    /// Top-right radius.
    pub top_right: f64,
    /// Bottom-right radius.
    pub bottom_right: f64,
    /// Bottom-left radius.
    pub bottom_left: f64,
}

impl CornerRadius {
    /// Creates radii for each corner, clockwise from top-left.
    #[inline]
    #[must_use]
    pub const fn new(top_left: f64, top_right: f64, bottom_right: f64, bottom_left: f64) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Same radius on every corner.
    #[inline]
    #[must_use]
    pub const fn uniform(r: f64) -> Self {
        Self::new(r, r, r, r)
    }

    /// Returns `true` if every radius is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_right == 0.0
            && self.bottom_left == 0.0
    }

    /// Converts to `kurbo` radii.
    #[must_use]
    pub fn to_kurbo(self) -> RoundedRectRadii {
        RoundedRectRadii::new(
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        )
    }

    /// Parses one or four comma/whitespace separated radii.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let t = Thickness::parse(s)?;
        if s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .count()
            == 2
        {
            return None;
        }
        Some(Self::new(t.left, t.top, t.right, t.bottom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_nan_and_negative() {
        assert_eq!(sanitize_length(f64::NAN), 0.0);
        assert_eq!(sanitize_length(-3.0), 0.0);
        assert_eq!(sanitize_length(4.5), 4.5);
        assert!(sanitize_length(f64::INFINITY).is_infinite());
    }

    #[test]
    fn sanitize_rect_handles_inverted_and_infinite() {
        let r = sanitize_rect(Rect::new(10.0, 10.0, 5.0, f64::INFINITY));
        assert_eq!(r, Rect::new(10.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn thickness_deflate_never_negative() {
        let t = Thickness::uniform(10.0);
        let r = t.deflate_rect(Rect::new(0.0, 0.0, 15.0, 30.0));
        assert_eq!(r, Rect::new(10.0, 10.0, 10.0, 20.0));
        assert_eq!(t.deflate_size(Size::new(5.0, 25.0)), Size::new(0.0, 5.0));
        assert_eq!(t.inflate_size(Size::new(1.0, 1.0)), Size::new(21.0, 21.0));
    }

    #[test]
    fn thickness_parse_forms() {
        assert_eq!(Thickness::parse("4"), Some(Thickness::uniform(4.0)));
        assert_eq!(
            Thickness::parse("1,2"),
            Some(Thickness::new(1.0, 2.0, 1.0, 2.0))
        );
        assert_eq!(
            Thickness::parse("1 2 3 4"),
            Some(Thickness::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(Thickness::parse("1,2,3"), None);
        assert_eq!(Thickness::parse("wide"), None);
    }

    #[test]
    fn corner_radius_parse() {
        assert_eq!(CornerRadius::parse("6"), Some(CornerRadius::uniform(6.0)));
        assert_eq!(
            CornerRadius::parse("1,2,3,4"),
            Some(CornerRadius::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(CornerRadius::parse("1,2"), None);
        assert!(CornerRadius::default().is_zero());
    }
}
