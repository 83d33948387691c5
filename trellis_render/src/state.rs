// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing state and clip bookkeeping shared by every backend.
//!
//! [`StateStack`] holds the `(transform, opacity, antialias)` tuple that
//! `push_state` / `pop_state` save and restore. [`ClipStack`] is tracked
//! independently: clips and opacity layers nest with each other in strict
//! LIFO order but never with the state stack.
//!
//! Clip entries are stored in device space, already transformed by the
//! transform active when they were pushed, so later transform changes do
//! not move an existing clip.

use kurbo::{Affine, BezPath, Point, Rect, Shape};

/// Curve flattening tolerance for device-space paths.
pub(crate) const TOLERANCE: f64 = 0.1;

/// One saved drawing state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    /// User space → device space transform.
    pub transform: Affine,
    /// Opacity multiplier applied to every submitted paint.
    pub opacity: f32,
    /// Whether primitives are antialiased.
    pub antialias: bool,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            opacity: 1.0,
            antialias: true,
        }
    }
}

/// LIFO stack of [`DrawState`] values plus the live state.
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    /// Creates a stack holding only the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live state.
    #[must_use]
    pub fn current(&self) -> DrawState {
        self.current
    }

    /// Number of saved states.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Saves the live state.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restores the most recently saved state. Does nothing when empty.
    pub fn pop(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    /// Drops every saved state and restores the defaults.
    pub fn reset(&mut self) {
        self.saved.clear();
        self.current = DrawState::default();
    }

    /// Replaces the live transform.
    pub fn set_transform(&mut self, transform: Affine) {
        self.current.transform = transform;
    }

    /// Composes `transform` with the live transform (`current * transform`),
    /// so `transform` applies first.
    pub fn multiply_transform(&mut self, transform: Affine) {
        self.current.transform = self.current.transform * transform;
    }

    /// Replaces the live opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.current.opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Replaces the antialias flag.
    pub fn set_antialias(&mut self, antialias: bool) {
        self.current.antialias = antialias;
    }
}

/// One entry of a [`ClipStack`].
#[derive(Clone, Debug, PartialEq)]
pub enum ClipEntry {
    /// Axis-aligned device-space rectangle.
    Rect(Rect),
    /// Arbitrary device-space path (non-zero winding).
    Geometry(BezPath),
    /// Opacity group.
    Layer {
        /// Group opacity.
        opacity: f32,
    },
}

impl ClipEntry {
    fn is_layer(&self) -> bool {
        matches!(self, Self::Layer { .. })
    }
}

/// Device-space clip and layer stack.
#[derive(Clone, Debug, Default)]
pub struct ClipStack {
    entries: Vec<ClipEntry>,
}

impl ClipStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a user-space rectangle clip under `transform`.
    ///
    /// Rectangles that stay axis-aligned after transformation use the cheap
    /// rectangle entry; anything rotated or skewed becomes a geometry clip.
    pub fn push_rect(&mut self, rect: Rect, transform: Affine) {
        let [a, b, c, d, _, _] = transform.as_coeffs();
        if b == 0.0 && c == 0.0 && a >= 0.0 && d >= 0.0 {
            self.entries.push(ClipEntry::Rect(transform.transform_rect_bbox(rect)));
        } else {
            self.entries
                .push(ClipEntry::Geometry(transform * rect.to_path(TOLERANCE)));
        }
    }

    /// Pushes a device-space path clip.
    pub fn push_geometry(&mut self, device_path: BezPath) {
        self.entries.push(ClipEntry::Geometry(device_path));
    }

    /// Pushes an opacity group.
    pub fn push_layer(&mut self, opacity: f32) {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self.entries.push(ClipEntry::Layer { opacity });
    }

    /// Pops the top entry if it is a clip.
    ///
    /// Returns `None`, leaving the stack untouched, when the stack is empty
    /// or its top is a layer.
    pub fn pop_clip(&mut self) -> Option<ClipEntry> {
        if self.entries.last().is_some_and(|e| !e.is_layer()) {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Pops the top entry if it is a layer.
    pub fn pop_layer(&mut self) -> Option<f32> {
        match self.entries.last() {
            Some(ClipEntry::Layer { opacity }) => {
                let opacity = *opacity;
                self.entries.pop();
                Some(opacity)
            }
            _ => None,
        }
    }

    /// Number of clip entries.
    #[must_use]
    pub fn clip_depth(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_layer()).count()
    }

    /// Number of layer entries.
    #[must_use]
    pub fn layer_depth(&self) -> usize {
        self.entries.iter().filter(|e| e.is_layer()).count()
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates entries bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &ClipEntry> {
        self.entries.iter()
    }

    /// Whether a device-space point passes every active clip.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        self.entries.iter().all(|e| match e {
            ClipEntry::Rect(r) => r.contains(pt),
            ClipEntry::Geometry(p) => p.winding(pt) != 0,
            ClipEntry::Layer { .. } => true,
        })
    }

    /// Conservative device-space bounds of the clipped region, or `None`
    /// when unclipped.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ClipEntry::Rect(r) => Some(*r),
                ClipEntry::Geometry(p) => Some(p.bounding_box()),
                ClipEntry::Layer { .. } => None,
            })
            .reduce(|a, b| a.intersect(b))
    }

    /// Product of every active layer opacity.
    #[must_use]
    pub fn layer_opacity(&self) -> f32 {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ClipEntry::Layer { opacity } => Some(*opacity),
                _ => None,
            })
            .product()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;

    #[test]
    fn pop_on_empty_is_noop() {
        let mut s = StateStack::new();
        s.set_opacity(0.5);
        s.pop();
        assert_eq!(s.current().opacity, 0.5);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn push_pop_restores() {
        let mut s = StateStack::new();
        s.push();
        s.set_transform(Affine::translate((5.0, 5.0)));
        s.set_opacity(0.25);
        s.set_antialias(false);
        assert_eq!(s.depth(), 1);
        s.pop();
        assert_eq!(s.current(), DrawState::default());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut s = StateStack::new();
        s.push();
        s.push();
        s.set_opacity(0.1);
        s.reset();
        assert_eq!(s.depth(), 0);
        assert_eq!(s.current(), DrawState::default());
    }

    #[test]
    fn multiply_applies_incoming_first() {
        let mut s = StateStack::new();
        s.set_transform(Affine::translate((10.0, 0.0)));
        s.multiply_transform(Affine::scale(2.0));
        let p = s.current().transform * Point::new(1.0, 1.0);
        assert_eq!(p, Point::new(12.0, 2.0), "scale then translate");
    }

    #[test]
    fn opacity_is_clamped() {
        let mut s = StateStack::new();
        s.set_opacity(3.0);
        assert_eq!(s.current().opacity, 1.0);
        s.set_opacity(f32::NAN);
        assert_eq!(s.current().opacity, 0.0);
    }

    #[test]
    fn clips_and_layers_nest_lifo() {
        let mut c = ClipStack::new();
        c.push_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Affine::IDENTITY);
        c.push_layer(0.5);
        assert_eq!(c.clip_depth(), 1);
        assert_eq!(c.layer_depth(), 1);

        assert!(c.pop_clip().is_none(), "top is a layer");
        assert_eq!(c.pop_layer(), Some(0.5));
        assert!(c.pop_layer().is_none(), "top is a clip");
        assert!(c.pop_clip().is_some());
        assert!(c.is_empty());
    }

    #[test]
    fn translated_rect_clip_stays_axis_aligned() {
        let mut c = ClipStack::new();
        c.push_rect(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Affine::translate(Vec2::new(5.0, 5.0)),
        );
        assert!(matches!(c.iter().next(), Some(ClipEntry::Rect(r)) if *r == Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(c.contains(Point::new(6.0, 6.0)));
        assert!(!c.contains(Point::new(4.0, 6.0)));
    }

    #[test]
    fn rotated_rect_clip_becomes_geometry() {
        let mut c = ClipStack::new();
        c.push_rect(
            Rect::new(-5.0, -5.0, 5.0, 5.0),
            Affine::rotate(core::f64::consts::FRAC_PI_4),
        );
        assert!(matches!(c.iter().next(), Some(ClipEntry::Geometry(_))));
        assert!(c.contains(Point::new(0.0, 6.5)), "rotated corner reaches further");
        assert!(!c.contains(Point::new(6.0, 6.0)));
    }

    #[test]
    fn bounds_and_layer_opacity_accumulate() {
        let mut c = ClipStack::new();
        assert_eq!(c.bounds(), None);
        c.push_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Affine::IDENTITY);
        c.push_layer(0.5);
        c.push_rect(Rect::new(5.0, 5.0, 20.0, 20.0), Affine::IDENTITY);
        c.push_layer(0.5);
        assert_eq!(c.bounds(), Some(Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(c.layer_opacity(), 0.25);
    }
}
