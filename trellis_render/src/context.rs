// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The backend-agnostic drawing surface.
//!
//! A [`RenderContext`] is a single-threaded surface for one frame (or one
//! off-screen target). It combines:
//!
//! - **Frame bracketing**: [`begin_draw`](RenderContext::begin_draw) and
//!   [`end_draw`](RenderContext::end_draw). `end_draw` reports device loss as
//!   [`DrawError::DeviceLost`], distinct from ordinary backend failures.
//! - **State**: a LIFO stack of `(transform, opacity, antialias)`.
//!   Popping an empty stack does nothing.
//! - **Clips and layers**: tracked separately from state; see
//!   [`ClipStack`](crate::state::ClipStack).
//! - **Primitives**: strokes take a brush, a width and an optional
//!   [`StrokeStyle`]; fills take only a brush.
//! - **Factories**: return `None` on failure. Callers skip the draw.
//!
//! Brush alpha is multiplied by the current opacity (state opacity times
//! every active layer opacity) when a primitive is submitted, not when the
//! frame ends.

use image::RgbaImage;
use kurbo::{Affine, BezPath, Cap, Ellipse, Join, Point, Rect, Shape, Size, Stroke, Vec2};
use thiserror::Error;
use trellis_core::color::Color;
use trellis_core::geometry::CornerRadius;

use crate::resource::{Bitmap, Brush, Geometry, TextFormat};
use crate::state::TOLERANCE;

/// Stroke width used when a caller passes a non-positive or non-finite width.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

/// Advance of one character as a fraction of the font size.
pub const FIXED_ADVANCE: f64 = 0.6;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Failure reported by [`RenderContext::end_draw`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    /// The device or surface became invalid; every device resource must be
    /// recreated.
    #[error("render device lost")]
    DeviceLost,
    /// Any other backend failure.
    #[error("backend failure: {0}")]
    Backend(String),
    /// `end_draw` was called without a matching `begin_draw`.
    #[error("end_draw called outside begin_draw/end_draw")]
    NotDrawing,
}

/// Line end shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Ends exactly at the endpoint.
    #[default]
    Flat,
    /// Extends half the width past the endpoint.
    Square,
    /// Semicircular end.
    Round,
}

/// Corner shape between stroke segments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Cut-off corner.
    Bevel,
    /// Rounded corner.
    Round,
}

/// Caps, joins, and dash pattern for strokes.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Start and end caps.
    pub cap: LineCap,
    /// Segment joins.
    pub join: LineJoin,
    /// Alternating dash and gap lengths in stroke-width units. Empty for a
    /// solid line.
    pub dashes: Vec<f64>,
    /// Offset into the dash pattern.
    pub dash_offset: f64,
    /// Miter limit.
    pub miter_limit: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            cap: LineCap::Flat,
            join: LineJoin::Miter,
            dashes: Vec::new(),
            dash_offset: 0.0,
            miter_limit: 10.0,
        }
    }
}

impl StrokeStyle {
    /// Builds a `kurbo` stroke of the given width.
    ///
    /// Dash lengths are scaled by the width.
    #[must_use]
    pub fn to_stroke(&self, width: f64) -> Stroke {
        let cap = match self.cap {
            LineCap::Flat => Cap::Butt,
            LineCap::Square => Cap::Square,
            LineCap::Round => Cap::Round,
        };
        let join = match self.join {
            LineJoin::Miter => Join::Miter,
            LineJoin::Bevel => Join::Bevel,
            LineJoin::Round => Join::Round,
        };
        let stroke = Stroke::new(width)
            .with_caps(cap)
            .with_join(join)
            .with_miter_limit(self.miter_limit);
        if self.dashes.is_empty() {
            stroke
        } else {
            stroke.with_dashes(
                self.dash_offset * width,
                self.dashes.iter().map(|d| d * width),
            )
        }
    }
}

/// Resolves a caller-supplied stroke width.
#[must_use]
pub fn resolve_stroke_width(width: f64) -> f64 {
    if width.is_finite() && width > 0.0 {
        width
    } else {
        DEFAULT_STROKE_WIDTH
    }
}

/// A color position within a gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position in `[0, 1]`.
    pub offset: f32,
    /// Color at `offset`.
    pub color: Color,
}

impl GradientStop {
    /// Creates a stop.
    #[must_use]
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Samples a gradient at `t`, clamping outside the first and last stops.
///
/// `stops` must be sorted by offset.
#[must_use]
pub fn sample_gradient(stops: &[GradientStop], t: f32) -> Color {
    let Some(first) = stops.first() else {
        return Color::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let local = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return a.color.lerp(b.color, local);
        }
    }
    stops.last().map_or(first.color, |s| s.color)
}

/// Horizontal alignment of text within its layout rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    /// Left in left-to-right text.
    #[default]
    Leading,
    /// Centered.
    Center,
    /// Right in left-to-right text.
    Trailing,
}

/// Parameters for [`RenderContext::create_text_format`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextFormatDesc {
    /// Font family name.
    pub family: String,
    /// Font size in device-independent pixels.
    pub size: f32,
    /// CSS-style weight, 100–900.
    pub weight: u16,
    /// Italic style.
    pub italic: bool,
    /// Paragraph alignment.
    pub alignment: TextAlignment,
}

impl TextFormatDesc {
    /// A regular-weight upright format.
    #[must_use]
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: 400,
            italic: false,
            alignment: TextAlignment::Leading,
        }
    }
}

/// Fixed-advance text metrics: every character advances `0.6 × size` and
/// every line is `1.2 × size` tall.
#[must_use]
pub fn measure_text_fixed(text: &str, size: f32) -> Size {
    if text.is_empty() {
        return Size::ZERO;
    }
    let size = f64::from(size.max(0.0));
    let mut lines = 0_u32;
    let mut widest = 0_u32;
    for line in text.split('\n') {
        lines += 1;
        widest = widest.max(u32::try_from(line.chars().count()).unwrap_or(u32::MAX));
    }
    Size::new(
        f64::from(widest) * FIXED_ADVANCE * size,
        f64::from(lines) * LINE_HEIGHT * size,
    )
}

/// A single-threaded drawing surface.
///
/// Every stroke method resolves its width with [`resolve_stroke_width`].
/// Draws referencing a handle this context does not own are skipped.
pub trait RenderContext {
    /// Surface size in device pixels.
    fn size(&self) -> Size;

    // -- Frame --

    /// Starts a frame.
    fn begin_draw(&mut self);
    /// Ends a frame.
    ///
    /// # Errors
    ///
    /// [`DrawError::DeviceLost`] when the device must be recreated,
    /// [`DrawError::NotDrawing`] without a matching `begin_draw`, and
    /// [`DrawError::Backend`] for any other failure.
    fn end_draw(&mut self) -> Result<(), DrawError>;
    /// Whether a frame is open.
    fn is_drawing(&self) -> bool;
    /// Primitives submitted since the last `begin_draw`.
    fn draw_call_count(&self) -> usize;
    /// Fills the whole surface, ignoring clips, layers, and opacity.
    fn clear(&mut self, color: Color);

    // -- State --

    /// Saves transform, opacity, and antialias.
    fn push_state(&mut self);
    /// Restores the last saved state; does nothing when none is saved.
    fn pop_state(&mut self);
    /// Drops every saved state and restores the defaults.
    fn reset_state(&mut self);
    /// Number of saved states.
    fn state_depth(&self) -> usize;
    /// Current transform.
    fn transform(&self) -> Affine;
    /// Replaces the transform.
    fn set_transform(&mut self, transform: Affine);
    /// Sets the transform to `current * transform`.
    fn multiply_transform(&mut self, transform: Affine);
    /// Current state opacity.
    fn opacity(&self) -> f32;
    /// Replaces the state opacity.
    fn set_opacity(&mut self, opacity: f32);
    /// Current antialias flag.
    fn antialias(&self) -> bool;
    /// Replaces the antialias flag.
    fn set_antialias(&mut self, antialias: bool);

    // -- Clips and layers --

    /// Intersects the clip with a user-space rectangle.
    fn push_clip_rect(&mut self, rect: Rect);
    /// Intersects the clip with a user-space geometry.
    fn push_clip_geometry(&mut self, geometry: Geometry);
    /// Pops the innermost clip.
    fn pop_clip(&mut self);
    /// Number of active clips.
    fn clip_depth(&self) -> usize;
    /// Starts an opacity group.
    fn push_layer(&mut self, opacity: f32);
    /// Ends the innermost opacity group.
    fn pop_layer(&mut self);
    /// Number of active layers.
    fn layer_depth(&self) -> usize;

    // -- Primitives --

    /// Strokes a line segment.
    fn draw_line(&mut self, p0: Point, p1: Point, brush: Brush, width: f64, style: Option<&StrokeStyle>);
    /// Strokes a rectangle outline.
    fn draw_rectangle(&mut self, rect: Rect, brush: Brush, width: f64, style: Option<&StrokeStyle>);
    /// Fills a rectangle.
    fn fill_rectangle(&mut self, rect: Rect, brush: Brush);
    /// Strokes a rounded rectangle outline.
    fn draw_rounded_rectangle(
        &mut self,
        rect: Rect,
        radii: CornerRadius,
        brush: Brush,
        width: f64,
        style: Option<&StrokeStyle>,
    );
    /// Fills a rounded rectangle.
    fn fill_rounded_rectangle(&mut self, rect: Rect, radii: CornerRadius, brush: Brush);
    /// Strokes an ellipse outline.
    fn draw_ellipse(&mut self, ellipse: Ellipse, brush: Brush, width: f64, style: Option<&StrokeStyle>);
    /// Fills an ellipse.
    fn fill_ellipse(&mut self, ellipse: Ellipse, brush: Brush);
    /// Strokes a geometry.
    fn draw_geometry(&mut self, geometry: Geometry, brush: Brush, width: f64, style: Option<&StrokeStyle>);
    /// Fills a geometry.
    fn fill_geometry(&mut self, geometry: Geometry, brush: Brush);
    /// Draws a bitmap scaled into `dest`.
    fn draw_bitmap(&mut self, bitmap: Bitmap, dest: Rect, opacity: f32);
    /// Draws a string inside `layout`.
    fn draw_text(&mut self, text: &str, format: TextFormat, layout: Rect, brush: Brush);
    /// Measures a string with a text format. Unknown formats measure as zero.
    fn measure_text(&self, text: &str, format: TextFormat) -> Size;

    // -- Factories --

    /// Creates a solid color brush.
    fn create_solid_color_brush(&mut self, color: Color) -> Option<Brush>;
    /// Creates a linear gradient brush between two user-space points.
    fn create_linear_gradient_brush(
        &mut self,
        start: Point,
        end: Point,
        stops: &[GradientStop],
    ) -> Option<Brush>;
    /// Creates a radial gradient brush.
    fn create_radial_gradient_brush(
        &mut self,
        center: Point,
        radii: Vec2,
        stops: &[GradientStop],
    ) -> Option<Brush>;
    /// Creates a geometry from a user-space path.
    fn create_path_geometry(&mut self, path: BezPath) -> Option<Geometry>;
    /// Creates a text format.
    fn create_text_format(&mut self, desc: &TextFormatDesc) -> Option<TextFormat>;
    /// Uploads an image.
    fn create_bitmap(&mut self, image: &RgbaImage) -> Option<Bitmap>;

    /// Creates a rectangle geometry.
    fn create_rectangle_geometry(&mut self, rect: Rect) -> Option<Geometry> {
        self.create_path_geometry(rect.to_path(TOLERANCE))
    }

    /// Creates a rounded rectangle geometry.
    fn create_rounded_rectangle_geometry(&mut self, rect: Rect, radii: CornerRadius) -> Option<Geometry> {
        self.create_path_geometry(rect.to_rounded_rect(radii.to_kurbo()).to_path(TOLERANCE))
    }

    /// Creates an ellipse geometry.
    fn create_ellipse_geometry(&mut self, ellipse: Ellipse) -> Option<Geometry> {
        self.create_path_geometry(ellipse.to_path(TOLERANCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_width_resolution() {
        assert_eq!(resolve_stroke_width(2.5), 2.5);
        assert_eq!(resolve_stroke_width(0.0), DEFAULT_STROKE_WIDTH);
        assert_eq!(resolve_stroke_width(-1.0), DEFAULT_STROKE_WIDTH);
        assert_eq!(resolve_stroke_width(f64::NAN), DEFAULT_STROKE_WIDTH);
    }

    #[test]
    fn stroke_style_scales_dashes() {
        let style = StrokeStyle {
            dashes: vec![2.0, 1.0],
            cap: LineCap::Round,
            ..StrokeStyle::default()
        };
        let stroke = style.to_stroke(3.0);
        assert_eq!(stroke.width, 3.0);
        assert_eq!(stroke.dash_pattern.as_slice(), &[6.0, 3.0]);
        assert_eq!(stroke.start_cap, Cap::Round);
    }

    #[test]
    fn gradient_sampling_clamps_and_interpolates() {
        let stops = [
            GradientStop::new(0.25, Color::BLACK),
            GradientStop::new(0.75, Color::WHITE),
        ];
        assert_eq!(sample_gradient(&stops, 0.0), Color::BLACK);
        assert_eq!(sample_gradient(&stops, 1.0), Color::WHITE);
        assert_eq!(sample_gradient(&stops, 0.5), Color::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(sample_gradient(&[], 0.5), Color::TRANSPARENT);
    }

    #[test]
    fn fixed_metrics() {
        assert_eq!(measure_text_fixed("", 10.0), Size::ZERO);
        let s = measure_text_fixed("abcd\nab", 10.0);
        assert!((s.width - 24.0).abs() < 1e-9);
        assert!((s.height - 24.0).abs() < 1e-9);
    }
}
