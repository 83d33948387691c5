// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CPU reference backend.
//!
//! [`SoftwareContext`] implements the full [`RenderContext`] contract on top
//! of an [`RgbaImage`]. Shapes are point-sampled at pixel centers: fills use
//! non-zero winding containment and strokes are expanded with
//! [`kurbo::stroke`] before filling. Text is measured with the fixed-advance
//! metric and recorded, not rasterized.
//!
//! Every submitted primitive is also recorded as a [`DrawCommand`] so tests
//! can assert on what a frame drew without inspecting pixels.
//!
//! Failures can be injected through [`SoftwareConfig`] and
//! [`SoftwareContext::lose_device`].

use std::ops::Range;

use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Ellipse, Line, Point, Rect, Shape, Size, StrokeOpts, Vec2};
use rustc_hash::FxHashMap;
use trellis_core::color::Color;
use trellis_core::geometry::CornerRadius;

use crate::context::{
    DrawError, GradientStop, RenderContext, StrokeStyle, TextFormatDesc, measure_text_fixed,
    resolve_stroke_width, sample_gradient,
};
use crate::engine::{Backend, EngineError, GraphicsApi, OffscreenTarget, TargetDesc};
use crate::resource::{Bitmap, Brush, Geometry, ResourceKey, TextFormat};
use crate::state::{ClipStack, StateStack, TOLERANCE};

/// Failure injection switches for the software backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SoftwareConfig {
    /// Every resource factory returns `None`.
    pub fail_resources: bool,
    /// Device creation fails for this API.
    pub unavailable_api: Option<GraphicsApi>,
    /// Target resizes fail.
    pub fail_resize: bool,
}

/// Primitive category of a [`DrawCommand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawKind {
    /// Whole-surface clear.
    Clear,
    /// Line segment.
    Line,
    /// Rectangle.
    Rectangle,
    /// Rounded rectangle.
    RoundedRectangle,
    /// Ellipse.
    Ellipse,
    /// Arbitrary geometry.
    Geometry,
    /// Bitmap blit.
    Bitmap,
    /// Text run.
    Text,
}

/// A primitive as submitted, in device space.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    /// Primitive category.
    pub kind: DrawKind,
    /// `true` for fills, `false` for strokes.
    pub filled: bool,
    /// Device-space bounding box of the primitive's geometry.
    pub bounds: Rect,
    /// Solid paint color after opacity was applied; `None` for gradients and
    /// bitmaps.
    pub color: Option<Color>,
    /// Resolved stroke width for strokes.
    pub stroke_width: Option<f64>,
    /// Text content for text runs.
    pub text: Option<String>,
}

#[derive(Clone, Debug)]
enum BrushData {
    Solid(Color),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    Radial {
        center: Point,
        radii: Vec2,
        stops: Vec<GradientStop>,
    },
}

/// A brush resolved for one draw: device → user inverse and alpha factor.
struct Paint<'a> {
    brush: &'a BrushData,
    inverse: Affine,
    alpha: f32,
}

impl Paint<'_> {
    fn color_at(&self, device: Point) -> Color {
        let color = match self.brush {
            BrushData::Solid(c) => *c,
            BrushData::Linear { start, end, stops } => {
                let p = self.inverse * device;
                let axis = *end - *start;
                let len2 = axis.hypot2();
                let t = if len2 > 0.0 {
                    (p - *start).dot(axis) / len2
                } else {
                    0.0
                };
                sample_gradient(stops, narrow(t))
            }
            BrushData::Radial {
                center,
                radii,
                stops,
            } => {
                let p = self.inverse * device - *center;
                let nx = if radii.x > 0.0 { p.x / radii.x } else { 0.0 };
                let ny = if radii.y > 0.0 { p.y / radii.y } else { 0.0 };
                sample_gradient(stops, narrow(nx.hypot(ny)))
            }
        };
        color.multiply_alpha(self.alpha)
    }

    fn solid_color(&self) -> Option<Color> {
        match self.brush {
            BrushData::Solid(c) => Some(c.multiply_alpha(self.alpha)),
            _ => None,
        }
    }
}

/// CPU render target backed by an [`RgbaImage`].
#[derive(Debug)]
pub struct SoftwareContext {
    surface: RgbaImage,
    alpha: bool,
    config: SoftwareConfig,

    states: StateStack,
    clips: ClipStack,

    drawing: bool,
    has_drawn: bool,
    device_lost: bool,
    draw_calls: usize,
    commands: Vec<DrawCommand>,

    key_base: u64,
    next_key: u64,
    brushes: FxHashMap<ResourceKey, BrushData>,
    geometries: FxHashMap<ResourceKey, BezPath>,
    text_formats: FxHashMap<ResourceKey, TextFormatDesc>,
    bitmaps: FxHashMap<ResourceKey, RgbaImage>,
}

impl SoftwareContext {
    /// Creates a transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, true, SoftwareConfig::default(), 0)
    }

    fn with_config(width: u32, height: u32, alpha: bool, config: SoftwareConfig, epoch: u64) -> Self {
        Self {
            surface: RgbaImage::new(width, height),
            alpha,
            config,
            states: StateStack::new(),
            clips: ClipStack::new(),
            drawing: false,
            has_drawn: false,
            device_lost: false,
            draw_calls: 0,
            commands: Vec::new(),
            key_base: epoch << 32,
            next_key: 1,
            brushes: FxHashMap::default(),
            geometries: FxHashMap::default(),
            text_formats: FxHashMap::default(),
            bitmaps: FxHashMap::default(),
        }
    }

    /// Makes every following `end_draw` report device loss, as if the
    /// adapter was removed.
    pub fn lose_device(&mut self) {
        self.device_lost = true;
    }

    /// Replaces the failure injection switches.
    pub fn set_config(&mut self, config: SoftwareConfig) {
        self.config = config;
    }

    /// Commands recorded since the last `begin_draw`.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Moves the recorded commands out.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        core::mem::take(&mut self.commands)
    }

    /// The backing surface.
    #[must_use]
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// Color of one pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.surface
            .get_pixel_checked(x, y)
            .map(|p| Color::from_rgba8(p[0], p[1], p[2], p[3]))
    }

    /// Replaces the surface with a blank one of the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface = RgbaImage::new(width, height);
    }

    fn alloc_key(&mut self) -> Option<ResourceKey> {
        if self.config.fail_resources {
            tracing::warn!("software backend: injected resource creation failure");
            return None;
        }
        let key = ResourceKey(self.key_base | self.next_key);
        self.next_key += 1;
        Some(key)
    }

    fn surface_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.surface.width()),
            f64::from(self.surface.height()),
        )
    }

    fn effective_alpha(&self) -> f32 {
        self.states.current().opacity * self.clips.layer_opacity()
    }

    fn can_draw(&self) -> bool {
        if !self.drawing {
            tracing::trace!("software backend: draw outside begin_draw/end_draw ignored");
        }
        self.drawing
    }

    fn record(&mut self, kind: DrawKind, filled: bool, bounds: Rect, color: Option<Color>, stroke_width: Option<f64>) {
        self.draw_calls += 1;
        self.commands.push(DrawCommand {
            kind,
            filled,
            bounds,
            color,
            stroke_width,
            text: None,
        });
    }

    /// Fills a user-space path with a brush.
    fn fill_user_path(&mut self, kind: DrawKind, path: &BezPath, brush: Brush) {
        if !self.can_draw() {
            return;
        }
        let Some(data) = self.brushes.get(&brush.key()).cloned() else {
            tracing::warn!(?brush, "software backend: unknown brush, draw skipped");
            return;
        };
        let transform = self.states.current().transform;
        let device = transform * path.clone();
        let paint = Paint {
            brush: &data,
            inverse: transform.inverse(),
            alpha: self.effective_alpha(),
        };
        let color = paint.solid_color();
        self.rasterize(&device, &paint);
        self.record(kind, true, device.bounding_box(), color, None);
    }

    /// Strokes a user-space path with a brush.
    fn stroke_user_path(
        &mut self,
        kind: DrawKind,
        path: &BezPath,
        brush: Brush,
        width: f64,
        style: Option<&StrokeStyle>,
    ) {
        if !self.can_draw() {
            return;
        }
        let Some(data) = self.brushes.get(&brush.key()).cloned() else {
            tracing::warn!(?brush, "software backend: unknown brush, draw skipped");
            return;
        };
        let width = resolve_stroke_width(width);
        let stroke = style.cloned().unwrap_or_default().to_stroke(width);
        let outline = kurbo::stroke(path.iter(), &stroke, &StrokeOpts::default(), TOLERANCE);
        let transform = self.states.current().transform;
        let device = transform * outline;
        let paint = Paint {
            brush: &data,
            inverse: transform.inverse(),
            alpha: self.effective_alpha(),
        };
        let color = paint.solid_color();
        self.rasterize(&device, &paint);
        let bounds = transform.transform_rect_bbox(path.bounding_box());
        self.record(kind, false, bounds, color, Some(width));
    }

    fn rasterize(&mut self, device: &BezPath, paint: &Paint<'_>) {
        let mut area = device.bounding_box().intersect(self.surface_rect());
        if let Some(clip) = self.clips.bounds() {
            area = area.intersect(clip);
        }
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }
        for y in pixel_span(area.y0, area.y1, self.surface.height()) {
            for x in pixel_span(area.x0, area.x1, self.surface.width()) {
                let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if device.winding(p) != 0 && self.clips.contains(p) {
                    let src = paint.color_at(p);
                    blend(self.surface.get_pixel_mut(x, y), src);
                }
            }
        }
    }
}

/// Pixel indices whose centers may fall within `[lo, hi)`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "bounds are clamped to the surface size before the cast"
)]
fn pixel_span(lo: f64, hi: f64, limit: u32) -> Range<u32> {
    let clamp = |v: f64| v.clamp(0.0, f64::from(limit)) as u32;
    clamp(lo.floor())..clamp(hi.ceil())
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "gradient parameters only need single precision"
)]
fn narrow(t: f64) -> f32 {
    t as f32
}

/// Source-over blend of a straight-alpha color onto a pixel.
fn blend(dst: &mut Rgba<u8>, src: Color) {
    let sa = src.a.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let d = Color::from_rgba8(dst[0], dst[1], dst[2], dst[3]);
    let out_a = sa + d.a * (1.0 - sa);
    let mix = |s: f32, d_c: f32| (s * sa + d_c * d.a * (1.0 - sa)) / out_a;
    let out = Color::new(mix(src.r, d.r), mix(src.g, d.g), mix(src.b, d.b), out_a);
    *dst = Rgba(out.to_rgba8());
}

impl RenderContext for SoftwareContext {
    fn size(&self) -> Size {
        self.surface_rect().size()
    }

    fn begin_draw(&mut self) {
        self.drawing = true;
        self.draw_calls = 0;
        self.commands.clear();
    }

    fn end_draw(&mut self) -> Result<(), DrawError> {
        if !self.drawing {
            return Err(DrawError::NotDrawing);
        }
        self.drawing = false;
        if self.states.depth() != 0 || !self.clips.is_empty() {
            tracing::warn!(
                states = self.states.depth(),
                clips = self.clips.clip_depth(),
                layers = self.clips.layer_depth(),
                "software backend: unbalanced push/pop at end_draw, resetting"
            );
            self.states.reset();
            self.clips.clear();
        }
        if self.device_lost {
            return Err(DrawError::DeviceLost);
        }
        self.has_drawn = true;
        Ok(())
    }

    fn is_drawing(&self) -> bool {
        self.drawing
    }

    fn draw_call_count(&self) -> usize {
        self.draw_calls
    }

    fn clear(&mut self, color: Color) {
        if !self.can_draw() {
            return;
        }
        let px = Rgba(color.to_rgba8());
        for p in self.surface.pixels_mut() {
            *p = px;
        }
        let bounds = self.surface_rect();
        self.record(DrawKind::Clear, true, bounds, Some(color), None);
    }

    fn push_state(&mut self) {
        self.states.push();
    }

    fn pop_state(&mut self) {
        self.states.pop();
    }

    fn reset_state(&mut self) {
        self.states.reset();
    }

    fn state_depth(&self) -> usize {
        self.states.depth()
    }

    fn transform(&self) -> Affine {
        self.states.current().transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.states.set_transform(transform);
    }

    fn multiply_transform(&mut self, transform: Affine) {
        self.states.multiply_transform(transform);
    }

    fn opacity(&self) -> f32 {
        self.states.current().opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.states.set_opacity(opacity);
    }

    fn antialias(&self) -> bool {
        self.states.current().antialias
    }

    fn set_antialias(&mut self, antialias: bool) {
        self.states.set_antialias(antialias);
    }

    fn push_clip_rect(&mut self, rect: Rect) {
        self.clips.push_rect(rect, self.states.current().transform);
    }

    fn push_clip_geometry(&mut self, geometry: Geometry) {
        let transform = self.states.current().transform;
        if let Some(path) = self.geometries.get(&geometry.key()) {
            self.clips.push_geometry(transform * path.clone());
        } else {
            // Keep push/pop balanced even for an unknown geometry.
            tracing::warn!(?geometry, "software backend: unknown clip geometry, clipping everything");
            self.clips.push_rect(Rect::ZERO, Affine::IDENTITY);
        }
    }

    fn pop_clip(&mut self) {
        if self.clips.pop_clip().is_none() {
            tracing::warn!("software backend: pop_clip without a matching clip");
        }
    }

    fn clip_depth(&self) -> usize {
        self.clips.clip_depth()
    }

    fn push_layer(&mut self, opacity: f32) {
        self.clips.push_layer(opacity);
    }

    fn pop_layer(&mut self) {
        if self.clips.pop_layer().is_none() {
            tracing::warn!("software backend: pop_layer without a matching layer");
        }
    }

    fn layer_depth(&self) -> usize {
        self.clips.layer_depth()
    }

    fn draw_line(&mut self, p0: Point, p1: Point, brush: Brush, width: f64, style: Option<&StrokeStyle>) {
        let path = Line::new(p0, p1).to_path(TOLERANCE);
        self.stroke_user_path(DrawKind::Line, &path, brush, width, style);
    }

    fn draw_rectangle(&mut self, rect: Rect, brush: Brush, width: f64, style: Option<&StrokeStyle>) {
        let path = rect.to_path(TOLERANCE);
        self.stroke_user_path(DrawKind::Rectangle, &path, brush, width, style);
    }

    fn fill_rectangle(&mut self, rect: Rect, brush: Brush) {
        let path = rect.to_path(TOLERANCE);
        self.fill_user_path(DrawKind::Rectangle, &path, brush);
    }

    fn draw_rounded_rectangle(
        &mut self,
        rect: Rect,
        radii: CornerRadius,
        brush: Brush,
        width: f64,
        style: Option<&StrokeStyle>,
    ) {
        let path = rect.to_rounded_rect(radii.to_kurbo()).to_path(TOLERANCE);
        self.stroke_user_path(DrawKind::RoundedRectangle, &path, brush, width, style);
    }

    fn fill_rounded_rectangle(&mut self, rect: Rect, radii: CornerRadius, brush: Brush) {
        let path = rect.to_rounded_rect(radii.to_kurbo()).to_path(TOLERANCE);
        self.fill_user_path(DrawKind::RoundedRectangle, &path, brush);
    }

    fn draw_ellipse(&mut self, ellipse: Ellipse, brush: Brush, width: f64, style: Option<&StrokeStyle>) {
        let path = ellipse.to_path(TOLERANCE);
        self.stroke_user_path(DrawKind::Ellipse, &path, brush, width, style);
    }

    fn fill_ellipse(&mut self, ellipse: Ellipse, brush: Brush) {
        let path = ellipse.to_path(TOLERANCE);
        self.fill_user_path(DrawKind::Ellipse, &path, brush);
    }

    fn draw_geometry(&mut self, geometry: Geometry, brush: Brush, width: f64, style: Option<&StrokeStyle>) {
        let Some(path) = self.geometries.get(&geometry.key()).cloned() else {
            tracing::warn!(?geometry, "software backend: unknown geometry, draw skipped");
            return;
        };
        self.stroke_user_path(DrawKind::Geometry, &path, brush, width, style);
    }

    fn fill_geometry(&mut self, geometry: Geometry, brush: Brush) {
        let Some(path) = self.geometries.get(&geometry.key()).cloned() else {
            tracing::warn!(?geometry, "software backend: unknown geometry, draw skipped");
            return;
        };
        self.fill_user_path(DrawKind::Geometry, &path, brush);
    }

    fn draw_bitmap(&mut self, bitmap: Bitmap, dest: Rect, opacity: f32) {
        if !self.can_draw() {
            return;
        }
        let Some(image) = self.bitmaps.get(&bitmap.key()).cloned() else {
            tracing::warn!(?bitmap, "software backend: unknown bitmap, draw skipped");
            return;
        };
        let transform = self.states.current().transform;
        let device = transform * dest.to_path(TOLERANCE);
        let inverse = transform.inverse();
        let alpha = self.effective_alpha() * opacity.clamp(0.0, 1.0);
        let (iw, ih) = image.dimensions();
        if iw > 0 && ih > 0 && dest.width() > 0.0 && dest.height() > 0.0 {
            let mut area = device.bounding_box().intersect(self.surface_rect());
            if let Some(clip) = self.clips.bounds() {
                area = area.intersect(clip);
            }
            for y in pixel_span(area.y0, area.y1, self.surface.height()) {
                for x in pixel_span(area.x0, area.x1, self.surface.width()) {
                    let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                    if device.winding(p) == 0 || !self.clips.contains(p) {
                        continue;
                    }
                    let local = inverse * p;
                    let u = (local.x - dest.x0) / dest.width() * f64::from(iw);
                    let v = (local.y - dest.y0) / dest.height() * f64::from(ih);
                    let sx = pixel_span(u, u, iw).start.min(iw - 1);
                    let sy = pixel_span(v, v, ih).start.min(ih - 1);
                    let s = image.get_pixel(sx, sy);
                    let src = Color::from_rgba8(s[0], s[1], s[2], s[3]).multiply_alpha(alpha);
                    blend(self.surface.get_pixel_mut(x, y), src);
                }
            }
        }
        let bounds = device.bounding_box();
        self.record(DrawKind::Bitmap, true, bounds, None, None);
    }

    fn draw_text(&mut self, text: &str, format: TextFormat, layout: Rect, brush: Brush) {
        if !self.can_draw() {
            return;
        }
        if !self.text_formats.contains_key(&format.key()) {
            tracing::warn!(?format, "software backend: unknown text format, draw skipped");
            return;
        }
        let Some(data) = self.brushes.get(&brush.key()) else {
            tracing::warn!(?brush, "software backend: unknown brush, draw skipped");
            return;
        };
        let color = match data {
            BrushData::Solid(c) => Some(c.multiply_alpha(self.effective_alpha())),
            _ => None,
        };
        let bounds = self.states.current().transform.transform_rect_bbox(layout);
        self.draw_calls += 1;
        self.commands.push(DrawCommand {
            kind: DrawKind::Text,
            filled: true,
            bounds,
            color,
            stroke_width: None,
            text: Some(text.to_owned()),
        });
    }

    fn measure_text(&self, text: &str, format: TextFormat) -> Size {
        self.text_formats
            .get(&format.key())
            .map_or(Size::ZERO, |desc| measure_text_fixed(text, desc.size))
    }

    fn create_solid_color_brush(&mut self, color: Color) -> Option<Brush> {
        let key = self.alloc_key()?;
        self.brushes.insert(key, BrushData::Solid(color));
        Some(Brush(key))
    }

    fn create_linear_gradient_brush(
        &mut self,
        start: Point,
        end: Point,
        stops: &[GradientStop],
    ) -> Option<Brush> {
        let key = self.alloc_key()?;
        let mut stops = stops.to_vec();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.brushes.insert(key, BrushData::Linear { start, end, stops });
        Some(Brush(key))
    }

    fn create_radial_gradient_brush(
        &mut self,
        center: Point,
        radii: Vec2,
        stops: &[GradientStop],
    ) -> Option<Brush> {
        let key = self.alloc_key()?;
        let mut stops = stops.to_vec();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        self.brushes.insert(
            key,
            BrushData::Radial {
                center,
                radii,
                stops,
            },
        );
        Some(Brush(key))
    }

    fn create_path_geometry(&mut self, path: BezPath) -> Option<Geometry> {
        let key = self.alloc_key()?;
        self.geometries.insert(key, path);
        Some(Geometry(key))
    }

    fn create_text_format(&mut self, desc: &TextFormatDesc) -> Option<TextFormat> {
        if !(desc.size.is_finite() && desc.size > 0.0) {
            tracing::warn!(size = desc.size, "software backend: invalid font size");
            return None;
        }
        let key = self.alloc_key()?;
        self.text_formats.insert(key, desc.clone());
        Some(TextFormat(key))
    }

    fn create_bitmap(&mut self, image: &RgbaImage) -> Option<Bitmap> {
        let key = self.alloc_key()?;
        self.bitmaps.insert(key, image.clone());
        Some(Bitmap(key))
    }
}

impl OffscreenTarget for SoftwareContext {
    fn to_bitmap(&self) -> Option<RgbaImage> {
        if !self.has_drawn {
            return None;
        }
        let mut image = self.surface.clone();
        if !self.alpha {
            for p in image.pixels_mut() {
                p[3] = 255;
            }
        }
        Some(image)
    }
}

/// [`Backend`] producing [`SoftwareContext`] targets.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    config: SoftwareConfig,
    device: Option<GraphicsApi>,
    epoch: u64,
}

impl SoftwareBackend {
    /// Creates a backend with the given failure switches.
    #[must_use]
    pub fn new(config: SoftwareConfig) -> Self {
        Self {
            config,
            device: None,
            epoch: 0,
        }
    }

    /// The failure switches applied to new devices and targets.
    #[must_use]
    pub fn config(&self) -> SoftwareConfig {
        self.config
    }

    /// Replaces the failure switches.
    pub fn set_config(&mut self, config: SoftwareConfig) {
        self.config = config;
    }

    /// The API of the live device.
    #[must_use]
    pub fn device(&self) -> Option<GraphicsApi> {
        self.device
    }

    fn next_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}

impl Backend for SoftwareBackend {
    type Context = SoftwareContext;
    type Offscreen = SoftwareContext;

    fn create_device(&mut self, api: GraphicsApi) -> Result<(), EngineError> {
        if self.config.unavailable_api == Some(api) {
            return Err(EngineError::Backend(format!("{api:?} device unavailable")));
        }
        self.device = Some(api);
        Ok(())
    }

    fn release_device(&mut self) {
        self.device = None;
    }

    fn create_target(&mut self, desc: &TargetDesc) -> Result<SoftwareContext, EngineError> {
        if self.device.is_none() {
            return Err(EngineError::NotInitialized);
        }
        let epoch = self.next_epoch();
        Ok(SoftwareContext::with_config(
            desc.width,
            desc.height,
            true,
            self.config,
            epoch,
        ))
    }

    fn resize_target(&mut self, target: &mut SoftwareContext, width: u32, height: u32) -> Result<(), EngineError> {
        if self.config.fail_resize {
            return Err(EngineError::Backend("injected resize failure".into()));
        }
        target.resize(width, height);
        Ok(())
    }

    fn create_offscreen(&mut self, width: u32, height: u32, alpha: bool) -> Result<SoftwareContext, EngineError> {
        if self.device.is_none() {
            return Err(EngineError::NotInitialized);
        }
        if width == 0 || height == 0 {
            return Err(EngineError::EmptySurface);
        }
        let epoch = self.next_epoch();
        Ok(SoftwareContext::with_config(width, height, alpha, self.config, epoch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SoftwareContext {
        let mut c = SoftwareContext::new(20, 20);
        c.begin_draw();
        c
    }

    #[test]
    fn fill_rectangle_paints_covered_pixels() {
        let mut c = ctx();
        let red = c.create_solid_color_brush(Color::RED).expect("brush");
        c.fill_rectangle(Rect::new(2.0, 2.0, 6.0, 6.0), red);
        assert_eq!(c.pixel(3, 3), Some(Color::RED));
        assert_eq!(c.pixel(7, 7), Some(Color::TRANSPARENT));
        assert_eq!(c.draw_call_count(), 1);
        assert!(c.end_draw().is_ok());
    }

    #[test]
    fn clear_ignores_clip() {
        let mut c = ctx();
        c.push_clip_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        c.clear(Color::BLUE);
        c.pop_clip();
        assert_eq!(c.pixel(19, 19), Some(Color::BLUE));
    }

    #[test]
    fn clip_limits_fills() {
        let mut c = ctx();
        let red = c.create_solid_color_brush(Color::RED).expect("brush");
        c.push_clip_rect(Rect::new(0.0, 0.0, 5.0, 20.0));
        c.fill_rectangle(Rect::new(0.0, 0.0, 20.0, 20.0), red);
        c.pop_clip();
        assert_eq!(c.pixel(2, 2), Some(Color::RED));
        assert_eq!(c.pixel(10, 2), Some(Color::TRANSPARENT));
        assert_eq!(c.clip_depth(), 0);
    }

    #[test]
    fn opacity_scales_brush_alpha_at_submission() {
        let mut c = ctx();
        let white = c.create_solid_color_brush(Color::WHITE).expect("brush");
        c.set_opacity(0.5);
        c.push_layer(0.5);
        c.fill_rectangle(Rect::new(0.0, 0.0, 4.0, 4.0), white);
        c.pop_layer();
        c.set_opacity(1.0);
        let cmd = &c.commands()[0];
        assert_eq!(cmd.color, Some(Color::WHITE.with_alpha(0.25)));
        let a = c.pixel(1, 1).map(|p| p.a).unwrap_or_default();
        assert!((a - 0.25).abs() < 0.01, "alpha {a}");
    }

    #[test]
    fn transform_moves_primitives() {
        let mut c = ctx();
        let red = c.create_solid_color_brush(Color::RED).expect("brush");
        c.set_transform(Affine::translate((10.0, 10.0)));
        c.fill_rectangle(Rect::new(0.0, 0.0, 2.0, 2.0), red);
        assert_eq!(c.commands()[0].bounds, Rect::new(10.0, 10.0, 12.0, 12.0));
        assert_eq!(c.pixel(11, 11), Some(Color::RED));
        assert_eq!(c.pixel(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn strokes_default_width_and_record() {
        let mut c = ctx();
        let black = c.create_solid_color_brush(Color::BLACK).expect("brush");
        c.draw_rectangle(Rect::new(2.0, 2.0, 10.0, 10.0), black, 0.0, None);
        let cmd = &c.commands()[0];
        assert_eq!(cmd.kind, DrawKind::Rectangle);
        assert!(!cmd.filled);
        assert_eq!(cmd.stroke_width, Some(1.0));
        c.draw_line(
            Point::new(0.0, 15.0),
            Point::new(20.0, 15.0),
            black,
            4.0,
            None,
        );
        assert_eq!(c.pixel(5, 14), Some(Color::BLACK), "thick line covers the row");
    }

    #[test]
    fn failed_factories_return_none() {
        let mut c = ctx();
        c.set_config(SoftwareConfig {
            fail_resources: true,
            ..SoftwareConfig::default()
        });
        assert!(c.create_solid_color_brush(Color::RED).is_none());
        assert!(c.create_text_format(&TextFormatDesc::new("Segoe UI", 12.0)).is_none());
    }

    #[test]
    fn unknown_handles_skip_draws() {
        let mut c = ctx();
        c.fill_rectangle(Rect::new(0.0, 0.0, 5.0, 5.0), Brush(ResourceKey(999)));
        assert!(c.commands().is_empty());
    }

    #[test]
    fn device_loss_reported_by_end_draw() {
        let mut c = ctx();
        c.lose_device();
        assert_eq!(c.end_draw(), Err(DrawError::DeviceLost));
        assert_eq!(c.end_draw(), Err(DrawError::NotDrawing));
    }

    #[test]
    fn unbalanced_stacks_are_reset_at_end_draw() {
        let mut c = ctx();
        c.push_state();
        c.push_clip_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(c.end_draw().is_ok());
        assert_eq!(c.state_depth(), 0);
        assert_eq!(c.clip_depth(), 0);
    }

    #[test]
    fn text_is_measured_and_recorded() {
        let mut c = ctx();
        let fmt = c
            .create_text_format(&TextFormatDesc::new("Segoe UI", 10.0))
            .expect("format");
        let brush = c.create_solid_color_brush(Color::BLACK).expect("brush");
        let size = c.measure_text("hello", fmt);
        assert!((size.width - 30.0).abs() < 1e-9);
        c.draw_text("hello", fmt, Rect::new(0.0, 0.0, 50.0, 12.0), brush);
        assert_eq!(c.commands()[0].text.as_deref(), Some("hello"));
    }

    #[test]
    fn linear_gradient_varies_across_axis() {
        let mut c = ctx();
        let brush = c
            .create_linear_gradient_brush(
                Point::new(0.0, 0.0),
                Point::new(20.0, 0.0),
                &[
                    GradientStop::new(0.0, Color::BLACK),
                    GradientStop::new(1.0, Color::WHITE),
                ],
            )
            .expect("brush");
        c.fill_rectangle(Rect::new(0.0, 0.0, 20.0, 20.0), brush);
        let left = c.pixel(0, 0).map(|p| p.r).unwrap_or_default();
        let right = c.pixel(19, 0).map(|p| p.r).unwrap_or_default();
        assert!(left < 0.1 && right > 0.9, "left {left} right {right}");
        assert_eq!(c.commands()[0].color, None);
    }

    #[test]
    fn bitmap_blit_scales_source() {
        let mut c = ctx();
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let bmp = c.create_bitmap(&img).expect("bitmap");
        c.draw_bitmap(bmp, Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        assert_eq!(c.pixel(2, 5), Some(Color::RED));
        assert_eq!(c.pixel(8, 5), Some(Color::BLUE));
    }

    #[test]
    fn offscreen_snapshot_requires_a_completed_draw() {
        let mut c = SoftwareContext::with_config(4, 4, false, SoftwareConfig::default(), 1);
        assert!(c.to_bitmap().is_none());
        c.begin_draw();
        c.clear(Color::RED.with_alpha(0.0));
        assert!(c.end_draw().is_ok());
        let img = c.to_bitmap().expect("drawn");
        assert_eq!(img.get_pixel(0, 0)[3], 255, "opaque target drops alpha");
    }

    #[test]
    fn backend_rejects_unavailable_api() {
        let mut b = SoftwareBackend::new(SoftwareConfig {
            unavailable_api: Some(GraphicsApi::Hardware),
            ..SoftwareConfig::default()
        });
        assert!(b.create_device(GraphicsApi::Hardware).is_err());
        assert!(b.create_device(GraphicsApi::Software).is_ok());
        assert_eq!(b.device(), Some(GraphicsApi::Software));
    }

    #[test]
    fn keys_from_different_targets_do_not_collide() {
        let mut b = SoftwareBackend::default();
        b.create_device(GraphicsApi::Software).expect("device");
        let mut t1 = b.create_offscreen(2, 2, true).expect("target");
        let mut t2 = b.create_offscreen(2, 2, true).expect("target");
        let k1 = t1.create_solid_color_brush(Color::RED).expect("brush");
        let k2 = t2.create_solid_color_brush(Color::RED).expect("brush");
        assert_ne!(k1, k2);
    }
}
