// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::color::Color;
use trellis_core::geometry::{CornerRadius, Size};

use crate::properties::{format_optional, parse_corner_radius, parse_number, parse_optional_color};
use crate::widget::{ContentModel, Invalidate, MeasureCx, RenderCx, Widget};

/// A filled and/or stroked box. Its size comes entirely from the control's
/// explicit size or the space its parent gives it.
#[derive(Clone, Debug, PartialEq)]
pub struct Rectangle {
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_thickness: f64,
    radius: CornerRadius,
}

impl Default for Rectangle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_thickness: 1.0,
            radius: CornerRadius::default(),
        }
    }
}

impl Rectangle {
    /// An unpainted rectangle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rectangle filled with `color`.
    #[must_use]
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    /// Adds an outline.
    #[must_use]
    pub fn with_stroke(mut self, color: Color, thickness: f64) -> Self {
        self.stroke = Some(color);
        self.stroke_thickness = thickness;
        self
    }

    /// Rounds the corners.
    #[must_use]
    pub fn with_radius(mut self, radius: CornerRadius) -> Self {
        self.radius = radius;
        self
    }

    /// Fill color.
    #[must_use]
    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    /// Replaces the fill color.
    pub fn set_fill(&mut self, fill: Option<Color>) {
        self.fill = fill;
    }
}

impl Widget for Rectangle {
    fn type_name(&self) -> &'static str {
        "Rectangle"
    }

    fn content_model(&self) -> ContentModel {
        ContentModel::Leaf
    }

    fn measure_override(&mut self, _cx: &mut MeasureCx<'_>, _available: Size) -> Size {
        Size::ZERO
    }

    fn render(&self, cx: &mut RenderCx<'_>) {
        let bounds = cx.bounds();
        if let Some(brush) = self.fill.and_then(|c| cx.brush(c)) {
            if self.radius.is_zero() {
                cx.ctx().fill_rectangle(bounds, brush);
            } else {
                cx.ctx().fill_rounded_rectangle(bounds, self.radius, brush);
            }
        }
        if let Some(brush) = self.stroke.and_then(|c| cx.brush(c)) {
            let inset = bounds.inset(-self.stroke_thickness / 2.0);
            if self.radius.is_zero() {
                cx.ctx()
                    .draw_rectangle(inset, brush, self.stroke_thickness, None);
            } else {
                cx.ctx().draw_rounded_rectangle(
                    inset,
                    self.radius,
                    brush,
                    self.stroke_thickness,
                    None,
                );
            }
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        Some(match name {
            "fill" => format_optional(self.fill.map(Color::to_hex)),
            "stroke" => format_optional(self.stroke.map(Color::to_hex)),
            "strokethickness" => self.stroke_thickness.to_string(),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        match name {
            "fill" => self.fill = parse_optional_color(name, value),
            "stroke" => self.stroke = parse_optional_color(name, value),
            "strokethickness" => self.stroke_thickness = parse_number(name, value, 1.0),
            "radius" | "cornerradius" => self.radius = parse_corner_radius(name, value),
            _ => return None,
        }
        Some(Invalidate::Visual)
    }
}
