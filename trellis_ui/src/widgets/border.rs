// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::color::Color;
use trellis_core::geometry::{CornerRadius, Rect, Size, Thickness};

use crate::properties::{
    format_optional, format_thickness, parse_corner_radius, parse_optional_color, parse_thickness,
};
use crate::widget::{ArrangeCx, ContentModel, Invalidate, MeasureCx, RenderCx, Widget};

/// A single-child decorator drawing a background and an outline.
///
/// The border thickness is reserved inside the control, in addition to its
/// padding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Border {
    background: Option<Color>,
    border_brush: Option<Color>,
    border_thickness: Thickness,
    corner_radius: CornerRadius,
}

impl Border {
    /// An invisible border.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the background.
    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Sets the outline.
    #[must_use]
    pub fn with_border(mut self, color: Color, thickness: Thickness) -> Self {
        self.border_brush = Some(color);
        self.border_thickness = thickness;
        self
    }

    /// Rounds the corners.
    #[must_use]
    pub fn with_corner_radius(mut self, radius: CornerRadius) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Outline thickness.
    #[must_use]
    pub fn border_thickness(&self) -> Thickness {
        self.border_thickness
    }

    fn is_uniform(&self) -> bool {
        let t = self.border_thickness;
        t.left == t.top && t.left == t.right && t.left == t.bottom
    }
}

impl Widget for Border {
    fn type_name(&self) -> &'static str {
        "Border"
    }

    fn content_model(&self) -> ContentModel {
        ContentModel::Single
    }

    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, available: Size) -> Size {
        let inner = self.border_thickness.deflate_size(available);
        let mut size = Size::ZERO;
        for child in cx.children() {
            let d = cx.measure_child(child, inner);
            size.width = size.width.max(d.width);
            size.height = size.height.max(d.height);
        }
        self.border_thickness.inflate_size(size)
    }

    fn arrange_override(&mut self, cx: &mut ArrangeCx<'_>, content: Rect) {
        let inner = self.border_thickness.deflate_rect(content);
        for child in cx.children() {
            cx.arrange_child(child, inner);
        }
    }

    fn render(&self, cx: &mut RenderCx<'_>) {
        let bounds = cx.bounds();
        if let Some(brush) = self.background.and_then(|c| cx.brush(c)) {
            if self.corner_radius.is_zero() {
                cx.ctx().fill_rectangle(bounds, brush);
            } else {
                cx.ctx()
                    .fill_rounded_rectangle(bounds, self.corner_radius, brush);
            }
        }

        let t = self.border_thickness;
        if t == Thickness::ZERO {
            return;
        }
        let Some(brush) = self.border_brush.and_then(|c| cx.brush(c)) else {
            return;
        };
        if self.is_uniform() {
            let inset = bounds.inset(-t.left / 2.0);
            cx.ctx().draw_rounded_rectangle(inset, self.corner_radius, brush, t.left, None);
        } else {
            // Uneven edges are filled as four strips.
            let ctx = cx.ctx();
            let Rect { x0, y0, x1, y1 } = bounds;
            ctx.fill_rectangle(Rect::new(x0, y0, x1, y0 + t.top), brush);
            ctx.fill_rectangle(Rect::new(x0, y1 - t.bottom, x1, y1), brush);
            ctx.fill_rectangle(Rect::new(x0, y0 + t.top, x0 + t.left, y1 - t.bottom), brush);
            ctx.fill_rectangle(Rect::new(x1 - t.right, y0 + t.top, x1, y1 - t.bottom), brush);
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        Some(match name {
            "background" => format_optional(self.background.map(Color::to_hex)),
            "borderbrush" => format_optional(self.border_brush.map(Color::to_hex)),
            "borderthickness" => format_thickness(self.border_thickness),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        match name {
            "background" => self.background = parse_optional_color(name, value),
            "borderbrush" => self.border_brush = parse_optional_color(name, value),
            "cornerradius" => self.corner_radius = parse_corner_radius(name, value),
            "borderthickness" => {
                self.border_thickness = parse_thickness(name, value);
                return Some(Invalidate::Measure);
            }
            _ => return None,
        }
        Some(Invalidate::Visual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ControlTree;
    use crate::widgets::Rectangle;

    #[test]
    fn thickness_is_reserved_around_content() {
        let mut tree = ControlTree::new();
        let border = tree.create(Border::new().with_border(Color::BLACK, Thickness::uniform(2.0)));
        let child = tree.create(Rectangle::new());
        tree.update_props(child, |p| {
            p.width = Some(10.0);
            p.height = Some(10.0);
        });
        tree.add_child(border, child);

        let d = tree.measure(border, Size::new(100.0, 100.0));
        assert_eq!(d, Size::new(14.0, 14.0));
        tree.arrange(border, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(tree.arranged_rect(child), Rect::new(2.0, 2.0, 12.0, 12.0));
    }
}
