// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::color::Color;
use trellis_core::geometry::Size;

use crate::properties::{parse_color, parse_number};
use crate::widget::{ContentModel, Invalidate, MeasureCx, RenderCx, Widget};

/// Default font family.
pub const DEFAULT_FONT_FAMILY: &str = "Segoe UI";

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// A single line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    text: String,
    font_family: String,
    font_size: f32,
    foreground: Color,
}

impl TextBlock {
    /// Black text in the default font.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            foreground: Color::BLACK,
        }
    }

    /// Sets the font.
    #[must_use]
    pub fn with_font(mut self, family: impl Into<String>, size: f32) -> Self {
        self.font_family = family.into();
        self.font_size = size;
        self
    }

    /// Sets the text color.
    #[must_use]
    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = color;
        self
    }

    /// The text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Font size in points.
    #[must_use]
    pub fn font_size(&self) -> f32 {
        self.font_size
    }
}

impl Widget for TextBlock {
    fn type_name(&self) -> &'static str {
        "TextBlock"
    }

    fn content_model(&self) -> ContentModel {
        ContentModel::Leaf
    }

    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, _available: Size) -> Size {
        cx.measure_text(&self.text, &self.font_family, self.font_size)
    }

    fn render(&self, cx: &mut RenderCx<'_>) {
        if self.text.is_empty() {
            return;
        }
        let Some(format) = cx.text_format(&self.font_family, self.font_size) else {
            return;
        };
        let Some(brush) = cx.brush(self.foreground) else {
            return;
        };
        let bounds = cx.bounds();
        cx.ctx().draw_text(&self.text, format, bounds, brush);
    }

    fn get_property(&self, name: &str) -> Option<String> {
        Some(match name {
            "text" | "content" => self.text.clone(),
            "fontfamily" => self.font_family.clone(),
            "fontsize" => self.font_size.to_string(),
            "foreground" | "color" => self.foreground.to_hex(),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        match name {
            "text" | "content" => self.text = value.to_owned(),
            "fontfamily" => self.font_family = value.to_owned(),
            "fontsize" => {
                let size = parse_number(name, value, DEFAULT_FONT_SIZE);
                self.font_size = if size.is_finite() && size > 0.0 {
                    size
                } else {
                    DEFAULT_FONT_SIZE
                };
            }
            "foreground" | "color" => {
                self.foreground = parse_color(name, value, Color::BLACK);
                return Some(Invalidate::Visual);
            }
            _ => return None,
        }
        Some(Invalidate::Measure)
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::geometry::Rect;
    use trellis_render::cache::ResourceCache;
    use trellis_render::context::RenderContext;
    use trellis_render::software::{DrawKind, SoftwareContext};

    use super::*;
    use crate::tree::ControlTree;

    #[test]
    fn measures_with_tree_metrics() {
        let mut tree = ControlTree::new();
        let t = tree.create(TextBlock::new("abcd").with_font("Mono", 10.0));
        let d = tree.measure(t, Size::new(f64::INFINITY, f64::INFINITY));
        assert!((d.width - 24.0).abs() < 1e-9, "4 glyphs at 0.6em");
        assert!((d.height - 12.0).abs() < 1e-9, "1.2 line height");
    }

    #[test]
    fn text_change_invalidates_measure() {
        let mut tree = ControlTree::new();
        let t = tree.create(TextBlock::new("a"));
        tree.measure(t, Size::new(100.0, 100.0));
        tree.set_property(t, "text", "longer").unwrap();
        assert!(!tree.is_measure_valid(t));
        tree.set_property(t, "foreground", "#ff0000").unwrap();
    }

    #[test]
    fn renders_text_in_arranged_rect() {
        let mut tree = ControlTree::new();
        let t = tree.create(TextBlock::new("hi"));
        tree.update_layout(t, Size::new(50.0, 20.0));
        let mut ctx = SoftwareContext::new(50, 20);
        let mut cache = ResourceCache::new();
        ctx.begin_draw();
        tree.render(t, &mut ctx, &mut cache);
        let _ = ctx.end_draw();
        let text = &ctx.commands()[0];
        assert_eq!(text.kind, DrawKind::Text);
        assert_eq!(text.text.as_deref(), Some("hi"));
        assert_eq!(text.bounds, Rect::new(0.0, 0.0, 50.0, 20.0));
    }
}
