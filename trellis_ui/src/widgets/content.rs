// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::color::Color;

use crate::properties::{format_optional, parse_optional_color};
use crate::widget::{ContentModel, Invalidate, RenderCx, Widget};

/// A control holding exactly one child, optionally over a background.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentControl {
    background: Option<Color>,
}

impl ContentControl {
    /// A transparent content host.
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
}

impl Widget for ContentControl {
    fn type_name(&self) -> &'static str {
        "ContentControl"
    }

    fn content_model(&self) -> ContentModel {
        ContentModel::Single
    }

    fn render(&self, cx: &mut RenderCx<'_>) {
        if let Some(brush) = self.background.and_then(|c| cx.brush(c)) {
            let bounds = cx.bounds();
            cx.ctx().fill_rectangle(bounds, brush);
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        (name == "background").then(|| format_optional(self.background.map(Color::to_hex)))
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        if name != "background" {
            return None;
        }
        self.background = parse_optional_color(name, value);
        Some(Invalidate::Visual)
    }
}
