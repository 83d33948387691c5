// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::color::Color;
use trellis_core::geometry::CornerRadius;

use crate::events::ControlEvent;
use crate::input::{Key, MouseButton};
use crate::properties::{parse_color, parse_corner_radius, parse_optional_color};
use crate::widget::{ContentModel, EventCx, Invalidate, RenderCx, Widget};

/// A pressable content control.
///
/// The host raises [`ControlEvent::Click`] when a press and release land on
/// the button. Space and Enter raise it from the keyboard while focused.
#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    background: Color,
    hover_background: Color,
    pressed_background: Color,
    border: Option<Color>,
    corner_radius: CornerRadius,
    hovered: bool,
    pressed: bool,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(0xe1, 0xe1, 0xe1, 0xff),
            hover_background: Color::from_rgba8(0xe5, 0xf1, 0xfb, 0xff),
            pressed_background: Color::from_rgba8(0xcc, 0xe4, 0xf7, 0xff),
            border: Some(Color::from_rgba8(0xad, 0xad, 0xad, 0xff)),
            corner_radius: CornerRadius::default(),
            hovered: false,
            pressed: false,
        }
    }
}

impl Button {
    /// A button with the default look.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pointer is over the button.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Whether the button is held down.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn current_background(&self) -> Color {
        if self.pressed {
            self.pressed_background
        } else if self.hovered {
            self.hover_background
        } else {
            self.background
        }
    }
}

impl Widget for Button {
    fn type_name(&self) -> &'static str {
        "Button"
    }

    fn content_model(&self) -> ContentModel {
        ContentModel::Single
    }

    fn focusable(&self) -> bool {
        true
    }

    fn render(&self, cx: &mut RenderCx<'_>) {
        let bounds = cx.bounds();
        if let Some(brush) = cx.brush(self.current_background()) {
            cx.ctx()
                .fill_rounded_rectangle(bounds, self.corner_radius, brush);
        }
        if let Some(brush) = self.border.and_then(|c| cx.brush(c)) {
            cx.ctx()
                .draw_rounded_rectangle(bounds.inset(-0.5), self.corner_radius, brush, 1.0, None);
        }
    }

    fn on_event(&mut self, cx: &mut EventCx<'_>, event: &ControlEvent) {
        match event {
            ControlEvent::MouseEnter => {
                self.hovered = true;
                cx.invalidate(Invalidate::Visual);
            }
            ControlEvent::MouseLeave => {
                self.hovered = false;
                cx.invalidate(Invalidate::Visual);
            }
            ControlEvent::MouseDown(args) if args.button == Some(MouseButton::Left) => {
                self.pressed = true;
                cx.capture_mouse();
                cx.set_handled();
                cx.invalidate(Invalidate::Visual);
            }
            ControlEvent::MouseUp(args) if args.button == Some(MouseButton::Left) => {
                if self.pressed {
                    self.pressed = false;
                    cx.release_capture();
                    cx.set_handled();
                    cx.invalidate(Invalidate::Visual);
                }
            }
            ControlEvent::KeyDown(args) if matches!(args.key, Key::Space | Key::Enter) => {
                cx.raise(ControlEvent::Click);
                cx.set_handled();
            }
            _ => {}
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        Some(match name {
            "background" => self.background.to_hex(),
            "hoverbackground" => self.hover_background.to_hex(),
            "pressedbackground" => self.pressed_background.to_hex(),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        let defaults = Self::default();
        match name {
            "background" => self.background = parse_color(name, value, defaults.background),
            "hoverbackground" => {
                self.hover_background = parse_color(name, value, defaults.hover_background);
            }
            "pressedbackground" => {
                self.pressed_background = parse_color(name, value, defaults.pressed_background);
            }
            "borderbrush" => self.border = parse_optional_color(name, value),
            "cornerradius" => self.corner_radius = parse_corner_radius(name, value),
            _ => return None,
        }
        Some(Invalidate::Visual)
    }
}
