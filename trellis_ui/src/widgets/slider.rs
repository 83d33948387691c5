// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::color::Color;
use trellis_core::geometry::{CornerRadius, Rect, Size};

use crate::events::ControlEvent;
use crate::input::{Key, MouseButton};
use crate::properties::parse_number;
use crate::widget::{ContentModel, EventCx, Invalidate, MeasureCx, RenderCx, Widget};

const THUMB_WIDTH: f64 = 10.0;
const TRACK_HEIGHT: f64 = 4.0;
const PREFERRED: Size = Size::new(100.0, 20.0);

/// A horizontal value picker.
///
/// Pressing on the slider captures the mouse and moves the thumb with the
/// pointer until release. Arrow keys step by `small_change`; Home and End
/// jump to the limits. Every change raises [`ControlEvent::ValueChanged`].
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    minimum: f64,
    maximum: f64,
    value: f64,
    small_change: f64,
    dragging: bool,
}

impl Default for Slider {
    fn default() -> Self {
        Self {
            minimum: 0.0,
            maximum: 100.0,
            value: 0.0,
            small_change: 1.0,
            dragging: false,
        }
    }
}

impl Slider {
    /// A slider over `[0, 100]`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slider over `[minimum, maximum]` starting at `value`.
    #[must_use]
    pub fn with_range(minimum: f64, maximum: f64, value: f64) -> Self {
        let mut s = Self {
            minimum,
            maximum: maximum.max(minimum),
            ..Self::default()
        };
        s.set_value(value);
        s
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Lower limit.
    #[must_use]
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Upper limit.
    #[must_use]
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Whether a thumb drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Sets the value, clamped to the range. Returns `true` if it changed.
    pub fn set_value(&mut self, value: f64) -> bool {
        let v = if value.is_nan() {
            self.minimum
        } else {
            value.clamp(self.minimum, self.maximum)
        };
        let changed = v != self.value;
        self.value = v;
        changed
    }

    fn fraction(&self) -> f64 {
        let span = self.maximum - self.minimum;
        if span > 0.0 {
            (self.value - self.minimum) / span
        } else {
            0.0
        }
    }

    fn value_at(&self, rect: Rect, x: f64) -> f64 {
        let travel = (rect.width() - THUMB_WIDTH).max(0.0);
        if travel == 0.0 {
            return self.minimum;
        }
        let t = ((x - rect.x0 - THUMB_WIDTH / 2.0) / travel).clamp(0.0, 1.0);
        self.minimum + t * (self.maximum - self.minimum)
    }

    fn thumb_rect(&self, bounds: Rect) -> Rect {
        let travel = (bounds.width() - THUMB_WIDTH).max(0.0);
        let x = bounds.x0 + travel * self.fraction();
        Rect::new(x, bounds.y0, x + THUMB_WIDTH, bounds.y1)
    }

    fn change(&mut self, cx: &mut EventCx<'_>, value: f64) {
        if self.set_value(value) {
            cx.raise(ControlEvent::ValueChanged(self.value));
            cx.invalidate(Invalidate::Visual);
        }
    }
}

impl Widget for Slider {
    fn type_name(&self) -> &'static str {
        "Slider"
    }

    fn content_model(&self) -> ContentModel {
        ContentModel::Leaf
    }

    fn focusable(&self) -> bool {
        true
    }

    fn measure_override(&mut self, _cx: &mut MeasureCx<'_>, available: Size) -> Size {
        Size::new(
            PREFERRED.width.min(available.width),
            PREFERRED.height.min(available.height),
        )
    }

    fn render(&self, cx: &mut RenderCx<'_>) {
        let bounds = cx.bounds();
        let mid = bounds.center().y;
        let track = Rect::new(
            bounds.x0 + THUMB_WIDTH / 2.0,
            mid - TRACK_HEIGHT / 2.0,
            bounds.x1 - THUMB_WIDTH / 2.0,
            mid + TRACK_HEIGHT / 2.0,
        );
        if let Some(brush) = cx.brush(Color::from_rgba8(0xe7, 0xea, 0xea, 0xff)) {
            cx.ctx().fill_rectangle(track, brush);
        }
        let thumb_color = if self.dragging {
            Color::from_rgba8(0x00, 0x5a, 0x9e, 0xff)
        } else {
            Color::from_rgba8(0x00, 0x78, 0xd7, 0xff)
        };
        if let Some(brush) = cx.brush(thumb_color) {
            let thumb = self.thumb_rect(bounds);
            cx.ctx()
                .fill_rounded_rectangle(thumb, CornerRadius::uniform(2.0), brush);
        }
    }

    fn on_event(&mut self, cx: &mut EventCx<'_>, event: &ControlEvent) {
        match event {
            ControlEvent::MouseDown(args) if args.button == Some(MouseButton::Left) => {
                self.dragging = true;
                cx.capture_mouse();
                cx.set_handled();
                let v = self.value_at(cx.rect(), args.position.x);
                self.change(cx, v);
            }
            ControlEvent::MouseMove(args) if self.dragging => {
                cx.set_handled();
                let v = self.value_at(cx.rect(), args.position.x);
                self.change(cx, v);
            }
            ControlEvent::MouseUp(_) if self.dragging => {
                self.dragging = false;
                cx.release_capture();
                cx.set_handled();
                cx.invalidate(Invalidate::Visual);
            }
            ControlEvent::KeyDown(args) => {
                let target = match args.key {
                    Key::Left | Key::Down => self.value - self.small_change,
                    Key::Right | Key::Up => self.value + self.small_change,
                    Key::Home => self.minimum,
                    Key::End => self.maximum,
                    _ => return,
                };
                cx.set_handled();
                self.change(cx, target);
            }
            _ => {}
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        Some(match name {
            "value" => self.value.to_string(),
            "minimum" | "min" => self.minimum.to_string(),
            "maximum" | "max" => self.maximum.to_string(),
            "smallchange" => self.small_change.to_string(),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        match name {
            "value" => {
                let v = parse_number(name, value, self.minimum);
                self.set_value(v);
            }
            "minimum" | "min" => {
                self.minimum = parse_number(name, value, 0.0);
                self.maximum = self.maximum.max(self.minimum);
                self.set_value(self.value);
            }
            "maximum" | "max" => {
                self.maximum = parse_number(name, value, 100.0_f64).max(self.minimum);
                self.set_value(self.value);
            }
            "smallchange" => self.small_change = parse_number(name, value, 1.0),
            _ => return None,
        }
        Some(Invalidate::Visual)
    }
}
