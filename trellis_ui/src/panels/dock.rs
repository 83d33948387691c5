// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::geometry::{Rect, Size};

use crate::properties::parse_bool;
use crate::tree::Dock;
use crate::widget::{ArrangeCx, Invalidate, MeasureCx, Widget};

/// Docks children to the edges of the remaining space, in insertion order.
///
/// Each child consumes a strip as thick as its desired size along the dock
/// axis. With `last_child_fill`, the last child takes whatever is left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DockPanel {
    last_child_fill: bool,
}

impl Default for DockPanel {
    fn default() -> Self {
        Self {
            last_child_fill: true,
        }
    }
}

impl DockPanel {
    /// A dock panel whose last child fills.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the last child fills the remaining space.
    #[must_use]
    pub fn with_last_child_fill(mut self, fill: bool) -> Self {
        self.last_child_fill = fill;
        self
    }

    /// Whether the last child fills the remaining space.
    #[must_use]
    pub fn last_child_fill(&self) -> bool {
        self.last_child_fill
    }
}

impl Widget for DockPanel {
    fn type_name(&self) -> &'static str {
        "DockPanel"
    }

    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, available: Size) -> Size {
        let mut used = Size::ZERO;
        let mut extent = Size::ZERO;
        for child in cx.children() {
            let remaining = Size::new(
                (available.width - used.width).max(0.0),
                (available.height - used.height).max(0.0),
            );
            let d = cx.measure_child(child, remaining);
            match cx.child_props(child).dock {
                Dock::Left | Dock::Right => {
                    extent.height = extent.height.max(used.height + d.height);
                    used.width += d.width;
                }
                Dock::Top | Dock::Bottom => {
                    extent.width = extent.width.max(used.width + d.width);
                    used.height += d.height;
                }
            }
        }
        Size::new(extent.width.max(used.width), extent.height.max(used.height))
    }

    fn arrange_override(&mut self, cx: &mut ArrangeCx<'_>, content: Rect) {
        let children = cx.children();
        let count = children.len();
        let mut rest = content;
        for (i, child) in children.into_iter().enumerate() {
            if self.last_child_fill && i + 1 == count {
                cx.arrange_child(child, rest);
                break;
            }
            let d = cx.desired_size(child);
            let rect = match cx.child_props(child).dock {
                Dock::Left => {
                    let w = d.width.min(rest.width());
                    let r = Rect::new(rest.x0, rest.y0, rest.x0 + w, rest.y1);
                    rest.x0 += w;
                    r
                }
                Dock::Right => {
                    let w = d.width.min(rest.width());
                    let r = Rect::new(rest.x1 - w, rest.y0, rest.x1, rest.y1);
                    rest.x1 -= w;
                    r
                }
                Dock::Top => {
                    let h = d.height.min(rest.height());
                    let r = Rect::new(rest.x0, rest.y0, rest.x1, rest.y0 + h);
                    rest.y0 += h;
                    r
                }
                Dock::Bottom => {
                    let h = d.height.min(rest.height());
                    let r = Rect::new(rest.x0, rest.y1 - h, rest.x1, rest.y1);
                    rest.y1 -= h;
                    r
                }
            };
            cx.arrange_child(child, rect);
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        (name == "lastchildfill").then(|| self.last_child_fill.to_string())
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        if name != "lastchildfill" {
            return None;
        }
        self.last_child_fill = parse_bool(name, value, true);
        Some(Invalidate::Arrange)
    }
}
