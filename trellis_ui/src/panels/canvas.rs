// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::geometry::{Point, Rect, Size};

use crate::widget::{ArrangeCx, MeasureCx, Widget};

/// Absolute positioning by `Canvas.Left` / `Canvas.Top`.
///
/// Children are measured without constraint and keep their desired size. A
/// child without offsets sits at the canvas origin. The canvas itself asks
/// for no space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Canvas;

impl Canvas {
    /// Creates a canvas.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Widget for Canvas {
    fn type_name(&self) -> &'static str {
        "Canvas"
    }

    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, _available: Size) -> Size {
        let unbounded = Size::new(f64::INFINITY, f64::INFINITY);
        for child in cx.children() {
            cx.measure_child(child, unbounded);
        }
        Size::ZERO
    }

    fn arrange_override(&mut self, cx: &mut ArrangeCx<'_>, content: Rect) {
        for child in cx.children() {
            let props = cx.child_props(child);
            let origin = Point::new(
                content.x0 + props.canvas_left.unwrap_or(0.0),
                content.y0 + props.canvas_top.unwrap_or(0.0),
            );
            let size = cx.desired_size(child);
            cx.arrange_child(child, Rect::from_origin_size(origin, size));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ControlTree;
    use crate::widgets::Rectangle;

    #[test]
    fn children_sit_at_their_offsets() {
        let mut tree = ControlTree::new();
        let canvas = tree.create(Canvas::new());
        let placed = tree.create(Rectangle::new());
        tree.set_size(placed, 20.0, 10.0);
        tree.set_position(placed, 15.0, 25.0);
        let origin = tree.create(Rectangle::new());
        tree.set_size(origin, 5.0, 5.0);
        tree.add_child(canvas, placed);
        tree.add_child(canvas, origin);

        let d = tree.measure(canvas, Size::new(100.0, 100.0));
        assert_eq!(d, Size::ZERO, "canvas imposes no size");
        tree.arrange(canvas, Rect::new(10.0, 10.0, 110.0, 110.0));

        assert_eq!(tree.arranged_rect(placed), Rect::new(25.0, 35.0, 45.0, 45.0));
        assert_eq!(tree.arranged_rect(origin), Rect::new(10.0, 10.0, 15.0, 15.0));
    }

    #[test]
    fn children_may_exceed_the_canvas() {
        let mut tree = ControlTree::new();
        let canvas = tree.create(Canvas::new());
        let big = tree.create(Rectangle::new());
        tree.set_size(big, 500.0, 500.0);
        tree.add_child(canvas, big);
        tree.update_layout(canvas, Size::new(100.0, 100.0));
        assert_eq!(tree.arranged_rect(big).size(), Size::new(500.0, 500.0));
    }
}
