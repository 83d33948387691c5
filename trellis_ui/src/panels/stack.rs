// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::geometry::{Point, Rect, Size};

use super::{Orientation, parse_orientation};
use crate::properties::parse_number;
use crate::tree::Visibility;
use crate::widget::{ArrangeCx, Invalidate, MeasureCx, Widget};

/// Lays children end to end along one axis.
///
/// Children are stretched across the cross axis unless they set an explicit
/// cross size. `spacing` separates consecutive non-collapsed children; there
/// is no gap before the first or after the last.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackPanel {
    orientation: Orientation,
    spacing: f64,
}

impl StackPanel {
    /// A top-to-bottom stack.
    #[must_use]
    pub fn vertical() -> Self {
        Self {
            orientation: Orientation::Vertical,
            spacing: 0.0,
        }
    }

    /// A left-to-right stack.
    #[must_use]
    pub fn horizontal() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            spacing: 0.0,
        }
    }

    /// Sets the gap between children.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    /// Stack axis.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl Widget for StackPanel {
    fn type_name(&self) -> &'static str {
        "StackPanel"
    }

    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, available: Size) -> Size {
        let o = self.orientation;
        let (_, cross_avail) = o.split(available);
        let child_avail = o.join(f64::INFINITY, cross_avail);

        let mut main = 0.0_f64;
        let mut cross = 0.0_f64;
        let mut count = 0_usize;
        for child in cx.children() {
            let d = cx.measure_child(child, child_avail);
            if cx.child_props(child).visibility == Visibility::Collapsed {
                continue;
            }
            let (m, c) = o.split(d);
            main += m;
            cross = cross.max(c);
            count += 1;
        }
        if count > 1 {
            main += self.spacing * (count - 1) as f64;
        }
        o.join(main, cross)
    }

    fn arrange_override(&mut self, cx: &mut ArrangeCx<'_>, content: Rect) {
        let o = self.orientation;
        let (_, cross) = o.split(content.size());
        let mut offset = 0.0;
        let mut placed = 0_usize;
        for child in cx.children() {
            let collapsed = cx.child_props(child).visibility == Visibility::Collapsed;
            if !collapsed && placed > 0 {
                offset += self.spacing;
            }
            let origin = match o {
                Orientation::Horizontal => Point::new(content.x0 + offset, content.y0),
                Orientation::Vertical => Point::new(content.x0, content.y0 + offset),
            };
            if collapsed {
                cx.arrange_child(child, Rect::from_origin_size(origin, Size::ZERO));
                continue;
            }
            let (main, _) = o.split(cx.desired_size(child));
            cx.arrange_child(child, Rect::from_origin_size(origin, o.join(main, cross)));
            offset += main;
            placed += 1;
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        Some(match name {
            "orientation" => self.orientation.name().to_owned(),
            "spacing" => self.spacing.to_string(),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        match name {
            "orientation" => self.orientation = parse_orientation(name, value),
            "spacing" => self.spacing = parse_number(name, value, 0.0_f64).max(0.0),
            _ => return None,
        }
        Some(Invalidate::Measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ControlId, ControlTree};
    use crate::widgets::Rectangle;

    fn fixed(tree: &mut ControlTree, w: Option<f64>, h: Option<f64>) -> ControlId {
        let id = tree.create(Rectangle::new());
        tree.update_props(id, |p| {
            p.width = w;
            p.height = h;
        });
        id
    }

    #[test]
    fn spacing_only_between_children() {
        let mut tree = ControlTree::new();
        let stack = tree.create(StackPanel::vertical().with_spacing(10.0));
        for _ in 0..3 {
            let c = fixed(&mut tree, None, Some(20.0));
            tree.add_child(stack, c);
        }
        let d = tree.measure(stack, Size::new(100.0, f64::INFINITY));
        assert_eq!(d.height, 80.0, "20*3 + 10*2");
    }

    #[test]
    fn vertical_stack_end_to_end() {
        let mut tree = ControlTree::new();
        let stack = tree.create(StackPanel::vertical().with_spacing(10.0));
        let kids: Vec<ControlId> = (0..3)
            .map(|_| {
                let c = fixed(&mut tree, Some(200.0), Some(50.0));
                tree.add_child(stack, c);
                c
            })
            .collect();

        let d = tree.measure(stack, Size::new(200.0, f64::INFINITY));
        assert_eq!(d.height, 190.0);
        tree.arrange(stack, Rect::new(0.0, 0.0, 200.0, 600.0));

        let tops: Vec<f64> = kids.iter().map(|&c| tree.arranged_rect(c).y0).collect();
        assert_eq!(tops, vec![0.0, 60.0, 120.0]);
        for &c in &kids {
            assert_eq!(tree.arranged_rect(c).size(), Size::new(200.0, 50.0));
        }
    }

    #[test]
    fn cross_axis_stretches_unless_explicit() {
        let mut tree = ControlTree::new();
        let stack = tree.create(StackPanel::horizontal().with_spacing(5.0));
        let a = fixed(&mut tree, Some(30.0), None);
        let b = fixed(&mut tree, Some(20.0), Some(10.0));
        tree.add_child(stack, a);
        tree.add_child(stack, b);
        tree.update_layout(stack, Size::new(100.0, 40.0));

        assert_eq!(tree.arranged_rect(a), Rect::new(0.0, 0.0, 30.0, 40.0));
        assert_eq!(tree.arranged_rect(b), Rect::new(35.0, 0.0, 55.0, 10.0));
    }

    #[test]
    fn collapsed_children_take_no_spacing() {
        let mut tree = ControlTree::new();
        let stack = tree.create(StackPanel::vertical().with_spacing(10.0));
        let a = fixed(&mut tree, None, Some(20.0));
        let hidden = fixed(&mut tree, None, Some(20.0));
        let b = fixed(&mut tree, None, Some(20.0));
        for c in [a, hidden, b] {
            tree.add_child(stack, c);
        }
        tree.hide(hidden);
        tree.update_layout(stack, Size::new(50.0, 200.0));
        assert_eq!(tree.arranged_rect(b).y0, 30.0);
        assert_eq!(tree.desired_size(stack).height, 50.0);
    }
}
