// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use trellis_core::geometry::{Point, Rect, Size};

use super::{Orientation, parse_orientation};
use crate::properties::{format_length, parse_length};
use crate::tree::ControlId;
use crate::widget::{ArrangeCx, Invalidate, MeasureCx, Widget};

/// Flows children along a line, starting a new line when the next child
/// would overflow.
///
/// Each line is as thick as its thickest child. `item_width` and
/// `item_height` force a uniform slot size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WrapPanel {
    orientation: Orientation,
    item_width: Option<f64>,
    item_height: Option<f64>,
}

impl WrapPanel {
    /// A left-to-right wrap panel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            item_width: None,
            item_height: None,
        }
    }

    /// A top-to-bottom wrap panel.
    #[must_use]
    pub fn vertical() -> Self {
        Self {
            orientation: Orientation::Vertical,
            ..Self::new()
        }
    }

    /// Forces every slot to this size.
    #[must_use]
    pub fn with_item_size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.item_width = width;
        self.item_height = height;
        self
    }

    fn slot(&self, desired: Size) -> Size {
        Size::new(
            self.item_width.unwrap_or(desired.width),
            self.item_height.unwrap_or(desired.height),
        )
    }

    /// Breaks children into lines: each line lists its children with their
    /// slot sizes, plus the line's cross-axis thickness.
    fn lines(&self, items: &[(ControlId, Size)], limit: f64) -> Vec<(Vec<(ControlId, Size)>, f64)> {
        let o = self.orientation;
        let mut lines = Vec::new();
        let mut line: Vec<(ControlId, Size)> = Vec::new();
        let mut main = 0.0;
        let mut cross = 0.0_f64;
        for &(child, slot) in items {
            let (m, c) = o.split(slot);
            if !line.is_empty() && main + m > limit {
                lines.push((core::mem::take(&mut line), cross));
                main = 0.0;
                cross = 0.0;
            }
            line.push((child, slot));
            main += m;
            cross = cross.max(c);
        }
        if !line.is_empty() {
            lines.push((line, cross));
        }
        lines
    }
}

impl Widget for WrapPanel {
    fn type_name(&self) -> &'static str {
        "WrapPanel"
    }

    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, available: Size) -> Size {
        let o = self.orientation;
        let child_avail = Size::new(
            self.item_width.unwrap_or(available.width),
            self.item_height.unwrap_or(available.height),
        );
        let items: Vec<(ControlId, Size)> = cx
            .children()
            .into_iter()
            .map(|c| (c, self.slot(cx.measure_child(c, child_avail))))
            .collect();
        let (limit, _) = o.split(available);
        let lines = self.lines(&items, limit);

        let mut main = 0.0_f64;
        let mut cross = 0.0;
        for (line, thickness) in &lines {
            let len: f64 = line.iter().map(|&(_, s)| o.split(s).0).sum();
            main = main.max(len);
            cross += thickness;
        }
        o.join(main, cross)
    }

    fn arrange_override(&mut self, cx: &mut ArrangeCx<'_>, content: Rect) {
        let o = self.orientation;
        let items: Vec<(ControlId, Size)> = cx
            .children()
            .into_iter()
            .map(|c| (c, self.slot(cx.desired_size(c))))
            .collect();
        let (limit, _) = o.split(content.size());

        let mut cross_offset = 0.0;
        for (line, thickness) in self.lines(&items, limit) {
            let mut main_offset = 0.0;
            for (child, slot) in line {
                let (m, _) = o.split(slot);
                let origin = match o {
                    Orientation::Horizontal => {
                        Point::new(content.x0 + main_offset, content.y0 + cross_offset)
                    }
                    Orientation::Vertical => {
                        Point::new(content.x0 + cross_offset, content.y0 + main_offset)
                    }
                };
                cx.arrange_child(child, Rect::from_origin_size(origin, o.join(m, thickness)));
                main_offset += m;
            }
            cross_offset += thickness;
        }
    }

    fn get_property(&self, name: &str) -> Option<String> {
        Some(match name {
            "orientation" => self.orientation.name().to_owned(),
            "itemwidth" => format_length(self.item_width),
            "itemheight" => format_length(self.item_height),
            _ => return None,
        })
    }

    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        match name {
            "orientation" => self.orientation = parse_orientation(name, value),
            "itemwidth" => self.item_width = parse_length(name, value),
            "itemheight" => self.item_height = parse_length(name, value),
            _ => return None,
        }
        Some(Invalidate::Measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ControlTree;
    use crate::widgets::Rectangle;

    fn boxed(tree: &mut ControlTree, panel: ControlId, w: f64, h: f64) -> ControlId {
        let id = tree.create(Rectangle::new());
        tree.set_size(id, w, h);
        tree.add_child(panel, id);
        id
    }

    #[test]
    fn wraps_when_the_next_child_overflows() {
        let mut tree = ControlTree::new();
        let panel = tree.create(WrapPanel::new());
        let a = boxed(&mut tree, panel, 40.0, 10.0);
        let b = boxed(&mut tree, panel, 40.0, 20.0);
        let c = boxed(&mut tree, panel, 40.0, 15.0);
        tree.update_layout(panel, Size::new(100.0, 100.0));

        assert_eq!(tree.arranged_rect(a), Rect::new(0.0, 0.0, 40.0, 10.0));
        assert_eq!(tree.arranged_rect(b), Rect::new(40.0, 0.0, 80.0, 20.0));
        assert_eq!(tree.arranged_rect(c), Rect::new(0.0, 20.0, 40.0, 35.0), "second line below the thickest");
        assert_eq!(tree.desired_size(panel), Size::new(80.0, 35.0));
    }

    #[test]
    fn uniform_item_size() {
        let mut tree = ControlTree::new();
        let panel = tree.create(WrapPanel::vertical().with_item_size(Some(30.0), Some(30.0)));
        let a = boxed(&mut tree, panel, 10.0, 10.0);
        let b = boxed(&mut tree, panel, 10.0, 10.0);
        tree.update_layout(panel, Size::new(100.0, 50.0));

        assert_eq!(tree.arranged_rect(a).origin(), Point::new(0.0, 0.0));
        assert_eq!(tree.arranged_rect(b).origin(), Point::new(30.0, 0.0), "column wrapped");
    }
}
