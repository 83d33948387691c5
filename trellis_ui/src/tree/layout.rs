// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-pass measure/arrange layout.
//!
//! Layout follows a drain-recompute pattern: pending [`MEASURE`] and
//! [`ARRANGE`] marks are drained into per-control flags at the start of a
//! public entry point, then the recursive passes skip any control whose flag
//! is clean and whose constraint is unchanged.
//!
//! The base pass owns margin, padding, explicit size, and min/max clamping;
//! widgets only see the content box.
//!
//! [`MEASURE`]: trellis_core::dirty::MEASURE
//! [`ARRANGE`]: trellis_core::dirty::ARRANGE

use trellis_core::geometry::{Rect, Size, sanitize_length, sanitize_rect, sanitize_size};

use super::id::ControlId;
use super::props::Visibility;
use super::store::ControlTree;
use crate::widget::{ArrangeCx, MeasureCx};

impl ControlTree {
    /// Measures `id` against `available` and returns its desired size
    /// (margin included).
    ///
    /// Negative and NaN constraints are treated as zero; infinity means
    /// unconstrained. A repeated call with the same constraint and no
    /// intervening invalidation returns the cached size.
    pub fn measure(&mut self, id: ControlId, available: Size) -> Size {
        self.validate(id);
        self.sync_dirty();
        self.measure_node(id, available)
    }

    /// Places `id` into `rect` (margin included) and arranges its subtree.
    pub fn arrange(&mut self, id: ControlId, rect: Rect) {
        self.validate(id);
        self.sync_dirty();
        self.arrange_node(id, rect);
    }

    /// Measures `root` against `size` and arranges it at the origin.
    pub fn update_layout(&mut self, root: ControlId, size: Size) {
        self.validate(root);
        self.sync_dirty();
        let size = sanitize_size(size);
        self.measure_node(root, size);
        let w = if size.width.is_finite() {
            size.width
        } else {
            self.desired_size(root).width
        };
        let h = if size.height.is_finite() {
            size.height
        } else {
            self.desired_size(root).height
        };
        self.arrange_node(root, Rect::new(0.0, 0.0, w, h));
    }

    /// Desired size from the last measure (margin included).
    #[must_use]
    pub fn desired_size(&self, id: ControlId) -> Size {
        self.validate(id);
        self.desired[id.idx as usize]
    }

    /// Arranged rect from the last arrange (margin excluded), in window
    /// coordinates.
    #[must_use]
    pub fn arranged_rect(&self, id: ControlId) -> Rect {
        self.validate(id);
        self.arranged[id.idx as usize]
    }

    pub(crate) fn measure_node(&mut self, id: ControlId, available: Size) -> Size {
        let i = id.idx as usize;
        let available = sanitize_size(available);

        if self.props[i].visibility == Visibility::Collapsed {
            self.desired[i] = Size::ZERO;
            self.last_available[i] = Some(available);
            self.needs_measure[i] = false;
            return Size::ZERO;
        }
        if !self.needs_measure[i] && self.last_available[i] == Some(available) {
            return self.desired[i];
        }

        let props = &self.props[i];
        let margin = props.margin;
        let content_available = props.content_constraint(margin.deflate_size(available));

        let content = match self.take_widget(id) {
            Some(mut widget) => {
                let mut cx = MeasureCx { tree: self, id };
                let size = widget.measure_override(&mut cx, content_available);
                self.restore_widget(id, widget);
                sanitize_size(size)
            }
            None => {
                tracing::warn!(?id, "measure re-entered a control; skipping");
                Size::ZERO
            }
        };

        let props = &self.props[i];
        let boxed = props.constrain(props.padding.inflate_size(content));
        let mut desired = margin.inflate_size(boxed);
        if available.width.is_finite() {
            desired.width = desired.width.min(available.width);
        }
        if available.height.is_finite() {
            desired.height = desired.height.min(available.height);
        }
        let desired = Size::new(
            finite_or_zero(desired.width),
            finite_or_zero(desired.height),
        );

        if self.desired[i] != desired {
            // A new desired size can move this control inside its parent.
            self.needs_arrange[i] = true;
        }
        self.desired[i] = desired;
        self.last_available[i] = Some(available);
        self.needs_measure[i] = false;
        desired
    }

    pub(crate) fn arrange_node(&mut self, id: ControlId, rect: Rect) {
        let i = id.idx as usize;
        let rect = sanitize_rect(rect);

        if self.props[i].visibility == Visibility::Collapsed {
            self.arranged[i] = Rect::from_origin_size(rect.origin(), Size::ZERO);
            self.last_final[i] = Some(rect);
            self.needs_arrange[i] = false;
            return;
        }
        if !self.needs_arrange[i] && self.last_final[i] == Some(rect) {
            return;
        }

        let props = &self.props[i];
        let outer = props.margin.deflate_rect(rect);
        let size = props.constrain(outer.size());
        let arranged = Rect::from_origin_size(outer.origin(), size);
        let content = props.padding.deflate_rect(arranged);
        self.arranged[i] = arranged;

        match self.take_widget(id) {
            Some(mut widget) => {
                let mut cx = ArrangeCx { tree: self, id };
                widget.arrange_override(&mut cx, content);
                self.restore_widget(id, widget);
            }
            None => tracing::warn!(?id, "arrange re-entered a control; skipping"),
        }

        self.last_final[i] = Some(rect);
        self.needs_arrange[i] = false;
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { sanitize_length(v) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use trellis_core::geometry::Thickness;

    use super::*;
    use crate::panels::StackPanel;
    use crate::widgets::{Rectangle, TextBlock};

    fn fixed(tree: &mut ControlTree, w: f64, h: f64) -> ControlId {
        let id = tree.create(Rectangle::new());
        tree.update_props(id, |p| {
            p.width = Some(w);
            p.height = Some(h);
        });
        id
    }

    #[test]
    fn measure_is_idempotent() {
        let mut tree = ControlTree::new();
        let root = tree.create(StackPanel::vertical());
        let text = tree.create(TextBlock::new("hello world"));
        tree.add_child(root, text);
        let c = fixed(&mut tree, 30.0, 12.5);
        tree.add_child(root, c);

        let avail = Size::new(300.0, f64::INFINITY);
        let first = tree.measure(root, avail);
        let second = tree.measure(root, avail);
        assert_eq!(first.width.to_bits(), second.width.to_bits());
        assert_eq!(first.height.to_bits(), second.height.to_bits());
    }

    #[test]
    fn clean_measure_is_memoized() {
        let mut tree = ControlTree::new();
        let root = tree.create(StackPanel::vertical());
        let c = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(root, c);
        tree.measure(root, Size::new(100.0, 100.0));
        assert!(tree.is_measure_valid(root));
        assert!(tree.is_measure_valid(c));

        tree.invalidate_measure(c);
        assert!(!tree.is_measure_valid(root));
        tree.measure(root, Size::new(100.0, 100.0));
        assert!(tree.is_measure_valid(root));
    }

    #[test]
    fn margin_and_padding_wrap_content() {
        let mut tree = ControlTree::new();
        let root = tree.create(StackPanel::vertical());
        tree.update_props(root, |p| {
            p.margin = Thickness::uniform(5.0);
            p.padding = Thickness::new(1.0, 2.0, 3.0, 4.0);
        });
        let c = fixed(&mut tree, 20.0, 10.0);
        tree.add_child(root, c);

        let desired = tree.measure(root, Size::new(f64::INFINITY, f64::INFINITY));
        assert_eq!(desired, Size::new(20.0 + 4.0 + 10.0, 10.0 + 6.0 + 10.0));

        tree.arrange(root, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(tree.arranged_rect(root), Rect::new(5.0, 5.0, 95.0, 95.0));
        assert_eq!(tree.arranged_rect(c), Rect::new(6.0, 7.0, 26.0, 17.0));
    }

    #[test]
    fn malformed_constraints_are_clamped() {
        let mut tree = ControlTree::new();
        let c = fixed(&mut tree, 20.0, 10.0);
        let d = tree.measure(c, Size::new(f64::NAN, -5.0));
        assert_eq!(d, Size::ZERO);
        tree.arrange(c, Rect::new(10.0, 10.0, 0.0, f64::NAN));
        let r = tree.arranged_rect(c);
        assert!(r.width() >= 0.0 && r.height() >= 0.0);
    }

    #[test]
    fn desired_is_clamped_to_finite_available() {
        let mut tree = ControlTree::new();
        let c = fixed(&mut tree, 200.0, 50.0);
        assert_eq!(tree.measure(c, Size::new(100.0, 100.0)), Size::new(100.0, 50.0));
    }

    #[test]
    fn collapsed_takes_no_space() {
        let mut tree = ControlTree::new();
        let root = tree.create(StackPanel::vertical());
        let a = fixed(&mut tree, 10.0, 10.0);
        let b = fixed(&mut tree, 10.0, 10.0);
        tree.add_child(root, a);
        tree.add_child(root, b);
        tree.update_props(a, |p| p.visibility = Visibility::Collapsed);
        let d = tree.measure(root, Size::new(100.0, f64::INFINITY));
        assert_eq!(d.height, 10.0);
    }

    #[test]
    fn update_layout_fills_window() {
        let mut tree = ControlTree::new();
        let root = tree.create(StackPanel::vertical());
        tree.update_layout(root, Size::new(640.0, 480.0));
        assert_eq!(tree.arranged_rect(root), Rect::new(0.0, 0.0, 640.0, 480.0));
        assert!(tree.is_arrange_valid(root));
    }
}
