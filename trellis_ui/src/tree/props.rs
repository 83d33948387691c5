// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-control base properties.

use trellis_core::geometry::{Size, Thickness, sanitize_length};

/// Whether a control is drawn and whether it takes up layout space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Drawn and laid out.
    #[default]
    Visible,
    /// Laid out but not drawn or hit-tested.
    Hidden,
    /// Neither drawn nor laid out; desired size is zero.
    Collapsed,
}

/// Edge a child docks to inside a [`DockPanel`](crate::panels::DockPanel).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dock {
    /// Left edge.
    #[default]
    Left,
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
}

/// Base properties shared by every control.
///
/// Includes the attached properties that parent panels read (grid cell,
/// canvas offsets, dock edge). A panel ignores the attached properties that
/// belong to other panel kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlProps {
    /// Lookup name; empty when unnamed.
    pub name: String,
    /// Explicit width, or `None` for automatic.
    pub width: Option<f64>,
    /// Explicit height, or `None` for automatic.
    pub height: Option<f64>,
    /// Lower width bound.
    pub min_width: f64,
    /// Lower height bound.
    pub min_height: f64,
    /// Upper width bound.
    pub max_width: f64,
    /// Upper height bound.
    pub max_height: f64,
    /// Space outside the control's box.
    pub margin: Thickness,
    /// Space between the control's box and its content.
    pub padding: Thickness,
    /// Draw/layout participation.
    pub visibility: Visibility,
    /// Whether the control receives input.
    pub enabled: bool,
    /// Whether the control takes part in keyboard focus.
    pub focusable: bool,
    /// Whether hit testing can return this control.
    pub hit_test_visible: bool,
    /// Group opacity in `[0, 1]`.
    pub opacity: f32,
    /// Clip content and children to the control's bounds.
    pub clip_to_bounds: bool,

    /// Grid row.
    pub grid_row: usize,
    /// Grid column.
    pub grid_column: usize,
    /// Number of grid rows spanned (at least one).
    pub grid_row_span: usize,
    /// Number of grid columns spanned (at least one).
    pub grid_column_span: usize,
    /// Canvas left offset.
    pub canvas_left: Option<f64>,
    /// Canvas top offset.
    pub canvas_top: Option<f64>,
    /// Dock edge.
    pub dock: Dock,
}

impl Default for ControlProps {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: None,
            height: None,
            min_width: 0.0,
            min_height: 0.0,
            max_width: f64::INFINITY,
            max_height: f64::INFINITY,
            margin: Thickness::ZERO,
            padding: Thickness::ZERO,
            visibility: Visibility::Visible,
            enabled: true,
            focusable: false,
            hit_test_visible: true,
            opacity: 1.0,
            clip_to_bounds: false,
            grid_row: 0,
            grid_column: 0,
            grid_row_span: 1,
            grid_column_span: 1,
            canvas_left: None,
            canvas_top: None,
            dock: Dock::Left,
        }
    }
}

impl ControlProps {
    /// Resolves the width bounds as `(min, max)` with `max >= min`.
    fn width_bounds(&self) -> (f64, f64) {
        let min = sanitize_length(self.min_width);
        let max = if self.max_width.is_nan() {
            f64::INFINITY
        } else {
            self.max_width
        };
        (min, max.max(min))
    }

    fn height_bounds(&self) -> (f64, f64) {
        let min = sanitize_length(self.min_height);
        let max = if self.max_height.is_nan() {
            f64::INFINITY
        } else {
            self.max_height
        };
        (min, max.max(min))
    }

    /// Applies explicit size and min/max bounds to a box size (margin
    /// excluded).
    #[must_use]
    pub fn constrain(&self, size: Size) -> Size {
        let (min_w, max_w) = self.width_bounds();
        let (min_h, max_h) = self.height_bounds();
        let w = self.width.map_or(size.width, sanitize_length);
        let h = self.height.map_or(size.height, sanitize_length);
        Size::new(
            sanitize_length(w).clamp(min_w, max_w),
            sanitize_length(h).clamp(min_h, max_h),
        )
    }

    /// The space offered to a control's content when `available` is offered
    /// to its box (margin excluded).
    #[must_use]
    pub fn content_constraint(&self, available: Size) -> Size {
        let (min_w, max_w) = self.width_bounds();
        let (min_h, max_h) = self.height_bounds();
        let w = self
            .width
            .map_or(available.width, sanitize_length)
            .clamp(min_w, max_w);
        let h = self
            .height
            .map_or(available.height, sanitize_length)
            .clamp(min_h, max_h);
        self.padding.deflate_size(Size::new(w, h))
    }

    /// Whether a change from `self` to `other` can alter layout.
    #[must_use]
    pub fn layout_differs(&self, other: &Self) -> bool {
        self.width != other.width
            || self.height != other.height
            || self.min_width != other.min_width
            || self.min_height != other.min_height
            || self.max_width != other.max_width
            || self.max_height != other.max_height
            || self.margin != other.margin
            || self.padding != other.padding
            || (self.visibility == Visibility::Collapsed)
                != (other.visibility == Visibility::Collapsed)
            || self.grid_row != other.grid_row
            || self.grid_column != other.grid_column
            || self.grid_row_span != other.grid_row_span
            || self.grid_column_span != other.grid_column_span
            || self.canvas_left != other.canvas_left
            || self.canvas_top != other.canvas_top
            || self.dock != other.dock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_size_wins_over_content() {
        let props = ControlProps {
            width: Some(50.0),
            ..ControlProps::default()
        };
        assert_eq!(props.constrain(Size::new(200.0, 10.0)), Size::new(50.0, 10.0));
    }

    #[test]
    fn min_beats_max() {
        let props = ControlProps {
            min_width: 40.0,
            max_width: 20.0,
            ..ControlProps::default()
        };
        assert_eq!(props.constrain(Size::new(10.0, 0.0)).width, 40.0);
    }

    #[test]
    fn content_constraint_removes_padding() {
        let props = ControlProps {
            padding: Thickness::uniform(5.0),
            height: Some(30.0),
            ..ControlProps::default()
        };
        let c = props.content_constraint(Size::new(100.0, f64::INFINITY));
        assert_eq!(c, Size::new(90.0, 20.0));
    }

    #[test]
    fn hidden_does_not_affect_layout() {
        let a = ControlProps::default();
        let b = ControlProps {
            visibility: Visibility::Hidden,
            opacity: 0.5,
            ..ControlProps::default()
        };
        assert!(!a.layout_differs(&b));
        let c = ControlProps {
            visibility: Visibility::Collapsed,
            ..ControlProps::default()
        };
        assert!(a.layout_differs(&c));
    }
}
