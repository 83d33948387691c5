// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! String-keyed property access.
//!
//! This is the surface a declarative document or a scripting bridge uses:
//! every base property and every widget property can be read and written by
//! name. Names are matched case-insensitively. Values that fail to parse fall
//! back to the property's default and are logged at `debug` level, so a
//! malformed attribute never aborts materialization.

use core::fmt::Display;
use core::str::FromStr;

use thiserror::Error;

use trellis_core::color::Color;
use trellis_core::geometry::{CornerRadius, Thickness};

use crate::tree::{ControlId, ControlTree, Dock, Visibility};

/// Failure of a string property access.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    /// Neither the base properties nor the widget know the name.
    #[error("{type_name} has no property named `{name}`")]
    Unknown {
        /// Requested property name.
        name: String,
        /// Element name of the control.
        type_name: &'static str,
    },
}

fn fallback<T: core::fmt::Debug>(name: &str, value: &str, default: T) -> T {
    tracing::debug!(name, value, ?default, "unparseable property value; using default");
    default
}

/// Parses a number, falling back to `default`.
pub(crate) fn parse_number<T>(name: &str, value: &str, default: T) -> T
where
    T: FromStr + core::fmt::Debug,
{
    value
        .trim()
        .parse()
        .unwrap_or_else(|_| fallback(name, value, default))
}

/// Parses an optional length; `auto`, empty, and unparseable values are
/// `None`.
pub(crate) fn parse_length(name: &str, value: &str) -> Option<f64> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("auto") {
        return None;
    }
    match v.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
        _ => fallback(name, value, None),
    }
}

/// Parses `true`/`false`/`1`/`0`, falling back to `default`.
pub(crate) fn parse_bool(name: &str, value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => fallback(name, value, default),
    }
}

/// Parses a color, falling back to `default`.
pub(crate) fn parse_color(name: &str, value: &str, default: Color) -> Color {
    Color::parse(value).unwrap_or_else(|| fallback(name, value, default))
}

/// Parses an optional color; `none`, `transparent`, and empty clear it.
pub(crate) fn parse_optional_color(name: &str, value: &str) -> Option<Color> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("none") {
        return None;
    }
    Color::parse(v).or_else(|| fallback(name, value, None))
}

/// Parses a thickness, falling back to zero.
pub(crate) fn parse_thickness(name: &str, value: &str) -> Thickness {
    Thickness::parse(value).unwrap_or_else(|| fallback(name, value, Thickness::ZERO))
}

/// Parses corner radii, falling back to zero.
pub(crate) fn parse_corner_radius(name: &str, value: &str) -> CornerRadius {
    CornerRadius::parse(value).unwrap_or_else(|| fallback(name, value, CornerRadius::default()))
}

pub(crate) fn format_length(v: Option<f64>) -> String {
    v.map_or_else(|| "auto".to_owned(), |v| v.to_string())
}

pub(crate) fn format_thickness(t: Thickness) -> String {
    format!("{},{},{},{}", t.left, t.top, t.right, t.bottom)
}

pub(crate) fn format_optional<T: Display>(v: Option<T>) -> String {
    v.map_or_else(String::new, |v| v.to_string())
}

fn parse_visibility(name: &str, value: &str) -> Visibility {
    match value.trim().to_ascii_lowercase().as_str() {
        "visible" => Visibility::Visible,
        "hidden" => Visibility::Hidden,
        "collapsed" => Visibility::Collapsed,
        _ => fallback(name, value, Visibility::Visible),
    }
}

fn parse_dock(name: &str, value: &str) -> Dock {
    match value.trim().to_ascii_lowercase().as_str() {
        "left" => Dock::Left,
        "top" => Dock::Top,
        "right" => Dock::Right,
        "bottom" => Dock::Bottom,
        _ => fallback(name, value, Dock::Left),
    }
}

fn dock_name(dock: Dock) -> &'static str {
    match dock {
        Dock::Left => "Left",
        Dock::Top => "Top",
        Dock::Right => "Right",
        Dock::Bottom => "Bottom",
    }
}

fn visibility_name(v: Visibility) -> &'static str {
    match v {
        Visibility::Visible => "Visible",
        Visibility::Hidden => "Hidden",
        Visibility::Collapsed => "Collapsed",
    }
}

impl ControlTree {
    /// Reads a property by name.
    ///
    /// Base properties are consulted first, then the widget's own.
    #[must_use]
    pub fn get_property(&self, id: ControlId, name: &str) -> Option<String> {
        let key = name.to_ascii_lowercase();
        let p = self.props(id);
        let base = match key.as_str() {
            "name" | "id" => p.name.clone(),
            "width" => format_length(p.width),
            "height" => format_length(p.height),
            "minwidth" => p.min_width.to_string(),
            "minheight" => p.min_height.to_string(),
            "maxwidth" => p.max_width.to_string(),
            "maxheight" => p.max_height.to_string(),
            "margin" => format_thickness(p.margin),
            "padding" => format_thickness(p.padding),
            "visible" => (p.visibility == Visibility::Visible).to_string(),
            "visibility" => visibility_name(p.visibility).to_owned(),
            "enabled" => p.enabled.to_string(),
            "focusable" => p.focusable.to_string(),
            "hittestvisible" => p.hit_test_visible.to_string(),
            "opacity" => p.opacity.to_string(),
            "cliptobounds" => p.clip_to_bounds.to_string(),
            "grid.row" => p.grid_row.to_string(),
            "grid.column" => p.grid_column.to_string(),
            "grid.rowspan" => p.grid_row_span.to_string(),
            "grid.columnspan" => p.grid_column_span.to_string(),
            "dockpanel.dock" | "dock" => dock_name(p.dock).to_owned(),
            "canvas.left" | "x" => format_optional(p.canvas_left),
            "canvas.top" | "y" => format_optional(p.canvas_top),
            _ => return self.widget_dyn(id).get_property(&key),
        };
        Some(base)
    }

    /// Writes a property by name.
    ///
    /// Unparseable values fall back to the property's default. Returns an
    /// error only when no base or widget property has this name.
    pub fn set_property(&mut self, id: ControlId, name: &str, value: &str) -> Result<(), PropertyError> {
        let key = name.to_ascii_lowercase();
        if self.set_base_property(id, &key, value) {
            return Ok(());
        }
        let changed = self.widgets[id.idx as usize]
            .as_deref_mut()
            .and_then(|w| w.set_property(&key, value));
        match changed {
            Some(what) => {
                self.invalidate(id, what);
                Ok(())
            }
            None => Err(PropertyError::Unknown {
                name: name.to_owned(),
                type_name: self.type_name(id),
            }),
        }
    }

    fn set_base_property(&mut self, id: ControlId, key: &str, value: &str) -> bool {
        let v = value;
        match key {
            "name" | "id" => self.update_props(id, |p| p.name = v.to_owned()),
            "width" => self.update_props(id, |p| p.width = parse_length(key, v)),
            "height" => self.update_props(id, |p| p.height = parse_length(key, v)),
            "minwidth" => self.update_props(id, |p| p.min_width = parse_number(key, v, 0.0)),
            "minheight" => self.update_props(id, |p| p.min_height = parse_number(key, v, 0.0)),
            "maxwidth" => {
                self.update_props(id, |p| p.max_width = parse_number(key, v, f64::INFINITY));
            }
            "maxheight" => {
                self.update_props(id, |p| p.max_height = parse_number(key, v, f64::INFINITY));
            }
            "margin" => self.update_props(id, |p| p.margin = parse_thickness(key, v)),
            "padding" => self.update_props(id, |p| p.padding = parse_thickness(key, v)),
            "visible" => {
                let visible = parse_bool(key, v, true);
                self.update_props(id, |p| {
                    p.visibility = if visible {
                        Visibility::Visible
                    } else {
                        Visibility::Collapsed
                    };
                });
            }
            "visibility" => self.update_props(id, |p| p.visibility = parse_visibility(key, v)),
            "enabled" => self.update_props(id, |p| p.enabled = parse_bool(key, v, true)),
            "focusable" => self.update_props(id, |p| p.focusable = parse_bool(key, v, false)),
            "hittestvisible" => {
                self.update_props(id, |p| p.hit_test_visible = parse_bool(key, v, true));
            }
            "opacity" => self.update_props(id, |p| {
                p.opacity = parse_number(key, v, 1.0_f32).clamp(0.0, 1.0);
            }),
            "cliptobounds" => self.update_props(id, |p| p.clip_to_bounds = parse_bool(key, v, false)),
            "grid.row" => self.update_props(id, |p| p.grid_row = parse_number(key, v, 0)),
            "grid.column" => self.update_props(id, |p| p.grid_column = parse_number(key, v, 0)),
            "grid.rowspan" => {
                self.update_props(id, |p| p.grid_row_span = parse_number(key, v, 1).max(1));
            }
            "grid.columnspan" => {
                self.update_props(id, |p| p.grid_column_span = parse_number(key, v, 1).max(1));
            }
            "dockpanel.dock" | "dock" => self.update_props(id, |p| p.dock = parse_dock(key, v)),
            "canvas.left" | "x" => {
                self.update_props(id, |p| p.canvas_left = Some(parse_number(key, v, 0.0)));
            }
            "canvas.top" | "y" => {
                self.update_props(id, |p| p.canvas_top = Some(parse_number(key, v, 0.0)));
            }
            _ => return false,
        }
        true
    }

    /// Makes the control visible.
    pub fn show(&mut self, id: ControlId) {
        self.update_props(id, |p| p.visibility = Visibility::Visible);
    }

    /// Collapses the control.
    pub fn hide(&mut self, id: ControlId) {
        self.update_props(id, |p| p.visibility = Visibility::Collapsed);
    }

    /// Enables input on the control.
    pub fn enable(&mut self, id: ControlId) {
        self.update_props(id, |p| p.enabled = true);
    }

    /// Disables input on the control and its subtree.
    pub fn disable(&mut self, id: ControlId) {
        self.update_props(id, |p| p.enabled = false);
    }

    /// Whether the control and every ancestor are enabled.
    #[must_use]
    pub fn is_effectively_enabled(&self, id: ControlId) -> bool {
        self.props(id).enabled && self.ancestors(id).iter().all(|&a| self.props(a).enabled)
    }

    /// Sets the canvas offsets.
    pub fn set_position(&mut self, id: ControlId, x: f64, y: f64) {
        self.update_props(id, |p| {
            p.canvas_left = Some(x);
            p.canvas_top = Some(y);
        });
    }

    /// Sets the explicit size.
    pub fn set_size(&mut self, id: ControlId, width: f64, height: f64) {
        self.update_props(id, |p| {
            p.width = Some(width);
            p.height = Some(height);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Button, TextBlock};

    #[test]
    fn base_properties_round_trip_by_name() {
        let mut tree = ControlTree::new();
        let id = tree.create(TextBlock::new("x"));
        tree.set_property(id, "Width", "120").unwrap();
        tree.set_property(id, "Grid.Row", "2").unwrap();
        tree.set_property(id, "DockPanel.Dock", "top").unwrap();
        tree.set_property(id, "margin", "1,2").unwrap();

        assert_eq!(tree.props(id).width, Some(120.0));
        assert_eq!(tree.props(id).grid_row, 2);
        assert_eq!(tree.props(id).dock, Dock::Top);
        assert_eq!(tree.props(id).margin, Thickness::new(1.0, 2.0, 1.0, 2.0));
        assert_eq!(tree.get_property(id, "width").as_deref(), Some("120"));
        assert_eq!(tree.get_property(id, "dock").as_deref(), Some("Top"));
    }

    #[test]
    fn malformed_values_use_defaults() {
        let mut tree = ControlTree::new();
        let id = tree.create(TextBlock::new("x"));
        tree.set_size(id, 10.0, 10.0);
        tree.set_property(id, "width", "wide").unwrap();
        tree.set_property(id, "opacity", "lots").unwrap();
        tree.set_property(id, "enabled", "maybe").unwrap();
        assert_eq!(tree.props(id).width, None, "auto");
        assert_eq!(tree.props(id).opacity, 1.0);
        assert!(tree.props(id).enabled);
    }

    #[test]
    fn widget_properties_are_forwarded() {
        let mut tree = ControlTree::new();
        let id = tree.create(TextBlock::new("x"));
        tree.set_property(id, "Text", "hello").unwrap();
        assert_eq!(tree.get_property(id, "text").as_deref(), Some("hello"));
    }

    #[test]
    fn unknown_property_is_an_error() {
        let mut tree = ControlTree::new();
        let id = tree.create(Button::new());
        let err = tree.set_property(id, "flavor", "vanilla").unwrap_err();
        assert_eq!(
            err,
            PropertyError::Unknown {
                name: "flavor".into(),
                type_name: "Button"
            }
        );
        assert!(tree.get_property(id, "flavor").is_none());
    }

    #[test]
    fn show_hide_and_enablement() {
        let mut tree = ControlTree::new();
        let parent = tree.create(crate::panels::StackPanel::vertical());
        let child = tree.create(Button::new());
        tree.add_child(parent, child);

        tree.hide(child);
        assert_eq!(tree.props(child).visibility, Visibility::Collapsed);
        tree.show(child);
        assert_eq!(tree.get_property(child, "visible").as_deref(), Some("true"));

        tree.disable(parent);
        assert!(tree.props(child).enabled);
        assert!(!tree.is_effectively_enabled(child));
        tree.enable(parent);
        assert!(tree.is_effectively_enabled(child));
    }

    #[test]
    fn set_position_writes_canvas_offsets() {
        let mut tree = ControlTree::new();
        let id = tree.create(Button::new());
        tree.set_position(id, 4.0, 8.0);
        assert_eq!(tree.get_property(id, "Canvas.Left").as_deref(), Some("4"));
        assert_eq!(tree.get_property(id, "y").as_deref(), Some("8"));
    }
}
