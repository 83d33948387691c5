// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout containers.
//!
//! Each panel is a [`Widget`](crate::widget::Widget) whose measure and
//! arrange overrides implement one placement strategy. Panels read their
//! children's attached properties (grid cell, canvas offsets, dock edge) from
//! [`ControlProps`](crate::tree::ControlProps).

mod canvas;
mod dock;
mod grid;
mod stack;
mod wrap;

pub use canvas::Canvas;
pub use dock::DockPanel;
pub use grid::{Grid, GridLength};
pub use stack::StackPanel;
pub use wrap::WrapPanel;

pub use crate::tree::Dock;

/// Primary axis of a flow panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    #[default]
    Vertical,
}

impl Orientation {
    /// Parses `"Horizontal"` or `"Vertical"` (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Horizontal => "Horizontal",
            Self::Vertical => "Vertical",
        }
    }

    /// `(main, cross)` components of a size along this axis.
    pub(crate) fn split(self, size: trellis_core::geometry::Size) -> (f64, f64) {
        match self {
            Self::Horizontal => (size.width, size.height),
            Self::Vertical => (size.height, size.width),
        }
    }

    /// Inverse of [`split`](Self::split).
    pub(crate) fn join(self, main: f64, cross: f64) -> trellis_core::geometry::Size {
        match self {
            Self::Horizontal => trellis_core::geometry::Size::new(main, cross),
            Self::Vertical => trellis_core::geometry::Size::new(cross, main),
        }
    }
}

pub(crate) fn parse_orientation(name: &str, value: &str) -> Orientation {
    Orientation::parse(value).unwrap_or_else(|| {
        tracing::debug!(name, value, "unknown orientation; using Vertical");
        Orientation::Vertical
    })
}
