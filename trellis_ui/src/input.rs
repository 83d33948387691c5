// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input records forwarded by the window host.

use trellis_core::geometry::Point;

/// A mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

/// Keyboard modifier state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift is held.
    pub shift: bool,
    /// Control is held.
    pub ctrl: bool,
    /// Alt is held.
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

/// A mouse event in window client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEventArgs {
    /// Pointer position.
    pub position: Point,
    /// Button that changed state, if any.
    pub button: Option<MouseButton>,
    /// Event timestamp in milliseconds, used for double-click detection.
    pub time_ms: f64,
    /// Wheel rotation in notches; positive is away from the user.
    pub wheel_delta: f64,
    /// Modifier state.
    pub modifiers: Modifiers,
}

impl MouseEventArgs {
    /// A move event at `position`.
    #[must_use]
    pub fn at(position: impl Into<Point>, time_ms: f64) -> Self {
        Self {
            position: position.into(),
            button: None,
            time_ms,
            wheel_delta: 0.0,
            modifiers: Modifiers::NONE,
        }
    }

    /// A button event at `position`.
    #[must_use]
    pub fn button(position: impl Into<Point>, button: MouseButton, time_ms: f64) -> Self {
        Self {
            button: Some(button),
            ..Self::at(position, time_ms)
        }
    }

    /// A wheel event at `position`.
    #[must_use]
    pub fn wheel(position: impl Into<Point>, delta: f64, time_ms: f64) -> Self {
        Self {
            wheel_delta: delta,
            ..Self::at(position, time_ms)
        }
    }
}

/// A logical key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Tab.
    Tab,
    /// Enter / Return.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Any other key, by virtual-key code.
    Other(u32),
}

impl Key {
    /// Maps a Windows virtual-key code.
    #[must_use]
    pub fn from_virtual_key(vk: u32) -> Self {
        match vk {
            0x08 => Self::Backspace,
            0x09 => Self::Tab,
            0x0D => Self::Enter,
            0x1B => Self::Escape,
            0x20 => Self::Space,
            0x23 => Self::End,
            0x24 => Self::Home,
            0x25 => Self::Left,
            0x26 => Self::Up,
            0x27 => Self::Right,
            0x28 => Self::Down,
            0x2E => Self::Delete,
            other => Self::Other(other),
        }
    }
}

/// A keyboard event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEventArgs {
    /// The key.
    pub key: Key,
    /// Modifier state.
    pub modifiers: Modifiers,
    /// Whether this is an auto-repeat.
    pub repeat: bool,
}

impl KeyEventArgs {
    /// A non-repeating press of `key`.
    #[must_use]
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            repeat: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_keys_map() {
        assert_eq!(Key::from_virtual_key(0x09), Key::Tab);
        assert_eq!(Key::from_virtual_key(0x27), Key::Right);
        assert_eq!(Key::from_virtual_key(0x41), Key::Other(0x41));
    }
}
