// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control events and typed observer slots.
//!
//! Widgets receive every [`ControlEvent`] through
//! [`Widget::on_event`](crate::widget::Widget::on_event). Code outside the
//! tree (application logic, a scripting bridge) observes the same events by
//! subscribing to an [`EventHub`] slot keyed by control and [`EventKind`].

use core::fmt;

use rustc_hash::FxHashMap;

use crate::input::{KeyEventArgs, MouseEventArgs};
use crate::tree::ControlId;

/// An event delivered to a control.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlEvent {
    /// A mouse button went down over the control.
    MouseDown(MouseEventArgs),
    /// A mouse button was released.
    MouseUp(MouseEventArgs),
    /// The pointer moved.
    MouseMove(MouseEventArgs),
    /// The wheel turned.
    MouseWheel(MouseEventArgs),
    /// The pointer entered the control.
    MouseEnter,
    /// The pointer left the control.
    MouseLeave,
    /// The control was clicked.
    Click,
    /// The control was clicked twice within the double-click thresholds.
    DoubleClick,
    /// The control gained keyboard focus.
    GotFocus,
    /// The control lost keyboard focus.
    LostFocus,
    /// A key went down.
    KeyDown(KeyEventArgs),
    /// A key was released.
    KeyUp(KeyEventArgs),
    /// A character was typed.
    Char(char),
    /// A value-bearing control changed its value.
    ValueChanged(f64),
}

impl ControlEvent {
    /// The discriminant used to key observer slots.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MouseDown(_) => EventKind::MouseDown,
            Self::MouseUp(_) => EventKind::MouseUp,
            Self::MouseMove(_) => EventKind::MouseMove,
            Self::MouseWheel(_) => EventKind::MouseWheel,
            Self::MouseEnter => EventKind::MouseEnter,
            Self::MouseLeave => EventKind::MouseLeave,
            Self::Click => EventKind::Click,
            Self::DoubleClick => EventKind::DoubleClick,
            Self::GotFocus => EventKind::GotFocus,
            Self::LostFocus => EventKind::LostFocus,
            Self::KeyDown(_) => EventKind::KeyDown,
            Self::KeyUp(_) => EventKind::KeyUp,
            Self::Char(_) => EventKind::Char,
            Self::ValueChanged(_) => EventKind::ValueChanged,
        }
    }

    /// Whether the event bubbles from the target to its ancestors until a
    /// widget handles it.
    #[must_use]
    pub fn bubbles(&self) -> bool {
        matches!(
            self,
            Self::MouseDown(_)
                | Self::MouseUp(_)
                | Self::MouseMove(_)
                | Self::MouseWheel(_)
                | Self::KeyDown(_)
                | Self::KeyUp(_)
                | Self::Char(_)
        )
    }
}

/// Fieldless mirror of [`ControlEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "variants mirror ControlEvent")]
pub enum EventKind {
    MouseDown,
    MouseUp,
    MouseMove,
    MouseWheel,
    MouseEnter,
    MouseLeave,
    Click,
    DoubleClick,
    GotFocus,
    LostFocus,
    KeyDown,
    KeyUp,
    Char,
    ValueChanged,
}

impl EventKind {
    /// Parses an event name such as `"Click"` or `"onClick"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_prefix("on").unwrap_or(name);
        Some(match name.to_ascii_lowercase().as_str() {
            "mousedown" => Self::MouseDown,
            "mouseup" => Self::MouseUp,
            "mousemove" => Self::MouseMove,
            "mousewheel" => Self::MouseWheel,
            "mouseenter" => Self::MouseEnter,
            "mouseleave" => Self::MouseLeave,
            "click" => Self::Click,
            "doubleclick" => Self::DoubleClick,
            "gotfocus" => Self::GotFocus,
            "lostfocus" => Self::LostFocus,
            "keydown" => Self::KeyDown,
            "keyup" => Self::KeyUp,
            "char" => Self::Char,
            "valuechanged" => Self::ValueChanged,
            _ => return None,
        })
    }
}

/// Handle returned by [`EventHub::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(ControlId, &ControlEvent)>;

/// Observer slots keyed by `(control, event kind)`.
#[derive(Default)]
pub struct EventHub {
    slots: FxHashMap<(ControlId, EventKind), Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("slots", &self.slots.len())
            .field("handlers", &self.handler_count())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl EventHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `kind` events on `id`.
    ///
    /// Handlers on the same slot run in subscription order.
    pub fn subscribe(
        &mut self,
        id: ControlId,
        kind: EventKind,
        handler: impl FnMut(ControlId, &ControlEvent) + 'static,
    ) -> HandlerId {
        let hid = HandlerId(self.next_id);
        self.next_id += 1;
        self.slots
            .entry((id, kind))
            .or_default()
            .push((hid, Box::new(handler)));
        hid
    }

    /// Removes a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, handler: HandlerId) -> bool {
        let mut found = false;
        self.slots.retain(|_, handlers| {
            let before = handlers.len();
            handlers.retain(|(hid, _)| *hid != handler);
            found |= handlers.len() != before;
            !handlers.is_empty()
        });
        found
    }

    /// Drops every handler registered for `id`.
    pub fn remove_control(&mut self, id: ControlId) {
        self.slots.retain(|(owner, _), _| *owner != id);
    }

    /// Runs the handlers subscribed to `event` on `id`. Returns how many ran.
    pub fn emit(&mut self, id: ControlId, event: &ControlEvent) -> usize {
        let Some(handlers) = self.slots.get_mut(&(id, event.kind())) else {
            return 0;
        };
        for (_, handler) in handlers.iter_mut() {
            handler(id, event);
        }
        handlers.len()
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::tree::ControlTree;
    use crate::widgets::Rectangle;

    #[test]
    fn handlers_fire_per_kind_and_control() {
        let mut tree = ControlTree::new();
        let a = tree.create(Rectangle::new());
        let b = tree.create(Rectangle::new());
        let mut hub = EventHub::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        hub.subscribe(a, EventKind::Click, move |id, ev| {
            l.borrow_mut().push((id, ev.clone()));
        });

        assert_eq!(hub.emit(a, &ControlEvent::Click), 1);
        assert_eq!(hub.emit(b, &ControlEvent::Click), 0, "other control");
        assert_eq!(hub.emit(a, &ControlEvent::MouseEnter), 0, "other kind");
        assert_eq!(log.borrow().as_slice(), &[(a, ControlEvent::Click)]);
    }

    #[test]
    fn unsubscribe_and_remove_control() {
        let mut tree = ControlTree::new();
        let a = tree.create(Rectangle::new());
        let mut hub = EventHub::new();
        let h1 = hub.subscribe(a, EventKind::Click, |_, _| {});
        hub.subscribe(a, EventKind::ValueChanged, |_, _| {});
        assert_eq!(hub.handler_count(), 2);
        assert!(hub.unsubscribe(h1));
        assert!(!hub.unsubscribe(h1), "already removed");
        hub.remove_control(a);
        assert_eq!(hub.handler_count(), 0);
    }

    #[test]
    fn event_names_parse() {
        assert_eq!(EventKind::from_name("onClick"), Some(EventKind::Click));
        assert_eq!(
            EventKind::from_name("ValueChanged"),
            Some(EventKind::ValueChanged)
        );
        assert_eq!(EventKind::from_name("onHover"), None);
    }
}
