// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The widget capability trait and the contexts handed to it.
//!
//! A [`Widget`] is the behavior half of a control: the tree owns topology and
//! [`ControlProps`], the widget owns whatever state its kind needs (text,
//! colors, panel settings) and overrides the layout, paint, and input hooks.
//!
//! Each hook receives a context scoped to one control:
//!
//! - [`MeasureCx`] / [`ArrangeCx`] give mutable access to the tree so a
//!   widget can measure and arrange its children.
//! - [`RenderCx`] wraps the render context in the control's local coordinate
//!   space together with the shared resource cache.
//! - [`EventCx`] records the side effects of input handling (capture,
//!   raised events, invalidation) for the host to apply afterwards.

use core::any::Any;
use core::fmt;

use trellis_core::color::Color;
use trellis_core::geometry::{Rect, Size};
use trellis_render::cache::ResourceCache;
use trellis_render::context::{RenderContext, measure_text_fixed};
use trellis_render::resource::{Brush, TextFormat};

use crate::events::ControlEvent;
use crate::tree::{ControlId, ControlProps, ControlTree};

/// How many children a widget accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentModel {
    /// No children.
    Leaf,
    /// At most one child (the content).
    Single,
    /// Any number of children.
    Many,
}

/// The layout work a widget-state change requires.
///
/// Ordered by cost, so the larger of two requests subsumes the smaller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Invalidate {
    /// Repaint only.
    Visual,
    /// Re-arrange (and repaint).
    Arrange,
    /// Re-measure (and re-arrange, and repaint).
    Measure,
}

/// Text metrics used during measure.
pub trait TextMeasurer: fmt::Debug {
    /// Size of a single line of `text` set in `family` at `size` points.
    fn measure(&self, text: &str, family: &str, size: f32) -> Size;
}

/// Fixed-advance text metrics matching the software backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedAdvanceMeasurer;

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, _family: &str, size: f32) -> Size {
        measure_text_fixed(text, size)
    }
}

/// Behavior of a control kind.
pub trait Widget: Any + fmt::Debug {
    /// Element name, e.g. `"StackPanel"`.
    fn type_name(&self) -> &'static str;

    /// How many children the widget accepts.
    fn content_model(&self) -> ContentModel {
        ContentModel::Many
    }

    /// Whether new controls of this kind take keyboard focus.
    fn focusable(&self) -> bool {
        false
    }

    /// Desired content size given at most `available` (padding already
    /// removed). The default is the maximum over all children measured with
    /// the same constraint.
    fn measure_override(&mut self, cx: &mut MeasureCx<'_>, available: Size) -> Size {
        let mut size = Size::ZERO;
        for child in cx.children() {
            let desired = cx.measure_child(child, available);
            size.width = size.width.max(desired.width);
            size.height = size.height.max(desired.height);
        }
        size
    }

    /// Positions children inside `content` (the arranged rect less padding).
    /// The default gives every child the full content rect.
    fn arrange_override(&mut self, cx: &mut ArrangeCx<'_>, content: Rect) {
        for child in cx.children() {
            cx.arrange_child(child, content);
        }
    }

    /// Draws the widget in local coordinates; `(0, 0)` is the top-left corner
    /// of the arranged rect. Children are drawn afterwards by the tree.
    fn render(&self, cx: &mut RenderCx<'_>) {
        let _ = cx;
    }

    /// Reacts to an event targeted at this control.
    fn on_event(&mut self, cx: &mut EventCx<'_>, event: &ControlEvent) {
        let _ = (cx, event);
    }

    /// Reads a widget-specific property by lower-case name.
    fn get_property(&self, name: &str) -> Option<String> {
        let _ = name;
        None
    }

    /// Writes a widget-specific property by lower-case name.
    ///
    /// Returns `None` if the name is not recognized, otherwise the layout
    /// work the change requires. Unparseable values fall back to the
    /// property's default.
    fn set_property(&mut self, name: &str, value: &str) -> Option<Invalidate> {
        let _ = (name, value);
        None
    }
}

impl dyn Widget {
    /// Downcasts to a concrete widget type.
    #[must_use]
    pub fn downcast_ref<W: Widget>(&self) -> Option<&W> {
        (self as &dyn Any).downcast_ref::<W>()
    }

    /// Mutably downcasts to a concrete widget type.
    #[must_use]
    pub fn downcast_mut<W: Widget>(&mut self) -> Option<&mut W> {
        (self as &mut dyn Any).downcast_mut::<W>()
    }
}

/// Context for [`Widget::measure_override`].
#[derive(Debug)]
pub struct MeasureCx<'a> {
    pub(crate) tree: &'a mut ControlTree,
    pub(crate) id: ControlId,
}

impl MeasureCx<'_> {
    /// The control being measured.
    #[must_use]
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// The control's base properties.
    #[must_use]
    pub fn props(&self) -> &ControlProps {
        self.tree.props(self.id)
    }

    /// The control's children in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<ControlId> {
        self.tree.children(self.id).collect()
    }

    /// A child's base properties.
    #[must_use]
    pub fn child_props(&self, child: ControlId) -> &ControlProps {
        self.tree.props(child)
    }

    /// Measures a child, returning its desired size (margin included).
    pub fn measure_child(&mut self, child: ControlId, available: Size) -> Size {
        debug_assert_eq!(
            self.tree.parent(child),
            Some(self.id),
            "measuring a control that is not a child"
        );
        self.tree.measure_node(child, available)
    }

    /// Measures one line of text with the tree's text measurer.
    #[must_use]
    pub fn measure_text(&self, text: &str, family: &str, size: f32) -> Size {
        self.tree.text_measurer().measure(text, family, size)
    }
}

/// Context for [`Widget::arrange_override`].
#[derive(Debug)]
pub struct ArrangeCx<'a> {
    pub(crate) tree: &'a mut ControlTree,
    pub(crate) id: ControlId,
}

impl ArrangeCx<'_> {
    /// The control being arranged.
    #[must_use]
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// The control's base properties.
    #[must_use]
    pub fn props(&self) -> &ControlProps {
        self.tree.props(self.id)
    }

    /// The control's children in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<ControlId> {
        self.tree.children(self.id).collect()
    }

    /// A child's base properties.
    #[must_use]
    pub fn child_props(&self, child: ControlId) -> &ControlProps {
        self.tree.props(child)
    }

    /// A child's desired size from the last measure pass.
    #[must_use]
    pub fn desired_size(&self, child: ControlId) -> Size {
        self.tree.desired_size(child)
    }

    /// Arranges a child into `rect` (margin included).
    pub fn arrange_child(&mut self, child: ControlId, rect: Rect) {
        debug_assert_eq!(
            self.tree.parent(child),
            Some(self.id),
            "arranging a control that is not a child"
        );
        self.tree.arrange_node(child, rect);
    }
}

/// Context for [`Widget::render`].
pub struct RenderCx<'a> {
    pub(crate) ctx: &'a mut dyn RenderContext,
    pub(crate) cache: &'a mut ResourceCache,
    pub(crate) props: &'a ControlProps,
    pub(crate) size: Size,
}

impl fmt::Debug for RenderCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCx")
            .field("cache", &self.cache)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderCx<'a> {
    /// The underlying render context, already translated to local space.
    pub fn ctx(&mut self) -> &mut dyn RenderContext {
        &mut *self.ctx
    }

    /// The control's base properties.
    #[must_use]
    pub fn props(&self) -> &'a ControlProps {
        self.props
    }

    /// The control's arranged size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// The control's bounds in local coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.size.to_rect()
    }

    /// A cached solid brush.
    pub fn brush(&mut self, color: Color) -> Option<Brush> {
        self.cache.solid_color_brush(&mut *self.ctx, color)
    }

    /// A cached text format.
    pub fn text_format(&mut self, family: &str, size: f32) -> Option<TextFormat> {
        self.cache.text_format(&mut *self.ctx, family, size)
    }
}

/// Context for [`Widget::on_event`].
#[derive(Debug)]
pub struct EventCx<'a> {
    pub(crate) id: ControlId,
    pub(crate) rect: Rect,
    pub(crate) props: &'a ControlProps,
    pub(crate) has_capture: bool,
    pub(crate) is_focused: bool,
    pub(crate) handled: bool,
    pub(crate) capture: Option<bool>,
    pub(crate) raised: Vec<ControlEvent>,
    pub(crate) invalidate: Option<Invalidate>,
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(
        id: ControlId,
        rect: Rect,
        props: &'a ControlProps,
        has_capture: bool,
        is_focused: bool,
    ) -> Self {
        Self {
            id,
            rect,
            props,
            has_capture,
            is_focused,
            handled: false,
            capture: None,
            raised: Vec::new(),
            invalidate: None,
        }
    }

    /// The control receiving the event.
    #[must_use]
    pub fn id(&self) -> ControlId {
        self.id
    }

    /// The control's arranged rect in window coordinates.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The control's base properties.
    #[must_use]
    pub fn props(&self) -> &ControlProps {
        self.props
    }

    /// Whether this control currently holds mouse capture.
    #[must_use]
    pub fn has_capture(&self) -> bool {
        self.has_capture
    }

    /// Whether this control has keyboard focus.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    /// Stops a bubbling event from reaching ancestors.
    pub fn set_handled(&mut self) {
        self.handled = true;
    }

    /// Whether the event has been handled.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Routes all mouse input to this control until released.
    pub fn capture_mouse(&mut self) {
        self.capture = Some(true);
        self.has_capture = true;
    }

    /// Releases mouse capture if this control holds it.
    pub fn release_capture(&mut self) {
        self.capture = Some(false);
        self.has_capture = false;
    }

    /// Queues an event for this control's observers.
    pub fn raise(&mut self, event: ControlEvent) {
        self.raised.push(event);
    }

    /// Requests layout or paint work.
    pub fn invalidate(&mut self, what: Invalidate) {
        self.invalidate = Some(self.invalidate.map_or(what, |w| w.max(what)));
    }
}
