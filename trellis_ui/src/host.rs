// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window host: input routing and the per-frame pipeline.
//!
//! A [`WindowHost`] owns everything one window needs: the control tree and
//! its root, the render engine, the shared resource cache, the animation
//! timeline, and the event hub observers subscribe through. The platform
//! layer forwards raw input and calls [`WindowHost::frame`] once per vsync.
//!
//! # Frame order
//!
//! ```text
//!   frame(dt)
//!     │
//!     ├─► Timeline::update(dt) ──► queued property writes applied
//!     ├─► update_layout(root, window size)
//!     ├─► begin_frame ──► clear ──► render(root) ──► present
//!     └─► drain visual changes into the report
//! ```
//!
//! # Input routing
//!
//! Mouse input is hit-tested against the root unless a control holds
//! capture, in which case the captured control receives every mouse event.
//! Bubbling events walk from the target up its ancestors until a widget
//! marks them handled. Keyboard input goes to the focused control, or the
//! root when nothing is focused. Disabled controls receive nothing.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_core::animation::{Animatable, Animation, AnimationConfig};
use trellis_core::color::Color;
use trellis_core::geometry::{Point, Size};
use trellis_core::timeline::{AnimationId, Timeline};
use trellis_render::cache::ResourceCache;
use trellis_render::context::RenderContext;
use trellis_render::engine::{
    Backend, EngineError, GraphicsApi, PresentStatus, RenderEngine, TargetDesc, WindowHandle,
};

use crate::events::{ControlEvent, EventHub};
use crate::input::{Key, KeyEventArgs, MouseEventArgs};
use crate::tree::{ControlId, ControlTree, Visibility};
use crate::widget::EventCx;

/// Host behavior settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostConfig {
    /// Longest gap between two clicks that still counts as a double-click.
    pub double_click_time_ms: f64,
    /// Farthest the pointer may travel between the two clicks.
    pub double_click_distance: f64,
    /// Color the window is cleared to each frame.
    pub background: Color,
    /// Preferred graphics API. Software and WARP are tried if it fails.
    pub api: GraphicsApi,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            double_click_time_ms: 500.0,
            double_click_distance: 4.0,
            background: Color::WHITE,
            api: GraphicsApi::Hardware,
        }
    }
}

impl HostConfig {
    /// Sets the clear color.
    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Sets the preferred graphics API.
    #[must_use]
    pub fn with_api(mut self, api: GraphicsApi) -> Self {
        self.api = api;
        self
    }
}

/// What one call to [`WindowHost::frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Animations that completed and were dropped from the timeline.
    pub completed_animations: usize,
    /// Animations still owned by the timeline.
    pub active_animations: usize,
    /// Controls that requested a repaint since the previous frame.
    pub repainted: usize,
    /// Primitives submitted.
    pub draw_calls: usize,
    /// Whether the frame reached the screen.
    pub status: PresentStatus,
}

#[derive(Debug)]
struct PropertyWrite {
    id: ControlId,
    name: String,
    value: String,
}

#[derive(Clone, Copy, Debug)]
struct LastClick {
    id: ControlId,
    position: Point,
    time_ms: f64,
}

/// One window's UI: tree, renderer, animations, and input state.
pub struct WindowHost<B: Backend> {
    engine: RenderEngine<B>,
    cache: Rc<RefCell<ResourceCache>>,
    tree: ControlTree,
    root: Option<ControlId>,
    timeline: Timeline,
    events: EventHub,
    config: HostConfig,
    size: Size,
    writes: Rc<RefCell<Vec<PropertyWrite>>>,
    focused: Option<ControlId>,
    captured: Option<ControlId>,
    pressed: Option<ControlId>,
    /// Hit control followed by its ancestors.
    hover_path: Vec<ControlId>,
    last_click: Option<LastClick>,
}

impl<B: Backend> core::fmt::Debug for WindowHost<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowHost")
            .field("engine", &self.engine)
            .field("root", &self.root)
            .field("size", &self.size)
            .field("focused", &self.focused)
            .field("captured", &self.captured)
            .field("hovered", &self.hovered())
            .field("timeline", &self.timeline)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> WindowHost<B> {
    /// Initializes a device and binds a `width × height` target to `window`.
    ///
    /// The configured API is tried first, then software, then WARP. Device
    /// loss clears the shared resource cache before the device is torn down.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotInitialized`] if no API could be initialized, or
    /// the target creation failure.
    pub fn new(
        backend: B,
        window: WindowHandle,
        width: u32,
        height: u32,
        config: HostConfig,
    ) -> Result<Self, EngineError> {
        let mut engine = RenderEngine::new(backend);
        let mut apis = vec![config.api];
        for fallback in [GraphicsApi::Software, GraphicsApi::Warp] {
            if !apis.contains(&fallback) {
                apis.push(fallback);
            }
        }
        if !apis.into_iter().any(|api| engine.initialize(api)) {
            return Err(EngineError::NotInitialized);
        }
        engine.create_render_target(&TargetDesc::new(window, width, height))?;

        let cache = Rc::new(RefCell::new(ResourceCache::new()));
        let lost = Rc::clone(&cache);
        engine.on_device_lost(move || lost.borrow_mut().clear_all());

        Ok(Self {
            engine,
            cache,
            tree: ControlTree::new(),
            root: None,
            timeline: Timeline::new(),
            events: EventHub::new(),
            config,
            size: Size::new(f64::from(width), f64::from(height)),
            writes: Rc::new(RefCell::new(Vec::new())),
            focused: None,
            captured: None,
            pressed: None,
            hover_path: Vec::new(),
            last_click: None,
        })
    }

    // -- Ownership --

    /// The control tree.
    #[must_use]
    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    /// Mutable access to the control tree.
    pub fn tree_mut(&mut self) -> &mut ControlTree {
        &mut self.tree
    }

    /// Observer slots for control events.
    pub fn events_mut(&mut self) -> &mut EventHub {
        &mut self.events
    }

    /// The animation timeline.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// The render engine.
    #[must_use]
    pub fn engine(&self) -> &RenderEngine<B> {
        &self.engine
    }

    /// Mutable access to the render engine.
    pub fn engine_mut(&mut self) -> &mut RenderEngine<B> {
        &mut self.engine
    }

    /// The resource cache shared with the device-loss subscription.
    #[must_use]
    pub fn resource_cache(&self) -> &Rc<RefCell<ResourceCache>> {
        &self.cache
    }

    /// Host settings.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// The root control, if one is set.
    #[must_use]
    pub fn root(&self) -> Option<ControlId> {
        self.root
    }

    /// Client area size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Makes `root` the window's content. Input state from the previous
    /// root is dropped.
    pub fn set_root(&mut self, root: ControlId) {
        self.root = Some(root);
        self.hover_path.clear();
        self.pressed = None;
        self.captured = None;
        self.last_click = None;
        if self
            .focused
            .is_some_and(|f| !self.tree.is_alive(f) || !self.tree.is_in_subtree(f, root))
        {
            self.focused = None;
        }
        self.tree.invalidate_measure(root);
    }

    /// Destroys `id` and its subtree, dropping their observers and any
    /// focus, capture, or hover state that pointed into it.
    pub fn destroy(&mut self, id: ControlId) {
        let removed = self.tree.destroy(id);
        for &gone in &removed {
            self.events.remove_control(gone);
        }
        let dead = |slot: Option<ControlId>| slot.filter(|s| !removed.contains(s));
        self.focused = dead(self.focused);
        self.captured = dead(self.captured);
        self.pressed = dead(self.pressed);
        self.root = dead(self.root);
        self.hover_path.retain(|h| !removed.contains(h));
        if self.last_click.is_some_and(|c| removed.contains(&c.id)) {
            self.last_click = None;
        }
    }

    /// Resizes the client area and its render target.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoTarget`] when no target is bound.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.engine.resize_render_target(width, height)?;
        self.size = Size::new(f64::from(width), f64::from(height));
        if let Some(root) = self.root {
            self.tree.invalidate_measure(root);
        }
        Ok(())
    }

    // -- Frame --

    /// Advances animations by `delta_ms`, lays out, renders, and presents.
    ///
    /// # Errors
    ///
    /// Propagates engine failures from `begin_frame` and `present`. A lost
    /// device is not an error; the frame reports
    /// [`PresentStatus::Recovered`].
    pub fn frame(&mut self, delta_ms: f64) -> Result<FrameReport, EngineError> {
        let completed = self.timeline.update(delta_ms);
        self.apply_animated_properties();

        if let Some(root) = self.root {
            self.tree.update_layout(root, self.size);
        }

        self.engine.begin_frame()?;
        if let Some(ctx) = self.engine.context() {
            ctx.clear(self.config.background);
            if let Some(root) = self.root {
                let mut cache = self.cache.borrow_mut();
                self.tree.render(root, ctx, &mut cache);
            }
        }
        let status = self.engine.present()?;
        let repainted = self.tree.take_visual_changes().len();

        Ok(FrameReport {
            completed_animations: completed,
            active_animations: self.timeline.len(),
            repainted,
            draw_calls: self.engine.stats().draw_calls,
            status,
        })
    }

    /// Starts animating a numeric property of `id` from `from` to `to`.
    ///
    /// Each tick writes the value through the string property surface, so
    /// any property [`ControlTree::set_property`] accepts can be animated.
    /// Writes to a destroyed control are dropped.
    pub fn animate(
        &mut self,
        id: ControlId,
        property: &str,
        from: f64,
        to: f64,
        config: AnimationConfig,
    ) -> AnimationId {
        self.animate_with(id, property, from, to, config, |v: f64| v.to_string())
    }

    /// Starts animating a color property of `id`.
    pub fn animate_color(
        &mut self,
        id: ControlId,
        property: &str,
        from: Color,
        to: Color,
        config: AnimationConfig,
    ) -> AnimationId {
        self.animate_with(id, property, from, to, config, Color::to_hex)
    }

    fn animate_with<T: Animatable>(
        &mut self,
        id: ControlId,
        property: &str,
        from: T,
        to: T,
        config: AnimationConfig,
        format: fn(T) -> String,
    ) -> AnimationId {
        let writes = Rc::clone(&self.writes);
        let name = property.to_owned();
        let mut animation = Animation::new(from, to, config);
        animation.on_update(move |value| {
            writes.borrow_mut().push(PropertyWrite {
                id,
                name: name.clone(),
                value: format(value),
            });
        });
        animation.play();
        self.timeline.insert(animation)
    }

    fn apply_animated_properties(&mut self) {
        let writes = core::mem::take(&mut *self.writes.borrow_mut());
        for write in writes {
            if !self.tree.is_alive(write.id) {
                continue;
            }
            if let Err(err) = self.tree.set_property(write.id, &write.name, &write.value) {
                tracing::warn!(id = ?write.id, %err, "animated property rejected");
            }
        }
    }

    // -- Mouse --

    /// A button went down.
    pub fn mouse_down(&mut self, args: MouseEventArgs) {
        let Some(target) = self.live_capture().or_else(|| self.hit(args.position)) else {
            return;
        };
        if let Some(candidate) = self.focus_candidate(target) {
            self.focus(candidate);
        }
        let handler = self.route(target, &ControlEvent::MouseDown(args));
        self.pressed = Some(handler.unwrap_or(target));
    }

    /// A button was released. Raises `Click` (and possibly `DoubleClick`)
    /// when the release lands inside the control that took the press.
    pub fn mouse_up(&mut self, args: MouseEventArgs) {
        let hit = self.hit(args.position);
        if let Some(target) = self.live_capture().or(hit) {
            self.route(target, &ControlEvent::MouseUp(args));
        }
        let Some(pressed) = self.pressed.take() else {
            return;
        };
        if let Some(hit) = hit
            && self.tree.is_alive(pressed)
            && self.tree.is_in_subtree(hit, pressed)
        {
            self.click(pressed, args);
        }
    }

    /// The pointer moved. Updates hover state before routing the move.
    pub fn mouse_move(&mut self, args: MouseEventArgs) {
        let hit = self.hit(args.position);
        self.update_hover(hit);
        if let Some(target) = self.live_capture().or(hit) {
            self.route(target, &ControlEvent::MouseMove(args));
        }
    }

    /// The wheel turned.
    pub fn mouse_wheel(&mut self, args: MouseEventArgs) {
        if let Some(target) = self.live_capture().or_else(|| self.hit(args.position)) {
            self.route(target, &ControlEvent::MouseWheel(args));
        }
    }

    /// The deepest control under the pointer after the last move.
    #[must_use]
    pub fn hovered(&self) -> Option<ControlId> {
        self.hover_path.first().copied()
    }

    fn hit(&self, point: Point) -> Option<ControlId> {
        self.root.and_then(|root| self.tree.hit_test(root, point))
    }

    fn click(&mut self, id: ControlId, args: MouseEventArgs) {
        self.deliver(id, &ControlEvent::Click);
        let double = self.last_click.is_some_and(|last| {
            last.id == id
                && args.time_ms - last.time_ms <= self.config.double_click_time_ms
                && (args.position - last.position).hypot() <= self.config.double_click_distance
        });
        if double {
            self.last_click = None;
            self.deliver(id, &ControlEvent::DoubleClick);
        } else {
            self.last_click = Some(LastClick {
                id,
                position: args.position,
                time_ms: args.time_ms,
            });
        }
    }

    fn update_hover(&mut self, hit: Option<ControlId>) {
        let path: Vec<ControlId> = match hit {
            Some(id) => core::iter::once(id).chain(self.tree.ancestors(id)).collect(),
            None => Vec::new(),
        };
        let old = core::mem::take(&mut self.hover_path);
        for &id in &old {
            if !path.contains(&id) && self.tree.is_alive(id) {
                self.deliver(id, &ControlEvent::MouseLeave);
            }
        }
        for &id in path.iter().rev() {
            if !old.contains(&id) {
                self.deliver(id, &ControlEvent::MouseEnter);
            }
        }
        self.hover_path = path;
    }

    // -- Capture --

    /// Routes all mouse input to `id` until released.
    pub fn capture_mouse(&mut self, id: ControlId) {
        if self.tree.is_alive(id) {
            self.captured = Some(id);
        }
    }

    /// Releases mouse capture.
    pub fn release_capture(&mut self) {
        self.captured = None;
    }

    /// The control holding mouse capture.
    #[must_use]
    pub fn captured(&self) -> Option<ControlId> {
        self.captured
    }

    /// Drops capture held by a control destroyed behind the host's back.
    fn live_capture(&mut self) -> Option<ControlId> {
        self.captured = self.captured.filter(|&c| self.tree.is_alive(c));
        self.captured
    }

    // -- Keyboard --

    /// A key went down. An unhandled Tab moves focus forward, or backward
    /// with Shift.
    pub fn key_down(&mut self, args: KeyEventArgs) {
        let handled = self
            .key_target()
            .and_then(|target| self.route(target, &ControlEvent::KeyDown(args)))
            .is_some();
        if !handled && args.key == Key::Tab && !args.modifiers.ctrl && !args.modifiers.alt {
            self.move_focus(!args.modifiers.shift);
        }
    }

    /// A key was released.
    pub fn key_up(&mut self, args: KeyEventArgs) {
        if let Some(target) = self.key_target() {
            self.route(target, &ControlEvent::KeyUp(args));
        }
    }

    /// A character was typed.
    pub fn char_input(&mut self, ch: char) {
        if let Some(target) = self.key_target() {
            self.route(target, &ControlEvent::Char(ch));
        }
    }

    fn key_target(&self) -> Option<ControlId> {
        self.focused.or(self.root)
    }

    // -- Focus --

    /// Moves keyboard focus to `id`. Returns `false`, leaving focus
    /// unchanged, if `id` is not a focusable, enabled, visible control under
    /// the root.
    pub fn focus(&mut self, id: ControlId) -> bool {
        if !self.can_focus(id) {
            return false;
        }
        if self.focused == Some(id) {
            return true;
        }
        if let Some(old) = self.focused.take()
            && self.tree.is_alive(old)
        {
            self.deliver(old, &ControlEvent::LostFocus);
        }
        self.focused = Some(id);
        self.deliver(id, &ControlEvent::GotFocus);
        true
    }

    /// Drops keyboard focus.
    pub fn clear_focus(&mut self) {
        if let Some(old) = self.focused.take()
            && self.tree.is_alive(old)
        {
            self.deliver(old, &ControlEvent::LostFocus);
        }
    }

    /// The focused control.
    #[must_use]
    pub fn focused(&self) -> Option<ControlId> {
        self.focused
    }

    /// Moves focus to the next (or previous) focusable control in paint
    /// order, wrapping at the ends.
    pub fn move_focus(&mut self, forward: bool) -> Option<ControlId> {
        let root = self.root?;
        let order: Vec<ControlId> = self
            .tree
            .descendants(root)
            .into_iter()
            .filter(|&id| self.can_focus(id))
            .collect();
        if order.is_empty() {
            return None;
        }
        let current = self
            .focused
            .and_then(|f| order.iter().position(|&id| id == f));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
            (None, true) => 0,
            (None, false) => order.len() - 1,
        };
        let id = order[next];
        self.focus(id);
        Some(id)
    }

    fn can_focus(&self, id: ControlId) -> bool {
        self.tree.is_alive(id)
            && self.tree.props(id).focusable
            && self.tree.is_effectively_enabled(id)
            && self.root.is_some_and(|root| self.tree.is_in_subtree(id, root))
            && core::iter::once(id)
                .chain(self.tree.ancestors(id))
                .all(|a| self.tree.props(a).visibility == Visibility::Visible)
    }

    fn focus_candidate(&self, target: ControlId) -> Option<ControlId> {
        core::iter::once(target)
            .chain(self.tree.ancestors(target))
            .find(|&id| self.can_focus(id))
    }

    // -- Delivery --

    /// Delivers `event` to `target`, bubbling to ancestors if the event
    /// bubbles. Returns the control that handled it.
    fn route(&mut self, target: ControlId, event: &ControlEvent) -> Option<ControlId> {
        if !self.tree.is_alive(target) {
            return None;
        }
        if !event.bubbles() {
            return self.deliver(target, event).then_some(target);
        }
        let path: Vec<ControlId> = core::iter::once(target)
            .chain(self.tree.ancestors(target))
            .collect();
        path.into_iter().find(|&id| self.deliver(id, event))
    }

    /// Runs `id`'s widget handler, applies its requests, then notifies
    /// observers of the event and of anything the widget raised. Returns
    /// whether the widget handled the event.
    fn deliver(&mut self, id: ControlId, event: &ControlEvent) -> bool {
        if !self.tree.is_effectively_enabled(id) {
            return false;
        }
        let Some(mut widget) = self.tree.take_widget(id) else {
            tracing::warn!(?id, ?event, "event re-entered a control; dropping");
            return false;
        };
        let rect = self.tree.arranged_rect(id);
        let mut cx = EventCx::new(
            id,
            rect,
            self.tree.props(id),
            self.captured == Some(id),
            self.focused == Some(id),
        );
        widget.on_event(&mut cx, event);
        let EventCx {
            handled,
            capture,
            raised,
            invalidate,
            ..
        } = cx;
        self.tree.restore_widget(id, widget);

        match capture {
            Some(true) => self.captured = Some(id),
            Some(false) if self.captured == Some(id) => self.captured = None,
            _ => {}
        }
        if let Some(what) = invalidate {
            self.tree.invalidate(id, what);
        }
        self.events.emit(id, event);
        for raised in &raised {
            self.events.emit(id, raised);
        }
        handled
    }
}
