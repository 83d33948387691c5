// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode controls, panel layout, and input routing for trellis.
//!
//! The crate is organized around one arena, the [`ControlTree`]:
//!
//! - [`tree`]: topology, per-control [`ControlProps`], invalidation, the
//!   two-pass measure/arrange layout, painting, and hit testing.
//! - [`widget`]: the [`Widget`] trait each control kind implements, and the
//!   contexts its hooks receive.
//! - [`widgets`] and [`panels`]: the built-in control kinds.
//! - [`properties`]: string-keyed access to every property, used by
//!   [`document`] and by scripting bridges.
//! - [`host`]: a [`WindowHost`] per window: input routing, focus and
//!   capture, animations, and the frame pipeline over a
//!   [`RenderEngine`](trellis_render::engine::RenderEngine).
//! - [`events`] and [`input`]: the records flowing through routing, and
//!   the [`EventHub`] observers subscribe to.
//!
//! ```text
//!   platform input ──► WindowHost ──► hit test / focus ──► Widget::on_event
//!                                                              │
//!                                       EventHub observers ◄───┘
//! ```
//!
//! [`ControlTree`]: tree::ControlTree
//! [`ControlProps`]: tree::ControlProps
//! [`Widget`]: widget::Widget
//! [`WindowHost`]: host::WindowHost
//! [`EventHub`]: events::EventHub

pub mod document;
pub mod events;
pub mod host;
pub mod input;
pub mod panels;
pub mod properties;
pub mod tree;
pub mod widget;
pub mod widgets;
