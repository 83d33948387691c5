// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control tree data model.
//!
//! A *control* is a node in the UI tree. Each control has:
//!
//! - An identity ([`ControlId`]): a generational handle that becomes stale
//!   when the control is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered
//!   tree. Sibling order is paint order.
//! - **Base properties** ([`ControlProps`]) set by the caller through
//!   [`update_props`](ControlTree::update_props) or the string property
//!   surface.
//! - **Behavior**: a boxed [`Widget`](crate::widget::Widget) implementing
//!   the measure, arrange, render, and input hooks for its kind.
//! - **Layout results** produced by [`measure`](ControlTree::measure) and
//!   [`arrange`](ControlTree::arrange): the desired size and the arranged
//!   rect.
//!
//! # Dirty tracking
//!
//! Property mutations mark the channels in [`trellis_core::dirty`]:
//!
//! - **MEASURE** / **ARRANGE**: propagate to every ancestor, since a
//!   parent's layout depends on its children.
//! - **VISUAL**: local-only repaint.
//! - **TOPOLOGY**: child insertion and removal.

mod id;
mod layout;
mod props;
mod render;
mod store;
mod traverse;

pub use id::{ControlId, INVALID};
pub use props::{ControlProps, Dock, Visibility};
pub use store::ControlTree;
pub use traverse::Children;
