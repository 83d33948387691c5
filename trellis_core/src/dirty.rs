// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation channel constants.
//!
//! The control tree uses multi-channel dirty tracking (via
//! [`understory_dirty`]) so that a property change deep in the tree
//! invalidates exactly the layout work that depends on it.
//!
//! # Propagation semantics
//!
//! Dependency edges point from a parent to each of its children: a parent's
//! desired size depends on its children's desired sizes.
//!
//! - **Propagating**: [`MEASURE`] and [`ARRANGE`] are marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy). Invalidating a child
//!   marks every ancestor up to the root, so memoized measure results higher
//!   up are never reused after a descendant changed.
//!
//! - **Local-only**: [`VISUAL`] marks a single control as needing repaint
//!   without affecting layout.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on child insertion and removal.
//!
//! # Consumption
//!
//! The tree drains [`MEASURE`] and [`ARRANGE`] at the start of each layout
//! pass into per-control flags; a control with a clean flag and an unchanged
//! constraint returns its cached result.

use understory_dirty::Channel;

/// Desired size may have changed; requires re-measure of the control and its
/// ancestors.
pub const MEASURE: Channel = Channel::new(0);

/// Final placement may have changed; requires re-arrange of the control and
/// its ancestors.
pub const ARRANGE: Channel = Channel::new(1);

/// Appearance changed without a layout impact.
pub const VISUAL: Channel = Channel::new(2);

/// Children were added, removed, or reordered.
pub const TOPOLOGY: Channel = Channel::new(3);
