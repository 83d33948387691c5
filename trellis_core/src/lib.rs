// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry, invalidation channels, and animation timelines for trellis.
//!
//! `trellis_core` holds the leaf-level building blocks that the render and
//! control-tree crates share. Nothing in here knows about drawing surfaces or
//! controls.
//!
//! # Architecture
//!
//! A trellis frame is driven by the host in a fixed order:
//!
//! ```text
//!   Host tick (delta ms)
//!       │
//!       ▼
//!   Timeline::update() ──► Animation callbacks ──► control properties
//!                                                       │
//!                 ┌─────────────────────────────────────┘
//!                 ▼
//!   Measure ──► Arrange ──► Render ──► Present
//! ```
//!
//! **[`geometry`]**: Thin re-exports of `kurbo` value types plus the
//! toolkit-specific [`Thickness`](geometry::Thickness) and
//! [`CornerRadius`](geometry::CornerRadius).
//!
//! **[`color`]**: Straight-alpha RGBA [`Color`](color::Color) with 8-bit
//! ARGB packing used for resource cache keys.
//!
//! **[`dirty`]**: Layout and visual invalidation channels for
//! `understory_dirty`.
//!
//! **[`easing`]**: The standard easing function family.
//!
//! **[`animation`]**: A single time-driven interpolation with delay,
//! iteration, direction, and fill-mode policies.
//!
//! **[`timeline`]**: An owning collection of animations advanced together.

pub mod animation;
pub mod color;
pub mod dirty;
pub mod easing;
pub mod geometry;
pub mod timeline;
