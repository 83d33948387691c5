// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render context contract, frame engine, and resource cache for trellis.
//!
//! This crate sits between the control tree and a graphics backend:
//!
//! - [`RenderContext`](context::RenderContext): the per-frame drawing API.
//!   Controls only ever talk to this trait; they never reach native handles.
//! - [`RenderEngine`](engine::RenderEngine): owns the device, the on-screen
//!   target, and the frame lifecycle, and recovers from device loss.
//! - [`ResourceCache`](cache::ResourceCache): memoizes brushes and text
//!   formats by semantic identity.
//! - [`software`]: a CPU backend implementing the whole contract. It is the
//!   reference implementation and the test double for everything above it.
//!
//! [`state`] holds the state and clip stacks every backend embeds, and
//! [`resource`] the opaque handle types factories return.

pub mod cache;
pub mod context;
pub mod engine;
pub mod resource;
pub mod software;
pub mod state;
