// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control identity.

use core::fmt;

/// Sentinel value indicating "no control" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a control in a [`ControlTree`](super::ControlTree).
///
/// Contains both a slot index and a generation counter so that stale handles
/// are detected after a control is destroyed and its slot reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ControlId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ControlId({}@gen{})", self.idx, self.generation)
    }
}
