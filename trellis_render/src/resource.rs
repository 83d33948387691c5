// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque handles for backend-managed drawing resources.

use core::fmt;

/// An opaque handle to a backend-managed resource.
///
/// Keys are assigned by the render context that created the resource and are
/// meaningless to any other context. A key that outlives its device (for
/// example across a device-loss recovery) no longer resolves, and draws
/// referencing it are skipped.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey(pub u64);

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({:#x})", self.0)
    }
}

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub ResourceKey);

        impl $name {
            /// Returns the underlying resource key.
            #[inline]
            #[must_use]
            pub const fn key(self) -> ResourceKey {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), (self.0).0)
            }
        }
    };
}

resource_handle!(
    /// A solid or gradient paint source.
    Brush
);
resource_handle!(
    /// A path usable for fills, strokes, and clips.
    Geometry
);
resource_handle!(
    /// A font family, size, and paragraph settings.
    TextFormat
);
resource_handle!(
    /// A device-resident image.
    Bitmap
);
