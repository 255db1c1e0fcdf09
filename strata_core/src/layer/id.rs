// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer and texture identity types.

use core::fmt;

/// Sentinel value indicating "no layer" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a layer in a [`LayerStore`](super::LayerStore).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a layer is destroyed and the slot is reused. Two
/// handles never compare equal across a destroy/create cycle, which makes a
/// `LayerId` unique for the lifetime of its store.
///
/// Handles are totally ordered (index first, then generation). The registry
/// uses this order to break ties between layers sharing an order value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId {
    /// Slot index into the store's arrays.
    pub(crate) idx: u32,
    /// Generation counter; must match the store's generation for this slot.
    pub(crate) generation: u32,
}

impl LayerId {
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

    /// Packs the handle into an opaque 64-bit identity.
    ///
    /// The packing preserves the handle's ordering.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.idx as u64) << 32) | self.generation as u64
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}@gen{})", self.idx, self.generation)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.idx, self.generation)
    }
}

/// An opaque reference to a texture owned by the host.
///
/// Textures are created and managed externally (e.g. by a render target or
/// an image pipeline). Layers refer to them through the
/// [`TextureSource`](super::TextureSource) extension.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u64);

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.0)
    }
}
