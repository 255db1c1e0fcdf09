// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer identity, configuration and host-side storage.
//!
//! Layers live in a [`LayerStore`] owned by the host and are addressed by
//! generational [`LayerId`] handles. Each layer has exactly one
//! [`LayerData`] variant, an optional set of [`LayerExtensions`], and a
//! [`PlatformDataMap`] of per-platform payloads.

mod data;
mod extension;
mod id;
mod platform_data;
mod store;

pub use data::{
    BlendType, CylinderLayer, EquirectLayer, LayerData, LayerDataDescriptor, LayerKind, QuadLayer,
};
pub use extension::{ColorScaleBias, CustomRects, ExtensionKind, LayerExtensions, TextureSource};
pub use id::{INVALID, LayerId, TextureId};
pub use platform_data::{PlatformDataMap, PlatformLayerData};
pub use store::LayerStore;
