// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Optional property bundles attached to a layer.

use kurbo::Rect;

use super::id::TextureId;

/// Tag for each extension bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtensionKind {
    /// [`TextureSource`].
    Texture,
    /// [`ColorScaleBias`].
    ColorScaleBias,
    /// [`CustomRects`].
    CustomRects,
}

/// Where a layer's pixels come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureSource {
    /// Texture shown to the left eye (or both eyes when `right` is `None`).
    pub left: Option<TextureId>,
    /// Texture shown to the right eye.
    pub right: Option<TextureId>,
}

/// Per-channel color transform: `color * scale + bias`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScaleBias {
    /// RGBA multiplier.
    pub scale: [f32; 4],
    /// RGBA offset.
    pub bias: [f32; 4],
}

impl Default for ColorScaleBias {
    fn default() -> Self {
        Self {
            scale: [1.0; 4],
            bias: [0.0; 4],
        }
    }
}

impl ColorScaleBias {
    /// Returns `true` if applying this transform changes nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Source and destination rectangles in normalized texture space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CustomRects {
    /// Region of the texture to sample.
    pub source: Rect,
    /// Region of the layer surface to fill.
    pub destination: Rect,
}

impl Default for CustomRects {
    fn default() -> Self {
        Self {
            source: Rect::new(0.0, 0.0, 1.0, 1.0),
            destination: Rect::new(0.0, 0.0, 1.0, 1.0),
        }
    }
}

/// The set of extensions attached to one layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerExtensions {
    /// Texture source, if any.
    pub texture: Option<TextureSource>,
    /// Color transform, if any.
    pub color_scale_bias: Option<ColorScaleBias>,
    /// Custom sampling rectangles, if any.
    pub custom_rects: Option<CustomRects>,
}

impl LayerExtensions {
    /// Returns whether the given extension is attached.
    #[must_use]
    pub fn contains(&self, kind: ExtensionKind) -> bool {
        match kind {
            ExtensionKind::Texture => self.texture.is_some(),
            ExtensionKind::ColorScaleBias => self.color_scale_bias.is_some(),
            ExtensionKind::CustomRects => self.custom_rects.is_some(),
        }
    }

    /// Returns the attached extension kinds.
    pub fn kinds(&self) -> impl Iterator<Item = ExtensionKind> + '_ {
        [
            ExtensionKind::Texture,
            ExtensionKind::ColorScaleBias,
            ExtensionKind::CustomRects,
        ]
        .into_iter()
        .filter(|&kind| self.contains(kind))
    }
}
