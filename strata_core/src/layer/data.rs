// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer data variants and their descriptors.
//!
//! Every layer carries exactly one [`LayerData`] value describing its shape.
//! The set of variants is closed; [`LayerKind`] is the fieldless tag used for
//! lookups, and each kind has a static [`LayerDataDescriptor`] registered at
//! compile time.

use alloc::string::ToString;
use core::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::Size;

use super::extension::ExtensionKind;
use crate::error::LayerDataError;

/// How a layer's color is combined with the layers beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendType {
    /// Straight alpha blending.
    #[default]
    Alpha,
    /// Premultiplied alpha blending.
    Premultiply,
    /// Additive blending.
    Additive,
}

/// Fieldless tag for a [`LayerData`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    /// The implicit scene layer separating underlays from overlays.
    Default,
    /// A flat rectangle in space.
    Quad,
    /// A section of the inside of a cylinder.
    Cylinder,
    /// A section of the inside of a sphere, mapped equirectangularly.
    Equirect,
    /// A cube map surrounding the viewer.
    CubeProjection,
    /// Per-eye projection rendered from cameras.
    Projection,
    /// Projection layer driven by a dedicated camera rig.
    ProjectionRig,
}

impl LayerKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Default,
        Self::Quad,
        Self::Cylinder,
        Self::Equirect,
        Self::CubeProjection,
        Self::Projection,
        Self::ProjectionRig,
    ];

    /// Returns the static descriptor for this kind.
    #[must_use]
    pub fn descriptor(self) -> &'static LayerDataDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Returns the stable type name persisted with layer configurations.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        self.descriptor().type_name
    }

    /// Looks up a kind by its persisted type name.
    pub fn from_type_name(name: &str) -> Result<Self, LayerDataError> {
        DESCRIPTORS
            .iter()
            .find(|d| d.type_name == name)
            .map(|d| d.kind)
            .ok_or_else(|| LayerDataError::UnknownLayerType(name.to_string()))
    }
}

/// Metadata associated with a [`LayerKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerDataDescriptor {
    /// The kind this descriptor belongs to.
    pub kind: LayerKind,
    /// Who provides the layer type.
    pub provider: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Stable type name used as the persisted variant key.
    pub type_name: &'static str,
    /// What the layer does and how it is used.
    pub description: &'static str,
    /// Whether new layers of this kind are placed above the default layer.
    pub prefer_overlay: bool,
    /// Whether the kind supports world or camera relative transforms.
    pub support_transform: bool,
    /// Extensions that are usually attached to this kind.
    pub suggested_extensions: &'static [ExtensionKind],
}

const TEXTURED: &[ExtensionKind] = &[ExtensionKind::Texture, ExtensionKind::ColorScaleBias];

// Indexed by `LayerKind as usize`.
static DESCRIPTORS: [LayerDataDescriptor; 7] = [
    LayerDataDescriptor {
        kind: LayerKind::Default,
        provider: "Strata",
        name: "Default Scene",
        type_name: "strata.layers.default",
        description: "The implicit scene layer. Separates overlay layers from underlays.",
        prefer_overlay: true,
        support_transform: false,
        suggested_extensions: &[],
    },
    LayerDataDescriptor {
        kind: LayerKind::Quad,
        provider: "Strata",
        name: "Quad",
        type_name: "strata.layers.quad",
        description: "A flat rectangular layer placed in space.",
        prefer_overlay: true,
        support_transform: true,
        suggested_extensions: &[
            ExtensionKind::Texture,
            ExtensionKind::ColorScaleBias,
            ExtensionKind::CustomRects,
        ],
    },
    LayerDataDescriptor {
        kind: LayerKind::Cylinder,
        provider: "Strata",
        name: "Cylinder",
        type_name: "strata.layers.cylinder",
        description: "A curved layer on the inside of a cylinder centered on the layer origin.",
        prefer_overlay: true,
        support_transform: true,
        suggested_extensions: &[
            ExtensionKind::Texture,
            ExtensionKind::ColorScaleBias,
            ExtensionKind::CustomRects,
        ],
    },
    LayerDataDescriptor {
        kind: LayerKind::Equirect,
        provider: "Strata",
        name: "Equirect",
        type_name: "strata.layers.equirect",
        description: "An equirectangular image mapped onto the inside of a sphere.",
        prefer_overlay: true,
        support_transform: true,
        suggested_extensions: TEXTURED,
    },
    LayerDataDescriptor {
        kind: LayerKind::CubeProjection,
        provider: "Strata",
        name: "Cube Projection",
        type_name: "strata.layers.cube-projection",
        description: "A cube map surrounding the viewer, typically used as a sky box.",
        prefer_overlay: false,
        support_transform: false,
        suggested_extensions: TEXTURED,
    },
    LayerDataDescriptor {
        kind: LayerKind::Projection,
        provider: "Strata",
        name: "Projection",
        type_name: "strata.layers.projection",
        description: "Per-eye images rendered from the viewer's cameras.",
        prefer_overlay: false,
        support_transform: false,
        suggested_extensions: TEXTURED,
    },
    LayerDataDescriptor {
        kind: LayerKind::ProjectionRig,
        provider: "Strata",
        name: "Projection Rig",
        type_name: "strata.layers.projection-rig",
        description: "A projection layer rendered by a dedicated camera rig.",
        prefer_overlay: false,
        support_transform: false,
        suggested_extensions: &[ExtensionKind::ColorScaleBias],
    },
];

/// Parameters of a [`LayerData::Quad`] layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadLayer {
    /// Width and height in meters.
    pub size: Size,
    /// Whether the host transform's scale multiplies `size`.
    pub apply_transform_scale: bool,
}

impl Default for QuadLayer {
    fn default() -> Self {
        Self {
            size: Size::new(1.0, 1.0),
            apply_transform_scale: true,
        }
    }
}

/// Parameters of a [`LayerData::Cylinder`] layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderLayer {
    /// Cylinder radius in meters.
    pub radius: f64,
    /// Angle of the visible section in radians.
    pub central_angle: f64,
    /// Width over height of the visible section.
    pub aspect_ratio: f64,
    /// Whether the height follows the radius and central angle.
    pub maintain_aspect_ratio: bool,
}

impl Default for CylinderLayer {
    fn default() -> Self {
        Self {
            radius: 1.0,
            central_angle: FRAC_PI_2,
            aspect_ratio: 1.0,
            maintain_aspect_ratio: true,
        }
    }
}

/// Parameters of a [`LayerData::Equirect`] layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquirectLayer {
    /// Sphere radius in meters. Zero means infinitely far away.
    pub radius: f64,
    /// Horizontal angle covered by the image in radians.
    pub central_horizontal_angle: f64,
    /// Upper vertical bound in radians.
    pub upper_vertical_angle: f64,
    /// Lower vertical bound in radians.
    pub lower_vertical_angle: f64,
}

impl Default for EquirectLayer {
    fn default() -> Self {
        Self {
            radius: 0.0,
            central_horizontal_angle: TAU,
            upper_vertical_angle: PI / 2.0,
            lower_vertical_angle: -PI / 2.0,
        }
    }
}

/// The shape and parameters of a layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerData {
    /// The implicit scene layer.
    Default,
    /// A flat rectangle.
    Quad(QuadLayer),
    /// A cylinder section.
    Cylinder(CylinderLayer),
    /// A sphere section.
    Equirect(EquirectLayer),
    /// A cube map.
    CubeProjection,
    /// Camera-rendered projection.
    Projection,
    /// Rig-rendered projection.
    ProjectionRig,
}

impl Default for LayerData {
    fn default() -> Self {
        Self::Quad(QuadLayer::default())
    }
}

impl LayerData {
    /// Creates default data for the given kind.
    #[must_use]
    pub fn new(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Default => Self::Default,
            LayerKind::Quad => Self::Quad(QuadLayer::default()),
            LayerKind::Cylinder => Self::Cylinder(CylinderLayer::default()),
            LayerKind::Equirect => Self::Equirect(EquirectLayer::default()),
            LayerKind::CubeProjection => Self::CubeProjection,
            LayerKind::Projection => Self::Projection,
            LayerKind::ProjectionRig => Self::ProjectionRig,
        }
    }

    /// Creates default data for a persisted type name.
    pub fn from_type_name(name: &str) -> Result<Self, LayerDataError> {
        LayerKind::from_type_name(name).map(Self::new)
    }

    /// Returns the tag of this variant.
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Default => LayerKind::Default,
            Self::Quad(_) => LayerKind::Quad,
            Self::Cylinder(_) => LayerKind::Cylinder,
            Self::Equirect(_) => LayerKind::Equirect,
            Self::CubeProjection => LayerKind::CubeProjection,
            Self::Projection => LayerKind::Projection,
            Self::ProjectionRig => LayerKind::ProjectionRig,
        }
    }

    /// Returns the descriptor of this variant's kind.
    #[must_use]
    pub fn descriptor(&self) -> &'static LayerDataDescriptor {
        self.kind().descriptor()
    }
}
