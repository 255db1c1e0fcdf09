// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Emulation plan: the ordered draw items for one frame.

use alloc::vec::Vec;

use kurbo::{Rect, Size};
use strata_core::layer::{
    BlendType, ColorScaleBias, CustomRects, LayerData, LayerId, LayerKind, TextureSource,
};

/// Which side of the scene an item is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EmulationPass {
    /// Drawn before the scene (negative order).
    Underlay,
    /// Drawn after the scene (positive order).
    Overlay,
}

impl EmulationPass {
    /// Returns the pass for a layer order.
    ///
    /// Order 0 belongs to the scene itself and is never emulated; it maps to
    /// [`Overlay`](Self::Overlay) for completeness.
    #[must_use]
    pub fn for_order(order: i32) -> Self {
        if order < 0 {
            Self::Underlay
        } else {
            Self::Overlay
        }
    }
}

/// A single emulated layer draw.
#[derive(Clone, Debug, PartialEq)]
pub struct EmulationItem {
    /// The layer this item originates from.
    pub layer: LayerId,
    /// The layer's order.
    pub order: i32,
    /// The layer's shape and parameters.
    pub data: LayerData,
    /// Underlay or overlay.
    pub pass: EmulationPass,
    /// How the item blends with what is beneath it.
    pub blend: BlendType,
    /// Texture to sample, if any.
    pub texture: Option<TextureSource>,
    /// Color transform, if any.
    pub color_scale_bias: Option<ColorScaleBias>,
    /// Custom sampling rectangles, if any.
    pub custom_rects: Option<CustomRects>,
}

impl EmulationItem {
    /// Returns the layer kind.
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        self.data.kind()
    }

    /// Region of the texture to sample, in normalized coordinates.
    #[must_use]
    pub fn source_rect(&self) -> Rect {
        self.custom_rects.unwrap_or_default().source
    }

    /// Region of the layer surface to fill, in normalized coordinates.
    #[must_use]
    pub fn destination_rect(&self) -> Rect {
        self.custom_rects.unwrap_or_default().destination
    }

    /// Size in meters of the drawn quad, for quad layers.
    #[must_use]
    pub fn quad_size(&self) -> Option<Size> {
        match self.data {
            LayerData::Quad(quad) => Some(quad.size),
            _ => None,
        }
    }
}

/// Draw items for a single frame, back to front.
///
/// Items are sorted by order, then by layer id, so underlays come first,
/// furthest from the scene first, and overlays follow nearest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmulationPlan {
    /// Draw items in back-to-front order.
    pub items: Vec<EmulationItem>,
}

impl EmulationPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns `true` if nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items drawn before the scene.
    pub fn underlays(&self) -> impl Iterator<Item = &EmulationItem> + '_ {
        self.pass(EmulationPass::Underlay)
    }

    /// Items drawn after the scene.
    pub fn overlays(&self) -> impl Iterator<Item = &EmulationItem> + '_ {
        self.pass(EmulationPass::Overlay)
    }

    /// Appends an item, keeping the plan sorted.
    pub fn push(&mut self, item: EmulationItem) {
        let at = self
            .items
            .partition_point(|i| (i.order, i.layer) <= (item.order, item.layer));
        self.items.insert(at, item);
    }

    fn pass(&self, pass: EmulationPass) -> impl Iterator<Item = &EmulationItem> + '_ {
        self.items.iter().filter(move |item| item.pass == pass)
    }
}

#[cfg(test)]
mod tests {
    use strata_core::layer::{LayerStore, QuadLayer};

    use super::*;

    fn item(layer: LayerId, order: i32, data: LayerData) -> EmulationItem {
        EmulationItem {
            layer,
            order,
            data,
            pass: EmulationPass::for_order(order),
            blend: BlendType::Alpha,
            texture: None,
            color_scale_bias: None,
            custom_rects: None,
        }
    }

    #[test]
    fn push_keeps_back_to_front_order() {
        let mut store = LayerStore::new();
        let ids: Vec<_> = (0..4)
            .map(|_| store.create_layer(LayerData::default()))
            .collect();

        let mut plan = EmulationPlan::new();
        plan.push(item(ids[0], 3, LayerData::default()));
        plan.push(item(ids[1], -2, LayerData::default()));
        plan.push(item(ids[2], 1, LayerData::default()));
        plan.push(item(ids[3], -7, LayerData::default()));

        let orders: Vec<_> = plan.items.iter().map(|i| i.order).collect();
        assert_eq!(orders, [-7, -2, 1, 3], "sorted by order");
        let underlays: Vec<_> = plan.underlays().map(|i| i.layer).collect();
        assert_eq!(underlays, [ids[3], ids[1]], "underlays first, furthest first");
        let overlays: Vec<_> = plan.overlays().map(|i| i.layer).collect();
        assert_eq!(overlays, [ids[2], ids[0]], "overlays nearest first");

        plan.clear();
        assert!(plan.is_empty(), "cleared");
    }

    #[test]
    fn rects_default_to_the_unit_square() {
        let mut store = LayerStore::new();
        let id = store.create_layer(LayerData::default());
        let mut quad = item(
            id,
            1,
            LayerData::Quad(QuadLayer {
                size: Size::new(2.0, 0.5),
                apply_transform_scale: false,
            }),
        );
        assert_eq!(quad.source_rect(), Rect::new(0.0, 0.0, 1.0, 1.0), "full source");
        assert_eq!(quad.quad_size(), Some(Size::new(2.0, 0.5)), "quad size");

        quad.custom_rects = Some(CustomRects {
            source: Rect::new(0.0, 0.0, 0.5, 1.0),
            destination: Rect::new(0.25, 0.25, 0.75, 0.75),
        });
        assert_eq!(
            quad.destination_rect(),
            Rect::new(0.25, 0.25, 0.75, 0.75),
            "custom destination"
        );
        assert_eq!(
            item(id, 1, LayerData::CubeProjection).quad_size(),
            None,
            "not a quad"
        );
    }
}
