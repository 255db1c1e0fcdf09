// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The emulation layer provider.

use alloc::collections::BTreeMap;

use strata_core::changes::{ChangeSet, LayerRecord};
use strata_core::layer::{BlendType, LayerData, LayerExtensions, LayerId, LayerKind, LayerStore};
use strata_core::platform::PlatformManager;
use strata_core::provider::LayerProvider;

use crate::plan::{EmulationItem, EmulationPass, EmulationPlan};
use crate::settings::{EmulationSettings, RunContext};

/// The provider's copy of one layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmulatedLayer {
    /// The layer.
    pub id: LayerId,
    /// Its order as of the last flush.
    pub order: i32,
    /// Whether the layer was in the last active list.
    pub enabled: bool,
    /// Shape and parameters.
    pub data: LayerData,
    /// Blend type.
    pub blend: BlendType,
    /// Attached extensions.
    pub extensions: LayerExtensions,
}

impl EmulatedLayer {
    fn capture(store: &LayerStore, record: LayerRecord, enabled: bool) -> Self {
        Self {
            id: record.id,
            order: record.order,
            enabled,
            data: *store.data(record.id),
            blend: store.blend_type(record.id),
            extensions: *store.extensions(record.id),
        }
    }

    fn refresh(&mut self, store: &LayerStore, record: LayerRecord) {
        self.order = record.order;
        self.data = *store.data(record.id);
        self.blend = store.blend_type(record.id);
        self.extensions = *store.extensions(record.id);
    }
}

/// Returns whether a layer kind can be drawn by emulation.
///
/// The scene layer is never drawn, and camera-rendered projection layers
/// have nothing to draw until a platform composites them.
fn is_emulated(kind: LayerKind) -> bool {
    !matches!(kind, LayerKind::Default | LayerKind::Projection)
}

/// A [`LayerProvider`] that previews layers by drawing them into the scene.
///
/// The provider keeps its own copy of every layer it was told about and
/// rebuilds an [`EmulationPlan`] after each flush. Hosts read the plan and
/// draw underlays before the scene and overlays after it.
///
/// The plan previews what the target platform would composite: kinds the
/// [active platform](PlatformManager::active) does not support are left out,
/// as are underlays on platforms without underlay support.
#[derive(Debug)]
pub struct EmulatedLayerProvider {
    settings: EmulationSettings,
    context: RunContext,
    device_active: bool,
    warned: bool,
    platform: PlatformManager,
    layers: BTreeMap<LayerId, EmulatedLayer>,
    plan: EmulationPlan,
}

impl EmulatedLayerProvider {
    /// Creates a provider.
    #[must_use]
    pub fn new(settings: EmulationSettings, context: RunContext) -> Self {
        Self {
            settings,
            context,
            device_active: false,
            warned: false,
            platform: PlatformManager::new(),
            layers: BTreeMap::new(),
            plan: EmulationPlan::new(),
        }
    }

    /// Returns the plan built by the last flush.
    #[must_use]
    pub fn plan(&self) -> &EmulationPlan {
        &self.plan
    }

    /// Returns the provider's copy of a layer.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&EmulatedLayer> {
        self.layers.get(&id)
    }

    /// Returns the number of tracked layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if no layer is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Returns the emulation settings.
    #[must_use]
    pub fn settings(&self) -> &EmulationSettings {
        &self.settings
    }

    /// Replaces the settings. Takes effect on the next flush.
    pub fn set_settings(&mut self, settings: EmulationSettings) {
        self.settings = settings;
    }

    /// Changes the run context. Takes effect on the next flush.
    pub fn set_context(&mut self, context: RunContext) {
        self.context = context;
    }

    /// Returns the target platform.
    #[must_use]
    pub fn platform(&self) -> &PlatformManager {
        &self.platform
    }

    /// Returns the target platform for selection. Takes effect on the next
    /// flush.
    pub fn platform_mut(&mut self) -> &mut PlatformManager {
        &mut self.platform
    }

    /// Records whether a real XR device is presenting.
    ///
    /// While one is, layers are composited by the device and emulation only
    /// runs in the editor's scene view.
    pub fn set_device_active(&mut self, active: bool) {
        self.device_active = active;
    }

    /// Returns whether the next flush will produce draw items.
    #[must_use]
    pub fn is_emulating(&self) -> bool {
        self.settings.is_enabled(self.context)
            && (!self.device_active || self.context == RunContext::Editor)
    }

    fn add_created(&mut self, store: &LayerStore, created: &[LayerRecord]) {
        for &record in created {
            if store.is_alive(record.id) && !self.layers.contains_key(&record.id) {
                let enabled = store.is_active_and_enabled(record.id);
                self.layers
                    .insert(record.id, EmulatedLayer::capture(store, record, enabled));
            }
        }
    }

    fn remove_destroyed(&mut self, removed: &[LayerId]) {
        for id in removed {
            self.layers.remove(id);
        }
    }

    fn modify_changed(&mut self, store: &LayerStore, modified: &[LayerRecord]) {
        for &record in modified {
            if !store.is_alive(record.id) {
                continue;
            }
            match self.layers.get_mut(&record.id) {
                Some(layer) => layer.refresh(store, record),
                None => {
                    let enabled = store.is_active_and_enabled(record.id);
                    self.layers
                        .insert(record.id, EmulatedLayer::capture(store, record, enabled));
                }
            }
        }
    }

    fn update_active(&mut self, store: &LayerStore, active: &[LayerRecord]) {
        for layer in self.layers.values_mut() {
            layer.enabled = false;
        }
        for &record in active {
            if !store.is_alive(record.id) {
                continue;
            }
            let layer = self
                .layers
                .entry(record.id)
                .or_insert_with(|| EmulatedLayer::capture(store, record, true));
            layer.order = record.order;
            layer.enabled = true;
        }
    }

    fn rebuild_plan(&mut self) {
        self.plan.clear();
        if !self.is_emulating() {
            if self.device_active && self.settings.warn_unsupported && !self.warned {
                log::warn!(
                    "composition layers are not emulated while an XR device is presenting"
                );
                self.warned = true;
            }
            return;
        }

        let platform = self.platform.active();
        for layer in self.layers.values() {
            let kind = layer.data.kind();
            if !layer.enabled || !is_emulated(kind) {
                continue;
            }
            let pass = EmulationPass::for_order(layer.order);
            if !platform.supports(kind) {
                log::debug!("{kind:?} layer {} not supported by {}", layer.id, platform.name());
                continue;
            }
            if pass == EmulationPass::Underlay && !platform.supports_underlays() {
                log::debug!("underlay {} not supported by {}", layer.id, platform.name());
                continue;
            }
            self.plan.push(EmulationItem {
                layer: layer.id,
                order: layer.order,
                data: layer.data,
                pass,
                blend: layer.blend,
                texture: layer.extensions.texture,
                color_scale_bias: layer.extensions.color_scale_bias,
                custom_rects: layer.extensions.custom_rects,
            });
        }
    }
}

impl LayerProvider for EmulatedLayerProvider {
    fn set_initial_state(&mut self, store: &LayerStore, layers: &[LayerRecord]) {
        self.layers.clear();
        self.add_created(store, layers);
        self.rebuild_plan();
    }

    fn cleanup_state(&mut self) {
        self.layers.clear();
        self.plan.clear();
        self.warned = false;
    }

    fn update_layers(&mut self, store: &LayerStore, changes: &ChangeSet) {
        self.add_created(store, &changes.created);
        self.remove_destroyed(&changes.removed);
        self.modify_changed(store, &changes.modified);
        self.update_active(store, &changes.active);
        self.rebuild_plan();
        log::trace!(
            "emulation plan: {} underlays, {} overlays",
            self.plan.underlays().count(),
            self.plan.overlays().count()
        );
    }
}
