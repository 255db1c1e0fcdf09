// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays storage for host-owned layer configuration.

use alloc::string::String;
use alloc::vec::Vec;

use super::data::{BlendType, LayerData, LayerKind};
use super::extension::LayerExtensions;
use super::id::{INVALID, LayerId};
use super::platform_data::{PlatformDataMap, PlatformLayerData};
use crate::error::LayerDataError;

/// Struct-of-arrays storage for all layers of a host.
///
/// Layers are addressed by [`LayerId`] handles. Internally, each layer occupies
/// a slot in parallel arrays. Destroyed layers are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// The store is the host side of the registry protocol: it owns each layer's
/// configuration and its activity in the host hierarchy. Setters that change
/// a configuration value queue a pending state change, which
/// [`LayerRegistry::update`](crate::registry::LayerRegistry::update) drains
/// before flushing. Activity setters ([`set_enabled`](Self::set_enabled),
/// [`set_active`](Self::set_active)) do not queue state changes; the host
/// reports them through the registry's lifecycle notifications instead.
#[derive(Debug)]
pub struct LayerStore {
    // -- Hierarchy --
    pub(crate) parent: Vec<u32>,

    // -- Configuration (set by callers) --
    pub(crate) name: Vec<String>,
    pub(crate) order: Vec<i32>,
    pub(crate) order_initialized: Vec<bool>,
    pub(crate) data: Vec<LayerData>,
    pub(crate) blend: Vec<BlendType>,
    pub(crate) extensions: Vec<LayerExtensions>,
    pub(crate) platform_data: Vec<PlatformDataMap>,

    // -- Activity --
    pub(crate) enabled: Vec<bool>,
    pub(crate) active_self: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Change tracking --
    pub(crate) pending_state_changes: Vec<u32>,
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerStore {
    /// Creates an empty layer store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            name: Vec::new(),
            order: Vec::new(),
            order_initialized: Vec::new(),
            data: Vec::new(),
            blend: Vec::new(),
            extensions: Vec::new(),
            platform_data: Vec::new(),
            enabled: Vec::new(),
            active_self: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            pending_state_changes: Vec::new(),
        }
    }

    // -- Allocation API --

    /// Creates a new layer with the given data and returns its handle.
    ///
    /// The layer starts at order 0 (not yet initialized by a registry),
    /// enabled, active, without extensions and without a parent.
    pub fn create_layer(&mut self, data: LayerData) -> LayerId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.name[i] = String::new();
            self.order[i] = 0;
            self.order_initialized[i] = false;
            self.data[i] = data;
            self.blend[i] = BlendType::default();
            self.extensions[i] = LayerExtensions::default();
            self.platform_data[i] = PlatformDataMap::default();
            self.enabled[i] = true;
            self.active_self[i] = true;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.name.push(String::new());
            self.order.push(0);
            self.order_initialized.push(false);
            self.data.push(data);
            self.blend.push(BlendType::default());
            self.extensions.push(LayerExtensions::default());
            self.platform_data.push(PlatformDataMap::default());
            self.enabled.push(true);
            self.active_self.push(true);
            self.generation.push(0);
            idx
        };

        LayerId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys a layer, freeing its slot for reuse.
    ///
    /// Children of the destroyed layer are detached and become roots.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_layer(&mut self, id: LayerId) {
        self.validate(id);
        let idx = id.idx;

        for child in 0..self.len {
            if self.parent[child as usize] == idx {
                self.parent[child as usize] = INVALID;
            }
        }
        self.parent[idx as usize] = INVALID;

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;

        self.free_list.push(idx);
        self.pending_state_changes.retain(|&pending| pending != idx);
    }

    /// Returns whether the given handle refers to a live layer.
    #[must_use]
    pub fn is_alive(&self, id: LayerId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the handles of all live layers in slot order.
    #[must_use]
    pub fn live_layers(&self) -> Vec<LayerId> {
        (0..self.len)
            .filter(|idx| !self.free_list.contains(idx))
            .map(|idx| LayerId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    /// Returns the number of live layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns `true` if the store holds no live layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -- Hierarchy API --

    /// Sets or clears the host parent of a layer.
    ///
    /// A layer is [active in the hierarchy](Self::active_in_hierarchy) only
    /// if it and all of its ancestors are active.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or if the new parent is a descendant of
    /// `child` (or `child` itself).
    pub fn set_parent(&mut self, child: LayerId, parent: Option<LayerId>) {
        self.validate(child);
        let Some(parent) = parent else {
            self.parent[child.idx as usize] = INVALID;
            return;
        };
        self.validate(parent);

        let mut cursor = parent.idx;
        while cursor != INVALID {
            assert!(cursor != child.idx, "parent cycle");
            cursor = self.parent[cursor as usize];
        }
        self.parent[child.idx as usize] = parent.idx;
    }

    /// Returns the host parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, id: LayerId) -> Option<LayerId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(LayerId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns whether the layer and all of its ancestors are active.
    #[must_use]
    pub fn active_in_hierarchy(&self, id: LayerId) -> bool {
        self.validate(id);
        self.active_in_hierarchy_at(id.idx)
    }

    /// Returns whether the layer is enabled and active in the hierarchy.
    #[must_use]
    pub fn is_active_and_enabled(&self, id: LayerId) -> bool {
        self.validate(id);
        self.enabled[id.idx as usize] && self.active_in_hierarchy_at(id.idx)
    }

    /// Returns whether the host can make the layer active.
    ///
    /// Activation is impossible when the layer is inactive in the hierarchy
    /// and its parent is inactive in the hierarchy as well.
    #[must_use]
    pub fn can_activate(&self, id: LayerId) -> bool {
        self.validate(id);
        if self.active_in_hierarchy_at(id.idx) {
            return true;
        }
        let p = self.parent[id.idx as usize];
        p == INVALID || self.active_in_hierarchy_at(p)
    }

    // -- Property getters (read-only) --

    /// Returns the display name of a layer.
    #[must_use]
    pub fn name(&self, id: LayerId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Returns the order of a layer.
    #[must_use]
    pub fn order(&self, id: LayerId) -> i32 {
        self.validate(id);
        self.order[id.idx as usize]
    }

    /// Returns the order of a layer, or `None` if the handle is stale.
    #[must_use]
    pub fn try_order(&self, id: LayerId) -> Option<i32> {
        self.is_alive(id).then(|| self.order[id.idx as usize])
    }

    /// Returns whether a registry has assigned the layer a valid order.
    #[must_use]
    pub fn order_initialized(&self, id: LayerId) -> bool {
        self.validate(id);
        self.order_initialized[id.idx as usize]
    }

    /// Returns the layer data.
    #[must_use]
    pub fn data(&self, id: LayerId) -> &LayerData {
        self.validate(id);
        &self.data[id.idx as usize]
    }

    /// Returns the kind of the layer data.
    #[must_use]
    pub fn kind(&self, id: LayerId) -> LayerKind {
        self.data(id).kind()
    }

    /// Returns the blend type.
    #[must_use]
    pub fn blend_type(&self, id: LayerId) -> BlendType {
        self.validate(id);
        self.blend[id.idx as usize]
    }

    /// Returns the attached extensions.
    #[must_use]
    pub fn extensions(&self, id: LayerId) -> &LayerExtensions {
        self.validate(id);
        &self.extensions[id.idx as usize]
    }

    /// Returns the serialized platform payloads.
    #[must_use]
    pub fn platform_data_map(&self, id: LayerId) -> &PlatformDataMap {
        self.validate(id);
        &self.platform_data[id.idx as usize]
    }

    /// Decodes the platform payload of type `T`.
    pub fn platform_data<T: PlatformLayerData>(&self, id: LayerId) -> Result<T, LayerDataError> {
        self.platform_data_map(id).get()
    }

    /// Returns whether the layer is enabled.
    #[must_use]
    pub fn enabled(&self, id: LayerId) -> bool {
        self.validate(id);
        self.enabled[id.idx as usize]
    }

    /// Returns whether the layer itself is active (ignoring ancestors).
    #[must_use]
    pub fn active_self(&self, id: LayerId) -> bool {
        self.validate(id);
        self.active_self[id.idx as usize]
    }

    // -- Mutation API (queues state changes) --

    /// Sets the display name used in diagnostics. Not a state change.
    pub fn set_name(&mut self, id: LayerId, name: impl Into<String>) {
        self.validate(id);
        self.name[id.idx as usize] = name.into();
    }

    /// Sets the requested order of a layer.
    ///
    /// This does not move a slot reservation. For layers already known to a
    /// registry use
    /// [`LayerRegistry::change_order`](crate::registry::LayerRegistry::change_order).
    pub fn set_order(&mut self, id: LayerId, order: i32) {
        self.validate(id);
        if self.order[id.idx as usize] != order {
            self.order[id.idx as usize] = order;
            self.mark_state_changed(id.idx);
        }
    }

    /// Sets the layer data.
    pub fn set_data(&mut self, id: LayerId, data: LayerData) {
        self.validate(id);
        if self.data[id.idx as usize] != data {
            self.data[id.idx as usize] = data;
            self.mark_state_changed(id.idx);
        }
    }

    /// Sets the blend type.
    pub fn set_blend_type(&mut self, id: LayerId, blend: BlendType) {
        self.validate(id);
        if self.blend[id.idx as usize] != blend {
            self.blend[id.idx as usize] = blend;
            self.mark_state_changed(id.idx);
        }
    }

    /// Replaces the attached extensions.
    pub fn set_extensions(&mut self, id: LayerId, extensions: LayerExtensions) {
        self.validate(id);
        if self.extensions[id.idx as usize] != extensions {
            self.extensions[id.idx as usize] = extensions;
            self.mark_state_changed(id.idx);
        }
    }

    /// Encodes and stores the platform payload of type `T`.
    pub fn set_platform_data<T: PlatformLayerData>(
        &mut self,
        id: LayerId,
        value: &T,
    ) -> Result<(), LayerDataError> {
        self.validate(id);
        if self.platform_data[id.idx as usize].set(value)? {
            self.mark_state_changed(id.idx);
        }
        Ok(())
    }

    /// Sets whether the layer is enabled.
    pub fn set_enabled(&mut self, id: LayerId, enabled: bool) {
        self.validate(id);
        self.enabled[id.idx as usize] = enabled;
    }

    /// Sets whether the layer itself is active.
    pub fn set_active(&mut self, id: LayerId, active: bool) {
        self.validate(id);
        self.active_self[id.idx as usize] = active;
    }

    /// Returns whether any state change is waiting to be drained.
    #[must_use]
    pub fn has_pending_state_changes(&self) -> bool {
        !self.pending_state_changes.is_empty()
    }

    // -- Registry-facing helpers --

    /// Writes an order assigned by a registry and marks it initialized.
    pub(crate) fn assign_order(&mut self, id: LayerId, order: i32) {
        self.set_order(id, order);
        self.order_initialized[id.idx as usize] = true;
    }

    /// Marks the current order as initialized without changing it.
    pub(crate) fn mark_order_initialized(&mut self, id: LayerId) {
        self.validate(id);
        self.order_initialized[id.idx as usize] = true;
    }

    /// Drains the queued state changes, oldest first.
    pub(crate) fn take_state_changes(&mut self) -> Vec<LayerId> {
        let pending = core::mem::take(&mut self.pending_state_changes);
        pending
            .into_iter()
            .map(|idx| LayerId {
                idx,
                generation: self.generation[idx as usize],
            })
            .collect()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: LayerId) {
        assert!(
            self.is_alive(id),
            "stale LayerId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    fn active_in_hierarchy_at(&self, mut idx: u32) -> bool {
        while idx != INVALID {
            if !self.active_self[idx as usize] {
                return false;
            }
            idx = self.parent[idx as usize];
        }
        true
    }

    fn mark_state_changed(&mut self, idx: u32) {
        if !self.pending_state_changes.contains(&idx) {
            self.pending_state_changes.push(idx);
        }
    }
}
