// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default layer policy.
//!
//! Slot 0 always belongs to exactly one *default layer*: the layer standing
//! for the rendered scene itself, which separates underlays from overlays.
//! The host may designate any activatable layer; otherwise a fallback layer
//! owned by the registry takes the slot.

use crate::events::{DefaultCandidateRejectedEvent, DefaultLayerChangedEvent};
use crate::layer::{LayerData, LayerId, LayerStore};
use crate::registry::LayerRegistry;
use crate::slots::DEFAULT_SLOT;

/// Name given to the fallback default layer.
pub const FALLBACK_LAYER_NAME: &str = "Default Scene Layer";

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DefaultLayerState {
    /// The designated default layer.
    pub(crate) current: Option<LayerId>,
    /// The registry-owned fallback layer, allocated while running.
    pub(crate) fallback: Option<LayerId>,
}

impl LayerRegistry {
    /// Returns the designated default layer.
    #[must_use]
    pub fn default_layer(&self) -> Option<LayerId> {
        self.default.current
    }

    /// Returns the registry-owned fallback layer.
    #[must_use]
    pub fn fallback_layer(&self) -> Option<LayerId> {
        self.default.fallback
    }

    /// Returns whether `id` is the designated default layer.
    #[must_use]
    pub fn is_default(&self, id: LayerId) -> bool {
        self.default.current == Some(id)
    }

    /// Designates the layer that occupies slot 0.
    ///
    /// The previous default is disabled and moved off slot 0. `None` reverts
    /// to the fallback layer, as does a candidate that is dead or cannot be
    /// activated because its parent is inactive. A stopped registry is
    /// started first.
    pub fn set_default_layer(&mut self, store: &mut LayerStore, candidate: Option<LayerId>) {
        if !self.is_running() {
            self.start_with(store, candidate);
            return;
        }

        if let Some(id) = candidate {
            if self.is_default(id)
                && store.try_order(id) == Some(DEFAULT_SLOT)
                && self.slots.occupant(DEFAULT_SLOT) == Some(id)
            {
                return;
            }
        }

        let previous = self.default.current;
        if previous != candidate {
            self.unset_previous_default(store);
        }

        let Some(id) = candidate else {
            self.ensure_fallback(store);
            return;
        };

        let is_fallback = self.default.fallback == Some(id);
        if !store.is_alive(id) || (!is_fallback && !store.can_activate(id)) {
            if store.is_alive(id) {
                log::warn!(
                    "cannot use {} ({id}) as default layer, it cannot be activated",
                    store.name(id)
                );
            } else {
                log::warn!("cannot use {id} as default layer, it no longer exists");
            }
            self.observers
                .default_candidate_rejected(&DefaultCandidateRejectedEvent { layer: id });
            if self.is_default(id) {
                self.unset_previous_default(store);
            }
            self.ensure_fallback(store);
            return;
        }

        self.designate(store, id, previous);
    }

    /// Reverts to the fallback default layer.
    pub fn reset_default_layer(&mut self, store: &mut LayerStore) {
        if self.default.current.is_some() && self.default.current == self.default.fallback {
            self.ensure_fallback(store);
        } else {
            self.set_default_layer(store, None);
        }
    }

    /// Makes sure the fallback layer exists and that some layer is the
    /// default.
    ///
    /// Creates the fallback in `store` if it is missing. It becomes the
    /// default when no other layer is designated, and is re-activated if it
    /// is the default but was disabled or lost slot 0. A designated default
    /// that no longer exists in `store` is dropped first.
    pub fn ensure_fallback(&mut self, store: &mut LayerStore) {
        let fallback = match self.default.fallback.filter(|&id| store.is_alive(id)) {
            Some(id) => id,
            None => {
                let id = store.create_layer(LayerData::Default);
                store.set_name(id, FALLBACK_LAYER_NAME);
                self.default.fallback = Some(id);
                id
            }
        };
        store.set_parent(fallback, None);

        if let Some(stale) = self.default.current.filter(|&id| !store.is_alive(id)) {
            self.default.current = None;
            self.forget_stale(stale);
        }

        match self.default.current {
            None => self.set_default_layer(store, Some(fallback)),
            Some(current) if current == fallback => {
                if !store.is_active_and_enabled(fallback)
                    || self.slots.occupant(DEFAULT_SLOT) != Some(fallback)
                {
                    self.designate(store, fallback, Some(fallback));
                }
            }
            Some(_) => {}
        }
        self.observers.occupied_slots_updated();
    }

    fn designate(&mut self, store: &mut LayerStore, id: LayerId, previous: Option<LayerId>) {
        self.default.current = Some(id);
        if let Some(held) = self.slots.slot_of(id) {
            if held != DEFAULT_SLOT {
                self.slots.release(held, id);
            }
        }
        if let Some(other) = self.slots.occupant(DEFAULT_SLOT) {
            if other != id {
                self.slots.release(DEFAULT_SLOT, other);
            }
        }
        store.assign_order(id, DEFAULT_SLOT);
        store.set_active(id, true);
        store.set_enabled(id, true);
        self.enabled(store, id);

        if self.config.rescan_on_default_change {
            self.pending_rescan = true;
        }
        self.observers.occupied_slots_updated();
        if previous != Some(id) {
            log::info!("{} ({id}) is now the default layer", store.name(id));
            self.observers
                .default_layer_changed(&DefaultLayerChangedEvent { previous, current: id });
        }
    }

    fn unset_previous_default(&mut self, store: &mut LayerStore) {
        let Some(previous) = self.default.current.take() else {
            return;
        };
        let alive = store.is_alive(previous);

        if self.slots.occupant(DEFAULT_SLOT) == Some(previous) {
            self.slots.release(DEFAULT_SLOT, previous);
            self.disabled(previous);
            if alive {
                store.set_enabled(previous, false);
                log::info!(
                    "{} ({previous}) is no longer the default layer and is now disabled",
                    store.name(previous)
                );
            }
        }
        if !alive {
            return;
        }

        let order = store.order(previous);
        let keeps_order = order != DEFAULT_SLOT
            && self.slots.can_change_order_to(previous, order, false);
        if self.default.fallback != Some(previous) && !keeps_order {
            let overlay = store.data(previous).descriptor().prefer_overlay;
            let assigned = self.slots.first_unused(overlay);
            store.assign_order(previous, assigned);
            if self.known.contains(&previous) {
                self.slots.reserve(previous, assigned, false);
            }
        }
    }
}
