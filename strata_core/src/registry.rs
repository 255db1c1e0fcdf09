// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer registry: lifecycle tracking, slot assignment and provider
//! synchronization.
//!
//! A [`LayerRegistry`] is the reconciliation engine between the host's
//! [`LayerStore`] and the bound [`LayerProvider`]s. The host reports
//! lifecycle transitions of its layers; the registry assigns each known
//! layer a unique order slot, keeps a designated default layer in slot 0,
//! and once per frame hands the accumulated [`ChangeSet`] to the providers.
//!
//! Per layer the registry walks the states
//! `Unregistered → Created → Enabled ⇄ Disabled → Destroyed`. None of the
//! notification or update methods fail: unknown or dead handles are ignored,
//! order collisions are resolved by reassignment, and unusable default
//! candidates fall back to an internally owned layer.
//!
//! # Lifecycle
//!
//! A registry is created stopped. [`start`](LayerRegistry::start) (or the
//! first `created`/`enabled` notification) creates the fallback default layer
//! in the store and registers every live layer. With
//! [`RegistryConfig::auto_shutdown`] set, the registry stops itself as soon
//! as a removal leaves only the fallback layer behind.

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::changes::ChangeTracker;
pub use crate::changes::{ChangeSet, LayerRecord};
use crate::config::{RegistryConfig, RunMode};
use crate::default_layer::DefaultLayerState;
pub use crate::default_layer::FALLBACK_LAYER_NAME;
use crate::events::{
    FlushEvent, ObserverList, OrderReassignedEvent, RegistryObserver, SubscriptionId,
};
use crate::layer::{LayerId, LayerKind, LayerStore};
use crate::provider::{LayerProvider, ProviderKind};
use crate::slots::{DEFAULT_SLOT, OrderSlotTable};

/// Tracks composition layers and feeds their changes to layer providers.
pub struct LayerRegistry {
    pub(crate) config: RegistryConfig,
    running: bool,
    pub(crate) known: BTreeSet<LayerId>,
    pub(crate) slots: OrderSlotTable,
    pub(crate) changes: ChangeTracker,
    pub(crate) default: DefaultLayerState,
    production: Option<Box<dyn LayerProvider>>,
    emulation: Option<Box<dyn LayerProvider>>,
    pub(crate) observers: ObserverList,
    pub(crate) pending_rescan: bool,
    frame_index: u64,
}

impl core::fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayerRegistry")
            .field("config", &self.config)
            .field("running", &self.running)
            .field("known", &self.known.len())
            .field("slots", &self.slots)
            .field("default", &self.default)
            .field("production", &self.production.is_some())
            .field("emulation", &self.emulation.is_some())
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl LayerRegistry {
    /// Creates a stopped registry.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            running: false,
            known: BTreeSet::new(),
            slots: OrderSlotTable::new(),
            changes: ChangeTracker::new(),
            default: DefaultLayerState::default(),
            production: None,
            emulation: None,
            observers: ObserverList::new(),
            pending_rescan: false,
            frame_index: 0,
        }
    }

    // -- Lifecycle --

    /// Starts the registry if it is stopped.
    ///
    /// Creates the fallback default layer in `store`, registers every live
    /// layer and sends the known set to the bound providers.
    pub fn start(&mut self, store: &mut LayerStore) {
        if !self.running {
            self.start_with(store, None);
        }
    }

    pub(crate) fn start_with(&mut self, store: &mut LayerStore, preferred: Option<LayerId>) {
        self.running = true;
        log::info!("layer registry started");

        if preferred.is_some() {
            self.set_default_layer(store, preferred);
        }
        self.ensure_fallback(store);
        self.rescan(store);

        let records = self.known_records(store);
        for provider in [&mut self.production, &mut self.emulation]
            .into_iter()
            .flatten()
        {
            provider.set_initial_state(store, &records);
        }
        self.observers.started();
    }

    /// Stops the registry.
    ///
    /// Clears all registry state, destroys the fallback layer in `store` and
    /// calls [`cleanup_state`](LayerProvider::cleanup_state) on the bound
    /// providers, which stay bound.
    pub fn stop(&mut self, store: &mut LayerStore) {
        if !self.running {
            return;
        }
        self.running = false;
        self.known.clear();
        self.changes.clear_all();
        self.slots.clear();
        self.pending_rescan = false;
        self.default.current = None;
        if let Some(fallback) = self.default.fallback.take() {
            if store.is_alive(fallback) {
                store.destroy_layer(fallback);
            }
        }
        for provider in [&mut self.production, &mut self.emulation]
            .into_iter()
            .flatten()
        {
            provider.cleanup_state();
        }
        log::info!("layer registry stopped");
        self.observers.stopped();
    }

    /// Returns whether the registry is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -- Host notifications --

    /// Reports a new layer.
    ///
    /// Starts a stopped registry. A layer created at order 0 while the
    /// registry is stopped becomes the default layer.
    pub fn created(&mut self, store: &mut LayerStore, id: LayerId) {
        if !store.is_alive(id) {
            return;
        }
        if !self.running {
            let preferred = (store.order(id) == DEFAULT_SLOT
                || store.kind(id) == LayerKind::Default)
                .then_some(id);
            self.start_with(store, preferred);
        }
        self.register(store, id);
    }

    /// Reports a layer that became enabled and active.
    ///
    /// Unknown layers are registered first.
    pub fn enabled(&mut self, store: &mut LayerStore, id: LayerId) {
        if !store.is_alive(id) {
            return;
        }
        if !self.known.contains(&id) {
            self.created(store, id);
        }
        if !self.known.contains(&id) || !store.active_in_hierarchy(id) {
            return;
        }
        self.changes.notify_enabled(id);
        self.claim_slot(store, id);
    }

    /// Reports a layer that became disabled or inactive.
    pub fn disabled(&mut self, id: LayerId) {
        if self.running && self.known.contains(&id) {
            self.changes.notify_disabled(id);
        }
    }

    /// Reports a destroyed layer.
    ///
    /// The handle may already be stale in `store`.
    pub fn destroyed(&mut self, store: &mut LayerStore, id: LayerId) {
        if !self.running {
            return;
        }
        self.forget(id);
        if self.default.fallback == Some(id) {
            self.default.fallback = None;
        }
        if self.default.current == Some(id) {
            self.default.current = None;
            self.ensure_fallback(store);
        }
        self.check_shutdown(store);
    }

    /// Reports a configuration change of a known layer.
    pub fn state_changed(&mut self, id: LayerId) {
        if self.running && self.known.contains(&id) {
            self.changes.notify_modified(id);
        }
    }

    // -- Frame loop --

    /// Reconciles and flushes pending changes to the bound providers.
    ///
    /// Drains the store's queued state changes, re-establishes the default
    /// layer if needed, performs a pending rescan, then delivers the change
    /// set to the production provider followed by the emulation provider.
    /// Returns the flushed set. Does nothing while stopped.
    pub fn update(&mut self, store: &mut LayerStore) -> ChangeSet {
        if !self.running {
            return ChangeSet::default();
        }

        let stale: Vec<LayerId> = self
            .known
            .iter()
            .copied()
            .filter(|&id| !store.is_alive(id))
            .collect();
        for id in stale {
            self.forget_stale(id);
        }

        for id in store.take_state_changes() {
            if !self.known.contains(&id) {
                continue;
            }
            if self.is_default(id) && store.order(id) != DEFAULT_SLOT {
                log::warn!(
                    "order of default layer {} ({id}) is pinned to {DEFAULT_SLOT}",
                    store.name(id)
                );
                store.assign_order(id, DEFAULT_SLOT);
            }
            if self.slots.slot_of(id) != Some(store.order(id)) {
                self.claim_slot(store, id);
            }
            self.state_changed(id);
        }

        let default_ok = self.default.current.is_some_and(|id| {
            store.is_alive(id)
                && store.is_active_and_enabled(id)
                && self.slots.occupant(DEFAULT_SLOT) == Some(id)
        });
        if !default_ok {
            self.reset_default_layer(store);
        }

        if self.pending_rescan {
            self.rescan(store);
        }

        let changes = self.changes.flush(store);
        for provider in [&mut self.production, &mut self.emulation]
            .into_iter()
            .flatten()
        {
            provider.update_layers(store, &changes);
        }

        let event = FlushEvent {
            frame_index: self.frame_index,
            created: changes.created.len(),
            removed: changes.removed.len(),
            modified: changes.modified.len(),
            active: changes.active.len(),
        };
        if changes.has_deltas() {
            log::debug!(
                "flush {}: {} created, {} removed, {} modified, {} active",
                event.frame_index,
                event.created,
                event.removed,
                event.modified,
                event.active
            );
        }
        self.observers.flush(&event);
        self.frame_index += 1;
        self.changes.clear_single_shot();
        changes
    }

    /// Forwards the late-frame hook to the bound providers.
    pub fn late_update(&mut self) {
        if !self.running {
            return;
        }
        for provider in [&mut self.production, &mut self.emulation]
            .into_iter()
            .flatten()
        {
            provider.late_update();
        }
    }

    /// Marks the registry for a rebuild on the next [`update`](Self::update).
    pub fn request_rescan(&mut self) {
        self.pending_rescan = true;
    }

    /// Rebuilds registry state from every live layer in `store`.
    ///
    /// In [`RunMode::Editor`] all registry state is discarded first, so every
    /// layer is reported as created again. In [`RunMode::Player`] only the
    /// slot table is rebuilt.
    pub fn rescan(&mut self, store: &mut LayerStore) {
        if !self.running {
            return;
        }
        self.pending_rescan = false;
        match self.config.mode {
            RunMode::Editor => {
                self.known.clear();
                self.changes.clear_for_rescan();
                self.slots.clear();
            }
            RunMode::Player => self.slots.clear(),
        }

        let fallback = self.default.fallback.filter(|&id| store.is_alive(id));
        if let Some(fallback) = fallback.filter(|&id| self.is_default(id)) {
            self.register(store, fallback);
            self.enabled(store, fallback);
        }
        for id in store.live_layers() {
            if Some(id) == fallback {
                continue;
            }
            self.register(store, id);
            if store.is_active_and_enabled(id) {
                self.enabled(store, id);
            }
        }
        self.observers.occupied_slots_updated();
    }

    // -- Providers --

    /// Binds a provider for `kind`, returning the one it replaces.
    ///
    /// The outgoing provider receives
    /// [`cleanup_state`](LayerProvider::cleanup_state). If the registry is
    /// running, the incoming one receives
    /// [`set_initial_state`](LayerProvider::set_initial_state) with every
    /// known layer; otherwise it is synchronized on start.
    pub fn bind_provider(
        &mut self,
        store: &LayerStore,
        kind: ProviderKind,
        mut provider: Box<dyn LayerProvider>,
    ) -> Option<Box<dyn LayerProvider>> {
        let mut previous = self.binding_mut(kind).take();
        if let Some(previous) = &mut previous {
            previous.cleanup_state();
        }
        if self.running {
            let records = self.known_records(store);
            provider.set_initial_state(store, &records);
        }
        *self.binding_mut(kind) = Some(provider);
        log::info!("{kind:?} layer provider bound");
        previous
    }

    /// Unbinds the provider for `kind` after cleaning it up.
    pub fn unbind_provider(&mut self, kind: ProviderKind) -> Option<Box<dyn LayerProvider>> {
        let mut previous = self.binding_mut(kind).take();
        if let Some(previous) = &mut previous {
            previous.cleanup_state();
            log::info!("{kind:?} layer provider unbound");
        }
        previous
    }

    /// Returns the provider bound for `kind`.
    #[must_use]
    pub fn provider(&self, kind: ProviderKind) -> Option<&dyn LayerProvider> {
        match kind {
            ProviderKind::Production => self.production.as_deref(),
            ProviderKind::Emulation => self.emulation.as_deref(),
        }
    }

    fn binding_mut(&mut self, kind: ProviderKind) -> &mut Option<Box<dyn LayerProvider>> {
        match kind {
            ProviderKind::Production => &mut self.production,
            ProviderKind::Emulation => &mut self.emulation,
        }
    }

    // -- Observers --

    /// Subscribes an observer to registry events.
    pub fn subscribe(&mut self, observer: Box<dyn RegistryObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Removes a subscribed observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn RegistryObserver>> {
        self.observers.unsubscribe(id)
    }

    // -- Orders --

    /// Moves a layer to `order`, returning whether the move happened.
    ///
    /// Refuses orders held by another layer, order 0 for layers other than
    /// the default, and any order but 0 for the default layer.
    pub fn change_order(&mut self, store: &mut LayerStore, id: LayerId, order: i32) -> bool {
        if !store.is_alive(id) {
            return false;
        }
        if !self.running || !self.known.contains(&id) {
            store.set_order(id, order);
            return true;
        }
        let is_default = self.is_default(id);
        if is_default && order != DEFAULT_SLOT {
            return false;
        }
        if !self.slots.can_change_order_to(id, order, is_default) {
            return false;
        }
        if let Some(held) = self.slots.slot_of(id) {
            self.slots.release(held, id);
        }
        self.slots.reserve(id, order, is_default);
        store.assign_order(id, order);
        self.observers.occupied_slots_updated();
        true
    }

    // -- Queries --

    /// Iterates the known layers in handle order.
    pub fn known_layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.known.iter().copied()
    }

    /// Returns whether `id` is known to the registry.
    #[must_use]
    pub fn is_known(&self, id: LayerId) -> bool {
        self.known.contains(&id)
    }

    /// Returns a snapshot of a known layer.
    #[must_use]
    pub fn record(&self, store: &LayerStore, id: LayerId) -> Option<LayerRecord> {
        if !self.known.contains(&id) {
            return None;
        }
        store.try_order(id).map(|order| LayerRecord { id, order })
    }

    /// Returns the slot table.
    #[must_use]
    pub fn slots(&self) -> &OrderSlotTable {
        &self.slots
    }

    /// Returns the layers holding a slot, from the lowest slot up.
    #[must_use]
    pub fn occupied_layers(&self) -> Vec<LayerId> {
        self.slots.iter().map(|(_, id)| id).collect()
    }

    /// Returns the pending change lists.
    #[must_use]
    pub fn change_tracker(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Returns the number of flushes performed so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    // -- Internals --

    /// The `Unregistered → Created` transition. Known layers only re-claim
    /// their slot.
    pub(crate) fn register(&mut self, store: &mut LayerStore, id: LayerId) {
        if self.known.contains(&id) {
            self.claim_slot(store, id);
            return;
        }
        self.known.insert(id);
        self.changes.notify_created(id);

        // The first default-data layer replaces the fallback.
        let replaces_fallback =
            self.default.current.is_none() || self.default.current == self.default.fallback;
        if store.kind(id) == LayerKind::Default
            && self.default.fallback != Some(id)
            && replaces_fallback
        {
            self.set_default_layer(store, Some(id));
            if !self.is_default(id) {
                store.set_active(id, false);
            }
        }
        if self.known.contains(&id) {
            self.claim_slot(store, id);
        }
    }

    /// Reserves the layer's order, or reassigns it to the nearest free slot
    /// on collision.
    pub(crate) fn claim_slot(&mut self, store: &mut LayerStore, id: LayerId) {
        let is_default = self.is_default(id);
        if self.default.fallback == Some(id) && !is_default {
            return;
        }

        let requested = store.order(id);
        let held = self.slots.slot_of(id);
        if held == Some(requested) {
            store.mark_order_initialized(id);
            return;
        }
        if let Some(held) = held {
            self.slots.release(held, id);
        }
        if self.slots.reserve(id, requested, is_default) {
            store.mark_order_initialized(id);
            self.observers.occupied_slots_updated();
            return;
        }

        let assigned = if requested == DEFAULT_SLOT {
            self.slots
                .first_unused(store.data(id).descriptor().prefer_overlay)
        } else {
            self.slots.next_unused_auto(requested)
        };
        if store.order_initialized(id) {
            log::warn!(
                "layer {} ({id}) cannot use order {requested}, it is already occupied",
                store.name(id)
            );
        }
        store.assign_order(id, assigned);
        if !self.slots.reserve(id, assigned, false) {
            log::warn!("no free order slot left for layer {} ({id})", store.name(id));
            return;
        }
        log::info!(
            "layer {} ({id}) set to next available order {assigned}",
            store.name(id)
        );
        self.observers.order_reassigned(&OrderReassignedEvent {
            layer: id,
            requested,
            assigned,
        });
        self.observers.occupied_slots_updated();
    }

    /// Drops a layer from the known set and the slot table.
    pub(crate) fn forget(&mut self, id: LayerId) {
        if self.known.remove(&id) {
            self.changes.notify_destroyed(id);
        }
        if let Some(order) = self.slots.slot_of(id) {
            self.slots.release(order, id);
            self.observers.occupied_slots_updated();
        }
    }

    /// Forgets a layer the host freed without a destroyed notification.
    pub(crate) fn forget_stale(&mut self, id: LayerId) {
        if self.known.contains(&id) || self.slots.slot_of(id).is_some() {
            log::warn!("layer {id} was removed from the store without notice");
            self.forget(id);
        }
    }

    fn check_shutdown(&mut self, store: &mut LayerStore) {
        if !self.config.auto_shutdown {
            return;
        }
        let only_fallback = self.slots.len() == 1
            && self.default.fallback.is_some()
            && self.slots.occupant(DEFAULT_SLOT) == self.default.fallback;
        if only_fallback {
            if self.changes.has_pending_removals() {
                self.update(store);
            }
            self.stop(store);
        }
    }

    fn known_records(&self, store: &LayerStore) -> Vec<LayerRecord> {
        let mut records: Vec<LayerRecord> = self
            .known
            .iter()
            .filter_map(|&id| store.try_order(id).map(|order| LayerRecord { id, order }))
            .collect();
        records.sort_by_key(|r| (r.order, r.id));
        records
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;
    use crate::layer::LayerData;
    use crate::testing::{RecordingObserver, RecordingProvider, bind_recording};

    fn running(config: RegistryConfig) -> (LayerStore, LayerRegistry) {
        let mut store = LayerStore::new();
        let mut registry = LayerRegistry::new(config);
        registry.start(&mut store);
        (store, registry)
    }

    fn quad(store: &mut LayerStore, order: i32) -> LayerId {
        let id = store.create_layer(LayerData::default());
        store.set_order(id, order);
        id
    }

    fn ids(records: &[LayerRecord]) -> Vec<LayerId> {
        records.iter().map(|r| r.id).collect()
    }

    fn assert_slots_unique(registry: &LayerRegistry) {
        let mut seen = BTreeSet::new();
        for (_, id) in registry.slots().iter() {
            assert!(seen.insert(id), "{id:?} holds more than one slot");
        }
    }

    #[test]
    fn start_creates_the_fallback_default() {
        let (store, registry) = running(RegistryConfig::player());
        let fallback = registry.fallback_layer().expect("fallback exists");
        assert!(store.is_alive(fallback), "fallback lives in the store");
        assert_eq!(registry.default_layer(), Some(fallback), "fallback is default");
        assert_eq!(registry.slots().occupant(0), Some(fallback), "slot 0");
        assert_eq!(store.kind(fallback), LayerKind::Default, "default data");
    }

    #[test]
    fn created_at_order_zero_starts_and_becomes_default() {
        let mut store = LayerStore::new();
        let mut registry = LayerRegistry::new(RegistryConfig::player());
        let l1 = quad(&mut store, 0);

        registry.created(&mut store, l1);

        assert!(registry.is_running(), "lazily started");
        assert_eq!(registry.default_layer(), Some(l1), "l1 is the default");
        assert_eq!(registry.slots().occupant(0), Some(l1), "l1 holds slot 0");
        assert_ne!(registry.fallback_layer(), Some(l1), "fallback still allocated");
    }

    #[test]
    fn colliding_orders_are_reassigned() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let observer = Rc::new(RefCell::new(RecordingObserver::default()));
        registry.subscribe(Box::new(observer.clone()));
        let l1 = quad(&mut store, 3);
        let l2 = quad(&mut store, 3);

        registry.created(&mut store, l1);
        registry.created(&mut store, l2);
        registry.enabled(&mut store, l1);
        registry.enabled(&mut store, l2);

        assert_eq!(store.order(l1), 3, "first keeps its order");
        assert_eq!(store.order(l2), 4, "second moves to the next free slot");
        assert_eq!(registry.slots().occupant(4), Some(l2), "slot reserved");
        assert_eq!(
            observer.borrow().reassigned,
            vec![OrderReassignedEvent {
                layer: l2,
                requested: 3,
                assigned: 4
            }],
            "reassignment reported"
        );
        assert!(observer.borrow().slot_updates > 0, "slot changes reported");

        let set = registry.update(&mut store);
        let active = ids(&set.active);
        assert!(active.contains(&l1) && active.contains(&l2), "both enabled");
        assert_slots_unique(&registry);
    }

    #[test]
    fn order_zero_collisions_follow_the_preferred_side() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let quad_layer = quad(&mut store, 0);
        let projection = store.create_layer(LayerData::Projection);

        registry.created(&mut store, quad_layer);
        registry.created(&mut store, projection);

        assert_eq!(store.order(quad_layer), 1, "quad prefers overlay");
        assert_eq!(store.order(projection), -1, "projection prefers underlay");
    }

    #[test]
    fn enable_disable_destroy_in_one_frame_is_only_removed() {
        let (mut store, mut registry) = running(RegistryConfig {
            auto_shutdown: false,
            ..RegistryConfig::player()
        });
        let l1 = quad(&mut store, 2);
        registry.created(&mut store, l1);
        registry.update(&mut store);

        registry.enabled(&mut store, l1);
        registry.disabled(l1);
        registry.destroyed(&mut store, l1);
        store.destroy_layer(l1);

        let set = registry.update(&mut store);
        assert_eq!(set.removed, [l1], "removed");
        assert!(!ids(&set.modified).contains(&l1), "not modified");
        assert!(!ids(&set.active).contains(&l1), "not active");
        assert!(!ids(&set.created).contains(&l1), "not created");
    }

    #[test]
    fn destroying_the_last_layer_shuts_down() {
        let mut store = LayerStore::new();
        let mut registry = LayerRegistry::new(RegistryConfig::player());
        let provider = bind_recording(&mut registry, &store, ProviderKind::Production);
        let l1 = quad(&mut store, 1);
        registry.enabled(&mut store, l1);
        registry.update(&mut store);
        let fallback = registry.fallback_layer().expect("fallback exists");

        registry.destroyed(&mut store, l1);
        store.destroy_layer(l1);

        let provider = provider.borrow();
        let last = provider.updates.last().expect("final flush");
        assert_eq!(last.removed, [l1], "removal flushed before stopping");
        assert!(!registry.is_running(), "stopped");
        assert!(registry.slots().is_empty(), "slots released");
        assert!(!store.is_alive(fallback), "fallback destroyed");
        assert_eq!(registry.default_layer(), None, "no default while stopped");
        assert_eq!(provider.cleanups, 1, "provider cleaned up");
    }

    #[test]
    fn rebinding_cleans_up_then_resyncs() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        let l2 = quad(&mut store, -1);
        registry.enabled(&mut store, l1);
        registry.enabled(&mut store, l2);

        let a = bind_recording(&mut registry, &store, ProviderKind::Production);
        let b = Rc::new(RefCell::new(RecordingProvider::default()));
        let replaced = registry.bind_provider(&store, ProviderKind::Production, Box::new(b.clone()));

        assert!(replaced.is_some(), "a was returned");
        assert_eq!(a.borrow().cleanups, 1, "a cleaned up once");
        let b = b.borrow();
        assert_eq!(b.initial_states.len(), 1, "b resynced once");
        assert_eq!(
            ids(&b.initial_states[0]),
            [l2, registry.fallback_layer().expect("fallback"), l1],
            "full known set in order"
        );
        assert_eq!(b.cleanups, 0, "b not cleaned up");
    }

    #[test]
    fn state_changed_is_idempotent() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        registry.enabled(&mut store, l1);
        registry.update(&mut store);

        registry.state_changed(l1);
        registry.state_changed(l1);
        let set = registry.update(&mut store);
        assert_eq!(ids(&set.modified), [l1], "one modified entry");
    }

    #[test]
    fn store_setters_surface_as_modified() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        registry.enabled(&mut store, l1);
        registry.update(&mut store);

        store.set_blend_type(l1, crate::layer::BlendType::Additive);
        let set = registry.update(&mut store);
        assert_eq!(ids(&set.modified), [l1], "setter drained into modified");
    }

    #[test]
    fn store_order_changes_move_the_slot() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        let l2 = quad(&mut store, 2);
        registry.enabled(&mut store, l1);
        registry.enabled(&mut store, l2);
        registry.update(&mut store);

        store.set_order(l1, 5);
        store.set_order(l2, 5);
        registry.update(&mut store);

        assert_eq!(registry.slots().occupant(5), Some(l1), "first mover wins");
        assert_eq!(store.order(l2), 6, "second is reassigned");
        assert!(!registry.slots().contains(1), "old slot released");
        assert_slots_unique(&registry);
    }

    #[test]
    fn active_holds_only_enabled_layers_sorted() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let a = quad(&mut store, 3);
        let b = quad(&mut store, -2);
        let c = quad(&mut store, 7);
        registry.enabled(&mut store, a);
        registry.enabled(&mut store, b);
        registry.enabled(&mut store, c);
        registry.disabled(c);

        let set = registry.update(&mut store);
        let fallback = registry.fallback_layer().expect("fallback");
        assert_eq!(ids(&set.active), [b, fallback, a], "sorted, c excluded");
    }

    #[test]
    fn unknown_layers_are_ignored_except_enabled() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);

        registry.disabled(l1);
        registry.state_changed(l1);
        assert!(!registry.is_known(l1), "still unknown");

        registry.enabled(&mut store, l1);
        assert!(registry.is_known(l1), "promoted");
        let set = registry.update(&mut store);
        assert!(ids(&set.created).contains(&l1), "reported as created");
        assert!(ids(&set.active).contains(&l1), "and active");
    }

    #[test]
    fn dead_handles_are_ignored() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        store.destroy_layer(l1);
        registry.created(&mut store, l1);
        registry.enabled(&mut store, l1);
        assert!(!registry.is_known(l1), "never registered");
        assert!(!registry.change_order(&mut store, l1, 2), "no order change");
    }

    #[test]
    fn slot_zero_stays_occupied() {
        let (mut store, mut registry) = running(RegistryConfig {
            auto_shutdown: false,
            ..RegistryConfig::player()
        });
        let custom = store.create_layer(LayerData::Default);
        registry.created(&mut store, custom);
        assert_eq!(registry.default_layer(), Some(custom), "default data wins");
        registry.update(&mut store);

        store.set_active(custom, false);
        registry.disabled(custom);
        registry.update(&mut store);
        let fallback = registry.fallback_layer().expect("fallback");
        assert_eq!(registry.default_layer(), Some(fallback), "inactive default replaced");
        assert_eq!(registry.slots().occupant(0), Some(fallback), "slot 0 held");

        registry.set_default_layer(&mut store, Some(custom));
        registry.destroyed(&mut store, custom);
        store.destroy_layer(custom);
        registry.update(&mut store);
        assert_eq!(registry.slots().occupant(0), Some(fallback), "fallback again");
    }

    #[test]
    fn change_order_respects_reservations() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        let l2 = quad(&mut store, 2);
        registry.enabled(&mut store, l1);
        registry.enabled(&mut store, l2);

        assert!(!registry.change_order(&mut store, l1, 2), "taken");
        assert!(!registry.change_order(&mut store, l1, 0), "reserved");
        assert!(registry.change_order(&mut store, l1, -4), "free");
        assert_eq!(registry.slots().occupant(-4), Some(l1), "moved");
        assert!(!registry.slots().contains(1), "old slot released");

        let fallback = registry.fallback_layer().expect("fallback");
        assert!(!registry.change_order(&mut store, fallback, 3), "default is pinned");
    }

    #[test]
    fn stopped_registry_ignores_updates() {
        let mut store = LayerStore::new();
        let mut registry = LayerRegistry::new(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        registry.disabled(l1);
        registry.state_changed(l1);
        assert!(registry.update(&mut store).is_empty(), "nothing flushed");
        assert!(!registry.is_running(), "still stopped");
    }

    #[test]
    fn providers_resync_on_restart() {
        let mut store = LayerStore::new();
        let mut registry = LayerRegistry::new(RegistryConfig {
            auto_shutdown: false,
            ..RegistryConfig::player()
        });
        let provider = bind_recording(&mut registry, &store, ProviderKind::Emulation);
        assert!(provider.borrow().initial_states.is_empty(), "not synced while stopped");

        registry.start(&mut store);
        registry.stop(&mut store);
        registry.start(&mut store);
        let provider = provider.borrow();
        assert_eq!(provider.initial_states.len(), 2, "synced on each start");
        assert_eq!(provider.cleanups, 1, "cleaned up on stop");
    }

    #[test]
    fn flushes_reach_production_then_emulation() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let production = bind_recording(&mut registry, &store, ProviderKind::Production);
        let emulation = bind_recording(&mut registry, &store, ProviderKind::Emulation);
        let l1 = quad(&mut store, 1);
        registry.enabled(&mut store, l1);

        let set = registry.update(&mut store);
        registry.late_update();
        assert_eq!(production.borrow().updates, [set.clone()], "production got the set");
        assert_eq!(emulation.borrow().updates, [set], "emulation got the same set");
        assert_eq!(production.borrow().late_updates, 1, "late hook forwarded");
    }

    #[test]
    fn editor_rescan_reports_everything_as_created() {
        let (mut store, mut registry) = running(RegistryConfig {
            auto_shutdown: false,
            ..RegistryConfig::editor()
        });
        let l1 = quad(&mut store, 1);
        registry.enabled(&mut store, l1);
        registry.update(&mut store);

        registry.request_rescan();
        let set = registry.update(&mut store);
        assert!(ids(&set.created).contains(&l1), "re-created");
        assert!(ids(&set.active).contains(&l1), "still active");
        assert_eq!(registry.slots().occupant(1), Some(l1), "slot rebuilt");
    }

    #[test]
    fn player_rescan_keeps_pending_lists() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 1);
        registry.enabled(&mut store, l1);
        registry.update(&mut store);
        store.set_enabled(l1, false);
        registry.disabled(l1);

        registry.rescan(&mut store);
        assert!(registry.change_tracker().is_modified(l1), "modified kept");
        assert!(!registry.change_tracker().is_active(l1), "not re-enabled");
        assert_eq!(registry.slots().occupant(1), Some(l1), "slot rebuilt");
    }

    #[test]
    fn lifecycle_events_are_observed() {
        let mut store = LayerStore::new();
        let mut registry = LayerRegistry::new(RegistryConfig::player());
        let observer = Rc::new(RefCell::new(RecordingObserver::default()));
        let sub = registry.subscribe(Box::new(observer.clone()));

        let l1 = quad(&mut store, 1);
        registry.enabled(&mut store, l1);
        registry.update(&mut store);
        registry.destroyed(&mut store, l1);

        {
            let observer = observer.borrow();
            assert_eq!(observer.started, 1, "started once");
            assert_eq!(observer.stopped, 1, "auto shutdown observed");
            assert_eq!(observer.flushes.len(), 2, "regular and final flush");
            assert_eq!(observer.flushes[1].removed, 1, "final flush removes l1");
        }

        assert!(registry.unsubscribe(sub).is_some(), "unsubscribed");
        registry.start(&mut store);
        assert_eq!(observer.borrow().started, 1, "no delivery after unsubscribe");
    }

    #[test]
    fn fallback_freed_by_the_host_is_replaced_in_one_update() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let old = registry.fallback_layer().expect("fallback exists");
        store.destroy_layer(old);

        let set = registry.update(&mut store);

        let fallback = registry.fallback_layer().expect("replacement exists");
        assert_ne!(fallback, old, "new fallback allocated");
        assert!(store.is_alive(fallback), "replacement lives in the store");
        assert_eq!(registry.default_layer(), Some(fallback), "replacement is default");
        assert_eq!(
            registry.slots().occupant(DEFAULT_SLOT),
            Some(fallback),
            "slot 0 held by a live layer"
        );
        assert!(!registry.is_known(old), "stale handle forgotten");
        assert_eq!(set.removed, [old], "providers told about the loss");
        assert!(ids(&set.active).contains(&fallback), "replacement active");
    }

    #[test]
    fn layers_freed_by_the_host_release_their_slot() {
        let (mut store, mut registry) = running(RegistryConfig::player());
        let l1 = quad(&mut store, 2);
        registry.enabled(&mut store, l1);
        registry.update(&mut store);

        store.destroy_layer(l1);
        let set = registry.update(&mut store);

        assert!(!registry.slots().contains(2), "slot released");
        assert!(!registry.is_known(l1), "forgotten");
        assert_eq!(set.removed, [l1], "reported as removed");
        assert!(set.active.iter().all(|r| r.id != l1), "not active");
    }
}

#[cfg(test)]
mod properties {
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;

    use proptest::prelude::*;

    use super::*;
    use crate::layer::LayerData;

    /// One host action. Layer operands index into the layers created so far.
    #[derive(Clone, Debug)]
    enum Step {
        Create { kind: usize, order: i32 },
        Enable(usize),
        Disable(usize),
        Destroy(usize),
        /// Freed in the store without telling the registry.
        Vanish(usize),
        VanishFallback,
        SetOrder(usize, i32),
        SetDefault(Option<usize>),
        StateChanged(usize),
        Update,
    }

    fn any_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            3 => (0..LayerKind::ALL.len(), -3_i32..4)
                .prop_map(|(kind, order)| Step::Create { kind, order }),
            2 => any::<usize>().prop_map(Step::Enable),
            1 => any::<usize>().prop_map(Step::Disable),
            1 => any::<usize>().prop_map(Step::Destroy),
            1 => any::<usize>().prop_map(Step::Vanish),
            1 => Just(Step::VanishFallback),
            1 => (any::<usize>(), -3_i32..4).prop_map(|(n, order)| Step::SetOrder(n, order)),
            1 => proptest::option::of(any::<usize>()).prop_map(Step::SetDefault),
            1 => any::<usize>().prop_map(Step::StateChanged),
            3 => Just(Step::Update),
        ]
    }

    fn any_config() -> impl Strategy<Value = RegistryConfig> {
        (any::<bool>(), any::<bool>()).prop_map(|(editor, auto_shutdown)| {
            let preset = if editor {
                RegistryConfig::editor()
            } else {
                RegistryConfig::player()
            };
            RegistryConfig {
                auto_shutdown,
                ..preset
            }
        })
    }

    fn nth(layers: &[LayerId], n: usize) -> Option<LayerId> {
        (!layers.is_empty()).then(|| layers[n % layers.len()])
    }

    fn live(layers: &[LayerId], store: &LayerStore, n: usize) -> Option<LayerId> {
        nth(layers, n).filter(|&id| store.is_alive(id))
    }

    fn check(
        store: &LayerStore,
        registry: &LayerRegistry,
        set: &ChangeSet,
    ) -> Result<(), TestCaseError> {
        for record in &set.active {
            let id = record.id;
            prop_assert!(store.is_alive(id), "dead {id:?} flushed as active");
            prop_assert!(store.is_active_and_enabled(id), "{id:?} active but disabled");
            prop_assert!(registry.is_known(id), "{id:?} active but unknown");
        }

        let created: BTreeSet<_> = set.created.iter().map(|r| r.id).collect();
        let modified: BTreeSet<_> = set.modified.iter().map(|r| r.id).collect();
        let removed: BTreeSet<_> = set.removed.iter().copied().collect();
        prop_assert!(created.is_disjoint(&modified), "created and modified overlap");
        prop_assert!(created.is_disjoint(&removed), "created and removed overlap");
        prop_assert!(modified.is_disjoint(&removed), "modified and removed overlap");
        prop_assert!(
            set.active.iter().all(|r| !removed.contains(&r.id)),
            "removed layer still active"
        );

        let mut holders = BTreeSet::new();
        for (order, id) in registry.slots().iter() {
            prop_assert!(holders.insert(id), "{id:?} holds two slots");
            prop_assert!(store.is_alive(id), "slot {order} held by dead {id:?}");
        }

        if registry.is_running() {
            let Some(default) = registry.default_layer() else {
                return Err(TestCaseError::fail("no default layer while running"));
            };
            prop_assert!(store.is_alive(default), "default {default:?} is dead");
            prop_assert!(
                store.is_active_and_enabled(default),
                "default {default:?} is not active"
            );
            prop_assert_eq!(
                registry.slots().occupant(DEFAULT_SLOT),
                Some(default),
                "default does not hold slot 0"
            );
            prop_assert_eq!(store.order(default), DEFAULT_SLOT, "default order");
        }
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn invariants_hold_after_every_update(
            config in any_config(),
            steps in prop::collection::vec(any_step(), 1..80),
        ) {
            let mut store = LayerStore::new();
            let mut registry = LayerRegistry::new(config);
            let mut layers = Vec::new();

            for step in steps {
                match step {
                    Step::Create { kind, order } => {
                        let id = store.create_layer(LayerData::new(LayerKind::ALL[kind]));
                        store.set_order(id, order);
                        registry.created(&mut store, id);
                        layers.push(id);
                    }
                    Step::Enable(n) => {
                        if let Some(id) = live(&layers, &store, n) {
                            store.set_active(id, true);
                            store.set_enabled(id, true);
                            registry.enabled(&mut store, id);
                        }
                    }
                    Step::Disable(n) => {
                        if let Some(id) = live(&layers, &store, n) {
                            store.set_enabled(id, false);
                            registry.disabled(id);
                        }
                    }
                    Step::Destroy(n) => {
                        if let Some(id) = live(&layers, &store, n) {
                            registry.destroyed(&mut store, id);
                            store.destroy_layer(id);
                        }
                    }
                    Step::Vanish(n) => {
                        if let Some(id) = live(&layers, &store, n) {
                            store.destroy_layer(id);
                        }
                    }
                    Step::VanishFallback => {
                        if let Some(id) = registry.fallback_layer().filter(|&id| store.is_alive(id)) {
                            store.destroy_layer(id);
                        }
                    }
                    Step::SetOrder(n, order) => {
                        if let Some(id) = live(&layers, &store, n) {
                            store.set_order(id, order);
                        }
                    }
                    Step::SetDefault(n) => {
                        let candidate = n.and_then(|n| nth(&layers, n));
                        registry.set_default_layer(&mut store, candidate);
                    }
                    Step::StateChanged(n) => {
                        if let Some(id) = nth(&layers, n) {
                            registry.state_changed(id);
                        }
                    }
                    Step::Update => {
                        let set = registry.update(&mut store);
                        check(&store, &registry, &set)?;
                    }
                }
            }

            let set = registry.update(&mut store);
            check(&store, &registry, &set)?;
        }
    }
}
