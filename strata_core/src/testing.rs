// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Test doubles shared by the unit tests.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::changes::{ChangeSet, LayerRecord};
use crate::events::{
    DefaultCandidateRejectedEvent, DefaultLayerChangedEvent, FlushEvent, OrderReassignedEvent,
    RegistryObserver,
};
use crate::layer::{LayerId, LayerStore};
use crate::provider::{LayerProvider, ProviderKind};
use crate::registry::LayerRegistry;

/// Provider that records every call it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingProvider {
    pub(crate) initial_states: Vec<Vec<LayerRecord>>,
    pub(crate) cleanups: usize,
    pub(crate) updates: Vec<ChangeSet>,
    pub(crate) late_updates: usize,
}

impl LayerProvider for RecordingProvider {
    fn set_initial_state(&mut self, _store: &LayerStore, layers: &[LayerRecord]) {
        self.initial_states.push(layers.to_vec());
    }

    fn cleanup_state(&mut self) {
        self.cleanups += 1;
    }

    fn update_layers(&mut self, _store: &LayerStore, changes: &ChangeSet) {
        self.updates.push(changes.clone());
    }

    fn late_update(&mut self) {
        self.late_updates += 1;
    }
}

/// Binds a fresh [`RecordingProvider`] and returns a handle to inspect it.
pub(crate) fn bind_recording(
    registry: &mut LayerRegistry,
    store: &LayerStore,
    kind: ProviderKind,
) -> Rc<RefCell<RecordingProvider>> {
    let provider = Rc::new(RefCell::new(RecordingProvider::default()));
    registry.bind_provider(store, kind, Box::new(provider.clone()));
    provider
}

/// Observer that records the events it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    pub(crate) started: usize,
    pub(crate) stopped: usize,
    pub(crate) slot_updates: usize,
    pub(crate) reassigned: Vec<OrderReassignedEvent>,
    pub(crate) default_changes: Vec<DefaultLayerChangedEvent>,
    pub(crate) rejected: Vec<LayerId>,
    pub(crate) flushes: Vec<FlushEvent>,
}

impl RegistryObserver for RecordingObserver {
    fn on_started(&mut self) {
        self.started += 1;
    }

    fn on_stopped(&mut self) {
        self.stopped += 1;
    }

    fn on_occupied_slots_updated(&mut self) {
        self.slot_updates += 1;
    }

    fn on_order_reassigned(&mut self, e: &OrderReassignedEvent) {
        self.reassigned.push(*e);
    }

    fn on_default_layer_changed(&mut self, e: &DefaultLayerChangedEvent) {
        self.default_changes.push(*e);
    }

    fn on_default_candidate_rejected(&mut self, e: &DefaultCandidateRejectedEvent) {
        self.rejected.push(e.layer);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.flushes.push(*e);
    }
}
