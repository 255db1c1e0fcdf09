// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry events and observers.
//!
//! This module provides a [`RegistryObserver`] trait with per-event methods
//! that the registry calls as it starts, stops, assigns slots, changes the
//! default layer and flushes. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! Observers are registered explicitly through
//! [`LayerRegistry::subscribe`](crate::registry::LayerRegistry::subscribe),
//! which returns a [`SubscriptionId`] for later removal. Events are delivered
//! to observers in subscription order.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::layer::LayerId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a layer could not keep its requested order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderReassignedEvent {
    /// The layer that moved.
    pub layer: LayerId,
    /// The order it asked for.
    pub requested: i32,
    /// The order it was given.
    pub assigned: i32,
}

/// Emitted when the designated default layer changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultLayerChangedEvent {
    /// The previous default layer. `None` if it had already been released,
    /// as when reverting to the fallback.
    pub previous: Option<LayerId>,
    /// The new default layer.
    pub current: LayerId,
}

/// Emitted when a layer cannot become the default layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultCandidateRejectedEvent {
    /// The rejected candidate.
    pub layer: LayerId,
}

/// Emitted after each flush to the providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlushEvent {
    /// Monotonic flush counter, starting at 0.
    pub frame_index: u64,
    /// Number of created layers in the flush.
    pub created: usize,
    /// Number of removed layers in the flush.
    pub removed: usize,
    /// Number of modified layers in the flush.
    pub modified: usize,
    /// Number of active layers in the flush.
    pub active: usize,
}

// ---------------------------------------------------------------------------
// RegistryObserver trait
// ---------------------------------------------------------------------------

/// Receives events from a registry.
pub trait RegistryObserver {
    /// Called when the registry starts.
    fn on_started(&mut self) {}

    /// Called when the registry stops.
    fn on_stopped(&mut self) {}

    /// Called when the set of occupied order slots changes.
    fn on_occupied_slots_updated(&mut self) {}

    /// Called when a layer was moved off its requested order.
    fn on_order_reassigned(&mut self, e: &OrderReassignedEvent) {
        _ = e;
    }

    /// Called when a new default layer is designated.
    fn on_default_layer_changed(&mut self, e: &DefaultLayerChangedEvent) {
        _ = e;
    }

    /// Called when a default layer candidate is rejected.
    fn on_default_candidate_rejected(&mut self, e: &DefaultCandidateRejectedEvent) {
        _ = e;
    }

    /// Called after a flush.
    fn on_flush(&mut self, e: &FlushEvent) {
        _ = e;
    }
}

/// A [`RegistryObserver`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl RegistryObserver for NoopObserver {}

/// Shares an observer between the registry and the host.
impl<T: RegistryObserver> RegistryObserver for Rc<RefCell<T>> {
    fn on_started(&mut self) {
        self.borrow_mut().on_started();
    }

    fn on_stopped(&mut self) {
        self.borrow_mut().on_stopped();
    }

    fn on_occupied_slots_updated(&mut self) {
        self.borrow_mut().on_occupied_slots_updated();
    }

    fn on_order_reassigned(&mut self, e: &OrderReassignedEvent) {
        self.borrow_mut().on_order_reassigned(e);
    }

    fn on_default_layer_changed(&mut self, e: &DefaultLayerChangedEvent) {
        self.borrow_mut().on_default_layer_changed(e);
    }

    fn on_default_candidate_rejected(&mut self, e: &DefaultCandidateRejectedEvent) {
        self.borrow_mut().on_default_candidate_rejected(e);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.borrow_mut().on_flush(e);
    }
}

// ---------------------------------------------------------------------------
// ObserverList
// ---------------------------------------------------------------------------

/// Handle returned when subscribing an observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of subscribed observers.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<(SubscriptionId, Box<dyn RegistryObserver>)>,
    next_id: u64,
}

impl core::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl ObserverList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observer.
    pub fn subscribe(&mut self, observer: Box<dyn RegistryObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Removes and returns an observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn RegistryObserver>> {
        let pos = self.observers.iter().position(|(sid, _)| *sid == id)?;
        Some(self.observers.remove(pos).1)
    }

    /// Returns the number of subscribed observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Emits a started event.
    pub fn started(&mut self) {
        self.each(|o| o.on_started());
    }

    /// Emits a stopped event.
    pub fn stopped(&mut self) {
        self.each(|o| o.on_stopped());
    }

    /// Emits an occupied-slots event.
    pub fn occupied_slots_updated(&mut self) {
        self.each(|o| o.on_occupied_slots_updated());
    }

    /// Emits an [`OrderReassignedEvent`].
    pub fn order_reassigned(&mut self, e: &OrderReassignedEvent) {
        self.each(|o| o.on_order_reassigned(e));
    }

    /// Emits a [`DefaultLayerChangedEvent`].
    pub fn default_layer_changed(&mut self, e: &DefaultLayerChangedEvent) {
        self.each(|o| o.on_default_layer_changed(e));
    }

    /// Emits a [`DefaultCandidateRejectedEvent`].
    pub fn default_candidate_rejected(&mut self, e: &DefaultCandidateRejectedEvent) {
        self.each(|o| o.on_default_candidate_rejected(e));
    }

    /// Emits a [`FlushEvent`].
    pub fn flush(&mut self, e: &FlushEvent) {
        self.each(|o| o.on_flush(e));
    }

    fn each(&mut self, mut f: impl FnMut(&mut dyn RegistryObserver)) {
        for (_, observer) in &mut self.observers {
            f(observer.as_mut());
        }
    }
}
