// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderObserver`] implements [`RegistryObserver`] and appends every
//! event it receives to a list of [`RecordedEvent`]s. Share it with the
//! registry through `Rc<RefCell<_>>` to read the log back, or hand the events
//! to [`json::export`](crate::json::export).

use strata_core::events::{
    DefaultCandidateRejectedEvent, DefaultLayerChangedEvent, FlushEvent, OrderReassignedEvent,
    RegistryObserver,
};

/// A recorded registry event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// The registry started.
    Started,
    /// The registry stopped.
    Stopped,
    /// The set of occupied order slots changed.
    OccupiedSlotsUpdated,
    /// A layer was moved off its requested order.
    OrderReassigned(OrderReassignedEvent),
    /// A new default layer was designated.
    DefaultLayerChanged(DefaultLayerChangedEvent),
    /// A default layer candidate was rejected.
    DefaultCandidateRejected(DefaultCandidateRejectedEvent),
    /// Changes were flushed to the providers.
    Flush(FlushEvent),
}

impl RecordedEvent {
    /// Short event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::Stopped => "Stopped",
            Self::OccupiedSlotsUpdated => "OccupiedSlotsUpdated",
            Self::OrderReassigned(_) => "OrderReassigned",
            Self::DefaultLayerChanged(_) => "DefaultLayerChanged",
            Self::DefaultCandidateRejected(_) => "DefaultCandidateRejected",
            Self::Flush(_) => "Flush",
        }
    }
}

/// A [`RegistryObserver`] that keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct RecorderObserver {
    events: Vec<RecordedEvent>,
    skip_slot_updates: bool,
}

impl RecorderObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops [`RecordedEvent::OccupiedSlotsUpdated`], which is frequent and
    /// carries no payload.
    #[must_use]
    pub fn skip_slot_updates(mut self, skip: bool) -> Self {
        self.skip_slot_updates = skip;
        self
    }

    /// Returns the recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Forgets all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RegistryObserver for RecorderObserver {
    fn on_started(&mut self) {
        self.events.push(RecordedEvent::Started);
    }

    fn on_stopped(&mut self) {
        self.events.push(RecordedEvent::Stopped);
    }

    fn on_occupied_slots_updated(&mut self) {
        if !self.skip_slot_updates {
            self.events.push(RecordedEvent::OccupiedSlotsUpdated);
        }
    }

    fn on_order_reassigned(&mut self, e: &OrderReassignedEvent) {
        self.events.push(RecordedEvent::OrderReassigned(*e));
    }

    fn on_default_layer_changed(&mut self, e: &DefaultLayerChangedEvent) {
        self.events.push(RecordedEvent::DefaultLayerChanged(*e));
    }

    fn on_default_candidate_rejected(&mut self, e: &DefaultCandidateRejectedEvent) {
        self.events.push(RecordedEvent::DefaultCandidateRejected(*e));
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        self.events.push(RecordedEvent::Flush(*e));
    }
}
