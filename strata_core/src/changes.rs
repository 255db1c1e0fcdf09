// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accumulation of layer lifecycle changes between flushes.
//!
//! A [`ChangeTracker`] collects notifications into four lists:
//!
//! - **created**: layers first seen since the last flush,
//! - **removed**: layers destroyed since the last flush,
//! - **modified**: known layers whose state changed since the last flush,
//! - **active**: layers currently enabled and active (persists across
//!   flushes).
//!
//! A layer appears in at most one of created, removed and modified. Each
//! `notify_*` method keeps that invariant, so the order in which a host
//! reports changes within a frame does not matter.

use alloc::vec::Vec;

use crate::layer::{LayerId, LayerStore};

/// Snapshot of a layer taken at flush time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerRecord {
    /// The layer.
    pub id: LayerId,
    /// Its order when the snapshot was taken.
    pub order: i32,
}

/// The changes delivered to a provider in one flush.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Layers first seen since the previous flush.
    pub created: Vec<LayerRecord>,
    /// Layers destroyed since the previous flush.
    pub removed: Vec<LayerId>,
    /// Known layers whose state changed since the previous flush.
    pub modified: Vec<LayerRecord>,
    /// Enabled and active layers, sorted by order then id.
    pub active: Vec<LayerRecord>,
}

impl ChangeSet {
    /// Returns `true` if the set carries no delta and no active layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.removed.is_empty()
            && self.modified.is_empty()
            && self.active.is_empty()
    }

    /// Returns `true` if the set carries created, removed or modified layers.
    #[must_use]
    pub fn has_deltas(&self) -> bool {
        !(self.created.is_empty() && self.removed.is_empty() && self.modified.is_empty())
    }
}

/// Pending change lists between two flushes.
#[derive(Clone, Debug, Default)]
pub struct ChangeTracker {
    created: Vec<LayerId>,
    removed: Vec<LayerId>,
    modified: Vec<LayerId>,
    active: Vec<LayerId>,
}

impl ChangeTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly known layer.
    pub fn notify_created(&mut self, id: LayerId) {
        self.modified.retain(|&m| m != id);
        push_unique(&mut self.created, id);
    }

    /// Records a layer becoming enabled and active.
    pub fn notify_enabled(&mut self, id: LayerId) {
        self.mark_modified_unless_created(id);
        push_unique(&mut self.active, id);
    }

    /// Records a layer becoming disabled or inactive.
    pub fn notify_disabled(&mut self, id: LayerId) {
        self.active.retain(|&a| a != id);
        self.mark_modified_unless_created(id);
    }

    /// Records a destroyed layer.
    pub fn notify_destroyed(&mut self, id: LayerId) {
        self.created.retain(|&c| c != id);
        self.modified.retain(|&m| m != id);
        self.active.retain(|&a| a != id);
        push_unique(&mut self.removed, id);
    }

    /// Records a state change of a known layer.
    pub fn notify_modified(&mut self, id: LayerId) {
        if !self.removed.contains(&id) {
            self.mark_modified_unless_created(id);
        }
    }

    /// Produces a snapshot of the pending lists.
    ///
    /// Orders are read from `store`. Layers that died without a destroyed
    /// notification are left out of created, modified and active.
    #[must_use]
    pub fn flush(&self, store: &LayerStore) -> ChangeSet {
        let mut active = records(store, &self.active);
        active.sort_by_key(|r| (r.order, r.id));
        ChangeSet {
            created: records(store, &self.created),
            removed: self.removed.clone(),
            modified: records(store, &self.modified),
            active,
        }
    }

    /// Clears created, removed and modified. Active persists.
    pub fn clear_single_shot(&mut self) {
        self.created.clear();
        self.removed.clear();
        self.modified.clear();
    }

    /// Clears everything except the removed list, for a rebuild.
    pub fn clear_for_rescan(&mut self) {
        self.created.clear();
        self.modified.clear();
        self.active.clear();
    }

    /// Clears every list.
    pub fn clear_all(&mut self) {
        self.clear_single_shot();
        self.active.clear();
    }

    /// Returns whether `id` is in the active list.
    #[must_use]
    pub fn is_active(&self, id: LayerId) -> bool {
        self.active.contains(&id)
    }

    /// Returns whether `id` is in the created list.
    #[must_use]
    pub fn is_created(&self, id: LayerId) -> bool {
        self.created.contains(&id)
    }

    /// Returns whether `id` is in the modified list.
    #[must_use]
    pub fn is_modified(&self, id: LayerId) -> bool {
        self.modified.contains(&id)
    }

    /// Returns whether `id` is in the removed list.
    #[must_use]
    pub fn is_removed(&self, id: LayerId) -> bool {
        self.removed.contains(&id)
    }

    /// Returns whether a removal is waiting to be flushed.
    #[must_use]
    pub fn has_pending_removals(&self) -> bool {
        !self.removed.is_empty()
    }

    fn mark_modified_unless_created(&mut self, id: LayerId) {
        if !self.created.contains(&id) {
            push_unique(&mut self.modified, id);
        }
    }
}

fn push_unique(list: &mut Vec<LayerId>, id: LayerId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

fn records(store: &LayerStore, ids: &[LayerId]) -> Vec<LayerRecord> {
    ids.iter()
        .filter_map(|&id| store.try_order(id).map(|order| LayerRecord { id, order }))
        .collect()
}
