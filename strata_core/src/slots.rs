// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unique depth slots for layers.
//!
//! Every layer a registry knows about occupies one signed integer slot.
//! Lower slots are composited first. Slot 0 belongs to the default scene
//! layer; negative slots are underlays and positive slots overlays.

use alloc::collections::BTreeMap;

use crate::layer::LayerId;

/// The slot reserved for the default scene layer.
pub const DEFAULT_SLOT: i32 = 0;

/// Map from order value to the layer occupying it.
#[derive(Clone, Debug, Default)]
pub struct OrderSlotTable {
    slots: BTreeMap<i32, LayerId>,
}

impl OrderSlotTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves `order` for `layer`.
    ///
    /// Succeeds if the slot is free or already held by `layer`. Slot 0 is
    /// only granted when `is_default` is set.
    pub fn reserve(&mut self, layer: LayerId, order: i32, is_default: bool) -> bool {
        if order == DEFAULT_SLOT && !is_default {
            return false;
        }
        match self.slots.get(&order) {
            Some(&occupant) => occupant == layer,
            None => {
                self.slots.insert(order, layer);
                true
            }
        }
    }

    /// Releases `order` if `layer` is its occupant.
    pub fn release(&mut self, order: i32, layer: LayerId) -> bool {
        if self.slots.get(&order) == Some(&layer) {
            self.slots.remove(&order);
            true
        } else {
            false
        }
    }

    /// Returns the nearest free slot at or beyond `order`.
    ///
    /// Starting from `order` (or `1` / `-1` when `order` is 0), walks up when
    /// `overlay` is set and down otherwise, skipping slot 0 and occupied
    /// slots. The walk saturates at the `i32` bounds.
    #[must_use]
    pub fn next_unused(&self, order: i32, overlay: bool) -> i32 {
        let step = if overlay { 1 } else { -1 };
        let mut candidate = if order == DEFAULT_SLOT { step } else { order };
        while candidate == DEFAULT_SLOT || self.slots.contains_key(&candidate) {
            match candidate.checked_add(step) {
                Some(next) => candidate = next,
                None => break,
            }
        }
        candidate
    }

    /// [`next_unused`](Self::next_unused) walking away from slot 0: up for
    /// orders above -1, down otherwise.
    #[must_use]
    pub fn next_unused_auto(&self, order: i32) -> i32 {
        self.next_unused(order, order > -1)
    }

    /// The free slot closest to slot 0 on the requested side.
    #[must_use]
    pub fn first_unused(&self, overlay: bool) -> i32 {
        self.next_unused(DEFAULT_SLOT, overlay)
    }

    /// Returns whether `layer` may move to `order`.
    #[must_use]
    pub fn can_change_order_to(&self, layer: LayerId, order: i32, is_default: bool) -> bool {
        if order == DEFAULT_SLOT && !is_default {
            return false;
        }
        self.slots.get(&order).is_none_or(|&occupant| occupant == layer)
    }

    /// Returns the layer occupying `order`.
    #[must_use]
    pub fn occupant(&self, order: i32) -> Option<LayerId> {
        self.slots.get(&order).copied()
    }

    /// Returns the slot held by `layer`.
    #[must_use]
    pub fn slot_of(&self, layer: LayerId) -> Option<i32> {
        self.slots
            .iter()
            .find_map(|(&order, &occupant)| (occupant == layer).then_some(order))
    }

    /// Returns whether `order` is occupied.
    #[must_use]
    pub fn contains(&self, order: i32) -> bool {
        self.slots.contains_key(&order)
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates `(order, layer)` pairs from the lowest slot up.
    pub fn iter(&self) -> impl Iterator<Item = (i32, LayerId)> + '_ {
        self.slots.iter().map(|(&order, &layer)| (order, layer))
    }

    /// Releases every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
