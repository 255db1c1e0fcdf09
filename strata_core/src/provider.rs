// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Provider contract for compositor and emulation backends.
//!
//! A *layer provider* turns the registry's per-frame deltas into something
//! visible. Two roles exist:
//!
//! - **Production**: Hands layers to the XR compositor of the running
//!   platform.
//!
//! - **Emulation**: Approximates the compositor's output with ordinary draw
//!   passes when no compositor is present (editor preview, desktop builds).
//!   See the `strata_emulation` crate.
//!
//! Both are bound to a [`LayerRegistry`](crate::registry::LayerRegistry) at
//! most once at a time. Binding a new provider for a role cleans up the
//! outgoing one and fully resyncs the incoming one from the known layers.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::changes::{ChangeSet, LayerRecord};
use crate::layer::LayerStore;

/// The role a provider is bound under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// The platform's XR compositor.
    Production,
    /// Draw-pass emulation of the compositor.
    Emulation,
}

impl ProviderKind {
    /// Both roles, in flush order.
    pub const ALL: [Self; 2] = [Self::Production, Self::Emulation];
}

/// Receives layer state from a registry.
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_frame() {
///     // Host: mutate layers and report lifecycle transitions.
///     store.set_order(layer, 3);
///     registry.enabled(&mut store, layer);
///
///     // Flush: providers receive `update_layers` in production, emulation order.
///     registry.update(&mut store);
///
///     // Late frame: providers finish per-frame work.
///     registry.late_update();
/// }
/// ```
pub trait LayerProvider {
    /// Replaces all provider state with the given known layers.
    ///
    /// Called when the provider is bound and when the registry starts.
    fn set_initial_state(&mut self, store: &LayerStore, layers: &[LayerRecord]);

    /// Drops all provider state.
    ///
    /// Called when the provider is unbound or replaced and when the registry
    /// stops.
    fn cleanup_state(&mut self);

    /// Applies one flush worth of changes, reading layer configuration from
    /// `store` as needed.
    fn update_layers(&mut self, store: &LayerStore, changes: &ChangeSet);

    /// Late-frame hook, after all updates of the frame ran.
    fn late_update(&mut self) {}
}

/// Shares a provider between the registry and the host, which keeps a clone
/// of the `Rc` to inspect provider state after binding.
impl<P: LayerProvider> LayerProvider for Rc<RefCell<P>> {
    fn set_initial_state(&mut self, store: &LayerStore, layers: &[LayerRecord]) {
        self.borrow_mut().set_initial_state(store, layers);
    }

    fn cleanup_state(&mut self) {
        self.borrow_mut().cleanup_state();
    }

    fn update_layers(&mut self, store: &LayerStore, changes: &ChangeSet) {
        self.borrow_mut().update_layers(store, changes);
    }

    fn late_update(&mut self) {
        self.borrow_mut().late_update();
    }
}
