// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition layer registry and provider change tracking.
//!
//! `strata_core` keeps track of declarative *composition layers* (quads,
//! cylinders, equirects, cube and projection layers) that an XR compositor
//! renders directly, and feeds per-frame deltas of those layers to one or
//! more pluggable [layer providers](provider::LayerProvider). It is `no_std`
//! compatible (with `alloc`).
//!
//! # Architecture
//!
//! The crate is organized around a frame loop driven by the host that owns
//! the layers:
//!
//! ```text
//!   LayerStore (host-owned layer configuration)
//!       │  created / enabled / disabled / destroyed / state_changed
//!       ▼
//!   LayerRegistry ──► OrderSlotTable   (unique depth slot per layer)
//!       │        └──► ChangeTracker    (created / removed / modified / active)
//!       ▼
//!   LayerRegistry::update() ──► ChangeSet ──► LayerProvider::update_layers()
//!                                                 (production, emulation)
//! ```
//!
//! **[`layer`]**: Generational layer handles, the host-side
//! [`LayerStore`](layer::LayerStore), the closed set of
//! [`LayerData`](layer::LayerData) variants with their compile-time
//! descriptors, optional extensions, and per-platform payloads.
//!
//! **[`slots`]**: [`OrderSlotTable`](slots::OrderSlotTable): unique signed
//! depth slots, with slot 0 reserved for the default layer. Negative slots
//! are underlays, positive slots overlays.
//!
//! **[`changes`]**: [`ChangeTracker`](changes::ChangeTracker) accumulates
//! lifecycle notifications between flushes and produces
//! [`ChangeSet`](changes::ChangeSet) snapshots.
//!
//! **[`registry`]**: [`LayerRegistry`](registry::LayerRegistry), the
//! reconciliation engine. It owns the known layers, the slot table, the
//! pending change set, the default-layer policy, and the provider bindings.
//!
//! **[`provider`]**: The [`LayerProvider`](provider::LayerProvider) trait
//! that compositor and emulation backends implement.
//!
//! **[`platform`]**: Capability descriptions of the active XR platform.
//!
//! **[`events`]**: [`RegistryObserver`](events::RegistryObserver) trait and
//! event types for registry instrumentation, with explicit subscription
//! handles.
//!
//! **[`config`]**: [`RegistryConfig`](config::RegistryConfig) presets.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod changes;
pub mod config;
mod default_layer;
pub mod error;
pub mod events;
pub mod layer;
pub mod platform;
pub mod provider;
pub mod registry;
pub mod slots;

#[cfg(test)]
pub(crate) mod testing;
