// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Emulated composition layers for strata.
//!
//! When no XR compositor is available, layers can still be previewed by
//! drawing them into the scene. This crate provides the emulation side of the
//! [`strata_core`] provider protocol:
//!
//! - [`EmulatedLayerProvider`]: a [`LayerProvider`] that mirrors the
//!   registry's layers and rebuilds a draw plan on every flush, limited to
//!   what the target [`PlatformProvider`] can composite
//! - [`EmulationPlan`]: the per-frame, back-to-front list of
//!   [`EmulationItem`]s, split into underlays and overlays around the scene
//! - [`EmulationSettings`]: when emulation runs, loadable from JSON
//!
//! Bind the provider to a registry under [`ProviderKind::Emulation`], sharing
//! it with the host to read the plan back:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use strata_core::layer::{LayerData, LayerStore};
//! use strata_core::provider::ProviderKind;
//! use strata_core::registry::LayerRegistry;
//! use strata_emulation::{EmulatedLayerProvider, EmulationSettings, RunContext};
//!
//! let mut store = LayerStore::new();
//! let mut registry = LayerRegistry::default();
//! let provider = Rc::new(RefCell::new(EmulatedLayerProvider::new(
//!     EmulationSettings::default(),
//!     RunContext::Editor,
//! )));
//! registry.bind_provider(&store, ProviderKind::Emulation, Box::new(provider.clone()));
//!
//! let quad = store.create_layer(LayerData::default());
//! store.set_order(quad, 2);
//! registry.created(&mut store, quad);
//! registry.enabled(&mut store, quad);
//! registry.update(&mut store);
//!
//! let provider = provider.borrow();
//! let overlays: Vec<_> = provider.plan().overlays().map(|item| item.layer).collect();
//! assert_eq!(overlays, [quad]);
//! ```
//!
//! [`LayerProvider`]: strata_core::provider::LayerProvider
//! [`PlatformProvider`]: strata_core::platform::PlatformProvider
//! [`ProviderKind::Emulation`]: strata_core::provider::ProviderKind::Emulation

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

mod plan;
mod provider;
mod settings;

pub use plan::{EmulationItem, EmulationPass, EmulationPlan};
pub use provider::{EmulatedLayer, EmulatedLayerProvider};
pub use settings::{EmulationSettings, RunContext};
