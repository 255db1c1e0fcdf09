// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry configuration.

/// How the host runs the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunMode {
    /// Authoring environment. Layers may be edited outside the frame loop, so
    /// a rescan rebuilds all registry state from the store.
    Editor,
    /// Running application. A rescan only rebuilds the slot table.
    #[default]
    Player,
}

/// Configuration for a [`LayerRegistry`](crate::registry::LayerRegistry).
///
/// Use one of the preset constructors and override individual fields:
///
/// ```
/// use strata_core::config::RegistryConfig;
///
/// let config = RegistryConfig {
///     auto_shutdown: false,
///     ..RegistryConfig::player()
/// };
/// assert!(!config.rescan_on_default_change);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Editor or player semantics for rescans.
    pub mode: RunMode,
    /// Stop the registry when only the fallback default layer is left after a
    /// removal.
    pub auto_shutdown: bool,
    /// Request a rescan whenever a new default layer is designated.
    pub rescan_on_default_change: bool,
}

impl RegistryConfig {
    /// Preset for authoring tools.
    #[must_use]
    pub const fn editor() -> Self {
        Self {
            mode: RunMode::Editor,
            auto_shutdown: true,
            rescan_on_default_change: true,
        }
    }

    /// Preset for running applications.
    #[must_use]
    pub const fn player() -> Self {
        Self {
            mode: RunMode::Player,
            auto_shutdown: true,
            rescan_on_default_change: false,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::player()
    }
}
