// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities of the XR platform layers are submitted to.

use alloc::boxed::Box;

use crate::layer::{BlendType, LayerKind};

/// Describes what the active XR platform's compositor can do.
///
/// Hosts and editors use this to hide unsupported layer types and to decide
/// which [`PlatformLayerData`](crate::layer::PlatformLayerData) payload a
/// layer carries for the platform.
pub trait PlatformProvider {
    /// Human-readable platform name.
    fn name(&self) -> &str;

    /// Layer kinds the compositor accepts. `None` means all kinds.
    fn supported_layer_kinds(&self) -> Option<&[LayerKind]> {
        None
    }

    /// Blend types the compositor accepts.
    fn supported_blend_types(&self) -> &[BlendType] {
        &[BlendType::Alpha, BlendType::Premultiply]
    }

    /// Whether layers may be composited below the default layer.
    fn supports_underlays(&self) -> bool {
        true
    }

    /// Key of the platform's layer payload, if it defines one.
    fn platform_data_key(&self) -> Option<&str> {
        None
    }

    /// Returns whether layers of `kind` can be submitted.
    fn supports(&self, kind: LayerKind) -> bool {
        self.supported_layer_kinds()
            .is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Capabilities assumed when no platform is active.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPlatformProvider;

impl PlatformProvider for DefaultPlatformProvider {
    fn name(&self) -> &str {
        "Default"
    }
}

/// Holds the active [`PlatformProvider`].
#[derive(Default)]
pub struct PlatformManager {
    active: Option<Box<dyn PlatformProvider>>,
}

impl core::fmt::Debug for PlatformManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlatformManager")
            .field("active", &self.active().name())
            .finish_non_exhaustive()
    }
}

impl PlatformManager {
    /// Creates a manager with no platform selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active platform, or [`DefaultPlatformProvider`].
    #[must_use]
    pub fn active(&self) -> &dyn PlatformProvider {
        match &self.active {
            Some(provider) => provider.as_ref(),
            None => &DefaultPlatformProvider,
        }
    }

    /// Selects the active platform. `None` reverts to the default.
    pub fn set_active(
        &mut self,
        provider: Option<Box<dyn PlatformProvider>>,
    ) -> Option<Box<dyn PlatformProvider>> {
        if let Some(p) = &provider {
            log::info!("platform provider set to {}", p.name());
        }
        core::mem::replace(&mut self.active, provider)
    }

    /// Returns whether a platform other than the default is selected.
    #[must_use]
    pub fn has_platform(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Handheld;

    impl PlatformProvider for Handheld {
        fn name(&self) -> &str {
            "Handheld"
        }

        fn supported_layer_kinds(&self) -> Option<&[LayerKind]> {
            Some(&[LayerKind::Default, LayerKind::Quad])
        }

        fn supports_underlays(&self) -> bool {
            false
        }

        fn platform_data_key(&self) -> Option<&str> {
            Some("handheld.layer")
        }
    }

    #[test]
    fn default_platform_supports_everything() {
        let manager = PlatformManager::new();
        assert_eq!(manager.active().name(), "Default", "fallback provider");
        assert!(!manager.has_platform(), "nothing selected");
        for kind in LayerKind::ALL {
            assert!(manager.active().supports(kind), "{kind:?} supported");
        }
    }

    #[test]
    fn active_platform_restricts_kinds() {
        let mut manager = PlatformManager::new();
        assert!(manager.set_active(Some(Box::new(Handheld))).is_none(), "no previous");
        let active = manager.active();
        assert!(active.supports(LayerKind::Quad), "quad supported");
        assert!(!active.supports(LayerKind::Cylinder), "cylinder unsupported");
        assert!(!active.supports_underlays(), "no underlays");
        assert_eq!(active.platform_data_key(), Some("handheld.layer"), "payload key");

        let previous = manager.set_active(None);
        assert_eq!(
            previous.as_deref().map(|p| p.name()),
            Some("Handheld"),
            "previous platform returned"
        );
        assert_eq!(manager.active().name(), "Default", "reverted");
    }
}
