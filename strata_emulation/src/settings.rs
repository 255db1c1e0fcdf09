// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! When emulation runs.

use serde::Deserialize;

/// Where the host application is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunContext {
    /// Editing a scene, not playing it.
    #[default]
    Editor,
    /// Playing inside the editor.
    PlayMode,
    /// A standalone player build.
    Standalone,
}

/// Emulation switches, typically loaded from the project's settings file.
///
/// Missing fields take their default values:
///
/// ```
/// use strata_emulation::{EmulationSettings, RunContext};
///
/// let settings = EmulationSettings::from_json(r#"{ "emulation_in_standalone": true }"#).unwrap();
/// assert!(settings.is_enabled(RunContext::Standalone));
/// assert!(settings.is_enabled(RunContext::PlayMode));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmulationSettings {
    /// Emulate layers while playing in the editor.
    pub emulation_in_play_mode: bool,
    /// Emulate layers in standalone player builds.
    pub emulation_in_standalone: bool,
    /// Warn once when emulation is requested but cannot be shown.
    pub warn_unsupported: bool,
}

impl Default for EmulationSettings {
    fn default() -> Self {
        Self {
            emulation_in_play_mode: true,
            emulation_in_standalone: false,
            warn_unsupported: true,
        }
    }
}

impl EmulationSettings {
    /// Parses settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns whether layers are emulated in `context`.
    ///
    /// Scene editing always emulates.
    #[must_use]
    pub fn is_enabled(&self, context: RunContext) -> bool {
        match context {
            RunContext::Editor => true,
            RunContext::PlayMode => self.emulation_in_play_mode,
            RunContext::Standalone => self.emulation_in_standalone,
        }
    }
}
