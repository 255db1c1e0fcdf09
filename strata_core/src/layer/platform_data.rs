// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform-specific layer payloads.
//!
//! XR platforms can attach their own settings to a layer (e.g. a
//! compositor-specific filtering flag). Each platform defines a type
//! implementing [`PlatformLayerData`]; the layer stores the payloads as JSON
//! text keyed by [`PlatformLayerData::KEY`], so settings for platforms that
//! are not active survive untouched.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LayerDataError;

/// A platform's per-layer settings.
pub trait PlatformLayerData: Serialize + DeserializeOwned + Default {
    /// Key the payload is stored under. Must be unique per platform.
    const KEY: &'static str;
}

/// Serialized platform payloads of one layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlatformDataMap {
    entries: BTreeMap<String, String>,
}

impl PlatformDataMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the payload for `T`.
    ///
    /// A missing or empty payload yields `T::default()`.
    pub fn get<T: PlatformLayerData>(&self) -> Result<T, LayerDataError> {
        match self.entries.get(T::KEY) {
            Some(text) if !text.is_empty() => {
                serde_json::from_str(text).map_err(|e| malformed(T::KEY, &e))
            }
            _ => Ok(T::default()),
        }
    }

    /// Encodes `value` and stores it. Returns whether the stored text changed.
    pub fn set<T: PlatformLayerData>(&mut self, value: &T) -> Result<bool, LayerDataError> {
        let text = serde_json::to_string(value).map_err(|e| malformed(T::KEY, &e))?;
        Ok(self.insert_raw(T::KEY, text))
    }

    /// Returns the raw payload stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Stores a raw payload. Returns whether the stored text changed.
    pub fn insert_raw(&mut self, key: &str, text: String) -> bool {
        if self.entries.get(key) == Some(&text) {
            return false;
        }
        self.entries.insert(key.to_string(), text);
        true
    }

    /// Removes the payload stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Returns the stored keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of stored payloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no payload is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn malformed(key: &str, err: &serde_json::Error) -> LayerDataError {
    LayerDataError::MalformedPlatformData {
        key: key.to_string(),
        message: err.to_string(),
    }
}
