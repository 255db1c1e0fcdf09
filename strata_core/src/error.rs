// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for layer data lookups and platform payload decoding.
//!
//! The registry's notification and update surface never fails: collisions,
//! unknown layers and rejected default candidates are recovered from locally
//! and reported through `log` and [`events`](crate::events). The errors here
//! cover the data side only.

use alloc::string::String;

/// Errors raised while resolving or decoding layer data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerDataError {
    /// No layer data variant is registered under the given type name.
    #[error("unknown layer data type `{0}`")]
    UnknownLayerType(String),
    /// A platform payload could not be encoded or decoded.
    #[error("malformed platform data for `{key}`: {message}")]
    MalformedPlatformData {
        /// Key the payload is stored under.
        key: String,
        /// Message from the serializer.
        message: String,
    },
}
