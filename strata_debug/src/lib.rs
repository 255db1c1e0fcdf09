// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and JSON export of strata registry events.
//!
//! This crate provides [`RegistryObserver`](strata_core::events::RegistryObserver)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintObserver`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderObserver`]: in-memory event log.
//! - [`json::export`]: writes recorded events as a JSON array.

pub mod json;
pub mod pretty;
pub mod recorder;
