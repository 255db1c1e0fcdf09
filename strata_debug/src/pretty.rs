// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable event output.
//!
//! [`PrettyPrintObserver`] implements [`RegistryObserver`] and writes one line
//! per event to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::events::{
    DefaultCandidateRejectedEvent, DefaultLayerChangedEvent, FlushEvent, OrderReassignedEvent,
    RegistryObserver,
};

/// Writes human-readable event lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintObserver<W: Write = Box<dyn Write>> {
    writer: W,
    quiet_flushes: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintObserver<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintObserver")
            .field("quiet_flushes", &self.quiet_flushes)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintObserver {
    /// Creates an observer that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates an observer that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintObserver<W> {
    /// Creates an observer that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            quiet_flushes: false,
        }
    }

    /// Skips flushes that carry no created, removed or modified layers.
    #[must_use]
    pub fn quiet_flushes(mut self, quiet: bool) -> Self {
        self.quiet_flushes = quiet;
        self
    }

    /// Consumes the observer and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> RegistryObserver for PrettyPrintObserver<W> {
    fn on_started(&mut self) {
        let _ = writeln!(self.writer, "[started]");
    }

    fn on_stopped(&mut self) {
        let _ = writeln!(self.writer, "[stopped]");
    }

    fn on_occupied_slots_updated(&mut self) {
        let _ = writeln!(self.writer, "[slots] occupied slots updated");
    }

    fn on_order_reassigned(&mut self, e: &OrderReassignedEvent) {
        let _ = writeln!(
            self.writer,
            "[order] layer={} requested={} assigned={}",
            e.layer, e.requested, e.assigned,
        );
    }

    fn on_default_layer_changed(&mut self, e: &DefaultLayerChangedEvent) {
        let _ = match e.previous {
            Some(previous) => writeln!(
                self.writer,
                "[default] previous={previous} current={}",
                e.current
            ),
            None => writeln!(self.writer, "[default] previous=none current={}", e.current),
        };
    }

    fn on_default_candidate_rejected(&mut self, e: &DefaultCandidateRejectedEvent) {
        let _ = writeln!(self.writer, "[rejected] layer={}", e.layer);
    }

    fn on_flush(&mut self, e: &FlushEvent) {
        if self.quiet_flushes && e.created + e.removed + e.modified == 0 {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[flush] frame={} created={} removed={} modified={} active={}",
            e.frame_index, e.created, e.removed, e.modified, e.active,
        );
    }
}
