// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded events.
//!
//! [`export`] writes the events collected by a
//! [`RecorderObserver`](crate::recorder::RecorderObserver) as a JSON array of
//! objects, one per event, each tagged with an `"event"` name and a `"seq"`
//! position. Layer handles are written in their `index@generation` form.

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

/// Converts one event to a JSON object.
#[must_use]
pub fn to_value(seq: usize, event: &RecordedEvent) -> Value {
    let args = match event {
        RecordedEvent::Started | RecordedEvent::Stopped | RecordedEvent::OccupiedSlotsUpdated => {
            json!({})
        }
        RecordedEvent::OrderReassigned(e) => json!({
            "layer": e.layer.to_string(),
            "requested": e.requested,
            "assigned": e.assigned,
        }),
        RecordedEvent::DefaultLayerChanged(e) => json!({
            "previous": e.previous.map(|id| id.to_string()),
            "current": e.current.to_string(),
        }),
        RecordedEvent::DefaultCandidateRejected(e) => json!({
            "layer": e.layer.to_string(),
        }),
        RecordedEvent::Flush(e) => json!({
            "frame_index": e.frame_index,
            "created": e.created,
            "removed": e.removed,
            "modified": e.modified,
            "active": e.active,
        }),
    };
    json!({
        "seq": seq,
        "event": event.name(),
        "args": args,
    })
}

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let values: Vec<Value> = events
        .iter()
        .enumerate()
        .map(|(seq, event)| to_value(seq, event))
        .collect();
    serde_json::to_writer_pretty(&mut *writer, &values)?;
    writeln!(writer)
}
