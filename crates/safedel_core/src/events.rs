//! Undelete notifications.
//!
//! Sinks are fire-and-forget: `publish` has no return value and the core
//! never waits on or inspects what a sink does with an event.

use crate::model::document::Document;
use log::info;
use std::sync::Mutex;

/// Emitted once per transition out of the soft-deleted state.
#[derive(Debug, Clone, PartialEq)]
pub struct UndeleteEvent {
    pub kind: String,
    pub document: Document,
}

impl UndeleteEvent {
    pub fn new(document: Document) -> Self {
        Self {
            kind: document.kind.clone(),
            document,
        }
    }
}

/// Receiver for undelete notifications.
pub trait EventSink {
    fn publish(&self, event: &UndeleteEvent);
}

impl<F> EventSink for F
where
    F: Fn(&UndeleteEvent),
{
    fn publish(&self, event: &UndeleteEvent) {
        self(event)
    }
}

/// Default sink: records the event in the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn publish(&self, event: &UndeleteEvent) {
        info!(
            "event=undelete_event module=events status=published kind={} id={}",
            event.kind,
            event
                .document
                .id
                .map_or_else(|| "none".to_string(), |id| id.to_string())
        );
    }
}

/// Keeps every published event in memory, in publish order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<UndeleteEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events published so far.
    pub fn events(&self) -> Vec<UndeleteEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: &UndeleteEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
