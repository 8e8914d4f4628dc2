//! Capturing security event sink for tests.

use std::sync::{Arc, Mutex};

use crate::domain::foundation::{SecurityEvent, SecurityEventKind};
use crate::ports::SecurityEventSink;

/// Keeps every recorded event in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecurityEventSink {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
}

impl InMemorySecurityEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first.
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Kinds of the recorded events, oldest first.
    pub fn kinds(&self) -> Vec<SecurityEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    pub fn contains(&self, kind: SecurityEventKind) -> bool {
        self.kinds().contains(&kind)
    }
}

impl SecurityEventSink for InMemorySecurityEventSink {
    fn record(&self, event: SecurityEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
