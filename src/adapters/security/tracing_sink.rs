//! Security event sink backed by `tracing`.

use crate::domain::foundation::SecurityEvent;
use crate::ports::SecurityEventSink;

/// Emits each event as a `WARN` record on the `security` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSecurityEventSink;

impl TracingSecurityEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityEventSink for TracingSecurityEventSink {
    fn record(&self, event: SecurityEvent) {
        tracing::warn!(
            target: "security",
            event = %event.kind,
            client = %event.client,
            details = %event.details,
            occurred_at = %event.occurred_at.to_rfc3339(),
            "Security event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SecurityEventKind;

    #[test]
    fn record_does_not_panic_without_subscriber() {
        let sink = TracingSecurityEventSink::new();
        sink.record(SecurityEvent::new(
            SecurityEventKind::RateLimitExceeded,
            "unknown",
            serde_json::json!({ "path": "/checkout" }),
        ));
    }
}
