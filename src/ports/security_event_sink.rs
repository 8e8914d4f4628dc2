//! Security event sink port.
//!
//! Every security-relevant rejection (rate limit, bad origin, bad signature,
//! invalid amounts) is recorded here. Recording must never fail the request.

use crate::domain::foundation::SecurityEvent;

/// Destination for structured security events.
pub trait SecurityEventSink: Send + Sync {
    fn record(&self, event: SecurityEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_event_sink_is_object_safe() {
        fn _accepts_dyn(_sink: &dyn SecurityEventSink) {}
    }
}
