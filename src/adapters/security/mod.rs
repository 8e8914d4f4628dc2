//! Security event sink adapters.

mod in_memory;
mod tracing_sink;

pub use in_memory::InMemorySecurityEventSink;
pub use tracing_sink::TracingSecurityEventSink;
