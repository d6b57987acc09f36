//! Trace collaborator
//!
//! The exception filter reports failures worth recording through a
//! [`TraceService`]. The call is fire-and-forget: whatever the service does
//! with the message, the filter still produces its response.

/// Receives the message of every failure the filter decides to record.
pub trait TraceService: Send + Sync + 'static {
    fn trace(&self, message: &str);
}

/// Any `Fn(&str)` closure can stand in for a trace service.
impl<F> TraceService for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn trace(&self, message: &str) {
        self(message)
    }
}

/// Default trace service writing through `tracing`
#[derive(Clone, Default)]
pub struct TracingTraceService;

impl TraceService for TracingTraceService {
    fn trace(&self, message: &str) {
        tracing::warn!(target: "api_exception_filter::trace", "{}", message);
    }
}
