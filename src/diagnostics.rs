//! Diagnostic sink for failures that must not reach the caller.
//!
//! Release-time failures (a flush that fails while an output stream is being
//! closed, a probe file that cannot be removed) are handed to a sink instead
//! of being returned. Sinks are fire-and-forget: `report` has no error path.

use tracing::debug;

use crate::event_log;

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Default sink: a `debug!` event on the `safe_persist::diagnostics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str) {
        debug!(target: "safe_persist::diagnostics", "{message}");
    }
}

/// Forwards to the registered event log. Before `event_log::setup` the
/// message goes to `TracingSink` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventLogSink;

impl DiagnosticSink for EventLogSink {
    fn report(&self, message: &str) {
        if event_log::log_event(message).is_err() {
            TracingSink.report(message);
        }
    }
}
