//! Process-wide event log registration. Everything runs in one test so the
//! order of the "before setup" and "after setup" checks is fixed.

use std::sync::Arc;

use safe_persist::{DiagnosticSink, ErrorCode, EventLogSink, event_log};

#[test]
fn registration_lifecycle() {
    assert!(!event_log::is_registered());
    let err = event_log::log_event("too early").unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotInitialized);

    // Fire-and-forget even before registration.
    let sink: Arc<dyn DiagnosticSink> = Arc::new(EventLogSink);
    sink.report("dropped into tracing");

    assert!(!event_log::setup("", 7));
    assert!(!event_log::setup("persist", 0));
    assert!(!event_log::is_registered());

    assert!(event_log::setup("persist", 0xABCD));
    assert!(event_log::setup("other", 0x1234), "second setup reports the existing registration");
    assert_eq!(event_log::guid(), Some(0xABCD));

    event_log::log_event("ready").unwrap();
    sink.report("release failure");
}
