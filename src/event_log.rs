//! Process-wide event log registration.
//!
//! The device event log is keyed by a GUID and shown under a logger name.
//! `setup` registers once; later calls are no-ops that report whether the
//! registration is in place. Logging before a successful `setup` fails with
//! `PersistError::NotInitialized` rather than dropping the message.
//!
//! Events are emitted as `tracing` events on the `event_log` target so they
//! land wherever the subscriber sends everything else.

use std::sync::OnceLock;

use tracing::info;

use crate::errors::{PersistError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Registration {
    name: String,
    guid: u64,
}

static REGISTRATION: OnceLock<Registration> = OnceLock::new();

/// Register the event log. Returns true when a registration is in place
/// after the call (including one made by an earlier call).
///
/// An empty name or a zero GUID is refused.
pub fn setup(name: &str, guid: u64) -> bool {
    if REGISTRATION.get().is_some() {
        return true;
    }
    if name.trim().is_empty() || guid == 0 {
        return false;
    }
    let _ = REGISTRATION.set(Registration {
        name: name.to_string(),
        guid,
    });
    REGISTRATION.get().is_some()
}

pub fn is_registered() -> bool {
    REGISTRATION.get().is_some()
}

/// GUID of the active registration.
pub fn guid() -> Option<u64> {
    REGISTRATION.get().map(|r| r.guid)
}

/// Write `message` to the event log.
pub fn log_event(message: &str) -> Result<()> {
    let reg = REGISTRATION.get().ok_or(PersistError::NotInitialized)?;
    info!(
        target: "event_log",
        guid = %format!("{:#018x}", reg.guid),
        logger = %reg.name,
        "{message}"
    );
    Ok(())
}
