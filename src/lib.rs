//! Core library for `safe_persist`.
//!
//! Crash-safe file persistence on device storage roots addressed by
//! locators such as `file:///SDCard/notes/today.txt`:
//! - atomic writes from a buffer or a stream ([`Storage::write_atomically`]),
//! - directory trees whose entries may carry the transparent-encryption
//!   suffix ([`Storage::create_directory_with_ancestors`], [`Storage::delete_tree`]),
//! - metadata and space queries that report `-1` when the answer is unknown.

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod event_log;
pub mod fs_ops;
pub mod locator;
pub mod output;
pub mod platform;
pub mod storage;

pub use config::{
    Config, LogLevel, RootConfig, default_config_path, default_log_path, path_has_symlink_ancestor,
};
pub use diagnostics::{DiagnosticSink, EventLogSink, TracingSink};
pub use errors::{ErrorCode, PersistError, Result};
pub use fs_ops::{
    AccessMode, Connection, FixedSpace, Fs2Probe, InputStream, OutputStream, SIZE_UNKNOWN, Source,
    SpaceProbe,
};
pub use locator::{Locator, strip_encryption_suffix};
pub use storage::{Root, Storage};
