//! Typed error definitions for safe_persist.
//! Provides the closed set of failure modes every storage operation reports,
//! plus a stable numeric code per variant for logs and scripts.

use std::fmt;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::fs_ops::io_error_with_help_io;

/// Result alias used across the library.
pub type Result<T, E = PersistError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("Permission denied on {locator}: {context}")]
    PermissionDenied { locator: String, context: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Parent directory missing for {0}")]
    MissingParent(String),

    #[error("Insufficient space for {locator}: need {required} bytes, have {available} bytes")]
    InsufficientSpace {
        locator: String,
        required: u64,
        available: u64,
    },

    #[error("Filesystem unavailable for {locator}: {reason}")]
    FilesystemUnavailable { locator: String, reason: String },

    #[error("I/O error on {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: io::Error,
    },

    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("Event log used before setup()")]
    NotInitialized,
}

impl PersistError {
    pub(crate) fn invalid(locator: impl fmt::Display, reason: impl Into<String>) -> Self {
        PersistError::InvalidLocator {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(locator: impl fmt::Display, reason: impl Into<String>) -> Self {
        PersistError::FilesystemUnavailable {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify an `io::Error` raised while performing `op` on `path`.
    ///
    /// Kinds with a dedicated variant map onto it; everything else becomes
    /// `Io` with the operation and an OS hint folded into the message.
    pub fn from_io(op: &str, locator: impl fmt::Display, path: &Path, e: io::Error) -> Self {
        let locator = locator.to_string();
        match e.kind() {
            io::ErrorKind::NotFound => PersistError::NotFound(locator),
            io::ErrorKind::AlreadyExists => PersistError::AlreadyExists(locator),
            io::ErrorKind::DirectoryNotEmpty => PersistError::DirectoryNotEmpty(locator),
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                let context = io_error_with_help_io(op, path)(e).to_string();
                PersistError::PermissionDenied { locator, context }
            }
            _ => PersistError::Io {
                locator,
                source: io_error_with_help_io(op, path)(e),
            },
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PersistError::InvalidLocator { .. } => ErrorCode::InvalidLocator,
            PersistError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            PersistError::NotFound(_) => ErrorCode::NotFound,
            PersistError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            PersistError::MissingParent(_) => ErrorCode::MissingParent,
            PersistError::InsufficientSpace { .. } => ErrorCode::InsufficientSpace,
            PersistError::FilesystemUnavailable { .. } => ErrorCode::FilesystemUnavailable,
            PersistError::Io { .. } => ErrorCode::Io,
            PersistError::DirectoryNotEmpty(_) => ErrorCode::DirectoryNotEmpty,
            PersistError::NotInitialized => ErrorCode::NotInitialized,
        }
    }
}

/// Numeric error codes. `Unknown` absorbs numbers this build does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    InvalidLocator = 1,
    PermissionDenied = 2,
    NotFound = 3,
    AlreadyExists = 4,
    MissingParent = 5,
    InsufficientSpace = 6,
    FilesystemUnavailable = 7,
    Io = 8,
    DirectoryNotEmpty = 9,
    NotInitialized = 10,
    Unknown = 0xFFFF,
}

impl ErrorCode {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            1 => ErrorCode::InvalidLocator,
            2 => ErrorCode::PermissionDenied,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::MissingParent,
            6 => ErrorCode::InsufficientSpace,
            7 => ErrorCode::FilesystemUnavailable,
            8 => ErrorCode::Io,
            9 => ErrorCode::DirectoryNotEmpty,
            10 => ErrorCode::NotInitialized,
            _ => ErrorCode::Unknown,
        }
    }

    pub fn as_raw(self) -> u16 {
        self as u16
    }

    /// Human-readable description for diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            ErrorCode::InvalidLocator => "malformed locator or unknown root",
            ErrorCode::PermissionDenied => "insufficient access rights",
            ErrorCode::NotFound => "expected entry is missing",
            ErrorCode::AlreadyExists => "name collision on create or rename",
            ErrorCode::MissingParent => "parent directory does not exist",
            ErrorCode::InsufficientSpace => "not enough free space for the write",
            ErrorCode::FilesystemUnavailable => "volume not mounted or not accessible",
            ErrorCode::Io => "read, write or flush failure",
            ErrorCode::DirectoryNotEmpty => "directory still has entries",
            ErrorCode::NotInitialized => "event log not registered",
            ErrorCode::Unknown => "unrecognized error code",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:03} {}", self.as_raw(), self.describe())
    }
}
