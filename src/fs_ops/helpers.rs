//! I/O error hints.
//!
//! Maps raw OS error codes to short human-readable hints and folds them into
//! `io::Error` messages together with the failing operation and path.
//!
//! Usage:
//!   File::open(p).map_err(io_error_with_help_io("open file", p))?;

use std::io;
use std::path::Path;

/// Hint for a raw OS error code. Unrecognized codes get a generic hint.
#[cfg(unix)]
pub fn describe_os_error(code: i32) -> &'static str {
    match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions",
        libc::ENOENT => "path not found; verify it exists",
        libc::EEXIST => "already exists; remove the entry or pick another name",
        libc::ENOTEMPTY => "directory not empty; delete its entries first",
        libc::ENOTDIR => "a path component is not a directory",
        libc::EISDIR => "target is a directory",
        libc::ENOSPC => "insufficient space on device",
        libc::EROFS => "read-only filesystem; cannot write here",
        libc::EXDEV => "cross-filesystem; rename not possible",
        libc::EBUSY => "resource busy; another process holds it",
        libc::ENODEV | libc::ENXIO => "device not present; card removed or volume unmounted",
        libc::EIO => "low-level I/O failure on the device",
        libc::ENAMETOOLONG => "filename or path too long; shorten path segments",
        libc::EMFILE => "process file descriptor limit reached",
        libc::ENFILE => "system-wide file table overflow",
        _ => "unrecognized OS error",
    }
}

#[cfg(not(unix))]
pub fn describe_os_error(code: i32) -> &'static str {
    match code {
        5 => "access denied; check permissions",               // ERROR_ACCESS_DENIED
        2 | 3 => "path not found; verify it exists",           // FILE/PATH NOT FOUND
        80 | 183 => "already exists; pick another name",       // FILE_EXISTS / ALREADY_EXISTS
        145 => "directory not empty; delete its entries first", // ERROR_DIR_NOT_EMPTY
        112 => "insufficient disk space",                      // ERROR_DISK_FULL
        19 => "write protected / read-only media",             // ERROR_WRITE_PROTECT
        17 => "not same device; rename not possible",          // ERROR_NOT_SAME_DEVICE
        21 => "device not ready; card removed or volume unmounted", // ERROR_NOT_READY
        32 => "sharing violation; file is in use",             // ERROR_SHARING_VIOLATION
        206 => "filename or path too long",                    // ERROR_FILENAME_EXCED_RANGE
        _ => "unrecognized OS error",
    }
}

/// Format a message with op/path plus the OS hint (or a kind-based one).
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        msg.push_str(" - ");
        msg.push_str(describe_os_error(code));
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        let hint = match e.kind() {
            io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
            io::ErrorKind::NotFound => Some("path not found; verify it exists"),
            io::ErrorKind::AlreadyExists => Some("already exists; remove the entry or pick another name"),
            io::ErrorKind::StorageFull => Some("insufficient space on device"),
            io::ErrorKind::UnexpectedEof => Some("stream ended early"),
            _ => None,
        };
        if let Some(h) = hint {
            msg.push_str(" - ");
            msg.push_str(h);
        }
    }

    msg
}

/// Adapter for io::Result code: returns a closure for `.map_err(...)` that
/// keeps the original `ErrorKind` and enriches the message.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}
