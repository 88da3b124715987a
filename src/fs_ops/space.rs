//! Free-space probing for a storage root.
//!
//! The atomic write engine asks the probe how much room is left before it
//! stages anything, so a write that cannot fit fails up front instead of
//! leaving a truncated temp file behind.

use std::io;
use std::path::Path;

pub trait SpaceProbe: Send + Sync {
    /// Bytes available to this process on the volume holding `path`.
    fn available(&self, path: &Path) -> io::Result<u64>;
    /// Total capacity of the volume.
    fn total(&self, path: &Path) -> io::Result<u64>;
    /// Bytes free on the volume (including any reserved for privileged users).
    fn free(&self, path: &Path) -> io::Result<u64>;
}

/// Host volume statistics via `fs2` (statvfs / GetDiskFreeSpaceExW).
#[derive(Debug, Default, Clone, Copy)]
pub struct Fs2Probe;

impl SpaceProbe for Fs2Probe {
    fn available(&self, path: &Path) -> io::Result<u64> {
        fs2::available_space(path)
    }

    fn total(&self, path: &Path) -> io::Result<u64> {
        fs2::total_space(path)
    }

    fn free(&self, path: &Path) -> io::Result<u64> {
        fs2::free_space(path)
    }
}

/// Reports fixed numbers regardless of the path. Useful for quota-style
/// limits and for exercising the no-room path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSpace {
    pub available: u64,
    pub total: u64,
}

impl FixedSpace {
    pub fn new(available: u64, total: u64) -> Self {
        Self { available, total }
    }
}

impl SpaceProbe for FixedSpace {
    fn available(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.available)
    }

    fn total(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.total)
    }

    fn free(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.available)
    }
}

/// Human-friendly byte count for log lines.
pub(crate) fn format_bytes(n: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let f = n as f64;
    if f >= GB {
        format!("{:.1} GiB", f / GB)
    } else if f >= MB {
        format!("{:.1} MiB", f / MB)
    } else if f >= KB {
        format!("{:.1} KiB", f / KB)
    } else {
        format!("{} B", n)
    }
}
