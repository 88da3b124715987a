//! Atomic write engine.
//!
//! A target ends up holding either its complete old content or the complete
//! new content:
//! - absent target: create it and stream straight into it; a failed copy
//!   removes the half-written file again;
//! - present target: stream into the temp sibling (`<target>.tmp`), then
//!   delete the target and rename the sibling onto the target's stored
//!   name. A crash before the rename leaves the old file intact and an
//!   orphaned sibling, which the next write to the same target removes.
//!
//! Buffer writes check free space first so a write that cannot fit never
//! stages anything.

use std::io::Read;

use tracing::{debug, info, warn};

use super::connection::{AccessMode, Connection};
use super::io_copy;
use super::space::format_bytes;
use super::streams::OutputStream;
use crate::errors::{PersistError, Result};
use crate::locator::Locator;
use crate::storage::Storage;

/// Where the new content comes from.
pub enum Source<'a> {
    Buffer(&'a [u8]),
    Stream(&'a mut dyn Read),
}

impl Source<'_> {
    fn known_len(&self) -> Option<u64> {
        match self {
            Source::Buffer(b) => Some(b.len() as u64),
            Source::Stream(_) => None,
        }
    }

    fn copy_into(&mut self, out: &mut OutputStream, chunk_size: usize) -> std::io::Result<u64> {
        match self {
            Source::Buffer(b) => io_copy::copy(&mut &b[..], out, chunk_size),
            Source::Stream(r) => io_copy::copy(&mut **r, out, chunk_size),
        }
    }
}

impl Storage {
    /// Replace or create `target`'s content from `source`. Returns the
    /// number of bytes written.
    pub fn write_atomically(&self, target: &Locator, mut source: Source<'_>) -> Result<u64> {
        let required = source.known_len();
        self.write_staged(target, &mut source, required)
    }

    pub fn write_bytes(&self, target: &Locator, data: &[u8]) -> Result<u64> {
        self.write_atomically(target, Source::Buffer(data))
    }

    pub fn write_from<R: Read>(&self, target: &Locator, reader: &mut R) -> Result<u64> {
        self.write_atomically(target, Source::Stream(reader))
    }

    /// Copy one locator's content over another through the same engine.
    /// Free space is checked against the source file's size.
    pub fn copy_file(&self, source: &Locator, target: &Locator) -> Result<u64> {
        let src = self.open(source, AccessMode::Read)?;
        let size = src.file_size()?;
        let mut input = src.open_input()?;
        let res = self.write_staged(target, &mut Source::Stream(&mut input), Some(size));
        input.close();
        res
    }

    fn write_staged(&self, target: &Locator, source: &mut Source<'_>, required: Option<u64>) -> Result<u64> {
        if target.is_directory() {
            return Err(PersistError::invalid(target, "cannot write to a directory locator"));
        }
        let dest = self.open(target, AccessMode::ReadWrite)?;

        if let Some(required) = required {
            ensure_room(&dest, required)?;
        }

        if !dest.exists()? {
            return self.write_new(&dest, source);
        }
        if dest.is_directory()? {
            return Err(PersistError::invalid(target, "target is a directory"));
        }
        self.replace_existing(&dest, source)
    }

    fn write_new(&self, dest: &Connection<'_>, source: &mut Source<'_>) -> Result<u64> {
        dest.create()?;
        let n = discard_on_failure(dest, || self.stream_into(dest, source))?;
        info!(locator = %dest.locator(), bytes = n, "created file");
        Ok(n)
    }

    fn replace_existing(&self, dest: &Connection<'_>, source: &mut Source<'_>) -> Result<u64> {
        let target_name = dest.name()?;
        let tmp_locator = dest.locator().temp_sibling();
        let mut tmp = self.open(&tmp_locator, AccessMode::ReadWrite)?;

        if tmp.exists()? {
            warn!(locator = %tmp_locator, "removing stale temp sibling");
            tmp.delete()?;
        }
        tmp.create()?;
        let copied = discard_on_failure(&tmp, || self.stream_into(&tmp, source))?;

        // Commit point.
        dest.delete()?;
        tmp.rename(&target_name)?;
        info!(locator = %dest.locator(), bytes = copied, "replaced file");
        Ok(copied)
    }

    /// Open an output stream on `conn`, fill it and release it.
    fn stream_into(&self, conn: &Connection<'_>, source: &mut Source<'_>) -> Result<u64> {
        let mut out = conn.open_output()?;
        let res = self.fill(&mut out, conn, source);
        out.close();
        res
    }

    fn fill(&self, out: &mut OutputStream, conn: &Connection<'_>, source: &mut Source<'_>) -> Result<u64> {
        source
            .copy_into(out, self.chunk_size())
            .map_err(|e| PersistError::from_io("copy data", conn.locator(), out.path(), e))
    }
}

/// Run `stage` against a file just created at `conn`; if it fails the file
/// is removed again (best effort) and the staging error is returned.
fn discard_on_failure<T>(conn: &Connection<'_>, stage: impl FnOnce() -> Result<T>) -> Result<T> {
    stage().inspect_err(|_| {
        if let Err(cleanup) = conn.delete() {
            debug!(locator = %conn.locator(), error = %cleanup, "could not remove partially written file");
        }
    })
}

/// Fail fast when the target's volume cannot hold `required` bytes.
fn ensure_room(conn: &Connection<'_>, required: u64) -> Result<()> {
    let available = conn.available_size()?;
    if available < required {
        warn!(
            locator = %conn.locator(),
            need = %format_bytes(required),
            free = %format_bytes(available),
            "not enough free space"
        );
        return Err(PersistError::InsufficientSpace {
            locator: conn.locator().to_string(),
            required,
            available,
        });
    }
    Ok(())
}
