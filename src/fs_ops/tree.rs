//! Directory tree operations.
//!
//! `delete` is strict: a populated directory is refused with
//! `DirectoryNotEmpty`. `delete_tree` removes everything below the locator
//! first, stripping encryption suffixes from listed names so each child is
//! addressed by its logical locator.

use tracing::{debug, info};

use super::connection::AccessMode;
use crate::errors::{PersistError, Result};
use crate::locator::{Locator, strip_encryption_suffix};
use crate::storage::Storage;

impl Storage {
    /// Create one directory level. Already existing is fine; a missing
    /// parent is `MissingParent`.
    pub fn create_directory(&self, locator: &Locator) -> Result<()> {
        let dir = locator.as_directory();
        let conn = self.open(&dir, AccessMode::ReadWrite)?;
        if conn.is_directory()? {
            return Ok(());
        }
        match conn.mkdir() {
            Ok(()) => Ok(()),
            Err(PersistError::AlreadyExists(_)) if conn.is_directory()? => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Create every missing directory from the root down to `locator`
    /// (or to its parent, for a file locator).
    pub fn create_directory_with_ancestors(&self, locator: &Locator) -> Result<()> {
        let ancestors = locator.ancestors()?;
        if let Some(root) = ancestors.first() {
            // Fails with FilesystemUnavailable when the root is not mounted.
            self.open(root, AccessMode::Read)?.exists()?;
        }
        for dir in &ancestors {
            // Roots are mount points, never created here.
            if dir.parent()?.is_none() {
                continue;
            }
            self.create_directory(dir)?;
        }
        debug!(locator = %locator, levels = ancestors.len(), "ensured directory chain");
        Ok(())
    }

    /// Delete a file or an empty directory. No-op when nothing is there.
    pub fn delete(&self, locator: &Locator) -> Result<()> {
        let conn = self.open(locator, AccessMode::ReadWrite)?;
        if !conn.exists()? {
            return Ok(());
        }
        conn.delete()
    }

    /// Delete `locator` and, for a directory, everything below it.
    pub fn delete_tree(&self, locator: &Locator) -> Result<()> {
        let removed = self.delete_tree_inner(locator)?;
        if removed > 0 {
            info!(locator = %locator, entries = removed, "deleted tree");
        }
        Ok(())
    }

    fn delete_tree_inner(&self, locator: &Locator) -> Result<usize> {
        // A directory listed under a file-style locator is still a directory.
        let probe = self.open(locator, AccessMode::Read)?;
        if !probe.exists()? {
            return Ok(0);
        }
        let is_dir = probe.is_directory()?;
        drop(probe);

        if !is_dir {
            self.open(locator, AccessMode::ReadWrite)?.delete()?;
            return Ok(1);
        }

        let dir = locator.as_directory();
        // Listing is finished and its handle dropped before any child goes.
        let names = self.open(&dir, AccessMode::Read)?.list()?;
        let mut removed = 0;
        for name in &names {
            let child = self.listed_child(&dir, name)?;
            removed += self.delete_tree_inner(&child)?;
        }
        // A root is a mount point: emptied, never removed.
        if dir.parent()?.is_none() {
            return Ok(removed);
        }
        self.open(&dir, AccessMode::ReadWrite)?.delete()?;
        Ok(removed + 1)
    }

    /// Locator for one entry of a listing of `dir`.
    ///
    /// Directories are never suffixed and keep their stored name. A file is
    /// addressed by its logical name unless that name resolves to a
    /// different entry (a plain twin or a directory), in which case the
    /// stored name is used as is.
    fn listed_child(&self, dir: &Locator, listed: &str) -> Result<Locator> {
        if let Some(sub) = listed.strip_suffix('/') {
            return Ok(dir.child(sub).as_directory());
        }
        let logical = dir.child(strip_encryption_suffix(listed));
        if self.open(&logical, AccessMode::Read)?.name()? == listed {
            Ok(logical)
        } else {
            Ok(dir.child(listed))
        }
    }

    /// Rename the entry at `locator` to `new_name` in the same directory and
    /// return the renamed entry's locator. `None` when nothing is there.
    pub fn rename(&self, locator: &Locator, new_name: &str) -> Result<Option<Locator>> {
        let mut conn = self.open(locator, AccessMode::ReadWrite)?;
        if !conn.exists()? {
            debug!(locator = %locator, "nothing to rename");
            return Ok(None);
        }
        conn.rename(new_name)?;
        Ok(Some(conn.locator().clone()))
    }
}
