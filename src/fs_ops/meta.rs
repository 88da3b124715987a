//! Read-only queries on locators and roots.
//!
//! Size and space queries return `SIZE_UNKNOWN` (-1) instead of an error
//! when the answer cannot be read; callers that need the reason check
//! accessibility separately. Existence queries propagate errors, except
//! the two "is it accessible" wrappers which degrade to `false`.

use tracing::{debug, warn};

use super::connection::{AccessMode, Connection};
use crate::errors::Result;
use crate::locator::{CARD_ROOT, DEVICE_MEMORY_ROOT, ENCRYPTION_SUFFIX, Locator};
use crate::storage::Storage;

/// Sentinel for "unknown or inaccessible"; never a real size.
pub const SIZE_UNKNOWN: i64 = -1;

/// Name of the throwaway file used to observe encryption.
pub const PROBE_FILE_NAME: &str = ".safe_persist_probe";

fn to_signed(what: &str, locator: &Locator, r: Result<u64>) -> i64 {
    match r {
        Ok(n) => i64::try_from(n).unwrap_or(i64::MAX),
        Err(e) => {
            debug!(locator = %locator, error = %e, "{what} unknown");
            SIZE_UNKNOWN
        }
    }
}

impl Storage {
    fn query<T>(&self, locator: &Locator, f: impl FnOnce(&Connection<'_>) -> Result<T>) -> Result<T> {
        let conn = self.open(locator, AccessMode::Read)?;
        f(&conn)
    }

    pub fn is_present(&self, locator: &Locator) -> Result<bool> {
        self.query(locator, |c| c.exists())
    }

    pub fn is_directory(&self, locator: &Locator) -> Result<bool> {
        self.query(locator, |c| c.is_directory())
    }

    pub fn file_size(&self, locator: &Locator) -> i64 {
        to_signed("file size", locator, self.query(locator, |c| c.file_size()))
    }

    pub fn directory_size(&self, locator: &Locator, include_subdirs: bool) -> i64 {
        to_signed(
            "directory size",
            locator,
            self.query(locator, |c| c.directory_size(include_subdirs)),
        )
    }

    /// Bytes available on the volume holding `root`.
    pub fn available_space(&self, root: &Locator) -> i64 {
        to_signed("available space", root, self.query(root, |c| c.available_size()))
    }

    pub fn total_space(&self, root: &Locator) -> i64 {
        to_signed("total space", root, self.query(root, |c| c.total_size()))
    }

    pub fn used_space(&self, root: &Locator) -> i64 {
        to_signed("used space", root, self.query(root, |c| c.used_size()))
    }

    fn is_accessible(&self, root: &str) -> bool {
        let loc = Locator::from(root);
        self.is_directory(&loc).unwrap_or_else(|e| {
            debug!(root, error = %e, "root not accessible");
            false
        })
    }

    pub fn is_card_accessible(&self) -> bool {
        self.is_accessible(CARD_ROOT)
    }

    pub fn is_device_memory_accessible(&self) -> bool {
        self.is_accessible(DEVICE_MEMORY_ROOT)
    }

    /// Create a probe file under `root` and report whether its stored name
    /// came back with the encryption suffix.
    pub fn is_encryption_enabled(&self, root: &Locator) -> Result<bool> {
        let probe = root.as_directory().child(PROBE_FILE_NAME);
        let conn = self.open(&probe, AccessMode::ReadWrite)?;
        if conn.exists()? {
            conn.delete()?;
        }
        conn.create()?;
        let name = conn.name();

        if let Err(e) = conn.delete() {
            warn!(locator = %probe, error = %e, "probe file left behind");
            self.sink()
                .report(&format!("error deleting encryption probe {probe}: {e}"));
        }

        let encrypted = name?.ends_with(ENCRYPTION_SUFFIX);
        debug!(root = %root, encrypted, "encryption probe");
        Ok(encrypted)
    }

    pub fn is_card_encrypted(&self) -> Result<bool> {
        self.is_encryption_enabled(&Locator::from(CARD_ROOT))
    }

    /// Stored names in a directory, sorted; subdirectories end in `/`.
    /// Names keep their encryption suffix.
    pub fn list(&self, locator: &Locator) -> Result<Vec<String>> {
        self.query(&locator.as_directory(), |c| c.list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::space::FixedSpace;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sizes_fall_back_to_sentinel() {
        let td = tempdir().unwrap();
        let storage = Storage::new().with_root("SDCard", td.path().join("gone"), false);
        assert_eq!(storage.file_size(&Locator::from("file:///SDCard/a")), SIZE_UNKNOWN);
        assert_eq!(storage.available_space(&Locator::from(CARD_ROOT)), SIZE_UNKNOWN);
        assert_eq!(storage.file_size(&Locator::from("no-separator")), SIZE_UNKNOWN);
    }

    #[test]
    fn space_reads_through_probe() {
        let td = tempdir().unwrap();
        let storage = Storage::new()
            .with_root("SDCard", td.path(), false)
            .with_space_probe(FixedSpace::new(40, 100));
        let root = Locator::from(CARD_ROOT);
        assert_eq!(storage.available_space(&root), 40);
        assert_eq!(storage.total_space(&root), 100);
        assert_eq!(storage.used_space(&root), 60);
    }

    #[test]
    fn accessibility_wrappers_never_fail() {
        let td = tempdir().unwrap();
        let storage = Storage::new().with_root("store", td.path(), false);
        assert!(storage.is_device_memory_accessible());
        // No SDCard root configured at all.
        assert!(!storage.is_card_accessible());
    }

    #[test]
    fn probe_detects_encrypted_root_and_cleans_up() {
        let td = tempdir().unwrap();
        let plain = td.path().join("plain");
        let enc = td.path().join("enc");
        fs::create_dir(&plain).unwrap();
        fs::create_dir(&enc).unwrap();
        let storage = Storage::new()
            .with_root("store", &plain, false)
            .with_root("SDCard", &enc, true);
        assert!(!storage.is_encryption_enabled(&Locator::from(DEVICE_MEMORY_ROOT)).unwrap());
        assert!(storage.is_card_encrypted().unwrap());
        assert_eq!(fs::read_dir(&plain).unwrap().count(), 0);
        assert_eq!(fs::read_dir(&enc).unwrap().count(), 0);
    }
}
