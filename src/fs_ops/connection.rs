//! Connections: an open handle on one locator.
//!
//! A connection resolves its locator's logical name to the name actually
//! stored on the host. On an encrypted root a file `a.txt` is stored as
//! `a.txt.rem`; lookups try the plain name first and then the suffixed one,
//! so callers can keep reasoning about logical names.
//!
//! Mutating calls require a writable mode, reads require a readable one.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::streams::{InputStream, OutputStream};
use crate::errors::{PersistError, Result};
use crate::locator::{ENCRYPTION_SUFFIX, Locator, strip_encryption_suffix};
use crate::storage::{Root, Storage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

impl AccessMode {
    fn can_read(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    fn can_write(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

#[derive(Debug)]
pub struct Connection<'s> {
    storage: &'s Storage,
    root: &'s Root,
    locator: Locator,
    logical: PathBuf,
    mode: AccessMode,
}

fn with_suffix(path: &Path) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(ENCRYPTION_SUFFIX);
    PathBuf::from(s)
}

impl<'s> Connection<'s> {
    pub(crate) fn new(
        storage: &'s Storage,
        root: &'s Root,
        locator: Locator,
        logical: PathBuf,
        mode: AccessMode,
    ) -> Self {
        Self {
            storage,
            root,
            locator,
            logical,
            mode,
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Host path of the logical (unsuffixed) name.
    pub fn host_path(&self) -> &Path {
        &self.logical
    }

    fn io_err(&self, op: &str, path: &Path, e: io::Error) -> PersistError {
        PersistError::from_io(op, &self.locator, path, e)
    }

    fn require_read(&self, op: &str) -> Result<()> {
        if self.mode.can_read() {
            Ok(())
        } else {
            Err(PersistError::PermissionDenied {
                locator: self.locator.to_string(),
                context: format!("{op} needs a readable connection"),
            })
        }
    }

    fn require_write(&self, op: &str) -> Result<()> {
        if self.mode.can_write() {
            Ok(())
        } else {
            Err(PersistError::PermissionDenied {
                locator: self.locator.to_string(),
                context: format!("{op} needs a writable connection"),
            })
        }
    }

    /// The root must be a reachable directory for anything below it to exist.
    fn ensure_mounted(&self) -> Result<()> {
        match fs::metadata(&self.root.path) {
            Ok(m) if m.is_dir() => Ok(()),
            Ok(_) => Err(PersistError::unavailable(
                &self.locator,
                format!("root '{}' is not a directory", self.root.path.display()),
            )),
            Err(e) => Err(PersistError::unavailable(
                &self.locator,
                format!("root '{}': {}", self.root.path.display(), e),
            )),
        }
    }

    fn probe(&self, path: &Path) -> Result<Option<fs::Metadata>> {
        match fs::symlink_metadata(path) {
            Ok(m) => Ok(Some(m)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotADirectory => Ok(None),
            Err(e) => Err(self.io_err("stat", path, e)),
        }
    }

    /// Host path and metadata of the stored entry, if any.
    fn stored(&self) -> Result<Option<(PathBuf, fs::Metadata)>> {
        self.ensure_mounted()?;
        if let Some(m) = self.probe(&self.logical)? {
            if self.locator.is_directory() && !m.is_dir() {
                return Ok(None);
            }
            return Ok(Some((self.logical.clone(), m)));
        }
        if self.locator.is_directory() {
            return Ok(None);
        }
        let suffixed = with_suffix(&self.logical);
        Ok(self
            .probe(&suffixed)?
            .filter(|m| !m.is_dir())
            .map(|m| (suffixed, m)))
    }

    fn stored_or_missing(&self) -> Result<(PathBuf, fs::Metadata)> {
        self.stored()?
            .ok_or_else(|| PersistError::NotFound(self.locator.to_string()))
    }

    fn ensure_parent(&self) -> Result<()> {
        let parent = self
            .logical
            .parent()
            .ok_or_else(|| PersistError::invalid(&self.locator, "no parent directory"))?;
        match self.probe(parent)? {
            Some(m) if m.is_dir() => Ok(()),
            _ => Err(PersistError::MissingParent(self.locator.to_string())),
        }
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.stored()?.is_some())
    }

    pub fn is_directory(&self) -> Result<bool> {
        Ok(self.stored()?.is_some_and(|(_, m)| m.is_dir()))
    }

    /// Stored leaf name, including an encryption suffix the platform added.
    /// The logical name when nothing is stored yet.
    pub fn name(&self) -> Result<String> {
        match self.stored()? {
            Some((p, _)) => Ok(p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.locator.name().to_string())),
            None => Ok(self.locator.name().to_string()),
        }
    }

    /// Create an empty file. Encrypted roots store it under the suffixed name.
    pub fn create(&self) -> Result<()> {
        self.require_write("create")?;
        if self.locator.is_directory() {
            return Err(PersistError::invalid(&self.locator, "create() on a directory locator; use mkdir()"));
        }
        if self.exists()? {
            return Err(PersistError::AlreadyExists(self.locator.to_string()));
        }
        self.ensure_parent()?;
        let target = if self.root.encrypted {
            with_suffix(&self.logical)
        } else {
            self.logical.clone()
        };
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| self.io_err("create file", &target, e))?;
        debug!(locator = %self.locator, stored = %target.display(), "created file");
        Ok(())
    }

    /// Create exactly one directory level.
    pub fn mkdir(&self) -> Result<()> {
        self.require_write("mkdir")?;
        if self.exists()? {
            return Err(PersistError::AlreadyExists(self.locator.to_string()));
        }
        self.ensure_parent()?;
        fs::create_dir(&self.logical).map_err(|e| self.io_err("create directory", &self.logical, e))?;
        debug!(locator = %self.locator, "created directory");
        Ok(())
    }

    /// Delete the file, or the directory if it is empty.
    pub fn delete(&self) -> Result<()> {
        self.require_write("delete")?;
        let (path, meta) = self.stored_or_missing()?;
        if meta.is_dir() {
            fs::remove_dir(&path).map_err(|e| self.io_err("remove directory", &path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| self.io_err("remove file", &path, e))?;
        }
        debug!(locator = %self.locator, stored = %path.display(), "deleted");
        Ok(())
    }

    /// Rename in place. `new_name` is taken literally as the stored name;
    /// afterwards the connection points at the renamed entry.
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        self.require_write("rename")?;
        if new_name.is_empty()
            || new_name == "."
            || new_name == ".."
            || new_name.contains(['/', '\\'])
        {
            return Err(PersistError::invalid(
                &self.locator,
                format!("'{new_name}' is not a plain file name"),
            ));
        }
        let parent_locator = self
            .locator
            .parent()?
            .ok_or_else(|| PersistError::invalid(&self.locator, "cannot rename a root"))?;
        let (path, meta) = self.stored_or_missing()?;
        let parent = path
            .parent()
            .ok_or_else(|| PersistError::invalid(&self.locator, "no parent directory"))?;
        let dest = parent.join(new_name);
        if self.probe(&dest)?.is_some() {
            return Err(PersistError::AlreadyExists(format!("{} -> {}", self.locator, new_name)));
        }
        fs::rename(&path, &dest).map_err(|e| self.io_err("rename", &path, e))?;

        let logical_name = strip_encryption_suffix(new_name);
        let mut renamed = parent_locator.child(logical_name);
        if meta.is_dir() {
            renamed = renamed.as_directory();
        }
        debug!(from = %self.locator, to = %renamed, "renamed");
        self.logical = parent.join(logical_name);
        self.locator = renamed;
        Ok(())
    }

    /// Stored names of the directory's entries, sorted; directories carry a
    /// trailing `/`. Encryption suffixes are left in place.
    pub fn list(&self) -> Result<Vec<String>> {
        self.require_read("list")?;
        let (path, meta) = self.stored_or_missing()?;
        if !meta.is_dir() {
            return Err(PersistError::invalid(&self.locator, "not a directory"));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&path).map_err(|e| self.io_err("list directory", &path, e))? {
            let entry = entry.map_err(|e| self.io_err("list directory", &path, e))?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry
                .file_type()
                .map_err(|e| self.io_err("stat entry", &entry.path(), e))?
                .is_dir();
            if is_dir {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    pub fn file_size(&self) -> Result<u64> {
        self.require_read("file_size")?;
        let (_, meta) = self.stored_or_missing()?;
        if meta.is_dir() {
            return Err(PersistError::invalid(&self.locator, "not a file"));
        }
        Ok(meta.len())
    }

    /// Sum of file sizes below the directory, one level or the whole tree.
    pub fn directory_size(&self, include_subdirs: bool) -> Result<u64> {
        self.require_read("directory_size")?;
        let (path, meta) = self.stored_or_missing()?;
        if !meta.is_dir() {
            return Err(PersistError::invalid(&self.locator, "not a directory"));
        }
        let depth = if include_subdirs { usize::MAX } else { 1 };
        let mut total = 0u64;
        for entry in WalkDir::new(&path).min_depth(1).max_depth(depth) {
            let entry = entry.map_err(|e| {
                let at = e.path().map(Path::to_path_buf).unwrap_or_else(|| path.clone());
                self.io_err("walk directory", &at, e.into())
            })?;
            if entry.file_type().is_file() {
                let m = entry
                    .metadata()
                    .map_err(|e| self.io_err("stat entry", entry.path(), e.into()))?;
                total += m.len();
            }
        }
        Ok(total)
    }

    fn space_query(&self, what: &str, f: impl FnOnce(&Path) -> io::Result<u64>) -> Result<u64> {
        self.ensure_mounted()?;
        f(&self.root.path).map_err(|e| PersistError::unavailable(&self.locator, format!("{what}: {e}")))
    }

    /// Bytes available on the volume holding this locator's root.
    pub fn available_size(&self) -> Result<u64> {
        self.space_query("available space", |p| self.storage.space().available(p))
    }

    pub fn total_size(&self) -> Result<u64> {
        self.space_query("total space", |p| self.storage.space().total(p))
    }

    pub fn used_size(&self) -> Result<u64> {
        let total = self.total_size()?;
        let free = self.space_query("free space", |p| self.storage.space().free(p))?;
        Ok(total.saturating_sub(free))
    }

    pub fn open_input(&self) -> Result<InputStream> {
        self.require_read("open_input")?;
        let (path, meta) = self.stored_or_missing()?;
        if meta.is_dir() {
            return Err(PersistError::invalid(&self.locator, "cannot stream a directory"));
        }
        let f = File::open(&path).map_err(|e| self.io_err("open for reading", &path, e))?;
        Ok(InputStream::new(f, path))
    }

    /// Output stream over the existing file, truncating it.
    pub fn open_output(&self) -> Result<OutputStream> {
        self.require_write("open_output")?;
        let (path, meta) = self.stored_or_missing()?;
        if meta.is_dir() {
            return Err(PersistError::invalid(&self.locator, "cannot stream a directory"));
        }
        let f = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| self.io_err("open for writing", &path, e))?;
        Ok(OutputStream::new(f, path, self.storage.chunk_size(), self.storage.sink()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    fn card(dir: &Path, encrypted: bool) -> Storage {
        Storage::new().with_root("SDCard", dir, encrypted)
    }

    #[test]
    fn create_on_encrypted_root_adds_suffix() {
        let td = tempdir().unwrap();
        let storage = card(td.path(), true);
        let conn = storage
            .open(&Locator::from("file:///SDCard/a.txt"), AccessMode::ReadWrite)
            .unwrap();
        conn.create().unwrap();
        assert!(td.path().join("a.txt.rem").is_file());
        assert!(conn.exists().unwrap());
        assert_eq!(conn.name().unwrap(), "a.txt.rem");
    }

    #[test]
    fn read_mode_refuses_mutation() {
        let td = tempdir().unwrap();
        let storage = card(td.path(), false);
        let conn = storage
            .open(&Locator::from("file:///SDCard/a.txt"), AccessMode::Read)
            .unwrap();
        assert_eq!(conn.create().unwrap_err().code(), ErrorCode::PermissionDenied);
    }

    #[test]
    fn create_without_parent_is_missing_parent() {
        let td = tempdir().unwrap();
        let storage = card(td.path(), false);
        let conn = storage
            .open(&Locator::from("file:///SDCard/no/a.txt"), AccessMode::ReadWrite)
            .unwrap();
        assert_eq!(conn.create().unwrap_err().code(), ErrorCode::MissingParent);
        let dir = storage
            .open(&Locator::from("file:///SDCard/no/deeper/"), AccessMode::ReadWrite)
            .unwrap();
        assert_eq!(dir.mkdir().unwrap_err().code(), ErrorCode::MissingParent);
    }

    #[test]
    fn unmounted_root_is_unavailable() {
        let td = tempdir().unwrap();
        let storage = card(&td.path().join("unplugged"), false);
        let conn = storage
            .open(&Locator::from("file:///SDCard/a.txt"), AccessMode::Read)
            .unwrap();
        assert_eq!(conn.exists().unwrap_err().code(), ErrorCode::FilesystemUnavailable);
        assert_eq!(conn.available_size().unwrap_err().code(), ErrorCode::FilesystemUnavailable);
    }

    #[test]
    fn streams_roundtrip_through_connection() {
        let td = tempdir().unwrap();
        let storage = card(td.path(), false);
        let conn = storage
            .open(&Locator::from("file:///SDCard/s.bin"), AccessMode::ReadWrite)
            .unwrap();
        conn.create().unwrap();
        let mut out = conn.open_output().unwrap();
        out.write_all(b"payload").unwrap();
        out.close();
        let mut input = conn.open_input().unwrap();
        let mut got = String::new();
        input.read_to_string(&mut got).unwrap();
        assert_eq!(got, "payload");
        assert_eq!(conn.file_size().unwrap(), 7);
    }

    #[test]
    fn rename_updates_locator() {
        let td = tempdir().unwrap();
        std::fs::write(td.path().join("old.txt"), "x").unwrap();
        let storage = card(td.path(), false);
        let mut conn = storage
            .open(&Locator::from("file:///SDCard/old.txt"), AccessMode::ReadWrite)
            .unwrap();
        conn.rename("new.txt").unwrap();
        assert_eq!(conn.locator().as_str(), "file:///SDCard/new.txt");
        assert!(conn.exists().unwrap());
        assert!(!td.path().join("old.txt").exists());
        assert_eq!(conn.rename("a/b").unwrap_err().code(), ErrorCode::InvalidLocator);
    }

    #[test]
    fn list_marks_directories() {
        let td = tempdir().unwrap();
        std::fs::create_dir(td.path().join("sub")).unwrap();
        std::fs::write(td.path().join("f.txt.rem"), "x").unwrap();
        let storage = card(td.path(), true);
        let conn = storage
            .open(&Locator::from("file:///SDCard/"), AccessMode::Read)
            .unwrap();
        assert_eq!(conn.list().unwrap(), vec!["f.txt.rem".to_string(), "sub/".to_string()]);
    }
}
