//! Windows implementations of platform helpers (best-effort, no ACL management).
//!
//! Windows lacks POSIX mode semantics, so the mode setters are no-ops.

use anyhow::{Context, Result, bail};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use super::temp::tmp_config_sibling_name;

/// Open a log file for appending. A file already larger than `max_len` is
/// emptied first.
pub fn open_log_file_secure_append(path: &Path, max_len: u64) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let f = OpenOptions::new().create(true).append(true).open(path)?;
    if f.metadata()?.len() > max_len {
        f.set_len(0)?;
    }
    Ok(f)
}

/// Write a new config file via temp + rename. Fails if the target exists.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;
    fs::create_dir_all(parent).with_context(|| format!("create parent '{}'", parent.display()))?;

    let tmp = tmp_config_sibling_name(path);
    let written = (|| -> io::Result<()> {
        let mut f = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
        f.write_all(contents)?;
        f.sync_all()
    })();
    if let Err(e) = written.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("write config '{}'", path.display()));
    }
    Ok(())
}

/// No-op on Windows.
pub fn set_dir_mode_0700(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// No-op on Windows.
pub fn set_file_mode_0600(_path: &Path) -> io::Result<()> {
    Ok(())
}
