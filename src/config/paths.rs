//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log/data paths and detects symlinked ancestors for safety.

use anyhow::{Context, Result};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

const APP_DIR: &str = "safe_persist";

/// Config path: `$SAFE_PERSIST_CONFIG` when set (a directory gets
/// `config.xml` appended, a relative path is taken from the current
/// directory), otherwise the OS config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV) {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            p = env::current_dir()
                .context("resolve current directory for relative config path")?
                .join(p);
        }
        if p.is_dir() {
            p.push("config.xml");
        }
        return Ok(p);
    }
    if let Some(mut base) = config_dir() {
        base.push(APP_DIR);
        base.push("config.xml");
        return Ok(base);
    }
    let home = env::var("HOME").context("no config dir and HOME is unset")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join(APP_DIR)
        .join("config.xml"))
}

/// OS-appropriate data directory; default roots live below it.
pub fn default_data_dir() -> Result<PathBuf> {
    if let Some(mut base) = data_dir() {
        base.push(APP_DIR);
        return Ok(base);
    }
    let home = env::var("HOME").context("no data dir and HOME is unset")?;
    Ok(PathBuf::from(home).join(".local").join("share").join(APP_DIR))
}

/// OS-appropriate default log file path (data dir).
pub fn default_log_path() -> Result<PathBuf> {
    let base = default_data_dir()?;
    // best-effort; the logger reports a failure to open the file itself
    let _ = fs::create_dir_all(&base);
    Ok(base.join("safe_persist.log"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn env_directory_gets_config_xml() {
        let td = tempdir().unwrap();
        unsafe { env::set_var(CONFIG_ENV, td.path()) };
        let p = default_config_path().unwrap();
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(p, td.path().join("config.xml"));
    }

    #[test]
    #[serial]
    fn env_file_is_used_verbatim() {
        let td = tempdir().unwrap();
        let file = td.path().join("custom.xml");
        unsafe { env::set_var(CONFIG_ENV, &file) };
        let p = default_config_path().unwrap();
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(p, file);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_ancestor_detected() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("x.log")).unwrap());
        assert!(!path_has_symlink_ancestor(&real.join("x.log")).unwrap());
    }
}
