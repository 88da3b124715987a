//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - RootConfig maps a locator root name onto a host directory.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;
use super::{CARD_ROOT_NAME, DEVICE_MEMORY_ROOT_NAME};
use crate::fs_ops::DEFAULT_CHUNK_SIZE;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// One locator root: `file:///<name>/...` resolves below `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootConfig {
    pub name: String,
    pub path: PathBuf,
    /// Files created under this root get the encryption suffix.
    pub encrypted: bool,
}

impl RootConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, encrypted: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            encrypted,
        }
    }
}

/// Runtime configuration for the storage layer and the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    pub roots: Vec<RootConfig>,
    /// Read size for stream copies
    pub chunk_size: usize,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            log_level: LogLevel::Normal,
            log_file: paths::default_log_path().ok(),
        }
    }
}

impl Config {
    /// Config with exactly the given roots; other fields use defaults.
    pub fn with_roots(roots: Vec<RootConfig>) -> Self {
        Self {
            roots,
            ..Default::default()
        }
    }

    pub fn root(&self, name: &str) -> Option<&RootConfig> {
        self.roots.iter().find(|r| r.name == name)
    }

    /// Insert or replace a root by name.
    pub fn set_root(&mut self, root: RootConfig) {
        match self.roots.iter_mut().find(|r| r.name == root.name) {
            Some(existing) => *existing = root,
            None => self.roots.push(root),
        }
    }
}

/// Card and device-memory roots below the data dir.
pub(crate) fn default_roots() -> Vec<RootConfig> {
    match paths::default_data_dir() {
        Ok(base) => vec![
            RootConfig::new(CARD_ROOT_NAME, base.join(CARD_ROOT_NAME), false),
            RootConfig::new(DEVICE_MEMORY_ROOT_NAME, base.join(DEVICE_MEMORY_ROOT_NAME), false),
        ],
        Err(_) => Vec::new(),
    }
}
