//! CLI definition and parsing.
//!
//! Notes:
//! - Locators are given in full, e.g. `file:///SDCard/notes/today.txt`.
//! - `--root NAME=PATH` adds or replaces a root from the config file.
//! - --debug is a shorthand for --log-level debug.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use safe_persist::{Config, LogLevel, RootConfig};

/// Crash-safe writes and directory tree maintenance on device storage roots.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Crash-safe file persistence for device storage roots")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Read configuration from this XML file instead of the default location.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Map a locator root onto a host directory (repeatable).
    #[arg(long = "root", global = true, value_name = "NAME=PATH")]
    pub roots: Vec<String>,

    /// Treat the named root as encrypted: new files get the .rem suffix (repeatable).
    #[arg(long = "encrypted-root", global = true, value_name = "NAME")]
    pub encrypted_roots: Vec<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the config file location used by safe_persist and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Atomically replace (or create) a file's content.
    Write {
        locator: String,
        /// Read the new content from this host file.
        #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "data")]
        from: Option<PathBuf>,
        /// Use this string as the new content.
        #[arg(long)]
        data: Option<String>,
        /// Create missing parent directories first.
        #[arg(short, long)]
        parents: bool,
    },
    /// Atomically copy one locator's content over another.
    Copy { source: String, target: String },
    /// Create a directory.
    Mkdir {
        locator: String,
        /// Create missing ancestors too.
        #[arg(short, long)]
        parents: bool,
    },
    /// Delete a file or an empty directory.
    Rm {
        locator: String,
        /// Delete a directory and everything below it.
        #[arg(short, long)]
        recursive: bool,
    },
    /// Rename an entry within its directory.
    Rename { locator: String, new_name: String },
    /// Show existence, kind and size of a locator.
    Stat { locator: String },
    /// Show available, total and used space of a root.
    Space { root: String },
    /// Report whether a root applies the encryption suffix.
    ProbeEncryption { root: String },
    /// List a directory's stored entry names.
    Ls { locator: String },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place).
    pub fn apply_overrides(&self, cfg: &mut Config) -> Result<()> {
        for spec in &self.roots {
            let root = parse_root_spec(spec)?;
            let encrypted = cfg.root(&root.name).is_some_and(|r| r.encrypted);
            cfg.set_root(RootConfig { encrypted, ..root });
        }
        for name in &self.encrypted_roots {
            match cfg.roots.iter_mut().find(|r| &r.name == name) {
                Some(r) => r.encrypted = true,
                None => bail!("--encrypted-root '{name}' does not name a configured root"),
            }
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        Ok(())
    }
}

/// Parse `NAME=PATH`.
fn parse_root_spec(spec: &str) -> Result<RootConfig> {
    let Some((name, path)) = spec.split_once('=') else {
        bail!("--root expects NAME=PATH, got '{spec}'");
    };
    let (name, path) = (name.trim(), path.trim());
    if name.is_empty() || path.is_empty() {
        bail!("--root expects NAME=PATH, got '{spec}'");
    }
    Ok(RootConfig::new(name, path, false))
}

pub fn parse() -> Args {
    Args::parse()
}
