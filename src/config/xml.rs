//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Creates a secure template if missing (unless SAFE_PERSIST_CONFIG is set).
//!
//! Unknown elements are rejected so a typo never silently falls back to a
//! default root.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel, RootConfig, default_roots};
use super::CONFIG_ENV;
use crate::fs_ops::DEFAULT_CHUNK_SIZE;
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "root", default)]
    roots: Vec<XmlRoot>,
    #[serde(rename = "chunk_size", default, deserialize_with = "de_usize_trimmed_opt")]
    chunk_size: Option<usize>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct XmlRoot {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@encrypted", default)]
    encrypted: Option<String>,
    #[serde(rename = "$text", default)]
    path: String,
}

// Trims surrounding whitespace; an unparsable number is treated as absent.
fn de_usize_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<usize>().ok()))
}

fn parse_flag(raw: Option<&str>) -> Result<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => bail!("invalid boolean '{other}' for root attribute 'encrypted'"),
    }
}

fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if !parsed.roots.is_empty() {
        cfg.roots = parsed
            .roots
            .into_iter()
            .map(|r| {
                Ok(RootConfig::new(
                    r.name.trim(),
                    PathBuf::from(r.path.trim()),
                    parse_flag(r.encrypted.as_deref())?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
    }

    if let Some(n) = parsed.chunk_size {
        cfg.chunk_size = n;
    }

    if let Some(s) = parsed.log_level.as_deref()
        && let Ok(level) = s.trim().parse::<LogLevel>()
    {
        cfg.log_level = level;
    }

    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    let cfg = xml_to_config(parsed).with_context(|| format!("config xml '{}'", path.display()))?;
    debug!(path = %path.display(), roots = cfg.roots.len(), "loaded config");
    Ok(cfg)
}

/// If SAFE_PERSIST_CONFIG is set, load and return that Config; otherwise Ok(None).
pub fn load_config_from_xml_env() -> Result<Option<Config>> {
    if env::var_os(CONFIG_ENV).is_none() {
        return Ok(None);
    }
    let path = default_config_path()?;
    load_config_from_xml_path(&path).map(Some)
}

/// Try loading Config from the platform default config.xml path.
/// Ok(None) when the file does not exist.
pub fn load_config_from_default_xml() -> Result<Option<Config>> {
    let path = default_config_path().context("resolve default config path")?;
    if !path.exists() {
        return Ok(None);
    }
    load_config_from_xml_path(&path).map(Some)
}

/// Create a commented template config file and its parent directory.
/// Refuses to write through a symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "/path/to/safe_persist.log".into());

    let mut roots = String::new();
    for r in default_roots() {
        roots.push_str(&format!(
            "  <root name=\"{}\" encrypted=\"{}\">{}</root>\n",
            r.name,
            r.encrypted,
            r.path.display()
        ));
    }

    let content = format!(
        "<!--\n  safe_persist configuration (XML)\n\n  root        -> maps file:///<name>/... onto a host directory\n                 encrypted=\"true\" stores new files with the .rem suffix\n  chunk_size  -> bytes per read when copying streams\n  log_level   -> quiet | normal | info | debug\n  log_file    -> path to log file (optional; stdout/stderr still used)\n\n  CLI flags override XML values.\n-->\n<config>\n{roots}  <chunk_size>{DEFAULT_CHUNK_SIZE}</chunk_size>\n  <log_level>normal</log_level>\n  <log_file>{suggested_log}</log_file>\n</config>\n"
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}

/// Create the default config if SAFE_PERSIST_CONFIG is not set; return the
/// created path so the CLI can tell the user.
pub fn ensure_default_config_exists() -> Option<PathBuf> {
    if env::var_os(CONFIG_ENV).is_some() {
        return None;
    }

    let cfg_path = default_config_path().ok()?;
    if cfg_path.exists() {
        return None;
    }

    match create_template_config(&cfg_path) {
        Ok(()) => Some(cfg_path),
        Err(e) => {
            eprintln!(
                "Failed to create template config at {}: {}",
                cfg_path.display(),
                e
            );
            None
        }
    }
}
