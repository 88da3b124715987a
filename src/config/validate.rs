//! Config validation logic.
//! Checks root names, root directories, and the copy chunk size.

use anyhow::{Result, bail};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::types::Config;

impl Config {
    /// Validate roots and sizes. A root directory that does not exist yet is
    /// allowed (an unplugged card is a runtime condition, not a config
    /// error) but one that exists must be a directory.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            bail!("no roots configured");
        }
        if self.chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut resolved = HashMap::new();
        for (i, root) in self.roots.iter().enumerate() {
            let name = root.name.as_str();
            if name.is_empty() {
                bail!("root #{} has an empty name", i + 1);
            }
            if name.contains(['/', '\\']) || name.contains(':') {
                bail!("root name '{name}' must not contain '/', '\\' or ':'");
            }
            if seen.insert(name, i).is_some() {
                bail!("root name '{name}' is configured more than once");
            }
            if root.path.as_os_str().is_empty() {
                bail!("root '{name}' has an empty path");
            }

            if root.path.exists() {
                if !root.path.is_dir() {
                    bail!("root '{name}' is not a directory: {}", root.path.display());
                }
                let real = dunce::canonicalize(&root.path).unwrap_or_else(|_| root.path.clone());
                if let Some(other) = resolved.insert(real.clone(), name) {
                    bail!(
                        "roots '{other}' and '{name}' resolve to the same directory '{}'",
                        real.display()
                    );
                }
                debug!(root = name, path = %real.display(), "root resolved");
            } else {
                warn!(root = name, path = %root.path.display(), "root directory does not exist yet");
            }
        }

        info!(
            roots = self.roots.len(),
            chunk_size = self.chunk_size,
            log_file = %self
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into()),
            "Config validated"
        );
        Ok(())
    }
}
