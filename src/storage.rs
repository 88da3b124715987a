//! Storage: the configured roots plus the collaborators every operation uses.
//!
//! A root maps the first locator component (`SDCard` in
//! `file:///SDCard/a.txt`) onto a host directory. Roots flagged `encrypted`
//! reproduce the device's transparent encryption: files created there are
//! stored with `.rem` appended to their names.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::trace;

use crate::config::Config;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::errors::{PersistError, Result};
use crate::fs_ops::connection::{AccessMode, Connection};
use crate::fs_ops::io_copy::DEFAULT_CHUNK_SIZE;
use crate::fs_ops::space::{Fs2Probe, SpaceProbe};
use crate::locator::Locator;

/// Only scheme the storage resolves.
pub const FILE_SCHEME: &str = "file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub name: String,
    pub path: PathBuf,
    pub encrypted: bool,
}

pub struct Storage {
    roots: BTreeMap<String, Root>,
    space: Arc<dyn SpaceProbe>,
    sink: Arc<dyn DiagnosticSink>,
    chunk_size: usize,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("roots", &self.roots)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    /// Storage with no roots, host space statistics and the tracing sink.
    pub fn new() -> Self {
        Self {
            roots: BTreeMap::new(),
            space: Arc::new(Fs2Probe),
            sink: Arc::new(TracingSink),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Build from a loaded configuration.
    pub fn from_config(cfg: &Config) -> Self {
        let mut storage = Self::new().with_chunk_size(cfg.chunk_size);
        for r in &cfg.roots {
            storage = storage.with_root(&r.name, r.path.clone(), r.encrypted);
        }
        storage
    }

    pub fn with_root(mut self, name: &str, path: impl Into<PathBuf>, encrypted: bool) -> Self {
        self.roots.insert(
            name.to_string(),
            Root {
                name: name.to_string(),
                path: path.into(),
                encrypted,
            },
        );
        self
    }

    pub fn with_space_probe(mut self, probe: impl SpaceProbe + 'static) -> Self {
        self.space = Arc::new(probe);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn roots(&self) -> impl Iterator<Item = &Root> {
        self.roots.values()
    }

    pub fn root(&self, name: &str) -> Option<&Root> {
        self.roots.get(name)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn space(&self) -> &dyn SpaceProbe {
        self.space.as_ref()
    }

    pub(crate) fn sink(&self) -> Arc<dyn DiagnosticSink> {
        Arc::clone(&self.sink)
    }

    /// Open a connection to `locator`. Only parses and resolves; nothing on
    /// disk is touched until the connection is used.
    pub fn open(&self, locator: &Locator, mode: AccessMode) -> Result<Connection<'_>> {
        let parts = locator.parts()?;
        if parts.scheme != FILE_SCHEME {
            return Err(PersistError::invalid(
                locator,
                format!("unsupported scheme '{}'", parts.scheme),
            ));
        }
        let root = self
            .roots
            .get(parts.root)
            .ok_or_else(|| PersistError::invalid(locator, format!("unknown root '{}'", parts.root)))?;

        let mut host = root.path.clone();
        for seg in &parts.segments {
            if seg.contains('\\') {
                return Err(PersistError::invalid(locator, "backslash in path segment"));
            }
            host.push(seg);
        }
        trace!(locator = %locator, host = %host.display(), ?mode, "open connection");
        Ok(Connection::new(self, root, locator.clone(), host, mode))
    }
}
