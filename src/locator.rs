//! Resource locators: `file:///<root>/<path>`.
//!
//! A `Locator` is an immutable string. Building one never touches the
//! filesystem and never validates; parsing happens when a derived value
//! (ancestors, parent, root) is needed or when storage resolves it.
//! Directory locators end with `/`.

use std::fmt;
use std::str::FromStr;

use crate::errors::{PersistError, Result};

pub const SCHEME_SEPARATOR: &str = "://";

/// Appended to a target's locator to stage new content before commit.
pub const TMP_SUFFIX: &str = ".tmp";

/// Appended by the platform to file names on an encrypted volume.
pub const ENCRYPTION_SUFFIX: &str = ".rem";

/// Removable card root.
pub const CARD_ROOT: &str = "file:///SDCard/";

/// Device memory root.
pub const DEVICE_MEMORY_ROOT: &str = "file:///store/";

/// Remove a trailing encryption marker from a stored name.
///
/// Names without the marker are returned unchanged. Callers holding an
/// `Option<&str>` can map through this (`None` stays `None`).
pub fn strip_encryption_suffix(name: &str) -> &str {
    name.strip_suffix(ENCRYPTION_SUFFIX).unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator(String);

/// Borrowed view of a parsed locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorParts<'a> {
    pub scheme: &'a str,
    pub root: &'a str,
    pub segments: Vec<&'a str>,
    /// `scheme://.../root/`, exactly as written in the source string.
    pub head: &'a str,
}

impl Locator {
    pub fn new(s: impl Into<String>) -> Self {
        Locator(s.into())
    }

    /// Concatenate segments onto `root`, inserting `/` where needed.
    pub fn join(root: &Locator, segments: &[&str]) -> Locator {
        let mut out = root.0.clone();
        for seg in segments {
            if !out.ends_with('/') {
                out.push('/');
            }
            out.push_str(seg);
        }
        Locator(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Split into scheme, root and path segments.
    pub fn parts(&self) -> Result<LocatorParts<'_>> {
        let s = self.0.as_str();
        let sep = s
            .find(SCHEME_SEPARATOR)
            .ok_or_else(|| PersistError::invalid(s, "missing '://' separator"))?;
        let scheme = &s[..sep];
        if scheme.is_empty() {
            return Err(PersistError::invalid(s, "empty scheme"));
        }

        let after = sep + SCHEME_SEPARATOR.len();
        // J2ME style `file:///root/` carries an empty host; accept both forms.
        let root_start = if s[after..].starts_with('/') { after + 1 } else { after };
        let rest = &s[root_start..];
        let (root, tail, head_end) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i + 1..], root_start + i + 1),
            None => (rest, "", s.len()),
        };
        if root.is_empty() {
            return Err(PersistError::invalid(s, "missing root"));
        }

        let trimmed = tail.strip_suffix('/').unwrap_or(tail);
        let mut segments = Vec::new();
        if !trimmed.is_empty() {
            for seg in trimmed.split('/') {
                match seg {
                    "" => return Err(PersistError::invalid(s, "empty path segment")),
                    "." | ".." => return Err(PersistError::invalid(s, "relative path segment")),
                    _ => segments.push(seg),
                }
            }
        }

        Ok(LocatorParts {
            scheme,
            root,
            segments,
            head: &s[..head_end],
        })
    }

    /// Every directory prefix from the root down, top first.
    ///
    /// For a directory locator the locator itself is the last entry; for a
    /// file locator the last entry is its parent directory.
    pub fn ancestors(&self) -> Result<Vec<Locator>> {
        let parts = self.parts()?;
        let mut head = parts.head.to_string();
        if !head.ends_with('/') {
            head.push('/');
        }

        let dir_segments = if self.is_directory() {
            parts.segments.len()
        } else {
            parts.segments.len().saturating_sub(1)
        };

        let mut out = Vec::with_capacity(dir_segments + 1);
        out.push(Locator(head.clone()));
        for seg in &parts.segments[..dir_segments] {
            head.push_str(seg);
            head.push('/');
            out.push(Locator(head.clone()));
        }
        Ok(out)
    }

    /// Last path component without a trailing `/`. The root's own name for
    /// a root locator.
    pub fn name(&self) -> &str {
        let trimmed = self.0.strip_suffix('/').unwrap_or(&self.0);
        match trimmed.rfind('/') {
            Some(i) => &trimmed[i + 1..],
            None => trimmed,
        }
    }

    /// Containing directory, `None` for a root.
    pub fn parent(&self) -> Result<Option<Locator>> {
        let parts = self.parts()?;
        if parts.segments.is_empty() {
            return Ok(None);
        }
        let trimmed = self.0.strip_suffix('/').unwrap_or(&self.0);
        let cut = trimmed.rfind('/').map(|i| i + 1).unwrap_or(trimmed.len());
        Ok(Some(Locator(trimmed[..cut].to_string())))
    }

    /// Same locator with a trailing `/`.
    pub fn as_directory(&self) -> Locator {
        if self.is_directory() {
            self.clone()
        } else {
            Locator(format!("{}/", self.0))
        }
    }

    /// Entry `name` inside this locator treated as a directory.
    pub fn child(&self, name: &str) -> Locator {
        Locator(format!("{}{}", self.as_directory().0, name))
    }

    /// Reserved-name twin used to stage content before commit.
    pub fn temp_sibling(&self) -> Locator {
        Locator(format!("{}{}", self.0, TMP_SUFFIX))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parsing validates the syntax; `From<&str>` does not.
impl FromStr for Locator {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self> {
        let loc = Locator::new(s);
        loc.parts()?;
        Ok(loc)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Locator::new(s)
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Locator(s)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
