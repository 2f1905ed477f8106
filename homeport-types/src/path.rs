//! Network path categories and candidate sets.
//!
//! A Homeport server may be reachable over several kinds of network path at
//! once. `PathKind` is the closed, priority-ordered set of those kinds;
//! `CandidateSet` is the per-resolution snapshot of known base URLs, one
//! per kind.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A category of network path to reach the same logical server.
///
/// The derived ordering is the fixed resolution priority: a working local
/// path always beats a public one, which always beats a federated remote
/// one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// Local-network address (LAN, VPN into the home network).
    Local,
    /// Public internet address.
    Public,
    /// Federated relay address.
    Remote,
}

impl PathKind {
    /// All path kinds in resolution priority order (highest first).
    pub const ALL: [PathKind; 3] = [PathKind::Local, PathKind::Public, PathKind::Remote];

    /// Stable string key used for settings storage and wire formats.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PathKind::Local => "local",
            PathKind::Public => "public",
            PathKind::Remote => "remote",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(PathKind::Local),
            "public" => Ok(PathKind::Public),
            "remote" => Ok(PathKind::Remote),
            other => Err(Error::UnknownPathKind(other.to_string())),
        }
    }
}

/// The set of currently known base URLs considered for one resolution pass.
///
/// At most one URL per [`PathKind`]; blank URLs are never stored. Built
/// fresh for each pass and not mutated afterwards. Iteration yields
/// entries in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    entries: BTreeMap<PathKind, String>,
}

impl CandidateSet {
    /// Creates an empty candidate set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a candidate set by looking up each path kind in priority
    /// order. Absent and blank results are skipped.
    pub fn from_lookup(mut lookup: impl FnMut(PathKind) -> Option<String>) -> Self {
        let mut set = Self::new();
        for kind in PathKind::ALL {
            if let Some(url) = lookup(kind) {
                set.insert(kind, url);
            }
        }
        set
    }

    /// Inserts a candidate URL for a path kind. Blank URLs are ignored.
    pub fn insert(&mut self, kind: PathKind, url: impl Into<String>) {
        let url = url.into();
        if !url.trim().is_empty() {
            self.entries.insert(kind, url);
        }
    }

    /// Returns the candidate URL for a path kind, if known.
    #[must_use]
    pub fn get(&self, kind: PathKind) -> Option<&str> {
        self.entries.get(&kind).map(String::as_str)
    }

    /// Whether no candidates are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of known candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates candidates in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (PathKind, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}
