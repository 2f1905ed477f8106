//! Directory models.
//!
//! `Device` is the rich model used by the device directory: one physical
//! server known under an opaque source-assigned id, optionally carrying a
//! TLS certificate common name (the only cross-source identity we have)
//! and one base URL per path kind. `Server` is the flat model used by the
//! simpler server-picker directory.
//!
//! Both are immutable values: merging produces new instances, sources
//! produce fresh ones on every emission.

use crate::PathKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A device (server installation) known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque identifier assigned by whichever source produced this value.
    pub id: String,
    /// Human-readable device name.
    pub name: String,
    /// TLS certificate common name, when the source knows it. Used solely
    /// to recognise the same physical server across sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_common_name: Option<String>,
    /// Base URL per path kind under which this device is reachable.
    pub available_paths: BTreeMap<PathKind, String>,
}

impl Device {
    /// Creates a device with no known paths.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            certificate_common_name: None,
            available_paths: BTreeMap::new(),
        }
    }

    /// Sets the certificate common name.
    #[must_use]
    pub fn with_certificate(mut self, common_name: impl Into<String>) -> Self {
        self.certificate_common_name = Some(common_name.into());
        self
    }

    /// Adds a base URL for a path kind.
    #[must_use]
    pub fn with_path(mut self, kind: PathKind, url: impl Into<String>) -> Self {
        self.available_paths.insert(kind, url.into());
        self
    }

    /// The certificate common name usable as a cross-source identity:
    /// non-blank, or `None`.
    #[must_use]
    pub fn certificate(&self) -> Option<&str> {
        self.certificate_common_name
            .as_deref()
            .map(str::trim)
            .filter(|cn| !cn.is_empty())
    }

    /// Returns a new device with this device's identity and the union of
    /// both path maps. On a per-kind collision `other`'s URL wins.
    #[must_use]
    pub fn with_merged_paths(&self, other: &Device) -> Device {
        let mut merged = self.clone();
        merged
            .available_paths
            .extend(other.available_paths.iter().map(|(k, v)| (*k, v.clone())));
        merged
    }
}

/// A server as shown by the flat server-picker directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Display name (for locally discovered servers this is the URL).
    pub host_name: String,
    /// Base URL of the server.
    pub host_url: String,
}

impl Server {
    /// Creates a server record.
    pub fn new(host_name: impl Into<String>, host_url: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            host_url: host_url.into(),
        }
    }

    /// Wraps a bare discovered URL, using it as both name and address.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            host_name: url.clone(),
            host_url: url,
        }
    }
}
