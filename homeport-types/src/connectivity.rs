//! Connectivity snapshots.
//!
//! The endpoint chooser reacts to these; producing them is the host
//! platform's job (its network monitor is wrapped behind the
//! `ConnectivitySource` trait in `homeport-endpoint`).

use serde::{Deserialize, Serialize};

/// A kind of active network connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Wifi,
    Ethernet,
    Cellular,
    Vpn,
}

/// A snapshot of the device's network connectivity at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// No usable network.
    Unavailable,
    /// One or more active connections.
    Available(Vec<ConnectionKind>),
}

impl Connectivity {
    /// Snapshot with the given active connection kinds.
    pub fn available(kinds: impl IntoIterator<Item = ConnectionKind>) -> Self {
        Connectivity::Available(kinds.into_iter().collect())
    }

    /// Whether any endpoint resolution is worth attempting.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        match self {
            Connectivity::Unavailable => false,
            Connectivity::Available(kinds) => !kinds.is_empty(),
        }
    }
}
