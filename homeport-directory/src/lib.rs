//! Device and server directory merge engines for Homeport.
//!
//! Two independently updating sources describe the servers a client
//! knows about: the remote directory API (pull-based, fetched on
//! explicit refresh) and local-network mDNS discovery (push-based,
//! long-lived). This crate reconciles them into one coherent list.
//!
//! # Variants
//!
//! - [`DeviceDirectory`]: rich model. Devices carry per-path-kind URLs
//!   and an optional certificate common name, the only identity shared
//!   across sources. A discovered device matching a known certificate is
//!   merged into that entry in place; anything else is appended.
//! - [`ServerDirectory`]: flat model. Servers have no cross-source
//!   identity, so the merge is a plain ordered union.
//!
//! Both engines carry their state inside the update stream's fold: the
//! merged list is recomputed from scratch on every input, making it a
//! deterministic function of the ordered event history.

pub mod source;

mod device_feed;
mod error;
mod mdns;
mod remote;
mod server_feed;

pub use device_feed::{merge_devices, DeviceDirectory};
pub use error::{DirectoryError, DirectoryResult};
pub use mdns::MdnsDiscovery;
pub use remote::{DirectoryClient, DirectoryConfig};
pub use server_feed::{merge_servers, ServerDirectory};
pub use source::{
    DeviceDiscoverySource, DiscoveryParams, RemoteDeviceSource, RemoteServerSource,
    ServerDiscoverySource,
};
