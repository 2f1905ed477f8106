//! Adaptive endpoint resolution for Homeport accounts.
//!
//! A Homeport server is often reachable over several network paths at
//! once (a LAN address, a public address, a federated relay) and the
//! best one changes with the client's network environment. This crate
//! keeps an account pointed at whichever path currently works.
//!
//! # Components
//!
//! - **Verifier**: live reachability/identity probe of a bare origin
//! - **Resolver**: probes stored candidates in priority order, first
//!   verified one wins
//! - **Chooser**: re-resolves on every connectivity change and emits a
//!   duplicate-suppressed stream of "best URL or none"
//! - **Switcher**: subscribes the chooser on behalf of one account and
//!   persists transitions
//!
//! # Pipeline
//!
//! connectivity change → candidate lookup → sequential origin probes →
//! distinct-until-changed → conditional account write. Each subscriber
//! owns one cooperative stream chain; there is no shared mutable state
//! between stages.

pub mod connectivity;
pub mod store;
pub mod verifier;

mod chooser;
mod error;
mod resolver;
mod switcher;

pub use chooser::{BestUrlSource, EndpointChooser};
pub use connectivity::ConnectivitySource;
pub use error::{EndpointError, EndpointResult};
pub use resolver::{UrlResolver, DEFAULT_RESOURCE_PATH};
pub use store::{AccountStore, CandidateStore, SettingsStore};
pub use switcher::AccountUrlSwitcher;
pub use verifier::{EndpointVerifier, HttpEndpointVerifier, VerifierConfig};
