//! Core type definitions for the Homeport connection core.
//!
//! This crate defines the fundamental, transport-agnostic types shared by
//! the endpoint-resolution and directory crates:
//! - Network path categories and per-resolution candidate sets
//! - Connectivity snapshots
//! - Directory models (devices with per-path addresses, flat servers)
//!
//! Everything here is a plain immutable value; the reactive pipelines that
//! produce and consume these types live in `homeport-endpoint` and
//! `homeport-directory`.

mod connectivity;
mod device;
mod path;

pub use connectivity::{ConnectionKind, Connectivity};
pub use device::{Device, Server};
pub use path::{CandidateSet, PathKind};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown path kind: {0}")]
    UnknownPathKind(String),
}
