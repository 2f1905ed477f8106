//! Endpoint verification.
//!
//! A verifier answers one question: is the server behind this bare origin
//! currently reachable and ours? The resolver probes candidates through
//! this seam; the HTTP implementation hits the server's status endpoint.

use crate::error::{EndpointError, EndpointResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Live reachability/identity check for a bare origin
/// (scheme + host [+ port], no resource path).
#[async_trait]
pub trait EndpointVerifier: Send + Sync {
    /// Returns whether the origin currently verifies. A transport-level
    /// failure is an `Err`, a reachable-but-wrong answer is `Ok(false)`.
    async fn verify(&self, origin: &str) -> EndpointResult<bool>;
}

/// Configuration for the HTTP verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Path of the status endpoint probed on each origin.
    pub probe_path: String,
    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            probe_path: "/status".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Verifies origins by probing their status endpoint over HTTP.
pub struct HttpEndpointVerifier {
    config: VerifierConfig,
    client: Client,
}

impl HttpEndpointVerifier {
    /// Creates a verifier with the given configuration.
    pub fn new(config: VerifierConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }
}

impl Default for HttpEndpointVerifier {
    fn default() -> Self {
        Self::new(VerifierConfig::default())
    }
}

#[async_trait]
impl EndpointVerifier for HttpEndpointVerifier {
    async fn verify(&self, origin: &str) -> EndpointResult<bool> {
        let url = format!("{}{}", origin.trim_end_matches('/'), self.config.probe_path);
        debug!(%url, "probing origin");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EndpointError::Network(format!("probe of {origin} failed: {e}")))?;

        Ok(response.status().is_success())
    }
}

/// A scripted verifier for testing.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy)]
    enum Verdict {
        Pass,
        Fail,
        Error,
    }

    /// Records every probed origin and answers from a per-origin script.
    /// Origins without a script entry do not verify.
    #[derive(Default)]
    pub struct MockVerifier {
        verdicts: Mutex<HashMap<String, Verdict>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockVerifier {
        /// Creates a verifier that rejects everything.
        pub fn new() -> Self {
            Self::default()
        }

        /// Marks an origin as verifying successfully.
        pub fn accept(&self, origin: impl Into<String>) {
            self.verdicts
                .lock()
                .unwrap()
                .insert(origin.into(), Verdict::Pass);
        }

        /// Marks an origin as reachable but not verifying.
        pub fn reject(&self, origin: impl Into<String>) {
            self.verdicts
                .lock()
                .unwrap()
                .insert(origin.into(), Verdict::Fail);
        }

        /// Makes probes of an origin fail with a network error.
        pub fn error(&self, origin: impl Into<String>) {
            self.verdicts
                .lock()
                .unwrap()
                .insert(origin.into(), Verdict::Error);
        }

        /// The probed origins, in call order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of probes performed.
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl EndpointVerifier for MockVerifier {
        async fn verify(&self, origin: &str) -> EndpointResult<bool> {
            self.calls.lock().unwrap().push(origin.to_string());
            match self.verdicts.lock().unwrap().get(origin) {
                Some(Verdict::Pass) => Ok(true),
                Some(Verdict::Error) => {
                    Err(EndpointError::Network("simulated probe failure".into()))
                }
                Some(Verdict::Fail) | None => Ok(false),
            }
        }
    }
}
