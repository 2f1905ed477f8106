//! Candidate URL resolution.
//!
//! Probes a candidate set in path-kind priority order and returns the
//! first base URL whose origin verifies. Probes are strictly sequential:
//! once a higher-priority candidate verifies, lower-priority ones are
//! never touched.

use crate::verifier::EndpointVerifier;
use homeport_types::CandidateSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path segment under which the file API is mounted on candidate URLs.
/// Probing strips it to reach the bare origin.
pub const DEFAULT_RESOURCE_PATH: &str = "/files";

/// Resolves a candidate set to the currently best-reachable base URL.
pub struct UrlResolver {
    verifier: Arc<dyn EndpointVerifier>,
    resource_path: String,
}

impl UrlResolver {
    /// Creates a resolver probing through the given verifier.
    pub fn new(verifier: Arc<dyn EndpointVerifier>) -> Self {
        Self {
            verifier,
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
        }
    }

    /// Overrides the resource path stripped from candidates when probing.
    #[must_use]
    pub fn with_resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = path.into();
        self
    }

    /// Returns the first candidate (in priority order) whose bare origin
    /// verifies, verbatim as it appeared in the set. A candidate whose
    /// probe fails, whether it answers "no" or errors out, is skipped
    /// and the next one is tried; nothing is retried within one pass.
    pub async fn resolve(&self, candidates: &CandidateSet) -> Option<String> {
        for (kind, url) in candidates.iter() {
            let origin = self.bare_origin(url);
            match self.verifier.verify(origin).await {
                Ok(true) => {
                    debug!(%kind, url, "candidate verified");
                    return Some(url.to_string());
                }
                Ok(false) => {
                    debug!(%kind, origin, "candidate did not verify");
                }
                Err(e) => {
                    warn!(%kind, origin, error = %e, "candidate probe failed");
                }
            }
        }
        None
    }

    /// Strips the resource path suffix (and trailing slashes) to get the
    /// bare origin probed by the verifier.
    fn bare_origin<'a>(&self, url: &'a str) -> &'a str {
        let trimmed = url.trim_end_matches('/');
        match trimmed.strip_suffix(self.resource_path.as_str()) {
            Some(origin) if !origin.is_empty() => origin.trim_end_matches('/'),
            _ => trimmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::mock::MockVerifier;

    fn resolver() -> (Arc<MockVerifier>, UrlResolver) {
        let verifier = Arc::new(MockVerifier::new());
        let resolver = UrlResolver::new(verifier.clone() as Arc<dyn EndpointVerifier>);
        (verifier, resolver)
    }

    #[test]
    fn bare_origin_strips_resource_path() {
        let (_, resolver) = resolver();
        assert_eq!(
            resolver.bare_origin("https://192.168.1.100/files"),
            "https://192.168.1.100"
        );
        assert_eq!(
            resolver.bare_origin("https://192.168.1.100/files/"),
            "https://192.168.1.100"
        );
        assert_eq!(
            resolver.bare_origin("https://cloud.example.com"),
            "https://cloud.example.com"
        );
    }

    #[test]
    fn bare_origin_ignores_mid_path_segment() {
        let (_, resolver) = resolver();
        assert_eq!(
            resolver.bare_origin("https://host/files/sub"),
            "https://host/files/sub"
        );
    }
}
