//! Server directory merge engine.
//!
//! The flat variant of the directory feed: servers carry no cross-source
//! identity, so the merge is a plain ordered union of remote servers
//! followed by each distinct locally discovered URL, appended once.

use crate::error::DirectoryResult;
use crate::source::{DiscoveryParams, RemoteServerSource, ServerDiscoverySource};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use homeport_types::Server;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Ordered union of the remote server list and discovered URLs.
pub fn merge_servers(remote: &[Server], locals: &[String]) -> Vec<Server> {
    let mut merged = remote.to_vec();
    merged.extend(locals.iter().map(Server::from_url));
    merged
}

enum FeedInput {
    Snapshot(DirectoryResult<Vec<Server>>),
    Discovered(DirectoryResult<String>),
}

#[derive(Default)]
struct FeedState {
    remote: Vec<Server>,
    locals: Vec<String>,
    discovery_faulted: bool,
}

impl FeedState {
    fn apply(&mut self, input: FeedInput) -> Option<DirectoryResult<Vec<Server>>> {
        match input {
            FeedInput::Snapshot(Ok(servers)) => {
                self.remote = servers;
                Some(Ok(merge_servers(&self.remote, &self.locals)))
            }
            FeedInput::Snapshot(Err(e)) => {
                warn!(error = %e, "server directory refresh failed");
                Some(Err(e))
            }
            FeedInput::Discovered(Ok(url)) => {
                if self.locals.contains(&url) {
                    return None;
                }
                self.locals.push(url);
                Some(Ok(merge_servers(&self.remote, &self.locals)))
            }
            FeedInput::Discovered(Err(e)) => {
                if self.discovery_faulted {
                    return None;
                }
                self.discovery_faulted = true;
                warn!(error = %e, "local server discovery failed");
                Some(Err(e))
            }
        }
    }
}

/// Continuously merged view over the remote server list and local
/// discovery.
pub struct ServerDirectory {
    remote: Arc<dyn RemoteServerSource>,
    discovery: Arc<dyn ServerDiscoverySource>,
    refresh_tx: broadcast::Sender<()>,
}

impl ServerDirectory {
    /// Creates a directory over the given sources.
    pub fn new(
        remote: Arc<dyn RemoteServerSource>,
        discovery: Arc<dyn ServerDiscoverySource>,
    ) -> Self {
        let (refresh_tx, _) = broadcast::channel(16);
        Self {
            remote,
            discovery,
            refresh_tx,
        }
    }

    /// Triggers a remote fetch on every live update stream.
    pub fn refresh(&self) {
        if self.refresh_tx.send(()).is_err() {
            debug!("refresh requested with no active update streams");
        }
    }

    /// Stream of merged server lists; same contract as
    /// [`crate::DeviceDirectory::updates`].
    pub fn updates(
        &self,
        params: &DiscoveryParams,
    ) -> BoxStream<'static, DirectoryResult<Vec<Server>>> {
        let remote = Arc::clone(&self.remote);

        let refreshes = stream::unfold(self.refresh_tx.subscribe(), |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(()) => return Some(((), rx)),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "refresh triggers lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        let snapshots = refreshes.then(move |()| {
            let remote = Arc::clone(&remote);
            async move { FeedInput::Snapshot(remote.fetch().await) }
        });

        let discovered = self.discovery.discover(params).map(FeedInput::Discovered);

        stream::select(snapshots, discovered)
            .scan(FeedState::default(), |state, input| {
                future::ready(Some(state.apply(input)))
            })
            .filter_map(future::ready)
            .boxed()
    }
}
