//! Device directory merge engine.
//!
//! Combines the trigger-driven remote snapshot with the accumulating
//! local-discovery set into one continuously updated, de-duplicated
//! device list. All state lives inside the stream's fold, so the merged
//! list is a deterministic function of the ordered event history.

use crate::error::DirectoryResult;
use crate::source::{DeviceDiscoverySource, DiscoveryParams, RemoteDeviceSource};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use homeport_types::Device;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Merges the remote snapshot with locally discovered devices.
///
/// Remote entries come first in remote order. Each local device (in
/// arrival order) either replaces the first entry of the current merged
/// list sharing its non-blank certificate common name, keeping that
/// entry's position and identity with the union of both path maps, or
/// is appended at the end. Recomputed from scratch on every change, so a
/// given set of inputs converges to the same list regardless of arrival
/// interleaving.
pub fn merge_devices(remote: &[Device], locals: &[Device]) -> Vec<Device> {
    let mut merged = remote.to_vec();
    for local in locals {
        let position = local
            .certificate()
            .and_then(|cn| merged.iter().position(|entry| entry.certificate() == Some(cn)));
        match position {
            Some(idx) => merged[idx] = merged[idx].with_merged_paths(local),
            None => merged.push(local.clone()),
        }
    }
    merged
}

enum FeedInput {
    Snapshot(DirectoryResult<Vec<Device>>),
    Discovered(DirectoryResult<Device>),
}

#[derive(Default)]
struct FeedState {
    remote: Vec<Device>,
    locals: Vec<Device>,
    discovery_faulted: bool,
}

impl FeedState {
    /// Applies one input event; returns the item to emit, if any.
    fn apply(&mut self, input: FeedInput) -> Option<DirectoryResult<Vec<Device>>> {
        match input {
            FeedInput::Snapshot(Ok(devices)) => {
                self.remote = devices;
                Some(Ok(merge_devices(&self.remote, &self.locals)))
            }
            // A failed refresh keeps the previous snapshot; the error is
            // scoped to this refresh only.
            FeedInput::Snapshot(Err(e)) => {
                warn!(error = %e, "device directory refresh failed");
                Some(Err(e))
            }
            FeedInput::Discovered(Ok(device)) => {
                if self.locals.contains(&device) {
                    return None;
                }
                self.locals.push(device);
                Some(Ok(merge_devices(&self.remote, &self.locals)))
            }
            FeedInput::Discovered(Err(e)) => {
                if self.discovery_faulted {
                    return None;
                }
                self.discovery_faulted = true;
                warn!(error = %e, "local device discovery failed");
                Some(Err(e))
            }
        }
    }
}

/// Continuously merged view over the remote device directory and local
/// discovery.
pub struct DeviceDirectory {
    remote: Arc<dyn RemoteDeviceSource>,
    discovery: Arc<dyn DeviceDiscoverySource>,
    refresh_tx: broadcast::Sender<()>,
}

impl DeviceDirectory {
    /// Creates a directory over the given sources.
    pub fn new(
        remote: Arc<dyn RemoteDeviceSource>,
        discovery: Arc<dyn DeviceDiscoverySource>,
    ) -> Self {
        let (refresh_tx, _) = broadcast::channel(16);
        Self {
            remote,
            discovery,
            refresh_tx,
        }
    }

    /// Triggers a remote fetch on every live update stream. A no-op when
    /// nothing is subscribed.
    pub fn refresh(&self) {
        if self.refresh_tx.send(()).is_err() {
            debug!("refresh requested with no active update streams");
        }
    }

    /// Stream of merged device lists. Emits whenever the combined state
    /// changes; a failed refresh yields an `Err` item and the stream
    /// continues. Runs until the caller drops it.
    pub fn updates(
        &self,
        params: &DiscoveryParams,
    ) -> BoxStream<'static, DirectoryResult<Vec<Device>>> {
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

        // `then` serializes fetches: a second refresh waits for the
        // first fetch to finish.
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
