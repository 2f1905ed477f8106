//! Best-endpoint selection.
//!
//! Turns connectivity changes plus stored candidates into a stream of
//! "currently best base URL or none". Duplicate suppression is an
//! explicit fold over the resolved values, so downstream subscribers only
//! see transitions; connectivity flapping between equivalent states
//! produces no redundant emissions.

use crate::connectivity::ConnectivitySource;
use crate::resolver::UrlResolver;
use crate::store::CandidateStore;
use futures::future;
use futures::stream::{BoxStream, Stream, StreamExt};
use homeport_types::CandidateSet;
use std::sync::Arc;
use tracing::debug;

/// Anything that can be observed for the currently best base URL.
///
/// The switcher subscribes through this seam; [`EndpointChooser`] is the
/// production implementation.
pub trait BestUrlSource: Send + Sync {
    /// Cold stream of resolved base URLs; `None` means no candidate
    /// currently verifies. Consecutive equal values are collapsed.
    fn observe_best_url(&self) -> BoxStream<'static, Option<String>>;
}

/// Chooses the best base URL on every connectivity change.
pub struct EndpointChooser {
    connectivity: Arc<dyn ConnectivitySource>,
    candidates: Arc<dyn CandidateStore>,
    resolver: Arc<UrlResolver>,
}

impl EndpointChooser {
    /// Creates a chooser over the given sources.
    pub fn new(
        connectivity: Arc<dyn ConnectivitySource>,
        candidates: Arc<dyn CandidateStore>,
        resolver: UrlResolver,
    ) -> Self {
        Self {
            connectivity,
            candidates,
            resolver: Arc::new(resolver),
        }
    }
}

impl BestUrlSource for EndpointChooser {
    fn observe_best_url(&self) -> BoxStream<'static, Option<String>> {
        let candidates = Arc::clone(&self.candidates);
        let resolver = Arc::clone(&self.resolver);

        // `then` awaits each resolution before taking the next snapshot,
        // so resolutions never overlap for one subscriber.
        let resolutions = self.connectivity.observe().then(move |snapshot| {
            let candidates = Arc::clone(&candidates);
            let resolver = Arc::clone(&resolver);
            async move {
                if !snapshot.is_usable() {
                    debug!("network unavailable, nothing to resolve");
                    return None;
                }
                let set = CandidateSet::from_lookup(|kind| candidates.candidate(kind));
                resolver.resolve(&set).await
            }
        });

        distinct_until_changed(resolutions).boxed()
    }
}

/// Collapses consecutive equal items, emitting transitions only.
fn distinct_until_changed<S, T>(stream: S) -> impl Stream<Item = T>
where
    S: Stream<Item = T>,
    T: PartialEq + Clone,
{
    stream
        .scan(None::<T>, |last, item| {
            let changed = last.as_ref() != Some(&item);
            if changed {
                *last = Some(item.clone());
            }
            future::ready(Some(changed.then_some(item)))
        })
        .filter_map(future::ready)
}
