//! Connectivity source seam.
//!
//! The host platform owns the actual network monitor; the chooser only
//! needs a stream of snapshots from it.

use futures::stream::BoxStream;
use homeport_types::Connectivity;

/// A source of connectivity-change snapshots.
pub trait ConnectivitySource: Send + Sync {
    /// Stream of connectivity snapshots in arrival order.
    fn observe(&self) -> BoxStream<'static, Connectivity>;
}

/// Scripted connectivity sources for testing.
pub mod mock {
    use super::*;
    use futures::stream::{self, StreamExt};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Replays a fixed sequence of snapshots, then completes.
    pub struct ScriptedConnectivity {
        snapshots: Vec<Connectivity>,
    }

    impl ScriptedConnectivity {
        /// Creates a source replaying the given snapshots.
        pub fn new(snapshots: impl IntoIterator<Item = Connectivity>) -> Self {
            Self {
                snapshots: snapshots.into_iter().collect(),
            }
        }
    }

    impl ConnectivitySource for ScriptedConnectivity {
        fn observe(&self) -> BoxStream<'static, Connectivity> {
            stream::iter(self.snapshots.clone()).boxed()
        }
    }

    /// Emits whatever is pushed through its sender; completes when the
    /// sender is dropped. `observe` may be called once.
    pub struct ChannelConnectivity {
        receiver: Mutex<Option<mpsc::UnboundedReceiver<Connectivity>>>,
    }

    impl ChannelConnectivity {
        /// Creates the source and the sender feeding it.
        pub fn channel() -> (mpsc::UnboundedSender<Connectivity>, Self) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                tx,
                Self {
                    receiver: Mutex::new(Some(rx)),
                },
            )
        }
    }

    impl ConnectivitySource for ChannelConnectivity {
        fn observe(&self) -> BoxStream<'static, Connectivity> {
            match self.receiver.lock().unwrap().take() {
                Some(rx) => stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|snapshot| (snapshot, rx))
                })
                .boxed(),
                None => stream::empty().boxed(),
            }
        }
    }
}
