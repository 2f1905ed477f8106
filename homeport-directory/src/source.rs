//! Directory source seams.
//!
//! Two independent inputs feed each merge engine: a pull-based remote
//! directory (fetched only on explicit refresh) and a push-based
//! local-network discovery stream. Both are traits so the engines can be
//! driven by mocks in tests and by the HTTP/mDNS implementations in
//! production.

use crate::error::DirectoryResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use homeport_types::{Device, Server};
use std::time::Duration;

/// Parameters for a local-network discovery scan.
#[derive(Debug, Clone)]
pub struct DiscoveryParams {
    /// mDNS service type to browse, e.g. `_homeport._tcp.local.`.
    pub service_type: String,
    /// How long to keep the scan open; `None` browses indefinitely.
    pub scan_window: Option<Duration>,
}

impl Default for DiscoveryParams {
    fn default() -> Self {
        Self {
            service_type: "_homeport._tcp.local.".to_string(),
            scan_window: None,
        }
    }
}

/// Pull-based source of remotely known devices.
#[async_trait]
pub trait RemoteDeviceSource: Send + Sync {
    /// Fetches the current remote directory. Invoked only on explicit
    /// refresh, never on a timer.
    async fn fetch(&self) -> DirectoryResult<Vec<Device>>;
}

/// Pull-based source of remotely known servers.
#[async_trait]
pub trait RemoteServerSource: Send + Sync {
    /// Fetches the current remote server list.
    async fn fetch(&self) -> DirectoryResult<Vec<Server>>;
}

/// Push-based source of devices found on the local network.
pub trait DeviceDiscoverySource: Send + Sync {
    /// Long-lived stream of discovered devices. An `Err` item is terminal
    /// for the discovery stream but not for anything merged so far.
    fn discover(&self, params: &DiscoveryParams) -> BoxStream<'static, DirectoryResult<Device>>;
}

/// Push-based source of bare server URLs found on the local network.
pub trait ServerDiscoverySource: Send + Sync {
    /// Long-lived stream of discovered base URLs.
    fn discover(&self, params: &DiscoveryParams) -> BoxStream<'static, DirectoryResult<String>>;
}

/// Scripted sources for testing.
pub mod mock {
    use super::*;
    use futures::stream::{self, StreamExt};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// A remote device source answering from a queue of scripted results.
    /// An empty queue answers with an empty directory.
    #[derive(Default)]
    pub struct MockRemoteDevices {
        responses: Mutex<VecDeque<DirectoryResult<Vec<Device>>>>,
        fetches: AtomicUsize,
    }

    impl MockRemoteDevices {
        /// Creates a source with no scripted responses.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues the next fetch result.
        pub fn queue(&self, response: DirectoryResult<Vec<Device>>) {
            self.responses.lock().unwrap().push_back(response);
        }

        /// Number of fetches performed.
        pub fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteDeviceSource for MockRemoteDevices {
        async fn fetch(&self) -> DirectoryResult<Vec<Device>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// A remote server source answering from a queue of scripted results.
    #[derive(Default)]
    pub struct MockRemoteServers {
        responses: Mutex<VecDeque<DirectoryResult<Vec<Server>>>>,
        fetches: AtomicUsize,
    }

    impl MockRemoteServers {
        /// Creates a source with no scripted responses.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues the next fetch result.
        pub fn queue(&self, response: DirectoryResult<Vec<Server>>) {
            self.responses.lock().unwrap().push_back(response);
        }

        /// Number of fetches performed.
        pub fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteServerSource for MockRemoteServers {
        async fn fetch(&self) -> DirectoryResult<Vec<Server>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// A discovery source fed through a channel; completes when the
    /// sender is dropped. `discover` may be called once.
    pub struct ChannelDeviceDiscovery {
        receiver: Mutex<Option<mpsc::UnboundedReceiver<DirectoryResult<Device>>>>,
    }

    impl ChannelDeviceDiscovery {
        /// Creates the source and the sender feeding it.
        pub fn channel() -> (
            mpsc::UnboundedSender<DirectoryResult<Device>>,
            Self,
        ) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                tx,
                Self {
                    receiver: Mutex::new(Some(rx)),
                },
            )
        }
    }

    impl DeviceDiscoverySource for ChannelDeviceDiscovery {
        fn discover(
            &self,
            _params: &DiscoveryParams,
        ) -> BoxStream<'static, DirectoryResult<Device>> {
            match self.receiver.lock().unwrap().take() {
                Some(rx) => stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                })
                .boxed(),
                None => stream::empty().boxed(),
            }
        }
    }

    /// A bare-URL discovery source fed through a channel.
    pub struct ChannelServerDiscovery {
        receiver: Mutex<Option<mpsc::UnboundedReceiver<DirectoryResult<String>>>>,
    }

    impl ChannelServerDiscovery {
        /// Creates the source and the sender feeding it.
        pub fn channel() -> (
            mpsc::UnboundedSender<DirectoryResult<String>>,
            Self,
        ) {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                tx,
                Self {
                    receiver: Mutex::new(Some(rx)),
                },
            )
        }
    }

    impl ServerDiscoverySource for ChannelServerDiscovery {
        fn discover(
            &self,
            _params: &DiscoveryParams,
        ) -> BoxStream<'static, DirectoryResult<String>> {
            match self.receiver.lock().unwrap().take() {
                Some(rx) => stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                })
                .boxed(),
                None => stream::empty().boxed(),
            }
        }
    }
}
