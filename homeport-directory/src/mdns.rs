//! Local-network discovery over mDNS.
//!
//! Browses a DNS-SD service type and turns resolved services into
//! directory entries. Devices advertise their identity and base URL in
//! TXT records (`id`, `name`, `cn`, `url`); when no `url` record is
//! present the address and port of the service are used instead.

use crate::error::{DirectoryError, DirectoryResult};
use crate::source::{DeviceDiscoverySource, DiscoveryParams, ServerDiscoverySource};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use homeport_types::{Device, PathKind};
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use std::net::IpAddr;
use tracing::{debug, warn};

/// mDNS-backed discovery source for both directory variants.
#[derive(Debug, Default)]
pub struct MdnsDiscovery;

impl MdnsDiscovery {
    /// Creates a discovery source. Each `discover` call runs its own
    /// browse with its own daemon.
    pub fn new() -> Self {
        Self
    }
}

/// Shuts the daemon down when the browse stream is dropped.
struct DaemonGuard(ServiceDaemon);

impl Drop for DaemonGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.shutdown() {
            debug!(error = %e, "mDNS daemon shutdown failed");
        }
    }
}

struct Browse {
    daemon: DaemonGuard,
    events: mdns_sd::Receiver<ServiceEvent>,
    deadline: Option<tokio::time::Instant>,
}

/// Opens a browse for the service type and yields resolved services
/// until the scan window closes or the daemon goes away.
fn browse(params: &DiscoveryParams) -> BoxStream<'static, DirectoryResult<ServiceInfo>> {
    let daemon = match ServiceDaemon::new() {
        Ok(daemon) => daemon,
        Err(e) => {
            return stream::once(future::ready(Err(DirectoryError::Discovery(format!(
                "failed to start mDNS daemon: {e}"
            )))))
            .boxed();
        }
    };

    let events = match daemon.browse(&params.service_type) {
        Ok(events) => events,
        Err(e) => {
            return stream::once(future::ready(Err(DirectoryError::Discovery(format!(
                "failed to browse {}: {e}",
                params.service_type
            )))))
            .boxed();
        }
    };

    let browse = Browse {
        daemon: DaemonGuard(daemon),
        events,
        deadline: params.scan_window.map(|w| tokio::time::Instant::now() + w),
    };

    stream::unfold(browse, |browse| async move {
        loop {
            let event = match browse.deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, browse.events.recv_async()).await {
                        Ok(event) => event,
                        Err(_) => {
                            debug!("mDNS scan window closed");
                            return None;
                        }
                    }
                }
                None => browse.events.recv_async().await,
            };

            match event {
                Ok(ServiceEvent::ServiceResolved(info)) => {
                    debug!(fullname = info.get_fullname(), "mDNS service resolved");
                    return Some((Ok(info), browse));
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "mDNS event channel closed");
                    return None;
                }
            }
        }
    })
    .boxed()
}

/// Base URL advertised by a resolved service: the `url` TXT record if
/// present, otherwise built from the first address and the port.
fn advertised_url(info: &ServiceInfo) -> Option<String> {
    if let Some(url) = info.get_property_val_str("url") {
        if !url.trim().is_empty() {
            return Some(url.to_string());
        }
    }
    let addr = info.get_addresses().iter().next()?;
    let port = info.get_port();
    Some(match addr {
        IpAddr::V6(v6) => format!("https://[{v6}]:{port}"),
        addr => format!("https://{addr}:{port}"),
    })
}

/// Builds a device from a resolved service, or `None` when it advertises
/// no usable address.
fn device_from_service(info: &ServiceInfo, service_type: &str) -> Option<Device> {
    let url = advertised_url(info)?;
    let instance = info
        .get_fullname()
        .trim_end_matches(service_type)
        .trim_end_matches('.');

    let id = info.get_property_val_str("id").unwrap_or(instance);
    let name = info.get_property_val_str("name").unwrap_or(instance);

    let mut device = Device::new(id, name).with_path(PathKind::Local, url);
    if let Some(cn) = info.get_property_val_str("cn") {
        device = device.with_certificate(cn);
    }
    Some(device)
}

impl DeviceDiscoverySource for MdnsDiscovery {
    fn discover(&self, params: &DiscoveryParams) -> BoxStream<'static, DirectoryResult<Device>> {
        let service_type = params.service_type.clone();
        browse(params)
            .filter_map(move |event| {
                future::ready(match event {
                    Ok(info) => device_from_service(&info, &service_type).map(Ok),
                    Err(e) => Some(Err(e)),
                })
            })
            .boxed()
    }
}

impl ServerDiscoverySource for MdnsDiscovery {
    fn discover(&self, params: &DiscoveryParams) -> BoxStream<'static, DirectoryResult<String>> {
        browse(params)
            .filter_map(|event| {
                future::ready(match event {
                    Ok(info) => advertised_url(&info).map(Ok),
                    Err(e) => Some(Err(e)),
                })
            })
            .boxed()
    }
}
