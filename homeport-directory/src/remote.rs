//! Remote directory HTTP client.
//!
//! Fetches the account's known devices and servers from the directory
//! API. The base URL is configurable so tests can point the client at a
//! local mock server.

use crate::error::{DirectoryError, DirectoryResult};
use crate::source::{RemoteDeviceSource, RemoteServerSource};
use async_trait::async_trait;
use homeport_types::{Device, PathKind, Server};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the directory client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the directory API.
    pub api_base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://hub.homeport.io".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Wire representation of a device in the directory API.
#[derive(Debug, Deserialize)]
struct DeviceRecord {
    id: String,
    name: String,
    #[serde(rename = "certificateCommonName")]
    certificate_common_name: Option<String>,
    #[serde(rename = "localUrl")]
    local_url: Option<String>,
    #[serde(rename = "publicUrl")]
    public_url: Option<String>,
    #[serde(rename = "remoteUrl")]
    remote_url: Option<String>,
}

impl DeviceRecord {
    fn into_device(self) -> Device {
        let mut device = Device::new(self.id, self.name);
        if let Some(cn) = self.certificate_common_name {
            device = device.with_certificate(cn);
        }
        let paths = [
            (PathKind::Local, self.local_url),
            (PathKind::Public, self.public_url),
            (PathKind::Remote, self.remote_url),
        ];
        for (kind, url) in paths {
            if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
                device = device.with_path(kind, url);
            }
        }
        device
    }
}

#[derive(Debug, Deserialize)]
struct DeviceList {
    devices: Vec<DeviceRecord>,
}

#[derive(Debug, Deserialize)]
struct ServerRecord {
    #[serde(rename = "hostName")]
    host_name: String,
    #[serde(rename = "hostUrl")]
    host_url: String,
}

#[derive(Debug, Deserialize)]
struct ServerList {
    servers: Vec<ServerRecord>,
}

/// HTTP client for the remote directory API.
pub struct DirectoryClient {
    config: DirectoryConfig,
    client: Client,
}

impl DirectoryClient {
    /// Creates a client with the given configuration.
    pub fn new(config: DirectoryConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> DirectoryResult<T> {
        let url = format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path);
        debug!(%url, "fetching directory");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Remote(format!("directory fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DirectoryError::Remote(format!(
                "directory fetch failed: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DirectoryError::Remote(format!("directory fetch failed: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for DirectoryClient {
    fn default() -> Self {
        Self::new(DirectoryConfig::default())
    }
}

#[async_trait]
impl RemoteDeviceSource for DirectoryClient {
    async fn fetch(&self) -> DirectoryResult<Vec<Device>> {
        let list: DeviceList = self.get_json("/api/v1/devices").await?;
        Ok(list
            .devices
            .into_iter()
            .map(DeviceRecord::into_device)
            .collect())
    }
}

#[async_trait]
impl RemoteServerSource for DirectoryClient {
    async fn fetch(&self) -> DirectoryResult<Vec<Server>> {
        let list: ServerList = self.get_json("/api/v1/servers").await?;
        Ok(list
            .servers
            .into_iter()
            .map(|record| Server::new(record.host_name, record.host_url))
            .collect())
    }
}
