use homeport_directory::{
    DirectoryClient, DirectoryConfig, DirectoryError, RemoteDeviceSource, RemoteServerSource,
};
use homeport_types::PathKind;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> DirectoryClient {
    DirectoryClient::new(DirectoryConfig {
        api_base_url: server.uri(),
        timeout_secs: 5,
    })
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn directory_config_defaults() {
    let cfg = DirectoryConfig::default();
    assert_eq!(cfg.api_base_url, "https://hub.homeport.io");
    assert_eq!(cfg.timeout_secs, 30);
}

// ── Devices ─────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_and_maps_devices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                {
                    "id": "id1",
                    "name": "Study Server",
                    "certificateCommonName": "cert-001",
                    "remoteUrl": "https://relay.example.com/files",
                    "publicUrl": "https://cloud.example.com/files",
                    "localUrl": ""
                },
                {
                    "id": "id2",
                    "name": "Attic Server",
                    "remoteUrl": "https://relay2.example.com/files"
                }
            ]
        })))
        .mount(&server)
        .await;

    let devices = RemoteDeviceSource::fetch(&client(&server)).await.unwrap();
    assert_eq!(devices.len(), 2);

    assert_eq!(devices[0].id, "id1");
    assert_eq!(devices[0].certificate(), Some("cert-001"));
    // The blank localUrl is dropped.
    assert_eq!(devices[0].available_paths.len(), 2);
    assert!(devices[0].available_paths.contains_key(&PathKind::Public));
    assert!(devices[0].available_paths.contains_key(&PathKind::Remote));

    assert_eq!(devices[1].certificate(), None);
    assert_eq!(devices[1].available_paths.len(), 1);
}

#[tokio::test]
async fn empty_device_list_is_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": [] })))
        .mount(&server)
        .await;

    let devices = RemoteDeviceSource::fetch(&client(&server)).await.unwrap();
    assert!(devices.is_empty());
}

// ── Servers ─────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_and_maps_servers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "servers": [
                { "hostName": "Server A", "hostUrl": "https://a.example.com" },
                { "hostName": "Server B", "hostUrl": "https://b.example.com" }
            ]
        })))
        .mount(&server)
        .await;

    let servers = RemoteServerSource::fetch(&client(&server)).await.unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0].host_name, "Server A");
    assert_eq!(servers[1].host_url, "https://b.example.com");
}

// ── Failures ────────────────────────────────────────────────────

#[tokio::test]
async fn http_error_maps_to_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = RemoteDeviceSource::fetch(&client(&server)).await;
    match result {
        Err(DirectoryError::Remote(message)) => assert!(message.contains("503")),
        other => panic!("expected a remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = RemoteDeviceSource::fetch(&client(&server)).await;
    assert!(matches!(result, Err(DirectoryError::Serialization(_))));
}

#[tokio::test]
async fn unreachable_directory_maps_to_remote_error() {
    let client = DirectoryClient::new(DirectoryConfig {
        api_base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 1,
    });

    let result = RemoteDeviceSource::fetch(&client).await;
    assert!(matches!(result, Err(DirectoryError::Remote(_))));
}
