use futures::stream::BoxStream;
use futures::StreamExt;
use homeport_directory::source::mock::{ChannelDeviceDiscovery, MockRemoteDevices};
use homeport_directory::{DeviceDirectory, DirectoryError, DirectoryResult, DiscoveryParams};
use homeport_types::{Device, PathKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn remote_device(id: &str, cert: &str) -> Device {
    Device::new(id, id)
        .with_certificate(cert)
        .with_path(PathKind::Remote, format!("https://relay.example.com/{id}/files"))
}

fn local_device(id: &str, cert: &str) -> Device {
    Device::new(id, id)
        .with_certificate(cert)
        .with_path(PathKind::Local, format!("https://192.168.1.20/{id}/files"))
}

fn make_directory() -> (
    Arc<MockRemoteDevices>,
    mpsc::UnboundedSender<DirectoryResult<Device>>,
    DeviceDirectory,
) {
    let remote = Arc::new(MockRemoteDevices::new());
    let (discovery_tx, discovery) = ChannelDeviceDiscovery::channel();
    let directory = DeviceDirectory::new(remote.clone(), Arc::new(discovery));
    (remote, discovery_tx, directory)
}

async fn next_item<T>(stream: &mut BoxStream<'static, T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("timed out waiting for an update")
        .expect("update stream ended unexpectedly")
}

// ── Refresh ─────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_pulls_the_remote_snapshot() {
    let (remote, _discovery_tx, directory) = make_directory();
    remote.queue(Ok(vec![remote_device("id1", "cert-001")]));

    let mut updates = directory.updates(&DiscoveryParams::default());
    directory.refresh();

    let list = next_item(&mut updates).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "id1");
    assert_eq!(remote.fetches(), 1);
}

#[tokio::test]
async fn fetches_are_purely_trigger_driven() {
    let (remote, _discovery_tx, directory) = make_directory();

    let _updates = directory.updates(&DiscoveryParams::default());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(remote.fetches(), 0);
}

#[tokio::test]
async fn refresh_without_subscribers_is_a_noop() {
    let (remote, _discovery_tx, directory) = make_directory();

    directory.refresh();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(remote.fetches(), 0);
}

// ── Certificate-based merging ───────────────────────────────────

#[tokio::test]
async fn matching_certificate_merges_into_the_remote_entry() {
    let (remote, discovery_tx, directory) = make_directory();
    remote.queue(Ok(vec![remote_device("id1", "cert-001")]));

    let mut updates = directory.updates(&DiscoveryParams::default());
    directory.refresh();
    next_item(&mut updates).await.unwrap();

    discovery_tx.send(Ok(local_device("mdns-1", "cert-001"))).unwrap();
    let list = next_item(&mut updates).await.unwrap();

    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "id1");
    assert!(list[0].available_paths.contains_key(&PathKind::Remote));
    assert!(list[0].available_paths.contains_key(&PathKind::Local));
}

#[tokio::test]
async fn merged_entry_keeps_its_position() {
    let (remote, discovery_tx, directory) = make_directory();
    remote.queue(Ok(vec![
        remote_device("id1", "cert-001"),
        remote_device("id2", "cert-002"),
    ]));

    let mut updates = directory.updates(&DiscoveryParams::default());
    directory.refresh();
    next_item(&mut updates).await.unwrap();

    discovery_tx.send(Ok(local_device("mdns-1", "cert-002"))).unwrap();
    let list = next_item(&mut updates).await.unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[1].id, "id2");
    assert_eq!(list[1].available_paths.len(), 2);
}

#[tokio::test]
async fn unmatched_local_device_is_appended() {
    let (remote, discovery_tx, directory) = make_directory();
    remote.queue(Ok(vec![remote_device("id1", "cert-001")]));

    let mut updates = directory.updates(&DiscoveryParams::default());
    directory.refresh();
    next_item(&mut updates).await.unwrap();

    discovery_tx.send(Ok(local_device("mdns-1", "cert-009"))).unwrap();
    let list = next_item(&mut updates).await.unwrap();

    assert_eq!(list.len(), 2);
    // Prior entries are untouched.
    assert_eq!(list[0].available_paths.len(), 1);
    assert_eq!(list[1].id, "mdns-1");
}

#[tokio::test]
async fn discovery_before_first_refresh_stands_alone() {
    let (remote, discovery_tx, directory) = make_directory();

    let mut updates = directory.updates(&DiscoveryParams::default());
    discovery_tx.send(Ok(local_device("mdns-1", "cert-001"))).unwrap();
    let list = next_item(&mut updates).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "mdns-1");

    // A later refresh folds the same physical server into the remote entry.
    remote.queue(Ok(vec![remote_device("id1", "cert-001")]));
    directory.refresh();
    let list = next_item(&mut updates).await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "id1");
    assert_eq!(list[0].available_paths.len(), 2);
}

// ── Duplicate discovery ─────────────────────────────────────────

#[tokio::test]
async fn duplicate_discovery_items_are_absorbed() {
    let (_remote, discovery_tx, directory) = make_directory();

    let mut updates = directory.updates(&DiscoveryParams::default());
    let device = local_device("mdns-1", "cert-001");
    discovery_tx.send(Ok(device.clone())).unwrap();
    next_item(&mut updates).await.unwrap();

    // Re-announcing the same device produces no emission; the next one
    // seen is for the second, distinct device.
    discovery_tx.send(Ok(device)).unwrap();
    discovery_tx.send(Ok(local_device("mdns-2", "cert-002"))).unwrap();
    let list = next_item(&mut updates).await.unwrap();
    assert_eq!(list.len(), 2);
}

// ── Failure scoping ─────────────────────────────────────────────

#[tokio::test]
async fn failed_refresh_keeps_the_previous_snapshot() {
    let (remote, discovery_tx, directory) = make_directory();
    remote.queue(Ok(vec![remote_device("id1", "cert-001")]));
    remote.queue(Err(DirectoryError::Remote("HTTP 503".into())));

    let mut updates = directory.updates(&DiscoveryParams::default());
    directory.refresh();
    next_item(&mut updates).await.unwrap();

    directory.refresh();
    let failed = next_item(&mut updates).await;
    assert!(failed.is_err());

    // The stale snapshot is still merged against.
    discovery_tx.send(Ok(local_device("mdns-1", "cert-009"))).unwrap();
    let list = next_item(&mut updates).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, "id1");
}

#[tokio::test]
async fn discovery_fault_does_not_stop_refreshes() {
    let (remote, discovery_tx, directory) = make_directory();

    let mut updates = directory.updates(&DiscoveryParams::default());
    discovery_tx
        .send(Err(DirectoryError::Discovery("daemon died".into())))
        .unwrap();
    let faulted = next_item(&mut updates).await;
    assert!(faulted.is_err());

    remote.queue(Ok(vec![remote_device("id1", "cert-001")]));
    directory.refresh();
    let list = next_item(&mut updates).await.unwrap();
    assert_eq!(list.len(), 1);
}
