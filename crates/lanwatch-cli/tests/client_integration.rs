//! Client against a live daemon on an ephemeral port.
//!
//! Tests CAN use `.unwrap()` and `.expect()`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lanwatch_cli::{ClientError, DaemonClient};
use lanwatch_core::DeviceId;
use lanwatchd::coordinator::ProbeCoordinator;
use lanwatchd::probe::{ProbeOutcome, Prober, UnreachableReason};
use lanwatchd::registry::{default_seed, spawn_registry, DeviceRegistry, MemoryStorage};
use lanwatchd::server::{AppState, HttpServer};
use tokio_util::sync::CancellationToken;

/// Only Cloudflare answers.
struct CloudflareOnly;

#[async_trait]
impl Prober for CloudflareOnly {
    fn name(&self) -> &'static str {
        "cloudflare-only"
    }

    async fn probe(&self, address: &str, _timeout: Duration) -> ProbeOutcome {
        if address == "1.1.1.1" {
            ProbeOutcome::Reachable
        } else {
            ProbeOutcome::Unreachable(UnreachableReason::NoReply)
        }
    }
}

/// Running daemon, stopped on drop.
struct TestDaemon {
    addr: SocketAddr,
    cancel_token: CancellationToken,
}

impl TestDaemon {
    async fn start() -> Self {
        let registry =
            spawn_registry(DeviceRegistry::new(MemoryStorage::new()).with_seed(default_seed()));
        let coordinator = ProbeCoordinator::new(Arc::new(CloudflareOnly));
        let cancel_token = CancellationToken::new();

        let server = HttpServer::bind(
            "127.0.0.1:0".parse().unwrap(),
            AppState::new(registry, coordinator),
            cancel_token.clone(),
        )
        .await
        .expect("bind ephemeral port");
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());

        Self { addr, cancel_token }
    }

    fn client(&self) -> DaemonClient {
        DaemonClient::new(&format!("http://{}", self.addr)).unwrap()
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[tokio::test]
async fn test_health_reports_compatible_version() {
    let daemon = TestDaemon::start().await;
    let health = daemon.client().health().await.unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_device_lifecycle() {
    let daemon = TestDaemon::start().await;
    let client = daemon.client();

    assert_eq!(client.list().await.unwrap().len(), 2);

    let nas = client.add("NAS", "192.168.1.4").await.unwrap();
    assert_eq!(nas.name, "NAS");
    assert_eq!(client.list().await.unwrap().len(), 3);

    client.remove(&nas.id).await.unwrap();
    assert_eq!(client.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rejections_carry_daemon_message() {
    let daemon = TestDaemon::start().await;
    let client = daemon.client();

    let err = client.add("X", "1.1.1.1").await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(err.to_string().contains("device with this IP already exists"));

    let err = client.add("", "1.2.3.4").await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    let err = client.remove(&DeviceId::new("missing")).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ClientError::Rejected { .. }));
}

#[tokio::test]
async fn test_status_round_trip() {
    let daemon = TestDaemon::start().await;
    let report = daemon.client().status().await.unwrap();

    let summary: Vec<(&str, bool)> = report
        .iter()
        .map(|r| (r.name.as_str(), r.online))
        .collect();
    assert_eq!(
        summary,
        vec![("Cloudflare DNS", true), ("Google DNS", false)]
    );
}
