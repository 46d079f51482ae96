//! Prober that sends ICMP echo requests directly.
//!
//! Uses unprivileged datagram ICMP sockets. On Linux the caller's group must be
//! inside `net.ipv4.ping_group_range`; otherwise socket creation fails and
//! every probe reports `Io`.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError, ICMP};
use tracing::debug;

use super::{checked_address, ProbeOutcome, Prober, UnreachableReason};

/// Echo payload, same size as the default of the `ping` utility.
const PAYLOAD: [u8; 56] = [0; 56];

/// Resolve a host string to an IP address.
async fn resolve_host(host: &str) -> std::io::Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    tokio::net::lookup_host(format!("{host}:0"))
        .await?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no addresses for {host}"),
            )
        })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IcmpProber;

impl IcmpProber {
    pub fn new() -> Self {
        Self
    }

    async fn echo(address: &str, timeout: Duration) -> ProbeOutcome {
        let ip = match resolve_host(address).await {
            Ok(ip) => ip,
            Err(e) => {
                debug!(address, error = %e, "Failed to resolve probe target");
                return ProbeOutcome::Unreachable(UnreachableReason::InvalidAddress);
            }
        };

        let client = match ip {
            IpAddr::V4(_) => Client::new(&Config::default()),
            IpAddr::V6(_) => Client::new(&Config::builder().kind(ICMP::V6).build()),
        };
        let client = match client {
            Ok(client) => client,
            Err(e) => return ProbeOutcome::Unreachable(UnreachableReason::Io(e.to_string())),
        };

        let mut pinger = client.pinger(ip, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_packet, rtt)) => {
                debug!(address, rtt_ms = rtt.as_millis() as u64, "Echo reply");
                ProbeOutcome::Reachable
            }
            Err(SurgeError::Timeout { .. }) => ProbeOutcome::Unreachable(UnreachableReason::TimedOut),
            Err(e) => ProbeOutcome::Unreachable(UnreachableReason::Io(e.to_string())),
        }
    }
}

#[async_trait]
impl Prober for IcmpProber {
    fn name(&self) -> &'static str {
        "icmp"
    }

    async fn probe(&self, address: &str, timeout: Duration) -> ProbeOutcome {
        let address = match checked_address(address) {
            Ok(address) => address,
            Err(reason) => return ProbeOutcome::Unreachable(reason),
        };

        // Covers name resolution as well as the echo itself.
        match tokio::time::timeout(timeout, Self::echo(address, timeout)).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::Unreachable(UnreachableReason::TimedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_host_ipv4() {
        let ip = resolve_host("192.168.1.1").await.unwrap();
        assert_eq!(ip, "192.168.1.1".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_resolve_host_ipv6() {
        let ip = resolve_host("::1").await.unwrap();
        assert_eq!(ip, "::1".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let ip = resolve_host("localhost").await.unwrap();
        assert!(ip.is_loopback());
    }

    #[tokio::test]
    async fn test_invalid_address_short_circuits() {
        let outcome = IcmpProber::new()
            .probe("-c", Duration::from_millis(50))
            .await;
        assert_eq!(
            outcome,
            ProbeOutcome::Unreachable(UnreachableReason::InvalidAddress)
        );
    }

    #[tokio::test]
    async fn test_probe_never_outlives_timeout() {
        // Reachability depends on the host network; only the bound is checked.
        let started = std::time::Instant::now();
        let _ = IcmpProber::new()
            .probe("192.0.2.1", Duration::from_millis(200))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
