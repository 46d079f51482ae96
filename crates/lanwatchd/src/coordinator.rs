//! Probe coordinator: one bounded-concurrency round over a device snapshot.
//!
//! A round spawns one task per device, gated by a semaphore so that at most
//! `W` tasks exist at once, where `W = clamp(devices, min_workers,
//! max_workers)`. Results arrive in completion order and are sorted exactly
//! once, when the [`ProbeReport`] is built.
//!
//! # Panic-Free Guarantees
//!
//! A probe task that panics or overruns its backstop timeout yields
//! `online: false` for its device. One failed probe never aborts the round.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use lanwatch_core::{Device, ProbeReport, ProbeResult};

use crate::probe::{ProbeOutcome, Prober, UnreachableReason, DEFAULT_PROBE_TIMEOUT};

/// Default lower bound on concurrent probes.
pub const DEFAULT_MIN_WORKERS: usize = 4;

/// Default upper bound on concurrent probes.
pub const DEFAULT_MAX_WORKERS: usize = 64;

/// Slack on top of the probe timeout before a task is abandoned.
const BACKSTOP_GRACE: Duration = Duration::from_millis(500);

/// Tunables for a probe round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub timeout: Duration,
    pub min_workers: usize,
    pub max_workers: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
            min_workers: DEFAULT_MIN_WORKERS,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl CoordinatorConfig {
    /// Pool width for a round over `devices` devices.
    ///
    /// Never zero, and never above `max_workers` even if the bounds are
    /// inverted.
    pub fn worker_count(&self, devices: usize) -> usize {
        devices.max(self.min_workers).min(self.max_workers).max(1)
    }
}

/// Runs probe rounds with a fixed prober and configuration.
#[derive(Clone)]
pub struct ProbeCoordinator {
    prober: Arc<dyn Prober>,
    config: CoordinatorConfig,
}

impl std::fmt::Debug for ProbeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeCoordinator")
            .field("prober", &self.prober.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ProbeCoordinator {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self::with_config(prober, CoordinatorConfig::default())
    }

    pub fn with_config(prober: Arc<dyn Prober>, config: CoordinatorConfig) -> Self {
        Self { prober, config }
    }

    /// Probes every device once and returns the sorted report.
    ///
    /// The returned report holds exactly one result per input device.
    pub async fn run(&self, devices: Vec<Device>) -> ProbeReport {
        if devices.is_empty() {
            return ProbeReport::empty();
        }

        let width = self.config.worker_count(devices.len());
        let timeout = self.config.timeout;
        let started = Instant::now();

        let semaphore = Arc::new(Semaphore::new(width));
        let mut tasks = JoinSet::new();

        for (index, device) in devices.iter().enumerate() {
            // Acquire before spawning so at most `width` tasks exist.
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let prober = Arc::clone(&self.prober);
            let device = device.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let probe = prober.probe(&device.ip, timeout);
                let outcome = match tokio::time::timeout(timeout + BACKSTOP_GRACE, probe).await {
                    Ok(outcome) => outcome,
                    Err(_) => ProbeOutcome::Unreachable(UnreachableReason::TimedOut),
                };

                if let Some(reason) = outcome.unreachable_reason() {
                    debug!(id = %device.id, ip = %device.ip, reason = %reason, "Device unreachable");
                }
                (index, ProbeResult::new(&device, outcome.is_online()))
            });
        }

        let mut reported = vec![false; devices.len()];
        let mut results = Vec::with_capacity(devices.len());

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Some(seen) = reported.get_mut(index) {
                        *seen = true;
                    }
                    results.push(result);
                }
                Err(e) => warn!(error = %e, "Probe task failed, device reported offline"),
            }
        }

        for (device, seen) in devices.iter().zip(&reported) {
            if !seen {
                results.push(ProbeResult::offline(device));
            }
        }

        let report = ProbeReport::from_unordered(results);
        info!(
            devices = devices.len(),
            width,
            online = report.online_count(),
            offline = report.offline_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            prober = self.prober.name(),
            "Probe round complete"
        );
        report
    }
}
