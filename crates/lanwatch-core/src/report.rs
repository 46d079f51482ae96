//! Probe results and the ordered report produced by a probe round.

use serde::{Deserialize, Serialize};

use crate::{Device, DeviceId};

/// Liveness of a single device, as observed by one probe round.
///
/// Derived view: never persisted, recomputed on every status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub id: DeviceId,
    pub name: String,
    pub ip: String,
    pub online: bool,
}

impl ProbeResult {
    pub fn new(device: &Device, online: bool) -> Self {
        Self {
            id: device.id.clone(),
            name: device.name.clone(),
            ip: device.ip.clone(),
            online,
        }
    }

    /// Result used when a device's probe could not produce an outcome.
    pub fn offline(device: &Device) -> Self {
        Self::new(device, false)
    }
}

/// The sorted, completed output of a probe round.
///
/// Results are ordered by `(name lowercased, ip)` ascending, with the device
/// ID as a final tie-break. The order depends only on the result set, never
/// on the order in which probes completed, so a stable input yields
/// byte-stable JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProbeResult>", into = "Vec<ProbeResult>")]
pub struct ProbeReport {
    results: Vec<ProbeResult>,
}

impl ProbeReport {
    /// Builds a report from results gathered in arbitrary order.
    ///
    /// This is the only place results are sorted.
    pub fn from_unordered(mut results: Vec<ProbeResult>) -> Self {
        results.sort_by_cached_key(|r| (r.name.to_lowercase(), r.ip.clone(), r.id.clone()));
        Self { results }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProbeResult> {
        self.results.iter()
    }

    /// Looks up the result for a device.
    pub fn get(&self, id: &DeviceId) -> Option<&ProbeResult> {
        self.results.iter().find(|r| &r.id == id)
    }

    pub fn online_count(&self) -> usize {
        self.results.iter().filter(|r| r.online).count()
    }

    pub fn offline_count(&self) -> usize {
        self.len() - self.online_count()
    }
}

impl From<Vec<ProbeResult>> for ProbeReport {
    fn from(results: Vec<ProbeResult>) -> Self {
        Self::from_unordered(results)
    }
}

impl From<ProbeReport> for Vec<ProbeResult> {
    fn from(report: ProbeReport) -> Self {
        report.results
    }
}

impl<'a> IntoIterator for &'a ProbeReport {
    type Item = &'a ProbeResult;
    type IntoIter = std::slice::Iter<'a, ProbeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
