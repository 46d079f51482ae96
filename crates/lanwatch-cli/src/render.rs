//! Plain-text tables for terminal output.

use std::fmt::Write;

use lanwatch_core::{Device, ProbeReport};

const NAME_HEADER: &str = "NAME";
const IP_HEADER: &str = "IP";

/// Renders the device list with full IDs, so they can be passed to `remove`.
pub fn devices_table(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "No devices registered.\n".to_string();
    }

    let name_width = column_width(NAME_HEADER, devices.iter().map(|d| d.name.as_str()));
    let ip_width = column_width(IP_HEADER, devices.iter().map(|d| d.ip.as_str()));

    let mut out = String::new();
    let _ = writeln!(out, "{NAME_HEADER:name_width$}  {IP_HEADER:ip_width$}  ID");
    for device in devices {
        let _ = writeln!(
            out,
            "{:name_width$}  {:ip_width$}  {}",
            device.name, device.ip, device.id
        );
    }
    out
}

/// Renders a probe report in its sorted order, followed by a summary line.
pub fn report_table(report: &ProbeReport) -> String {
    if report.is_empty() {
        return "No devices registered.\n".to_string();
    }

    let name_width = column_width(NAME_HEADER, report.iter().map(|r| r.name.as_str()));
    let ip_width = column_width(IP_HEADER, report.iter().map(|r| r.ip.as_str()));

    let mut out = String::new();
    let _ = writeln!(out, "{NAME_HEADER:name_width$}  {IP_HEADER:ip_width$}  STATUS");
    for result in report {
        let state = if result.online { "online" } else { "offline" };
        let _ = writeln!(out, "{:name_width$}  {:ip_width$}  {state}", result.name, result.ip);
    }
    let _ = writeln!(
        out,
        "\n{} devices, {} online, {} offline",
        report.len(),
        report.online_count(),
        report.offline_count()
    );
    out
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanwatch_core::{DeviceId, ProbeResult};

    fn device(id: &str, name: &str, ip: &str) -> Device {
        Device::new(DeviceId::new(id), name, ip)
    }

    #[test]
    fn test_devices_table_aligns_columns() {
        let table = devices_table(&[
            device("a1", "Google DNS", "8.8.8.8"),
            device("b2", "TV", "192.168.1.8"),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "NAME        IP           ID");
        assert_eq!(lines[1], "Google DNS  8.8.8.8      a1");
        assert_eq!(lines[2], "TV          192.168.1.8  b2");
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(devices_table(&[]), "No devices registered.\n");
        assert_eq!(report_table(&ProbeReport::empty()), "No devices registered.\n");
    }

    #[test]
    fn test_report_table_summary() {
        let report = ProbeReport::from_unordered(vec![
            ProbeResult::new(&device("g", "Google DNS", "8.8.8.8"), false),
            ProbeResult::new(&device("c", "Cloudflare DNS", "1.1.1.1"), true),
        ]);
        let table = report_table(&report);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[1].starts_with("Cloudflare DNS"));
        assert!(lines[1].ends_with("online"));
        assert!(lines[2].ends_with("offline"));
        assert_eq!(lines.last().copied(), Some("2 devices, 1 online, 1 offline"));
    }
}
