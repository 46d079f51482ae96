//! Route paths served by the daemon.

/// Device collection: `GET` lists, `POST` registers.
pub const DEVICES: &str = "/api/devices";

/// Single device: `DELETE` removes.
pub const DEVICE: &str = "/api/devices/{id}";

/// Runs a fresh probe round and returns the report.
pub const STATUS: &str = "/api/status";

/// Liveness and version information.
pub const HEALTH: &str = "/healthz";

/// Raw stored device list.
pub const DEVICES_FILE: &str = "/devices.json";

/// Builds the path for a single device.
pub fn device(id: &str) -> String {
    format!("{DEVICES}/{id}")
}
