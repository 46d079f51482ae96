//! Device entities and value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{DomainError, DomainResult};

// ============================================================================
// Type-Safe Identifiers
// ============================================================================

/// Unique identifier for a registered device.
///
/// Freshly registered devices get a UUIDv4 string, but the value is treated
/// as opaque: IDs written by other tools round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a DeviceId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocates a new, globally unique ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the underlying string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// New Device (validated input)
// ============================================================================

/// A validated registration request.
///
/// Both fields are trimmed; construction fails if either is left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    name: String,
    ip: String,
}

impl NewDevice {
    /// Validates and normalizes a registration request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyField` for the first blank field,
    /// checking `name` before `ip`.
    pub fn new(name: &str, ip: &str) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyField { field: "name" });
        }

        let ip = ip.trim();
        if ip.is_empty() {
            return Err(DomainError::EmptyField { field: "ip" });
        }

        Ok(Self {
            name: name.to_string(),
            ip: ip.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }
}

// ============================================================================
// Device
// ============================================================================

/// A named network endpoint tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub ip: String,
}

impl Device {
    /// Creates a device with an explicit ID.
    pub fn new(id: DeviceId, name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ip: ip.into(),
        }
    }

    /// Registers a validated request under a freshly generated ID.
    pub fn register(new: NewDevice) -> Self {
        Self {
            id: DeviceId::generate(),
            name: new.name,
            ip: new.ip,
        }
    }

    /// Exact, case-sensitive IP comparison used for duplicate detection.
    pub fn has_ip(&self, ip: &str) -> bool {
        self.ip == ip
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_device_trims_fields() {
        let new = NewDevice::new("  Router ", " 192.168.1.1\n").unwrap();
        assert_eq!(new.name(), "Router");
        assert_eq!(new.ip(), "192.168.1.1");
    }

    #[test]
    fn test_new_device_rejects_empty_name() {
        let err = NewDevice::new("", "1.2.3.4").unwrap_err();
        assert_eq!(err, DomainError::EmptyField { field: "name" });
    }

    #[test]
    fn test_new_device_rejects_whitespace_ip() {
        let err = NewDevice::new("Printer", "   ").unwrap_err();
        assert_eq!(err, DomainError::EmptyField { field: "ip" });
    }

    #[test]
    fn test_new_device_checks_name_first() {
        let err = NewDevice::new(" ", "").unwrap_err();
        assert_eq!(err, DomainError::EmptyField { field: "name" });
    }

    #[test]
    fn test_register_allocates_distinct_ids() {
        let a = Device::register(NewDevice::new("A", "10.0.0.1").unwrap());
        let b = Device::register(NewDevice::new("B", "10.0.0.2").unwrap());
        assert_ne!(a.id, b.id);
        assert_eq!(a.id.as_str().len(), 36);
    }

    #[test]
    fn test_has_ip_is_case_sensitive() {
        let device = Device::new(DeviceId::new("x"), "v6 host", "fe80::ABCD");
        assert!(device.has_ip("fe80::ABCD"));
        assert!(!device.has_ip("fe80::abcd"));
    }

    #[test]
    fn test_device_json_shape() {
        let device = Device::new(DeviceId::new("id-1"), "Google DNS", "8.8.8.8");
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "id-1", "name": "Google DNS", "ip": "8.8.8.8"})
        );
    }
}
