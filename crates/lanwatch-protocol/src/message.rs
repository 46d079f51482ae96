//! Request and response bodies for the daemon's HTTP API.

use serde::{Deserialize, Serialize};

use crate::version::ApiVersion;

/// Body of `POST /api/devices`.
///
/// Fields are optional on the wire so that a missing field is reported as a
/// validation failure rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl CreateDeviceRequest {
    pub fn new(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ip: Some(ip.into()),
        }
    }
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Returned when `name` or `ip` is missing or blank.
    pub fn fields_required() -> Self {
        Self::new("name and ip are required")
    }

    /// Returned when the IP is already registered.
    pub fn duplicate_ip() -> Self {
        Self::new("device with this IP already exists")
    }

    /// Returned when the device ID is unknown.
    pub fn not_found() -> Self {
        Self::new("not found")
    }
}

/// Acknowledgement body for successful deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkBody {
    pub ok: bool,
}

impl OkBody {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Body of `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub version: String,
    pub api_version: ApiVersion,
}

impl HealthBody {
    pub fn ok(version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            version: version.into(),
            api_version: ApiVersion::CURRENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_missing_fields() {
        let req: CreateDeviceRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
        assert!(req.ip.is_none());

        let req: CreateDeviceRequest = serde_json::from_str(r#"{"name": "NAS"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("NAS"));
        assert!(req.ip.is_none());
    }

    #[test]
    fn test_create_request_null_fields() {
        let req: CreateDeviceRequest =
            serde_json::from_str(r#"{"name": null, "ip": "10.0.0.1"}"#).unwrap();
        assert!(req.name.is_none());
        assert_eq!(req.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_create_request_serializes_both_fields() {
        let json = serde_json::to_value(CreateDeviceRequest::new("NAS", "10.0.0.4")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "NAS", "ip": "10.0.0.4"}));
    }

    #[test]
    fn test_ok_body_shape() {
        let json = serde_json::to_string(&OkBody::ok()).unwrap();
        assert_eq!(json, r#"{"ok":true}"#);
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ErrorBody::not_found()).unwrap();
        assert_eq!(json, serde_json::json!({"error": "not found"}));
    }

    #[test]
    fn test_health_body_roundtrip() {
        let body = HealthBody::ok("0.1.0");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""api_version":"1.0""#));
        let back: HealthBody = serde_json::from_str(&json).unwrap();
        assert_eq!(back, body);
    }
}
