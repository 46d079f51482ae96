//! API versioning for client/daemon compatibility checks.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Version of the HTTP API served by the daemon.
///
/// Uses major.minor:
/// - Major version bump: breaking changes to routes or bodies
/// - Minor version bump: additive changes, backward compatible
///
/// Serialized as a `"major.minor"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl ApiVersion {
    /// Current API version.
    pub const CURRENT: ApiVersion = ApiVersion { major: 1, minor: 0 };

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Parses a version string like "1.0".
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat(s.to_string());

        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u16>().map_err(|_| invalid())?;
        let minor = minor.parse::<u16>().map_err(|_| invalid())?;

        Ok(Self { major, minor })
    }

    /// Major versions must match; any minor version is compatible.
    pub fn is_compatible_with(&self, other: &ApiVersion) -> bool {
        self.major == other.major
    }

    /// Fails with `VersionError::Incompatible` unless compatible with `CURRENT`.
    pub fn ensure_compatible(&self) -> Result<(), VersionError> {
        if self.is_compatible_with(&Self::CURRENT) {
            Ok(())
        } else {
            Err(VersionError::Incompatible {
                got: self.to_string(),
                expected: Self::CURRENT.to_string(),
            })
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ApiVersion> for String {
    fn from(v: ApiVersion) -> Self {
        v.to_string()
    }
}

/// Errors that can occur with version handling.
#[derive(Error, Debug, Clone)]
pub enum VersionError {
    #[error("Invalid version format: {0}")]
    InvalidFormat(String),

    #[error("Incompatible API version: got {got}, expected {expected}")]
    Incompatible { got: String, expected: String },
}
