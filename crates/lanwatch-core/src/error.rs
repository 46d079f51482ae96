//! Domain-specific error types following panic-free policy.

use crate::DeviceId;
use thiserror::Error;

/// Errors that can occur in domain operations.
///
/// These are caller mistakes, not system faults: each one maps to a
/// rejected request and leaves the registry unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was missing, empty or whitespace-only
    #[error("{field} is required")]
    EmptyField { field: &'static str },

    /// Another device already uses this IP
    #[error("device with IP {ip} already exists")]
    DuplicateIp { ip: String },

    /// No device with this ID is registered
    #[error("device not found: {id}")]
    DeviceNotFound { id: DeviceId },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
