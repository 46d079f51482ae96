//! Registry actor commands, errors, and events.
//!
//! This module defines the message types for communicating with the `RegistryActor`:
//! - `RegistryCommand`: Commands sent to the actor
//! - `RegistryError`: Errors that can occur during registry operations
//! - `DeviceEvent`: Events published by the registry for subscribers
//!
//! All types are designed for async message passing and follow the panic-free policy.

use lanwatch_core::{Device, DeviceId, DomainError};
use thiserror::Error;
use tokio::sync::oneshot;

use super::storage::StorageError;

// ============================================================================
// Registry Commands
// ============================================================================

/// Commands sent to the registry actor.
///
/// Each command carries a oneshot channel for the response.
#[derive(Debug)]
pub enum RegistryCommand {
    /// Read the full device collection.
    List {
        respond_to: oneshot::Sender<Result<Vec<Device>, RegistryError>>,
    },

    /// Register a new device.
    ///
    /// # Errors
    /// - `DomainError::EmptyField` if name or ip is blank
    /// - `DomainError::DuplicateIp` if the ip is already registered
    Add {
        name: String,
        ip: String,
        respond_to: oneshot::Sender<Result<Device, RegistryError>>,
    },

    /// Remove a device by ID. Responds `Ok(false)` if it was not registered.
    Remove {
        id: DeviceId,
        respond_to: oneshot::Sender<Result<bool, RegistryError>>,
    },
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The request was rejected; the registry is unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Durable storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The response channel was closed before receiving a response.
    ///
    /// This typically indicates the actor was shut down.
    #[error("response channel closed")]
    ChannelClosed,
}

impl RegistryError {
    /// True for rejected requests (caller mistakes), false for system faults.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}

// ============================================================================
// Device Events
// ============================================================================

/// Events published by the registry after each successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Added { device: Device },
    Removed { id: DeviceId },
}
