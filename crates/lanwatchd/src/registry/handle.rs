//! Client interface for interacting with the RegistryActor.
//!
//! The `RegistryHandle` provides a cheap-to-clone interface for sending commands
//! to the registry actor and subscribing to device events.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Channel errors are mapped to `RegistryError::ChannelClosed`

use tokio::sync::{broadcast, mpsc, oneshot};

use lanwatch_core::{Device, DeviceId};

use super::commands::{DeviceEvent, RegistryCommand, RegistryError};

/// Handle for interacting with the registry actor.
///
/// # Usage
///
/// ```ignore
/// let handle = registry_handle.clone();
///
/// let device = handle.add("NAS", "192.168.1.4").await?;
/// let devices = handle.snapshot().await?;
/// let removed = handle.remove(device.id).await?;
/// ```
#[derive(Clone)]
pub struct RegistryHandle {
    /// Command sender to the actor
    sender: mpsc::Sender<RegistryCommand>,

    /// Event broadcaster for subscribing to updates
    event_sender: broadcast::Sender<DeviceEvent>,
}

impl RegistryHandle {
    pub fn new(
        sender: mpsc::Sender<RegistryCommand>,
        event_sender: broadcast::Sender<DeviceEvent>,
    ) -> Self {
        Self {
            sender,
            event_sender,
        }
    }

    /// Returns an owned copy of the current device collection.
    ///
    /// Probe rounds work on this copy, so registry edits made while a round
    /// is in flight neither block nor affect it.
    ///
    /// # Errors
    ///
    /// - `RegistryError::Storage` if the collection cannot be read
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn snapshot(&self) -> Result<Vec<Device>, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::List { respond_to: tx })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)?
    }

    /// Registers a new device.
    ///
    /// # Errors
    ///
    /// - `RegistryError::Domain` if the request is invalid or the ip is taken
    /// - `RegistryError::Storage` if persistence fails
    /// - `RegistryError::ChannelClosed` if the actor has shut down
    pub async fn add(
        &self,
        name: impl Into<String>,
        ip: impl Into<String>,
    ) -> Result<Device, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::Add {
                name: name.into(),
                ip: ip.into(),
                respond_to: tx,
            })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)?
    }

    /// Removes a device. Returns `Ok(false)` if it was not registered.
    pub async fn remove(&self, id: DeviceId) -> Result<bool, RegistryError> {
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(RegistryCommand::Remove { id, respond_to: tx })
            .await
            .map_err(|_| RegistryError::ChannelClosed)?;

        rx.await.map_err(|_| RegistryError::ChannelClosed)?
    }

    /// Subscribes to device events.
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_sender.subscribe()
    }

    /// Returns true while the actor is still receiving commands.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}
