//! Registry actor - owns the device registry and processes commands.
//!
//! The RegistryActor is the single writer of device state in the process.
//! It receives commands via an mpsc channel and publishes events via broadcast.
//!
//! # Panic-Free Guarantees
//!
//! This module follows the panic-free policy:
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - All fallible operations use `?`, pattern matching, or `unwrap_or`
//! - Channel send failures are logged but don't panic

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info};

use lanwatch_core::{Device, DeviceId};

use super::commands::{DeviceEvent, RegistryCommand, RegistryError};
use super::storage::DeviceStorage;
use super::store::DeviceRegistry;

/// The registry actor - owns the device registry.
///
/// Commands are processed one at a time, so concurrent HTTP requests never
/// interleave their read-modify-write cycles.
pub struct RegistryActor<S> {
    /// Command receiver
    receiver: mpsc::Receiver<RegistryCommand>,

    /// The registry and its storage backend
    registry: DeviceRegistry<S>,

    /// Event publisher for mutation notifications
    event_publisher: broadcast::Sender<DeviceEvent>,
}

impl<S: DeviceStorage> RegistryActor<S> {
    pub fn new(
        receiver: mpsc::Receiver<RegistryCommand>,
        registry: DeviceRegistry<S>,
        event_publisher: broadcast::Sender<DeviceEvent>,
    ) -> Self {
        Self {
            receiver,
            registry,
            event_publisher,
        }
    }

    /// Runs the actor event loop.
    ///
    /// Processes commands until the channel closes (all senders dropped).
    pub async fn run(mut self) {
        info!("Registry actor starting");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("Registry actor stopped");
    }

    /// Dispatches a command to the appropriate handler.
    fn handle_command(&mut self, cmd: RegistryCommand) {
        match cmd {
            RegistryCommand::List { respond_to } => {
                let result = self.handle_list();
                // Ignore send error - client may have dropped the receiver
                let _ = respond_to.send(result);
            }
            RegistryCommand::Add {
                name,
                ip,
                respond_to,
            } => {
                let result = self.handle_add(&name, &ip);
                let _ = respond_to.send(result);
            }
            RegistryCommand::Remove { id, respond_to } => {
                let result = self.handle_remove(id);
                let _ = respond_to.send(result);
            }
        }
    }

    // ========================================================================
    // Command Handlers
    // ========================================================================

    fn handle_list(&mut self) -> Result<Vec<Device>, RegistryError> {
        self.registry.load().inspect_err(|e| log_failure("list", e))
    }

    fn handle_add(&mut self, name: &str, ip: &str) -> Result<Device, RegistryError> {
        let device = self
            .registry
            .add(name, ip)
            .inspect_err(|e| log_failure("add", e))?;

        self.publish(DeviceEvent::Added {
            device: device.clone(),
        });
        Ok(device)
    }

    fn handle_remove(&mut self, id: DeviceId) -> Result<bool, RegistryError> {
        let removed = self
            .registry
            .remove(&id)
            .inspect_err(|e| log_failure("remove", e))?;

        if removed {
            self.publish(DeviceEvent::Removed { id });
        }
        Ok(removed)
    }

    fn publish(&self, event: DeviceEvent) {
        // No subscribers is not an error
        if self.event_publisher.send(event).is_err() {
            debug!("No event subscribers");
        }
    }
}

/// Rejected requests are expected traffic; only storage faults are errors.
fn log_failure(op: &'static str, err: &RegistryError) {
    if err.is_rejection() {
        debug!(op, error = %err, "Registry request rejected");
    } else {
        error!(op, error = %err, "Registry operation failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::storage::MemoryStorage;
    use tokio::sync::oneshot;

    fn create_actor() -> (
        RegistryActor<MemoryStorage>,
        MemoryStorage,
        broadcast::Receiver<DeviceEvent>,
    ) {
        let (_tx, rx) = mpsc::channel(10);
        let (event_tx, event_rx) = broadcast::channel(10);
        let storage = MemoryStorage::new();
        let actor = RegistryActor::new(rx, DeviceRegistry::new(storage.clone()), event_tx);
        (actor, storage, event_rx)
    }

    #[tokio::test]
    async fn test_add_publishes_event() {
        let (mut actor, _storage, mut events) = create_actor();
        let (tx, rx) = oneshot::channel();

        actor.handle_command(RegistryCommand::Add {
            name: "Router".to_string(),
            ip: "192.168.1.1".to_string(),
            respond_to: tx,
        });

        let device = rx.await.unwrap().unwrap();
        assert_eq!(
            events.try_recv().unwrap(),
            DeviceEvent::Added { device }
        );
    }

    #[tokio::test]
    async fn test_rejected_add_publishes_nothing() {
        let (mut actor, storage, mut events) = create_actor();
        let (tx, rx) = oneshot::channel();

        actor.handle_command(RegistryCommand::Add {
            name: "".to_string(),
            ip: "192.168.1.1".to_string(),
            respond_to: tx,
        });

        assert!(rx.await.unwrap().is_err());
        assert!(events.try_recv().is_err());
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_unknown_publishes_nothing() {
        let (mut actor, _storage, mut events) = create_actor();
        let (tx, rx) = oneshot::channel();

        actor.handle_command(RegistryCommand::Remove {
            id: DeviceId::new("missing"),
            respond_to: tx,
        });

        assert!(!rx.await.unwrap().unwrap());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_panic() {
        let (mut actor, _storage, _events) = create_actor();
        let (tx, rx) = oneshot::channel();
        drop(rx);

        actor.handle_command(RegistryCommand::List { respond_to: tx });
    }
}
