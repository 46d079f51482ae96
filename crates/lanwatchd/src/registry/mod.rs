//! Device registry using Actor pattern.
//!
//! The registry is the source of truth for the tracked devices. It receives
//! commands via a tokio mpsc channel and persists the whole collection on
//! every mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │  HTTP handlers  │────▶│  RegistryActor  │────▶│ Broadcast Channel│
//! └─────────────────┘     └────────┬────────┘     └──────────────────┘
//!         │                        │                       │
//!         │   RegistryCommand      │ DeviceRegistry        │ DeviceEvent
//!         │   (mpsc channel)       ▼                       ▼
//!         │               ┌─────────────────┐       log subscribers
//!         │               │  DeviceStorage  │
//!         │               │ (devices.json)  │
//!         ▼               └─────────────────┘
//!   List/Add/Remove
//! ```
//!
//! # Panic-Free Guarantees
//!
//! All operations in this module follow the panic-free policy:
//! - No `.unwrap()` or `.expect()` in production code
//! - All fallible operations return `Result` or `Option`
//! - Channel operations handle closure gracefully

use tokio::sync::{broadcast, mpsc};

mod actor;
mod commands;
mod handle;
mod storage;
mod store;

pub use actor::RegistryActor;
pub use commands::{DeviceEvent, RegistryCommand, RegistryError};
pub use handle::RegistryHandle;
pub use storage::{DeviceStorage, JsonFileStorage, MemoryStorage, StorageError, StoredDevice};
pub use store::{default_seed, DeviceRegistry};

/// Channel buffer sizes
const COMMAND_BUFFER: usize = 100;
const EVENT_BUFFER: usize = 100;

/// Spawn the registry actor and return a handle for interaction.
///
/// # Example
///
/// ```no_run
/// use lanwatchd::registry::{spawn_registry, DeviceRegistry, JsonFileStorage};
///
/// #[tokio::main]
/// async fn main() {
///     let registry = DeviceRegistry::new(JsonFileStorage::new("devices.json"));
///     let handle = spawn_registry(registry);
///
///     let devices = handle.snapshot().await;
/// }
/// ```
pub fn spawn_registry<S: DeviceStorage>(registry: DeviceRegistry<S>) -> RegistryHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    let actor = RegistryActor::new(cmd_rx, registry, event_tx.clone());
    tokio::spawn(actor.run());

    RegistryHandle::new(cmd_tx, event_tx)
}
