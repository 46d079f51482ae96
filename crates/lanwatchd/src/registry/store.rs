//! Synchronous device registry over a storage backend.
//!
//! Every operation is a read-modify-write of the whole collection. Nothing is
//! cached between calls, so the storage backend stays the single source of
//! truth.

use lanwatch_core::{Device, DeviceId, DomainError, NewDevice};
use tracing::{debug, info, warn};

use super::commands::RegistryError;
use super::storage::DeviceStorage;

/// Devices written on first use when no durable state exists.
pub fn default_seed() -> Vec<NewDevice> {
    [("Google DNS", "8.8.8.8"), ("Cloudflare DNS", "1.1.1.1")]
        .into_iter()
        .filter_map(|(name, ip)| NewDevice::new(name, ip).ok())
        .collect()
}

/// The device registry: validation, uniqueness and persistence rules.
#[derive(Debug)]
pub struct DeviceRegistry<S> {
    storage: S,
    seed: Vec<NewDevice>,
}

impl<S: DeviceStorage> DeviceRegistry<S> {
    /// Creates a registry that initializes empty storage with no devices.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            seed: Vec::new(),
        }
    }

    /// Sets the devices written when no durable state exists yet.
    #[must_use]
    pub fn with_seed(mut self, seed: Vec<NewDevice>) -> Self {
        self.seed = seed;
        self
    }

    /// Loads the full collection.
    ///
    /// Initializes storage from the seed set on first use, and assigns IDs to
    /// records that lack one. Either correction is persisted before returning.
    pub fn load(&mut self) -> Result<Vec<Device>, RegistryError> {
        let Some(records) = self.storage.read()? else {
            let devices: Vec<Device> = self.seed.iter().cloned().map(Device::register).collect();
            self.storage.write(&devices)?;
            info!(count = devices.len(), "Initialized empty device registry");
            return Ok(devices);
        };

        let mut repaired = 0usize;
        let devices: Vec<Device> = records
            .into_iter()
            .map(|record| {
                let id = record.id.unwrap_or_else(|| {
                    repaired += 1;
                    DeviceId::generate()
                });
                Device::new(id, record.name, record.ip)
            })
            .collect();

        if repaired > 0 {
            warn!(repaired, "Assigned IDs to stored devices that had none");
            self.storage.write(&devices)?;
        }

        Ok(devices)
    }

    /// Replaces the stored collection.
    pub fn save(&mut self, devices: &[Device]) -> Result<(), RegistryError> {
        self.storage.write(devices)?;
        Ok(())
    }

    /// Registers a new device.
    ///
    /// Validation happens before storage is touched.
    ///
    /// # Errors
    ///
    /// - `DomainError::EmptyField` if name or ip is blank
    /// - `DomainError::DuplicateIp` if another device has the same ip
    pub fn add(&mut self, name: &str, ip: &str) -> Result<Device, RegistryError> {
        let new = NewDevice::new(name, ip)?;

        let mut devices = self.load()?;
        if devices.iter().any(|d| d.has_ip(new.ip())) {
            debug!(ip = new.ip(), "Rejected duplicate IP");
            return Err(DomainError::DuplicateIp {
                ip: new.ip().to_string(),
            }
            .into());
        }

        let device = Device::register(new);
        devices.push(device.clone());
        self.save(&devices)?;

        info!(id = %device.id, name = %device.name, ip = %device.ip, "Device registered");
        Ok(device)
    }

    /// Removes a device by ID.
    ///
    /// Returns `Ok(false)` without writing if no such device exists.
    pub fn remove(&mut self, id: &DeviceId) -> Result<bool, RegistryError> {
        let mut devices = self.load()?;
        let before = devices.len();
        devices.retain(|d| &d.id != id);

        if devices.len() == before {
            debug!(id = %id, "Remove requested for unknown device");
            return Ok(false);
        }

        self.save(&devices)?;
        info!(id = %id, "Device removed");
        Ok(true)
    }
}
