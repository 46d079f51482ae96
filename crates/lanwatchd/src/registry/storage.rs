//! Durable storage for the device collection.
//!
//! The collection is always read and written as a whole. `JsonFileStorage`
//! is the production backend; `MemoryStorage` keeps everything in process
//! and counts writes so tests can assert when persistence happened.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use lanwatch_core::{Device, DeviceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Stored Record
// ============================================================================

/// A device record as found in durable storage.
///
/// `id` is optional on read: records written by hand or by older tools may
/// lack one, and the registry assigns it on load. Keys other than `id`,
/// `name` and `ip` are ignored and not written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDevice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DeviceId>,
    pub name: String,
    pub ip: String,
}

impl From<&Device> for StoredDevice {
    fn from(device: &Device) -> Self {
        Self {
            id: Some(device.id.clone()),
            name: device.name.clone(),
            ip: device.ip.clone(),
        }
    }
}

// ============================================================================
// Storage Errors
// ============================================================================

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize device list: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ============================================================================
// Storage Trait
// ============================================================================

/// Whole-collection persistence for the device registry.
pub trait DeviceStorage: Send + 'static {
    /// Reads the stored collection.
    ///
    /// Returns `Ok(None)` when no durable state exists yet.
    fn read(&self) -> Result<Option<Vec<StoredDevice>>, StorageError>;

    /// Replaces the stored collection.
    fn write(&mut self, devices: &[Device]) -> Result<(), StorageError>;
}

// ============================================================================
// JSON File Storage
// ============================================================================

/// Stores the collection as a pretty-printed JSON array in a single file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so readers never observe a partially written collection.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "devices.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DeviceStorage for JsonFileStorage {
    fn read(&self) -> Result<Option<Vec<StoredDevice>>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&mut self, devices: &[Device]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
            }
        }

        let records: Vec<StoredDevice> = devices.iter().map(StoredDevice::from).collect();
        let mut json = serde_json::to_string_pretty(&records).map_err(StorageError::Serialize)?;
        json.push('\n');

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| StorageError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        debug!(path = %self.path.display(), count = devices.len(), "Device list written");
        Ok(())
    }
}

// ============================================================================
// Memory Storage
// ============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    records: Option<Vec<StoredDevice>>,
    writes: usize,
}

/// In-process storage. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    /// Storage with no durable state yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with the given records.
    pub fn with_records(records: Vec<StoredDevice>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                records: Some(records),
                writes: 0,
            })),
        }
    }

    /// Number of completed writes.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Current stored records, if any.
    pub fn records(&self) -> Option<Vec<StoredDevice>> {
        self.lock().records.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceStorage for MemoryStorage {
    fn read(&self) -> Result<Option<Vec<StoredDevice>>, StorageError> {
        Ok(self.lock().records.clone())
    }

    fn write(&mut self, devices: &[Device]) -> Result<(), StorageError> {
        let mut state = self.lock();
        state.records = Some(devices.iter().map(StoredDevice::from).collect());
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn device(id: &str, name: &str, ip: &str) -> Device {
        Device::new(DeviceId::new(id), name, ip)
    }

    #[test]
    fn test_missing_file_reads_none() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("devices.json"));
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_empty_file_reads_empty_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(&path, "  \n").unwrap();

        let storage = JsonFileStorage::new(&path);
        assert_eq!(storage.read().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonFileStorage::new(dir.path().join("devices.json"));

        storage
            .write(&[device("a", "Router", "192.168.1.1")])
            .unwrap();

        let records = storage.read().unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(DeviceId::new("a")));
        assert_eq!(records[0].name, "Router");
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state").join("devices.json");
        let mut storage = JsonFileStorage::new(&path);

        storage.write(&[]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_record_without_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(&path, r#"[{"name": "Legacy", "ip": "10.0.0.3"}]"#).unwrap();

        let records = JsonFileStorage::new(&path).read().unwrap().unwrap();
        assert_eq!(records[0].id, None);
    }

    #[test]
    fn test_unknown_keys_read_but_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(
            &path,
            r#"[{"id": "a", "name": "NAS", "ip": "10.0.0.4", "mac": "aa:bb:cc:dd:ee:ff"}]"#,
        )
        .unwrap();

        let mut storage = JsonFileStorage::new(&path);
        let records = storage.read().unwrap().unwrap();
        assert_eq!(records[0].name, "NAS");

        storage.write(&[device("a", "NAS", "10.0.0.4")]).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value[0].get("mac").is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonFileStorage::new(&path).read().unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
        assert!(err.to_string().contains("devices.json"));
    }

    #[test]
    fn test_file_format_is_plain_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devices.json");
        let mut storage = JsonFileStorage::new(&path);
        storage.write(&[device("a", "NAS", "10.0.0.4")]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"id": "a", "name": "NAS", "ip": "10.0.0.4"}])
        );
    }

    #[test]
    fn test_memory_storage_counts_writes() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();

        assert!(storage.read().unwrap().is_none());
        writer.write(&[device("a", "x", "1")]).unwrap();
        writer.write(&[]).unwrap();

        assert_eq!(storage.write_count(), 2);
        assert_eq!(storage.records(), Some(Vec::new()));
    }
}
