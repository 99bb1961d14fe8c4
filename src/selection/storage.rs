//! Durable named-slot storage for the selection
//!
//! The dashboard keeps its selection in a single named slot. On disk the
//! slot lives in a fjall keyspace; tests use the in-memory variant.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use fjall::Keyspace;

pub trait SlotStorage: Send + Sync {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>>;
    fn write(&self, slot: &str, bytes: Vec<u8>) -> Result<()>;
    fn remove(&self, slot: &str) -> Result<()>;
}

pub struct FjallSlotStorage {
    _db: fjall::Database,
    store: Keyspace,
}

impl FjallSlotStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let store = db.keyspace("selection", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { _db: db, store })
    }
}

impl SlotStorage for FjallSlotStorage {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(slot.as_bytes())?.map(|v| v.to_vec()))
    }

    fn write(&self, slot: &str, bytes: Vec<u8>) -> Result<()> {
        self.store.insert(slot.as_bytes().to_vec(), bytes)?;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        self.store.remove(slot.as_bytes().to_vec())?;
        Ok(())
    }
}

/// Volatile storage. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStorage {
    slots: Arc<DashMap<String, Vec<u8>>>,
}

impl MemorySlotStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(slot).map(|bytes| bytes.value().clone()))
    }

    fn write(&self, slot: &str, bytes: Vec<u8>) -> Result<()> {
        self.slots.insert(slot.to_string(), bytes);
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<()> {
        self.slots.remove(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fjall_slot_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let storage = FjallSlotStorage::open(temp_dir.path()).unwrap();
            storage.write("selectedCities", b"[1,2]".to_vec()).unwrap();
        }

        let storage = FjallSlotStorage::open(temp_dir.path()).unwrap();
        assert_eq!(storage.read("selectedCities").unwrap(), Some(b"[1,2]".to_vec()));

        storage.remove("selectedCities").unwrap();
        assert_eq!(storage.read("selectedCities").unwrap(), None);
    }

    #[test]
    fn test_memory_slot_clones_share_state() {
        let storage = MemorySlotStorage::new();
        let observer = storage.clone();

        storage.write("slot", vec![7]).unwrap();
        assert_eq!(observer.read("slot").unwrap(), Some(vec![7]));
        assert_eq!(observer.read("other").unwrap(), None);
    }
}
