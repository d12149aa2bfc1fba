//! How a preset store reaches durable storage

use crate::error::Result;
use beatswirl_core::PresetStore;

/// Strategy for writing the preset store after a save command
pub trait PresetPersistence: Send {
    /// Write (or schedule a write of) the whole store
    fn persist(&mut self, store: &PresetStore) -> Result<()>;

    /// Results of writes that completed since the last poll.
    /// Synchronous strategies report through `persist` and return nothing here.
    fn poll(&mut self) -> Vec<Result<()>> {
        Vec::new()
    }
}

/// Writes on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectPersistence;

impl PresetPersistence for DirectPersistence {
    fn persist(&mut self, store: &PresetStore) -> Result<()> {
        Ok(store.save()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatswirl_core::{Preset, SlotKey};
    use tempfile::tempdir;

    #[test]
    fn test_direct_persistence_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("presets.json");
        let mut store = PresetStore::load(&path);
        store.set(SlotKey::E, Preset::default());

        DirectPersistence.persist(&store).unwrap();
        assert_eq!(PresetStore::load(&path), store);
        assert!(DirectPersistence.poll().is_empty());
    }
}
