use super::StorageBackend;
use crate::error::StoreError;
use std::collections::BTreeMap;

/// Backend that keeps nothing beyond the process lifetime.
#[derive(Default)]
pub struct MemoryBackend;

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(BTreeMap::new())
    }

    fn persist(&self, _entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        Ok(())
    }
}
