//! Device identity, persisted through an [`IdentityStorage`].

use log::{debug, warn};

use crate::error::{CommanderError, CommanderResult};
use crate::storage::{decode_record, encode_record, IdentityStorage};

/// Default maximum identity length in bytes.
pub const DEFAULT_ID_MAX_LENGTH: usize = 32;

/// Outcome of a successful [`IdentityStore::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityChange {
    /// The identity already had this value. Nothing was written.
    Unchanged,
    /// The identity was persisted and updated.
    Changed,
}

/// Owns the device identity and its persistence.
pub struct IdentityStore {
    id: String,
    max_length: usize,
    storage: Box<dyn IdentityStorage>,
}

impl IdentityStore {
    /// Create a store with an empty identity.
    pub fn new(storage: Box<dyn IdentityStorage>, max_length: usize) -> Self {
        IdentityStore {
            id: String::new(),
            max_length,
            storage,
        }
    }

    /// Current identity. Empty until set or seeded.
    pub fn get(&self) -> &str {
        &self.id
    }

    /// Maximum identity length in bytes.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Change the maximum identity length. The current identity is kept
    /// even if it is now longer than the new maximum.
    pub fn set_max_length(&mut self, max_length: usize) {
        self.max_length = max_length;
    }

    /// Whether the identity is persisted anywhere.
    pub fn has_storage(&self) -> bool {
        self.storage.is_available()
    }

    /// Set the identity.
    ///
    /// Rejects identities longer than the maximum. Setting the current value
    /// again writes nothing. If persisting fails the in-memory identity is
    /// left alone so memory and storage never disagree.
    pub fn set(&mut self, id: &str) -> CommanderResult<IdentityChange> {
        if id.len() > self.max_length {
            return Err(CommanderError::IdTooLong {
                id: id.to_string(),
                max: self.max_length,
            });
        }

        if id == self.id {
            return Ok(IdentityChange::Unchanged);
        }

        if self.storage.is_available() {
            let record = encode_record(id, self.max_length);
            if let Err(e) = self.storage.write_record(&record) {
                warn!("failed to persist identity '{}': {}", id, e);
                return Err(CommanderError::Storage(e));
            }
        }

        debug!("identity changed from '{}' to '{}'", self.id, id);
        self.id = id.to_string();
        Ok(IdentityChange::Changed)
    }

    /// Read the persisted record, if storage is present and holds one.
    pub fn load(&mut self) -> CommanderResult<Option<String>> {
        if !self.storage.is_available() {
            return Ok(None);
        }

        let record = self
            .storage
            .read_record(self.max_length)
            .map_err(CommanderError::Storage)?;
        Ok(record.as_deref().map(decode_record))
    }
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("id", &self.id)
            .field("max_length", &self.max_length)
            .field("has_storage", &self.storage.is_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, NoStorage};
    use std::io;

    struct FailingStorage;

    impl IdentityStorage for FailingStorage {
        fn read_record(&mut self, _len: usize) -> io::Result<Option<Vec<u8>>> {
            Err(io::Error::new(io::ErrorKind::Other, "eeprom offline"))
        }

        fn write_record(&mut self, _record: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "eeprom offline"))
        }
    }

    #[test]
    fn test_set_persists_on_change() {
        let storage = MemoryStorage::new();
        let mut store = IdentityStore::new(Box::new(storage.clone()), 32);

        assert_eq!(store.set("node-1").unwrap(), IdentityChange::Changed);
        assert_eq!(store.get(), "node-1");
        assert_eq!(storage.stored_id().as_deref(), Some("node-1"));
        assert_eq!(storage.writes(), 1);
    }

    #[test]
    fn test_set_same_value_does_not_write() {
        let storage = MemoryStorage::new();
        let mut store = IdentityStore::new(Box::new(storage.clone()), 32);

        store.set("node-1").unwrap();
        assert_eq!(store.set("node-1").unwrap(), IdentityChange::Unchanged);
        assert_eq!(storage.writes(), 1);
    }

    #[test]
    fn test_set_too_long_keeps_previous() {
        let mut store = IdentityStore::new(Box::new(NoStorage), 4);
        store.set("abcd").unwrap();

        let err = store.set("abcde").unwrap_err();
        assert!(matches!(err, CommanderError::IdTooLong { max: 4, .. }));
        assert_eq!(store.get(), "abcd");
    }

    #[test]
    fn test_set_without_storage() {
        let mut store = IdentityStore::new(Box::new(NoStorage), 32);
        assert!(!store.has_storage());
        assert_eq!(store.get(), "");
        assert_eq!(store.set("x").unwrap(), IdentityChange::Changed);
        assert_eq!(store.get(), "x");
    }

    #[test]
    fn test_set_persist_failure_keeps_previous() {
        let mut store = IdentityStore::new(Box::new(FailingStorage), 32);
        assert!(matches!(store.set("x"), Err(CommanderError::Storage(_))));
        assert_eq!(store.get(), "");
    }

    #[test]
    fn test_load() {
        let storage = MemoryStorage::with_id("stored", 32);
        let mut store = IdentityStore::new(Box::new(storage), 32);
        assert_eq!(store.load().unwrap().as_deref(), Some("stored"));

        let mut empty = IdentityStore::new(Box::new(MemoryStorage::new()), 32);
        assert_eq!(empty.load().unwrap(), None);

        let mut absent = IdentityStore::new(Box::new(NoStorage), 32);
        assert_eq!(absent.load().unwrap(), None);
    }
}
