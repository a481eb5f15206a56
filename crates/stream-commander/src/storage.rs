//! Non-volatile storage for the device identity.
//!
//! The identity is kept as one fixed-size record, read and written whole.
//! The record is the identity's UTF-8 bytes padded with NUL up to the
//! configured maximum length.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

/// A fixed-size record store for the identity.
pub trait IdentityStorage: Send {
    /// Whether this storage actually persists anything.
    ///
    /// When `false`, the identity store neither seeds from nor writes to it.
    fn is_available(&self) -> bool {
        true
    }

    /// Read the whole record. `None` means nothing has been stored yet.
    fn read_record(&mut self, len: usize) -> io::Result<Option<Vec<u8>>>;

    /// Replace the whole record.
    fn write_record(&mut self, record: &[u8]) -> io::Result<()>;
}

/// Encode an identity into a record of exactly `len` bytes.
///
/// Identities longer than `len` are cut; callers validate length first.
pub fn encode_record(id: &str, len: usize) -> Vec<u8> {
    let mut record = vec![0u8; len];
    let bytes = id.as_bytes();
    let n = bytes.len().min(len);
    record[..n].copy_from_slice(&bytes[..n]);
    record
}

/// Decode a record back into an identity, stopping at the first NUL.
pub fn decode_record(record: &[u8]) -> String {
    let end = record.iter().position(|&b| b == 0).unwrap_or(record.len());
    String::from_utf8_lossy(&record[..end]).into_owned()
}

/// Storage for boards without non-volatile memory. Never persists anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStorage;

impl IdentityStorage for NoStorage {
    fn is_available(&self) -> bool {
        false
    }

    fn read_record(&mut self, _len: usize) -> io::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn write_record(&mut self, _record: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryStorageInner {
    record: Option<Vec<u8>>,
    writes: usize,
}

/// In-memory storage. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryStorageInner>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage already holding `id`.
    pub fn with_id(id: &str, len: usize) -> Self {
        let storage = Self::new();
        storage.inner.lock().record = Some(encode_record(id, len));
        storage
    }

    /// The identity currently stored, if any.
    pub fn stored_id(&self) -> Option<String> {
        self.inner.lock().record.as_deref().map(decode_record)
    }

    /// Number of record writes so far.
    pub fn writes(&self) -> usize {
        self.inner.lock().writes
    }
}

impl IdentityStorage for MemoryStorage {
    fn read_record(&mut self, len: usize) -> io::Result<Option<Vec<u8>>> {
        Ok(self.inner.lock().record.as_ref().map(|record| {
            let mut record = record.clone();
            record.resize(len, 0);
            record
        }))
    }

    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        let mut inner = self.inner.lock();
        inner.record = Some(record.to_vec());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_nul_padded() {
        assert_eq!(encode_record("ab", 4), vec![b'a', b'b', 0, 0]);
    }

    #[test]
    fn test_record_full_length_has_no_terminator() {
        let record = encode_record("abcd", 4);
        assert_eq!(record, b"abcd");
        assert_eq!(decode_record(&record), "abcd");
    }

    #[test]
    fn test_decode_stops_at_nul() {
        assert_eq!(decode_record(b"node\0junk"), "node");
        assert_eq!(decode_record(&[0u8; 8]), "");
    }

    #[test]
    fn test_no_storage() {
        let mut storage = NoStorage;
        assert!(!storage.is_available());
        assert_eq!(storage.read_record(32).unwrap(), None);
        storage.write_record(b"x").unwrap();
        assert_eq!(storage.read_record(32).unwrap(), None);
    }

    #[test]
    fn test_memory_storage() {
        let handle = MemoryStorage::new();
        let mut storage = handle.clone();
        assert!(storage.is_available());
        assert_eq!(storage.read_record(8).unwrap(), None);

        storage.write_record(&encode_record("dev", 8)).unwrap();
        assert_eq!(handle.stored_id().as_deref(), Some("dev"));
        assert_eq!(handle.writes(), 1);
        assert_eq!(storage.read_record(8).unwrap().unwrap().len(), 8);
    }
}
