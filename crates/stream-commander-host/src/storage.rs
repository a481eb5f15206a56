//! Identity persistence in a plain file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stream_commander::IdentityStorage;

/// Keeps the identity record in a file, standing in for a board's EEPROM.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Use the file at `path`. It is created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStorage for FileStorage {
    fn read_record(&mut self, len: usize) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(mut record) => {
                record.resize(len, 0);
                Ok(Some(record))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_record(&mut self, record: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream_commander::{decode_record, encode_record};

    #[test]
    fn test_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("id.bin"));
        assert!(storage.read_record(32).unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("id.bin");
        let mut storage = FileStorage::new(&path);

        storage.write_record(&encode_record("bench-2", 32)).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 32);

        let record = storage.read_record(32).unwrap().unwrap();
        assert_eq!(decode_record(&record), "bench-2");
    }

    #[test]
    fn test_short_file_is_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.bin");
        fs::write(&path, b"abc").unwrap();

        let mut storage = FileStorage::new(&path);
        let record = storage.read_record(8).unwrap().unwrap();
        assert_eq!(record, b"abc\0\0\0\0\0");
    }
}
