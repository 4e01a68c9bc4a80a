//! The shared read-only file cache.
//!
//! `RETR` serves file bytes straight out of a memory mapping. Mappings are
//! de-duplicated process-wide: concurrent downloads of the same path share
//! one mapping, and the cache entry evicts itself when the last holder
//! releases it. Overwriting a cached file does not disturb readers holding
//! the mapping; they keep the old bytes alive through the map itself.

use super::error::{Error, ErrorKind};
use lazy_static::lazy_static;
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

lazy_static! {
    // Keyed by host-native path. Insertion and drop-time removal are
    // serialized by this one mutex; see MappedFile::drop for the
    // resurrection case.
    static ref OPEN_FILES: Mutex<HashMap<PathBuf, Weak<MappedFile>>> = Mutex::new(HashMap::new());
}

/// A memory-mapped read-only file, shared between all sessions that are
/// currently sending it.
#[derive(Debug)]
pub struct MappedFile {
    path: PathBuf,
    len: u64,
    // None for zero-length files, which cannot be mapped.
    map: Option<Mmap>,
}

impl MappedFile {
    /// Retrieves the file at `path`, reusing a live mapping when one exists.
    /// Open and mapping failures surface as local errors.
    pub fn open(path: &Path) -> Result<Arc<MappedFile>, Error> {
        let mut files = OPEN_FILES.lock().expect("mapped file cache mutex poisoned");

        if let Some(existing) = files.get(path).and_then(Weak::upgrade) {
            return Ok(existing);
        }

        let local = |err| Error::new(ErrorKind::LocalError, err);
        let file = File::open(path).map_err(local)?;
        let len = file.metadata().map_err(local)?.len();
        let map = if len > 0 {
            // Safety: the mapping is read-only and outlives every borrow of
            // its bytes because they are only handed out via &self.
            Some(unsafe { Mmap::map(&file) }.map_err(local)?)
        } else {
            None
        };

        let mapped = Arc::new(MappedFile {
            path: path.to_path_buf(),
            len,
            map,
        });
        files.insert(path.to_path_buf(), Arc::downgrade(&mapped));
        Ok(mapped)
    }

    /// Size of the file at mapping time.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// `true` for zero-length files, which have no mapping at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The mapped contents; empty for zero-length files.
    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        let mut files = OPEN_FILES.lock().expect("mapped file cache mutex poisoned");
        // Another thread may have replaced the expired entry with a fresh
        // mapping between our strong count hitting zero and this lock being
        // taken. Only erase the slot when it is really dead.
        if let Some(weak) = files.get(&self.path) {
            if weak.strong_count() == 0 {
                files.remove(&self.path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn concurrent_opens_share_one_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.bin");
        std::fs::File::create(&path).unwrap().write_all(b"payload").unwrap();

        let a = MappedFile::open(&path).unwrap();
        let b = MappedFile::open(&path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.bytes(), b"payload");
        assert_eq!(a.len(), 7);
    }

    #[test]
    fn cache_slot_is_released_with_the_last_holder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short-lived.bin");
        std::fs::File::create(&path).unwrap().write_all(b"x").unwrap();

        let first = MappedFile::open(&path).unwrap();
        let weak = Arc::downgrade(&first);
        drop(first);
        assert!(weak.upgrade().is_none());

        // A later open produces a fresh mapping rather than a stale slot.
        let second = MappedFile::open(&path).unwrap();
        assert_eq!(second.bytes(), b"x");
    }

    #[test]
    fn zero_length_files_map_to_empty_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::File::create(&path).unwrap();

        let mapped = MappedFile::open(&path).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(mapped.bytes(), b"");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(MappedFile::open(Path::new("/no/such/file")).is_err());
    }

    #[test]
    fn overwrite_does_not_corrupt_live_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replace.bin");
        std::fs::File::create(&path).unwrap().write_all(b"old bytes").unwrap();

        let mapped = MappedFile::open(&path).unwrap();
        // Replace the file contents on disk via rename, the way an upload
        // would; the reader keeps the original bytes.
        let tmp = dir.path().join("new.bin");
        std::fs::File::create(&tmp).unwrap().write_all(b"new").unwrap();
        std::fs::rename(&tmp, &path).unwrap();

        assert_eq!(mapped.bytes(), b"old bytes");
    }
}
