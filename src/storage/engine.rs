//! Filesystem-Backed Storage Engine
//!
//! This module implements the persistence layer. Each entry is one
//! regular file inside a flat namespace directory: the file name is the
//! key, the file content is the value.
//!
//! ## Design Decisions
//!
//! 1. **Trait seam**: Consumers depend on the [`Storage`] trait, never on
//!    filesystem paths. The executor cannot construct a path at all.
//! 2. **Validated keys**: Every operation validates its key before the
//!    first filesystem call, so a key can never escape the namespace
//!    root (see [`key`](crate::storage::key)).
//! 3. **Truncate-then-write**: `put` fully replaces an entry in a single
//!    write. There is no transactional rollback; a write that fails
//!    midway leaves the entry in whatever state the filesystem left it.
//! 4. **Bounded reads**: `get` reads at most [`MAX_VALUE_LEN`] bytes.
//!    Longer file content (written out-of-band) is silently cut at the
//!    limit.
//!
//! Existence is determined by asking the filesystem directly; there is
//! no in-memory index to fall out of sync.

use crate::storage::key::{self, KeyError};
use crate::MAX_VALUE_LEN;
use bytes::Bytes;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during a storage operation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key failed validation and never reached the filesystem.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// An underlying I/O fault (permissions, no space, ...).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The persistence contract: map a validated key to a byte value.
///
/// Keys live in a single flat namespace. There is no listing operation
/// and no entry lifecycle beyond put, get, and delete.
pub trait Storage: Send + Sync + 'static {
    /// Creates the entry if absent, or fully replaces its value.
    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Returns the entry's value, or `None` if no entry exists.
    ///
    /// At most [`MAX_VALUE_LEN`] bytes are returned even if more was
    /// stored. An I/O fault is distinct from absence.
    fn get(&self, key: &str) -> StorageResult<Option<Bytes>>;

    /// Removes the entry.
    ///
    /// Removing an absent key is not an error: the operation is
    /// idempotent and succeeds whenever the key is valid.
    fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Storage engine that persists entries as files under a root directory.
///
/// # Example
///
/// ```
/// use filekv::storage::{FsStorage, Storage};
///
/// let dir = tempfile::tempdir().unwrap();
/// let storage = FsStorage::open(dir.path()).unwrap();
///
/// storage.put("name", b"Ariz").unwrap();
/// let value = storage.get("name").unwrap();
/// assert_eq!(value.as_deref(), Some(&b"Ariz"[..]));
///
/// storage.delete("name").unwrap();
/// assert_eq!(storage.get("name").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// The namespace root. All entry files live directly under it.
    root: PathBuf,
}

impl FsStorage {
    /// Opens a storage engine rooted at `root`, creating the directory
    /// if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The namespace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the key and resolves it to its entry file path.
    fn entry_path(&self, key: &str) -> Result<PathBuf, KeyError> {
        key::validate(key)?;
        Ok(self.root.join(key))
    }
}

impl Storage for FsStorage {
    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<Bytes>> {
        let path = self.entry_path(key)?;

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut content = Vec::with_capacity(MAX_VALUE_LEN);
        file.take(MAX_VALUE_LEN as u64).read_to_end(&mut content)?;
        Ok(Some(Bytes::from(content)))
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        // Absence of the entry satisfies the delete intent; removal
        // faults are swallowed and the operation still reports success.
        let _ = fs::remove_file(path);
        Ok(())
    }
}
