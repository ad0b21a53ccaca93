//! Durable key-value slots on disk
//!
//! Each slot is one file in the data directory:
//!
//! ```text
//! <data_dir>/
//!   todos.v1.json        # slot "todos.v1"
//!   todos.v1.json.lock   # flock guard for the slot
//! ```
//!
//! Values are opaque strings; callers decide the encoding.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::validate_slot_key;
use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

const SLOT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl Storage {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the slot `key`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SLOT_EXTENSION}"))
    }

    /// Raw slot bytes. `Ok(None)` when it was never written; I/O and lock
    /// failures are errors.
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        check_key(key)?;
        let value = lock::read_locked(self.slot_path(key), self.lock_timeout_ms)?;
        tracing::debug!(key, bytes = value.as_ref().map_or(0, Vec::len), "read slot");
        Ok(value)
    }

    /// Read a slot as text. `Ok(None)` when it was never written.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self.get_raw(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| Error::OperationFailed(format!("slot {key} is not valid UTF-8"))),
            None => Ok(None),
        }
    }

    /// Replace a slot's value atomically.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        check_key(key)?;
        let path = self.slot_path(key);
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)?;
        tracing::debug!(key, bytes = value.len(), "wrote slot");
        Ok(())
    }

    /// Delete a slot; returns whether it existed.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        check_key(key)?;
        let path = self.slot_path(key);
        let _lock = lock::FileLock::acquire(lock::lock_path_for(&path), self.lock_timeout_ms)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

fn check_key(key: &str) -> Result<()> {
    validate_slot_key(key).map_err(Error::InvalidArgument)
}
