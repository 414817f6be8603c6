//! Shared Engine
//!
//! A cloneable handle that serializes every operation on one engine.
//!
//! `StorageEngine` itself has no internal locking. `SharedEngine` puts the
//! whole engine behind a single `parking_lot::Mutex` and takes it exactly
//! once per operation, so each call stays atomic with respect to the others.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::{FileInfo, StorageEngine};
use crate::error::Result;

/// Thread-safe handle to a `StorageEngine`
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<StorageEngine>>,
}

impl SharedEngine {
    /// Build a new empty engine behind the lock
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::from_engine(StorageEngine::new(config)?))
    }

    pub fn from_engine(engine: StorageEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with shared access under the lock
    pub fn with<T>(&self, f: impl FnOnce(&StorageEngine) -> T) -> T {
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive access under the lock
    ///
    /// Several engine calls inside one closure form one atomic unit.
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut StorageEngine) -> T) -> T {
        f(&mut self.inner.lock())
    }

    // =========================================================================
    // Forwarding Operations (one lock acquisition each)
    // =========================================================================

    pub fn create(&self, name: &str, size: usize) -> Result<()> {
        self.inner.lock().create(name, size)
    }

    pub fn write(&self, name: &str, offset: usize, data: &[u8]) -> Result<()> {
        self.inner.lock().write(name, offset, data)
    }

    /// Copy of the requested bytes (the lock is released on return)
    pub fn read(&self, name: &str, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.inner.lock().read(name, offset, len).map(<[u8]>::to_vec)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.inner.lock().delete(name)
    }

    pub fn list(&self) -> Vec<FileInfo> {
        self.inner.lock().list()
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        self.inner.lock().save()
    }

    pub fn restore(&self, bytes: &[u8]) -> Result<()> {
        self.inner.lock().restore(bytes)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.inner.lock().save_to_path(path)
    }

    pub fn file_count(&self) -> usize {
        self.inner.lock().file_count()
    }

    /// Take the engine back out if this is the last handle
    pub fn into_inner(self) -> std::result::Result<StorageEngine, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
