//! Path Registry
//!
//! Maps canonical paths to handles so that every spelling of a path resolves
//! to the same [`FileHandle`]. A registry is an explicitly owned object: build
//! one at startup and share it (tests build a fresh one each). Entries are never
//! evicted; dropping the registry and every handle clone stops the workers.

use crate::config::{FileqConfig, HandleConfig};
use crate::error::FileError;
use crate::fs::{FileSystem, TokioFileSystem};
use crate::handle::FileHandle;
use crate::path::{self, CanonicalPath};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Registry of handles keyed by canonical path.
pub struct Registry {
    handles: Mutex<HashMap<CanonicalPath, FileHandle>>,
    runtime: tokio::runtime::Handle,
    fs: Arc<dyn FileSystem>,
    config: HandleConfig,
}

impl Registry {
    /// Create a registry whose handle workers run on `runtime`.
    pub fn new(
        runtime: tokio::runtime::Handle,
        fs: Arc<dyn FileSystem>,
        config: HandleConfig,
    ) -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
            runtime,
            fs,
            config,
        }
    }

    /// Create a registry on the ambient tokio runtime with the default
    /// filesystem and configuration.
    pub fn current() -> Result<Self, FileError> {
        Self::with_handle_config(HandleConfig::default())
    }

    /// Create a registry on the ambient tokio runtime from loaded configuration.
    pub fn from_config(config: &FileqConfig) -> Result<Self, FileError> {
        Self::with_handle_config(config.handles.clone())
    }

    fn with_handle_config(config: HandleConfig) -> Result<Self, FileError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FileError::unexpected(format!("no tokio runtime available: {}", e)))?;
        Ok(Self::new(runtime, Arc::new(TokioFileSystem), config))
    }

    /// Get the handle for `path`, creating it on first use.
    ///
    /// Relative paths resolve against the current working directory; `.` and
    /// `..` segments are collapsed, so equivalent spellings share a handle.
    pub fn get_handle(&self, path: impl AsRef<Path>) -> Result<FileHandle, FileError> {
        let path = path.as_ref();
        let canonical = path::normalize(path).map_err(|e| {
            FileError::unexpected(format!("cannot resolve {}: {}", path.display(), e))
        })?;

        // Check and insert under one lock acquisition.
        let mut handles = self.handles.lock();
        let handle = handles.entry(canonical).or_insert_with_key(|key| {
            info!(path = %key.as_path().display(), "Created file handle");
            FileHandle::new(
                key.clone(),
                Arc::clone(&self.fs),
                self.config.clone(),
                &self.runtime,
            )
        });
        Ok(handle.clone())
    }

    /// Whether a handle has been created for `path`.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        match path::normalize(path.as_ref()) {
            Ok(canonical) => self.handles.lock().contains_key(&canonical),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Canonical paths of every handle, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .handles
            .lock()
            .keys()
            .map(|key| key.as_path().to_path_buf())
            .collect();
        paths.sort();
        paths
    }
}

/// Whether `value` is a [`FileHandle`].
///
/// Only needed where a value's type is erased; typed code already knows.
pub fn is_handle(value: &dyn Any) -> bool {
    value.is::<FileHandle>()
}
