//! Filesystem binding
//!
//! Raw I/O used by handles. Implementations return plain [`std::io::Error`]s;
//! classification into [`crate::FileError`] happens in the handle.

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Raw filesystem operations a handle's work items call into.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Create `path` and every missing ancestor. Succeeds if it already exists.
    async fn make_directories(&self, path: &Path) -> io::Result<()>;

    /// Create a new empty file, failing with `AlreadyExists` if `path` exists.
    ///
    /// The descriptor must be closed before returning.
    async fn create_exclusive(&self, path: &Path) -> io::Result<()>;

    /// Remove the file at `path`.
    async fn unlink(&self, path: &Path) -> io::Result<()>;

    /// Read the whole file.
    async fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the file's contents with `data`, creating it if needed.
    async fn write_all(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Whether anything exists at `path`.
    async fn exists(&self, path: &Path) -> io::Result<bool>;
}

/// [`FileSystem`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn make_directories(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn create_exclusive(&self, path: &Path) -> io::Result<()> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        drop(file);
        Ok(())
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write_all(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, data).await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
