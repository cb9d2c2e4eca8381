//! File Handle
//!
//! The public object for one canonical path. Every operation enqueues a work
//! item on the handle's [`SerialQueue`] and returns a [`Pending`] right away;
//! items settle strictly in submission order, one at a time.

use crate::config::HandleConfig;
use crate::encoding::{Contents, Encoding};
use crate::error::{ErrorCode, FileError};
use crate::fs::FileSystem;
use crate::path::{parent_directory, CanonicalPath};
use crate::queue::{Pending, QueueStats, SerialQueue};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

struct HandleInner {
    path: CanonicalPath,
    fs: Arc<dyn FileSystem>,
    config: HandleConfig,
    queue: SerialQueue,
}

/// Serialized access to one file.
///
/// Obtained from [`crate::Registry::get_handle`]. Clones refer to the same
/// handle and share its queue; equality is identity.
#[derive(Clone)]
pub struct FileHandle {
    inner: Arc<HandleInner>,
}

impl FileHandle {
    pub(crate) fn new(
        path: CanonicalPath,
        fs: Arc<dyn FileSystem>,
        config: HandleConfig,
        runtime: &tokio::runtime::Handle,
    ) -> Self {
        let queue = SerialQueue::spawn(runtime, path.as_path().to_path_buf());
        Self {
            inner: Arc::new(HandleInner {
                path,
                fs,
                config,
                queue,
            }),
        }
    }

    /// The canonical path this handle serializes.
    pub fn path(&self) -> &Path {
        self.inner.path.as_path()
    }

    /// Whether `self` and `other` are the same handle.
    pub fn ptr_eq(&self, other: &FileHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn stats(&self) -> QueueStats {
        self.inner.queue.stats()
    }

    /// Create the file, and its parent directories unless disabled.
    ///
    /// An existing file is not an error.
    pub fn create(&self) -> Pending<()> {
        let fs = Arc::clone(&self.inner.fs);
        let path = self.owned_path();
        let create_parents = self.inner.config.create_parents;
        self.inner.queue.submit("create", async move {
            if create_parents {
                if let Some(parent) = parent_directory(&path) {
                    fs.make_directories(parent)
                        .await
                        .map_err(|e| classify(e, parent, "create"))?;
                }
            }
            match fs.create_exclusive(&path).await {
                Ok(()) => Ok(()),
                Err(e) => tolerate(e, &path, "create", &ErrorCode::ALREADY_EXISTS),
            }
        })
    }

    /// Remove the file. A missing file is not an error.
    pub fn delete(&self) -> Pending<()> {
        let fs = Arc::clone(&self.inner.fs);
        let path = self.owned_path();
        self.inner.queue.submit("delete", async move {
            match fs.unlink(&path).await {
                Ok(()) => Ok(()),
                Err(e) => tolerate(e, &path, "delete", &ErrorCode::NOT_FOUND),
            }
        })
    }

    /// Read the whole file as text in the handle's default encoding.
    ///
    /// A `Binary` default is read as UTF-8 here; use [`FileHandle::read_with`]
    /// for raw bytes.
    pub fn read(&self) -> Pending<String> {
        let encoding = match self.inner.config.default_encoding {
            Encoding::Binary => Encoding::Utf8,
            text => text,
        };
        let fs = Arc::clone(&self.inner.fs);
        let path = self.owned_path();
        self.inner.queue.submit("read", async move {
            let bytes = fs
                .read_all(&path)
                .await
                .map_err(|e| classify(e, &path, "read"))?;
            match Contents::decode(bytes, encoding) {
                Contents::Text(text) => Ok(text),
                Contents::Bytes(_) => Err(FileError::unexpected("text read produced bytes")),
            }
        })
    }

    /// Read the whole file with an explicit encoding.
    pub fn read_with(&self, encoding: Encoding) -> Pending<Contents> {
        let fs = Arc::clone(&self.inner.fs);
        let path = self.owned_path();
        self.inner.queue.submit("read", async move {
            let bytes = fs
                .read_all(&path)
                .await
                .map_err(|e| classify(e, &path, "read"))?;
            Ok(Contents::decode(bytes, encoding))
        })
    }

    /// Replace the file's contents with `data` in the default encoding.
    pub fn write(&self, data: impl Into<Contents>) -> Pending<()> {
        self.write_with(data, self.inner.config.default_encoding)
    }

    /// Replace the file's contents, encoding text payloads with `encoding`.
    pub fn write_with(&self, data: impl Into<Contents>, encoding: Encoding) -> Pending<()> {
        let bytes = data.into().encode(encoding);
        let fs = Arc::clone(&self.inner.fs);
        let path = self.owned_path();
        self.inner.queue.submit("write", async move {
            fs.write_all(&path, &bytes)
                .await
                .map_err(|e| classify(e, &path, "write"))
        })
    }

    /// Whether the file exists, as of this item's turn in the queue.
    pub fn exists(&self) -> Pending<bool> {
        let fs = Arc::clone(&self.inner.fs);
        let path = self.owned_path();
        self.inner.queue.submit("exists", async move {
            fs.exists(&path)
                .await
                .map_err(|e| classify(e, &path, "exists"))
        })
    }

    /// Settles once every operation submitted before it has settled.
    pub fn flush(&self) -> Pending<()> {
        self.inner.queue.submit("flush", async { Ok(()) })
    }

    fn owned_path(&self) -> PathBuf {
        self.inner.path.as_path().to_path_buf()
    }
}

impl PartialEq for FileHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for FileHandle {}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

/// Classify a failed filesystem call and log it.
fn classify(err: io::Error, path: &Path, op: &'static str) -> FileError {
    let classified = FileError::from_io(err, path);
    match &classified {
        FileError::Fs { code, .. } => {
            warn!(path = %path.display(), op, code = %code, "Filesystem operation failed");
        }
        FileError::Unexpected { reason } => {
            error!(path = %path.display(), op, reason = %reason, "Unexpected filesystem failure");
        }
    }
    classified
}

/// Like [`classify`], but `expected` resolves as success.
fn tolerate(
    err: io::Error,
    path: &Path,
    op: &'static str,
    expected: &ErrorCode,
) -> Result<(), FileError> {
    if ErrorCode::from_io(&err).as_ref() == Some(expected) {
        debug!(path = %path.display(), op, code = %expected, "Ignoring expected error");
        return Ok(());
    }
    Err(classify(err, path, op))
}
