use async_trait::async_trait;
use fileq::{
    FileHandle, FileSystem, HandleConfig, QueueState, QueueStats, Registry, TokioFileSystem,
};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Registry on the test's runtime with the real filesystem.
pub fn registry() -> Registry {
    Registry::current().unwrap()
}

pub fn registry_with(fs: Arc<dyn FileSystem>, config: HandleConfig) -> Registry {
    Registry::new(tokio::runtime::Handle::current(), fs, config)
}

/// Stats once the handle's worker is idle with nothing queued.
///
/// A settled `Pending` does not mean the stats are updated yet; the worker
/// records the outcome after delivering it.
pub async fn settled_stats(file: &FileHandle) -> QueueStats {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stats = file.stats();
            if stats.state == QueueState::Idle && stats.pending == 0 {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("handle queue never went idle")
}

/// Reads of any file named `slow.txt` block until the gate is opened.
pub struct GatedFileSystem {
    pub gate: Arc<Semaphore>,
    inner: TokioFileSystem,
}

impl GatedFileSystem {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            inner: TokioFileSystem,
        }
    }
}

#[async_trait]
impl FileSystem for GatedFileSystem {
    async fn make_directories(&self, path: &Path) -> io::Result<()> {
        self.inner.make_directories(path).await
    }

    async fn create_exclusive(&self, path: &Path) -> io::Result<()> {
        self.inner.create_exclusive(path).await
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        self.inner.unlink(path).await
    }

    async fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        if path.ends_with("slow.txt") {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|_| io::Error::other("gate closed"))?;
        }
        self.inner.read_all(path).await
    }

    async fn write_all(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(path, data).await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.inner.exists(path).await
    }
}

/// Reads fail with an error that carries no OS code; everything else works.
pub struct CodelessReadFailure {
    inner: TokioFileSystem,
}

impl CodelessReadFailure {
    pub fn new() -> Self {
        Self {
            inner: TokioFileSystem,
        }
    }
}

#[async_trait]
impl FileSystem for CodelessReadFailure {
    async fn make_directories(&self, path: &Path) -> io::Result<()> {
        self.inner.make_directories(path).await
    }

    async fn create_exclusive(&self, path: &Path) -> io::Result<()> {
        self.inner.create_exclusive(path).await
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        self.inner.unlink(path).await
    }

    async fn read_all(&self, _path: &Path) -> io::Result<Vec<u8>> {
        Err(io::Error::other("binding returned garbage"))
    }

    async fn write_all(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(path, data).await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.inner.exists(path).await
    }
}
