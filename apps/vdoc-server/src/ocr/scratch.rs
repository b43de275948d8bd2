//! Scratch storage for uploads awaiting OCR

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Where uploads are staged while the detector reads them
#[async_trait]
pub trait ScratchStore: Send + Sync {
    /// Write `data` under `file_name` and return its path
    async fn persist(&self, file_name: &str, data: &[u8]) -> io::Result<PathBuf>;

    /// Delete a previously persisted file
    async fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Files in a directory on local disk (the OS temp dir by default)
#[derive(Debug, Clone)]
pub struct TempDirStore {
    dir: PathBuf,
}

impl TempDirStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl Default for TempDirStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

#[async_trait]
impl ScratchStore for TempDirStore {
    async fn persist(&self, file_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

/// Unique, filesystem-safe staging name derived from the upload's name
pub fn staging_name(original: &str) -> String {
    let cleaned: String = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .take(64)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned = if cleaned.is_empty() { "upload" } else { cleaned };
    format!("vdoc-ocr-{}-{}", uuid::Uuid::new_v4(), cleaned)
}

/// Store that counts calls, for asserting cleanup behaviour
#[cfg(test)]
pub struct CountingStore {
    inner: TempDirStore,
    pub persisted: std::sync::atomic::AtomicUsize,
    pub removed: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl CountingStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            inner: TempDirStore::new(dir),
            persisted: Default::default(),
            removed: Default::default(),
        }
    }

    pub fn removed_count(&self) -> usize {
        self.removed.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn persisted_count(&self) -> usize {
        self.persisted.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ScratchStore for CountingStore {
    async fn persist(&self, file_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        self.persisted
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.inner.persist(file_name, data).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        self.removed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.inner.remove(path).await
    }
}
