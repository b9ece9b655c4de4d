//! Blob store backends.
//!
//! Everything the log touches goes through the [`BlobStore`] trait: a
//! key-addressed object store with per-key last-write-wins `put` and no
//! locking or transactional guarantees. [`MemoryStore`] backs tests and
//! embedded use; [`FsStore`] maps a bucket onto a local directory.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::{BlobError, BlobResult};

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read an object. Returns [`BlobError::NotFound`] if the key has no object.
    async fn get(&self, key: &str) -> BlobResult<Bytes>;

    /// Write an object, overwriting any previous value under the key.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> BlobResult<()>;
}

/// In-memory store keyed by object name.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

struct StoredObject {
    data: Bytes,
    content_type: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded for `key`, if the object exists.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let objects = self.objects.read().await;
        objects.get(key).map(|obj| obj.content_type.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|obj| obj.data.clone())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> BlobResult<()> {
        let mut objects = self.objects.write().await;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

/// Filesystem-backed store: one file per key under a root directory.
///
/// Keys may contain `/` separators, which become subdirectories. The
/// content type is accepted for interface parity but not persisted.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, key: &str) -> BlobResult<PathBuf> {
        if key.is_empty() || Path::new(key).components().any(|c| c.as_os_str() == "..") {
            return Err(BlobError::Backend(format!("invalid object key: {key:?}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        let path = self.object_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(err) => Err(BlobError::Io {
                key: key.to_string(),
                source: err,
            }),
        }
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> BlobResult<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|err| BlobError::Io {
                key: key.to_string(),
                source: err,
            })?;
        }
        fs::write(&path, &data).await.map_err(|err| BlobError::Io {
            key: key.to_string(),
            source: err,
        })
    }
}
