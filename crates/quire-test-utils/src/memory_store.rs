// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory `BlobStore` for deterministic tests without a drive backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use quire_core::{BlobId, BlobRef, BlobStore, ContainerId, QuireError};

/// Name of the single container this store exposes as its root.
pub const ROOT_CONTAINER: &str = "root";

struct StoredBlob {
    name: String,
    container: ContainerId,
    content: Vec<u8>,
    mime_type: String,
    revision: u64,
}

impl StoredBlob {
    fn handle(&self, id: &str) -> BlobRef {
        BlobRef {
            id: BlobId(id.to_string()),
            name: self.name.clone(),
            revision: format!("r{}", self.revision),
        }
    }
}

#[derive(Default)]
struct Inner {
    blobs: HashMap<String, StoredBlob>,
    next_id: u64,
    writes: usize,
    failing_writes: usize,
    failing_reads: usize,
}

/// A blob store held entirely in memory.
///
/// Every create/update bumps the blob's revision, so optimistic-concurrency
/// behavior matches a real drive.
#[derive(Default)]
pub struct MemoryBlobStore {
    inner: Mutex<Inner>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful create/update calls.
    pub async fn write_count(&self) -> usize {
        self.inner.lock().await.writes
    }

    /// Number of blobs currently stored.
    pub async fn blob_count(&self) -> usize {
        self.inner.lock().await.blobs.len()
    }

    /// Make the next `n` create/update calls fail with a storage error.
    pub async fn fail_next_writes(&self, n: usize) {
        self.inner.lock().await.failing_writes = n;
    }

    /// Make the next `n` reads fail with a storage error.
    pub async fn fail_next_reads(&self, n: usize) {
        self.inner.lock().await.failing_reads = n;
    }

    /// Raw content of the root-container blob called `name`.
    pub async fn raw_content(&self, name: &str) -> Option<Vec<u8>> {
        let inner = self.inner.lock().await;
        inner
            .blobs
            .values()
            .find(|b| b.name == name && b.container.0 == ROOT_CONTAINER)
            .map(|b| b.content.clone())
    }

    /// MIME type of the root-container blob called `name`.
    pub async fn mime_type(&self, name: &str) -> Option<String> {
        let inner = self.inner.lock().await;
        inner
            .blobs
            .values()
            .find(|b| b.name == name && b.container.0 == ROOT_CONTAINER)
            .map(|b| b.mime_type.clone())
    }

    /// Overwrite a root-container blob behind the caller's back, as another
    /// client or an attacker would. Bumps the revision.
    pub async fn overwrite_raw(&self, name: &str, content: Vec<u8>) -> bool {
        let mut inner = self.inner.lock().await;
        match inner
            .blobs
            .values_mut()
            .find(|b| b.name == name && b.container.0 == ROOT_CONTAINER)
        {
            Some(blob) => {
                blob.content = content;
                blob.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Edit the JSON of a root-container blob in place.
    pub async fn edit_json<F>(&self, name: &str, edit: F) -> bool
    where
        F: FnOnce(&mut serde_json::Value),
    {
        let Some(raw) = self.raw_content(name).await else {
            return false;
        };
        let Ok(mut value) = serde_json::from_slice::<serde_json::Value>(&raw) else {
            return false;
        };
        edit(&mut value);
        match serde_json::to_vec(&value) {
            Ok(bytes) => self.overwrite_raw(name, bytes).await,
            Err(_) => false,
        }
    }
}

fn injected(what: &str) -> QuireError {
    QuireError::storage(std::io::Error::other(format!("injected {what} failure")))
}

impl Inner {
    fn take_write_failure(&mut self) -> Result<(), QuireError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(injected("write"));
        }
        Ok(())
    }

    fn take_read_failure(&mut self) -> Result<(), QuireError> {
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(injected("read"));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn find_named_blob(
        &self,
        name: &str,
        container: &ContainerId,
    ) -> Result<Option<BlobRef>, QuireError> {
        let mut inner = self.inner.lock().await;
        inner.take_read_failure()?;
        Ok(inner
            .blobs
            .iter()
            .find(|(_, b)| b.name == name && &b.container == container)
            .map(|(id, b)| b.handle(id)))
    }

    async fn create_blob(
        &self,
        name: &str,
        content: &[u8],
        mime_type: &str,
        container: &ContainerId,
    ) -> Result<BlobRef, QuireError> {
        let mut inner = self.inner.lock().await;
        inner.take_write_failure()?;

        if let Some((id, _)) = inner
            .blobs
            .iter()
            .find(|(_, b)| b.name == name && &b.container == container)
        {
            return Err(QuireError::Conflict {
                blob_id: id.clone(),
            });
        }

        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        let blob = StoredBlob {
            name: name.to_string(),
            container: container.clone(),
            content: content.to_vec(),
            mime_type: mime_type.to_string(),
            revision: 1,
        };
        let handle = blob.handle(&id);
        inner.blobs.insert(id, blob);
        inner.writes += 1;
        Ok(handle)
    }

    async fn update_blob(
        &self,
        id: &BlobId,
        content: &[u8],
        mime_type: &str,
        expected_revision: Option<&str>,
    ) -> Result<BlobRef, QuireError> {
        let mut inner = self.inner.lock().await;
        inner.take_write_failure()?;

        let blob = inner
            .blobs
            .get_mut(&id.0)
            .ok_or_else(|| QuireError::BlobNotFound {
                blob_id: id.0.clone(),
            })?;

        if let Some(expected) = expected_revision {
            if blob.handle(&id.0).revision != expected {
                return Err(QuireError::Conflict {
                    blob_id: id.0.clone(),
                });
            }
        }

        blob.content = content.to_vec();
        blob.mime_type = mime_type.to_string();
        blob.revision += 1;
        let handle = blob.handle(&id.0);
        inner.writes += 1;
        Ok(handle)
    }

    async fn read_blob(&self, id: &BlobId) -> Result<Vec<u8>, QuireError> {
        let mut inner = self.inner.lock().await;
        inner.take_read_failure()?;
        inner
            .blobs
            .get(&id.0)
            .map(|b| b.content.clone())
            .ok_or_else(|| QuireError::BlobNotFound {
                blob_id: id.0.clone(),
            })
    }

    async fn root_container_id(&self) -> Result<ContainerId, QuireError> {
        Ok(ContainerId(ROOT_CONTAINER.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> ContainerId {
        ContainerId(ROOT_CONTAINER.to_string())
    }

    #[tokio::test]
    async fn create_find_read_roundtrip() {
        let store = MemoryBlobStore::new();
        let created = store
            .create_blob("vault.enc", b"{}", "application/json", &root())
            .await
            .unwrap();
        let found = store.find_named_blob("vault.enc", &root()).await.unwrap();
        assert_eq!(found, Some(created.clone()));
        assert_eq!(store.read_blob(&created.id).await.unwrap(), b"{}");
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = MemoryBlobStore::new();
        store.create_blob("a", b"1", "text/plain", &root()).await.unwrap();
        let err = store.create_blob("a", b"2", "text/plain", &root()).await;
        assert!(matches!(err, Err(QuireError::Conflict { .. })));
        assert_eq!(store.blob_count().await, 1);
    }

    #[tokio::test]
    async fn stale_revision_is_rejected() {
        let store = MemoryBlobStore::new();
        let v1 = store.create_blob("a", b"1", "text/plain", &root()).await.unwrap();
        let v2 = store
            .update_blob(&v1.id, b"2", "text/plain", Some(&v1.revision))
            .await
            .unwrap();
        assert_ne!(v1.revision, v2.revision);

        let stale = store
            .update_blob(&v1.id, b"3", "text/plain", Some(&v1.revision))
            .await;
        assert!(matches!(stale, Err(QuireError::Conflict { .. })));
        assert_eq!(store.read_blob(&v1.id).await.unwrap(), b"2");
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let store = MemoryBlobStore::new();
        store.fail_next_writes(1).await;
        let err = store.create_blob("a", b"1", "text/plain", &root()).await;
        assert!(err.as_ref().is_err_and(QuireError::is_storage));
        assert!(store.create_blob("a", b"1", "text/plain", &root()).await.is_ok());
    }

    #[tokio::test]
    async fn read_blob_as_json_parses() {
        let store = MemoryBlobStore::new();
        let blob = store
            .create_blob("j", br#"{"version":1}"#, "application/json", &root())
            .await
            .unwrap();
        let value = store.read_blob_as_json(&blob.id).await.unwrap();
        assert_eq!(value["version"], 1);
    }
}
