// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`BlobStore`] over a local directory.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<container>/<uuid>.blob       raw content
//! <root>/<container>/<uuid>.meta.json  BlobMeta sidecar
//! ```
//!
//! Blob ids are `<container>/<uuid>`. Writers claim `<container>/.lock`
//! before checking names or revisions, so the check and the write are atomic
//! across every process sharing the root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use quire_config::model::StorageConfig;
use quire_core::{BlobId, BlobRef, BlobStore, ContainerId, QuireError};

use crate::lock::ContainerLock;
use crate::meta::BlobMeta;

/// Name of the container returned by [`BlobStore::root_container_id`].
pub const ROOT_CONTAINER: &str = "root";

const BLOB_SUFFIX: &str = ".blob";
const META_SUFFIX: &str = ".meta.json";

/// Directory-backed blob store.
///
/// Writes are serialized per container by a lock file, so the duplicate-name
/// check on create and the revision check on update cannot interleave with a
/// write from another store instance or another process. The in-process
/// mutex keeps tasks of one store from spinning on that file.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.root_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &ContainerId) -> Result<PathBuf, QuireError> {
        check_component(&container.0)?;
        Ok(self.root.join(&container.0))
    }

    /// Content and metadata paths for `id`.
    fn paths(&self, id: &BlobId) -> Result<(PathBuf, PathBuf), QuireError> {
        let Some((container, stem)) = id.0.split_once('/') else {
            return Err(QuireError::BlobNotFound {
                blob_id: id.0.clone(),
            });
        };
        check_component(container)?;
        check_component(stem)?;
        let dir = self.root.join(container);
        Ok((
            dir.join(format!("{stem}{BLOB_SUFFIX}")),
            dir.join(format!("{stem}{META_SUFFIX}")),
        ))
    }
}

/// Reject ids that would escape the store root.
fn check_component(part: &str) -> Result<(), QuireError> {
    if part.is_empty() || part == "." || part == ".." || part.contains(['/', '\\']) {
        return Err(QuireError::Internal(format!(
            "invalid blob path component: {part:?}"
        )));
    }
    Ok(())
}

fn container_of(path: &Path) -> Result<&Path, QuireError> {
    path.parent()
        .ok_or_else(|| QuireError::Internal(format!("{} has no parent", path.display())))
}

async fn read_meta(path: &Path) -> Result<Option<BlobMeta>, QuireError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(QuireError::storage),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(QuireError::storage(e)),
    }
}

/// Write `bytes` to a sibling temp file, sync it, then rename over `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), QuireError> {
    let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));

    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(QuireError::storage(e));
    }
    Ok(())
}

async fn write_blob(
    content_path: &Path,
    meta_path: &Path,
    content: &[u8],
    meta: &BlobMeta,
) -> Result<(), QuireError> {
    let meta_bytes = serde_json::to_vec_pretty(meta).map_err(QuireError::storage)?;
    write_atomic(content_path, content).await?;
    write_atomic(meta_path, &meta_bytes).await
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn find_named_blob(
        &self,
        name: &str,
        container: &ContainerId,
    ) -> Result<Option<BlobRef>, QuireError> {
        let dir = self.container_dir(container)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(QuireError::storage(e)),
        };

        while let Some(entry) = entries.next_entry().await.map_err(QuireError::storage)? {
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(META_SUFFIX)) else {
                continue;
            };
            let Some(meta) = read_meta(&entry.path()).await? else {
                continue;
            };
            if meta.name == name {
                return Ok(Some(BlobRef {
                    id: BlobId(format!("{}/{stem}", container.0)),
                    name: meta.name,
                    revision: meta.revision,
                }));
            }
        }
        Ok(None)
    }

    async fn create_blob(
        &self,
        name: &str,
        content: &[u8],
        mime_type: &str,
        container: &ContainerId,
    ) -> Result<BlobRef, QuireError> {
        let dir = self.container_dir(container)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(QuireError::storage)?;

        let _guard = self.write_lock.lock().await;
        let _lock = ContainerLock::acquire(&dir).await?;

        if let Some(existing) = self.find_named_blob(name, container).await? {
            return Err(QuireError::Conflict {
                blob_id: existing.id.0,
            });
        }

        let id = BlobId(format!("{}/{}", container.0, Uuid::new_v4().simple()));
        let (content_path, meta_path) = self.paths(&id)?;
        let meta = BlobMeta::new(name, mime_type, content);
        write_blob(&content_path, &meta_path, content, &meta).await?;

        debug!(blob_id = %id, revision = %meta.revision, "blob created");
        Ok(BlobRef {
            id,
            name: meta.name,
            revision: meta.revision,
        })
    }

    async fn update_blob(
        &self,
        id: &BlobId,
        content: &[u8],
        mime_type: &str,
        expected_revision: Option<&str>,
    ) -> Result<BlobRef, QuireError> {
        let (content_path, meta_path) = self.paths(id)?;
        let dir = container_of(&content_path)?;
        if !tokio::fs::try_exists(dir).await.map_err(QuireError::storage)? {
            return Err(QuireError::BlobNotFound {
                blob_id: id.0.clone(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let _lock = ContainerLock::acquire(dir).await?;

        let current = read_meta(&meta_path)
            .await?
            .ok_or_else(|| QuireError::BlobNotFound {
                blob_id: id.0.clone(),
            })?;

        if let Some(expected) = expected_revision {
            if current.revision != expected {
                return Err(QuireError::Conflict {
                    blob_id: id.0.clone(),
                });
            }
        }

        let meta = current.next(mime_type, content);
        write_blob(&content_path, &meta_path, content, &meta).await?;

        debug!(blob_id = %id, revision = %meta.revision, "blob updated");
        Ok(BlobRef {
            id: id.clone(),
            name: meta.name,
            revision: meta.revision,
        })
    }

    async fn read_blob(&self, id: &BlobId) -> Result<Vec<u8>, QuireError> {
        let (content_path, _) = self.paths(id)?;
        match tokio::fs::read(&content_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(QuireError::BlobNotFound {
                blob_id: id.0.clone(),
            }),
            Err(e) => Err(QuireError::storage(e)),
        }
    }

    async fn root_container_id(&self) -> Result<ContainerId, QuireError> {
        tokio::fs::create_dir_all(self.root.join(ROOT_CONTAINER))
            .await
            .map_err(QuireError::storage)?;
        Ok(ContainerId(ROOT_CONTAINER.to_string()))
    }
}
