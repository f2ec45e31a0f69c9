// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob store trait for the opaque storage backend (cloud drive, local folder).

use async_trait::async_trait;

use crate::error::QuireError;
use crate::types::{BlobId, BlobRef, ContainerId};

/// Named-blob storage the vault persists its record into.
///
/// Implementations must write each blob atomically: a reader sees either the
/// previous complete content or the new complete content, never a mix.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Looks up a blob by name inside a container.
    async fn find_named_blob(
        &self,
        name: &str,
        container: &ContainerId,
    ) -> Result<Option<BlobRef>, QuireError>;

    /// Creates a new blob. Fails with [`QuireError::Conflict`] if a blob with
    /// the same name already exists in the container.
    async fn create_blob(
        &self,
        name: &str,
        content: &[u8],
        mime_type: &str,
        container: &ContainerId,
    ) -> Result<BlobRef, QuireError>;

    /// Overwrites a blob's content.
    ///
    /// When `expected_revision` is set and differs from the stored revision,
    /// nothing is written and [`QuireError::Conflict`] is returned.
    async fn update_blob(
        &self,
        id: &BlobId,
        content: &[u8],
        mime_type: &str,
        expected_revision: Option<&str>,
    ) -> Result<BlobRef, QuireError>;

    /// Reads a blob's raw content.
    async fn read_blob(&self, id: &BlobId) -> Result<Vec<u8>, QuireError>;

    /// Reads a blob and parses it as JSON.
    async fn read_blob_as_json(&self, id: &BlobId) -> Result<serde_json::Value, QuireError> {
        let bytes = self.read_blob(id).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// The container the vault record lives in.
    async fn root_container_id(&self) -> Result<ContainerId, QuireError>;
}
