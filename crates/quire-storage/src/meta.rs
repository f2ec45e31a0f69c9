// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata sidecar stored next to each blob.

use serde::{Deserialize, Serialize};

/// Contents of `<id>.meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    pub name: String,
    pub mime_type: String,
    /// Incremented on every write to the blob.
    pub generation: u64,
    pub revision: String,
}

impl BlobMeta {
    pub fn new(name: &str, mime_type: &str, content: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            generation: 1,
            revision: revision_for(1, content),
        }
    }

    /// Metadata after overwriting the blob with `content`.
    pub fn next(&self, mime_type: &str, content: &[u8]) -> Self {
        let generation = self.generation + 1;
        Self {
            name: self.name.clone(),
            mime_type: mime_type.to_string(),
            generation,
            revision: revision_for(generation, content),
        }
    }
}

/// `<generation>-<first 16 hex chars of sha256(content)>`.
///
/// The generation keeps the revision moving even when identical content is
/// written twice.
pub fn revision_for(generation: u64, content: &[u8]) -> String {
    let digest = ring::digest::digest(&ring::digest::SHA256, content);
    let hex = hex::encode(digest.as_ref());
    format!("{generation}-{}", &hex[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_changes_with_generation_and_content() {
        let first = BlobMeta::new("vault.enc", "application/json", b"{}");
        let same_bytes = first.next("application/json", b"{}");
        let other_bytes = first.next("application/json", b"[]");

        assert_eq!(first.generation, 1);
        assert_eq!(same_bytes.generation, 2);
        assert_ne!(first.revision, same_bytes.revision);
        assert_ne!(same_bytes.revision, other_bytes.revision);
        assert_eq!(same_bytes.name, "vault.enc");
    }

    #[test]
    fn revision_format() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(revision_for(3, b"abc"), "3-ba7816bf8f01cfea");
    }
}
