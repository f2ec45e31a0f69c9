// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Quire vault.
//!
//! Holds the error taxonomy, the [`BlobStore`] collaborator trait, and the
//! small identifier types shared by the vault and the storage backends.

pub mod error;
pub mod traits;
pub mod types;

pub use error::QuireError;
pub use traits::BlobStore;
pub use types::{BlobId, BlobRef, ContainerId, VaultStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_store_is_object_safe() {
        fn _assert_dyn(_: &dyn BlobStore) {}
        fn _assert_arc(_: std::sync::Arc<dyn BlobStore>) {}
    }

    #[test]
    fn blob_ref_serializes() {
        let blob = BlobRef {
            id: BlobId("b-1".into()),
            name: "vault.enc".into(),
            revision: "r1".into(),
        };
        let json = serde_json::to_string(&blob).expect("should serialize");
        let parsed: BlobRef = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(blob, parsed);
    }
}
