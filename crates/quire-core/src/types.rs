// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the blob store trait and the vault.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier of a blob within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(pub String);

/// Opaque identifier of a container (folder) within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub String);

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a stored blob.
///
/// `revision` is an opaque etag that changes on every write; passing it back
/// to `update_blob` turns the write into a compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    pub id: BlobId,
    pub name: String,
    pub revision: String,
}

/// Lifecycle state of a vault as seen by one manager instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
pub enum VaultStatus {
    /// No vault record is persisted.
    NoVault,
    /// A record exists but no content key is held in memory.
    Locked,
    /// The content key is in memory; encrypt/decrypt are available.
    Unlocked,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn vault_status_display_round_trips() {
        for status in [VaultStatus::NoVault, VaultStatus::Locked, VaultStatus::Unlocked] {
            let parsed = VaultStatus::from_str(&status.to_string()).expect("should parse back");
            assert_eq!(status, parsed);
        }
        assert_eq!(VaultStatus::NoVault.to_string(), "no-vault");
    }

    #[test]
    fn blob_id_displays_inner_value() {
        assert_eq!(BlobId("abc".into()).to_string(), "abc");
        assert_eq!(ContainerId("root".into()).to_string(), "root");
    }
}
