// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicit parameters handed to the vault manager.

use quire_config::model::VaultConfig;

/// Key-derivation and record-location parameters for one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultParams {
    /// PBKDF2-HMAC-SHA256 iterations used when wrapping a new record.
    /// Unlock always uses the count stored in the record.
    pub kdf_iterations: u32,
    /// Blob name of the record inside the root container.
    pub record_name: String,
    /// MIME type the record is written with.
    pub record_mime: String,
}

impl From<&VaultConfig> for VaultParams {
    fn from(config: &VaultConfig) -> Self {
        Self {
            kdf_iterations: config.kdf_iterations,
            record_name: config.record_name.clone(),
            record_mime: config.record_mime.clone(),
        }
    }
}

impl Default for VaultParams {
    fn default() -> Self {
        Self::from(&VaultConfig::default())
    }
}
