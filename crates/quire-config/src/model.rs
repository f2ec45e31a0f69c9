// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Quire vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Minimum PBKDF2-HMAC-SHA256 iteration count accepted anywhere.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Top-level Quire configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuireConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Blob storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Vault key-management settings.
    #[serde(default)]
    pub vault: VaultConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Local blob store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory acting as the drive root. Containers are sub-directories.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
        }
    }
}

fn default_root_dir() -> String {
    dirs::data_dir()
        .map(|d| d.join("quire").join("drive"))
        .unwrap_or_else(|| std::path::PathBuf::from("./quire-drive"))
        .display()
        .to_string()
}

/// Vault record and key-derivation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count for newly wrapped records
    /// (default: 100000). Existing records are unwrapped with the count they
    /// were written with.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Name of the blob holding the vault record.
    #[serde(default = "default_record_name")]
    pub record_name: String,

    /// MIME type the record is stored with.
    #[serde(default = "default_record_mime")]
    pub record_mime: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            record_name: default_record_name(),
            record_mime: default_record_mime(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    MIN_KDF_ITERATIONS
}

fn default_record_name() -> String {
    "vault.enc".to_string()
}

fn default_record_mime() -> String {
    "application/json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_defaults_match_record_format() {
        let vault = VaultConfig::default();
        assert_eq!(vault.kdf_iterations, 100_000);
        assert_eq!(vault.record_name, "vault.enc");
        assert_eq!(vault.record_mime, "application/json");
    }

    #[test]
    fn default_root_dir_is_not_empty() {
        assert!(!StorageConfig::default().root_dir.is_empty());
    }

    #[test]
    fn defaults_survive_a_toml_round_trip() {
        let text = toml::to_string(&QuireConfig::default()).unwrap();
        assert!(text.contains("[vault]"));
        let parsed: QuireConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.vault.kdf_iterations, MIN_KDF_ITERATIONS);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn unknown_vault_key_is_rejected() {
        let result: Result<QuireConfig, _> = toml::from_str("[vault]\nkdf_rounds = 5\n");
        assert!(result.is_err());
    }
}
