// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./quire.toml` > `~/.config/quire/quire.toml` > `/etc/quire/quire.toml`
//! with environment variable overrides via `QUIRE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::QuireConfig;

/// `QUIRE_` variables that carry secrets for the CLI, not config keys.
pub const SECRET_ENV_KEYS: &[&str] = &["vault_password", "vault_new_password"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/quire/quire.toml` (system-wide)
/// 3. `~/.config/quire/quire.toml` (user XDG config)
/// 4. `./quire.toml` (local directory)
/// 5. `QUIRE_*` environment variables
pub fn load_config() -> Result<QuireConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<QuireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuireConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuireConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuireConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard hierarchy, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(QuireConfig::default()))
        .merge(Toml::file("/etc/quire/quire.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("quire/quire.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("quire.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `QUIRE_VAULT_KDF_ITERATIONS` must map to `vault.kdf_iterations`,
/// not `vault.kdf.iterations`.
fn env_provider() -> Env {
    Env::prefixed("QUIRE_")
        .filter(|key| !SECRET_ENV_KEYS.contains(&key.as_str()))
        .map(|key| {
            key.as_str()
                .replacen("logging_", "logging.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("vault_", "vault.", 1)
                .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_vault_iterations() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("QUIRE_VAULT_KDF_ITERATIONS", "250000");
            jail.set_env("QUIRE_STORAGE_ROOT_DIR", "/tmp/quire-drive");
            let config = Figment::new()
                .merge(Serialized::defaults(QuireConfig::default()))
                .merge(env_provider())
                .extract::<QuireConfig>()?;
            assert_eq!(config.vault.kdf_iterations, 250_000);
            assert_eq!(config.storage.root_dir, "/tmp/quire-drive");
            Ok(())
        });
    }

    #[test]
    fn password_env_vars_are_not_config_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("QUIRE_VAULT_PASSWORD", "hunter2");
            jail.set_env("QUIRE_VAULT_NEW_PASSWORD", "hunter3");
            let config = Figment::new()
                .merge(Serialized::defaults(QuireConfig::default()))
                .merge(env_provider())
                .extract::<QuireConfig>()?;
            assert_eq!(config.vault.record_name, "vault.enc");
            Ok(())
        });
    }

    #[test]
    fn file_values_are_read() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                "[vault]\nrecord_name = \"keys.json\"\n[logging]\nlevel = \"debug\"\n",
            )?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.vault.record_name, "keys.json");
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }
}
