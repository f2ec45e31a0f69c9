// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{MIN_KDF_ITERATIONS, QuireConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &QuireConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` must be one of: {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.root_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.root_dir must not be empty".to_string(),
        });
    }

    if config.vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                config.vault.kdf_iterations
            ),
        });
    }

    let name = config.vault.record_name.trim();
    if name.is_empty() || name.contains(['/', '\\']) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.record_name `{}` must be a non-empty name without path separators",
                config.vault.record_name
            ),
        });
    }

    if config.vault.record_mime.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.record_mime must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&QuireConfig::default()).is_ok());
    }

    #[test]
    fn low_iteration_count_fails_validation() {
        let mut config = QuireConfig::default();
        config.vault.kdf_iterations = 10_000;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "kdf_iterations"));
    }

    #[test]
    fn higher_iteration_count_is_accepted() {
        let mut config = QuireConfig::default();
        config.vault.kdf_iterations = 600_000;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn record_name_with_separator_fails() {
        let mut config = QuireConfig::default();
        config.vault.record_name = "../vault.enc".to_string();
        assert!(has_message(&validate_config(&config).unwrap_err(), "record_name"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = QuireConfig::default();
        config.logging.level = "loud".to_string();
        config.storage.root_dir = " ".to_string();
        config.vault.kdf_iterations = 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
