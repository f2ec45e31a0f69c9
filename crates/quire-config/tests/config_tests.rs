// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Quire configuration system.

use quire_config::diagnostic::ConfigError;
use quire_config::model::QuireConfig;
use quire_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_quire_config() {
    let toml = r#"
[logging]
level = "debug"

[storage]
root_dir = "/tmp/quire-drive"

[vault]
kdf_iterations = 310000
record_name = "vault.json"
record_mime = "application/json"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.storage.root_dir, "/tmp/quire-drive");
    assert_eq!(config.vault.kdf_iterations, 310_000);
    assert_eq!(config.vault.record_name, "vault.json");
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    let defaults = QuireConfig::default();
    assert_eq!(config.vault.kdf_iterations, defaults.vault.kdf_iterations);
    assert_eq!(config.vault.record_name, "vault.enc");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn unknown_vault_key_gets_a_suggestion() {
    let toml = r#"
[vault]
kdf_iteratons = 200000
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "kdf_iteratons" && s == "kdf_iterations"
        )
    });
    assert!(found, "expected an UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_config_from_str("[telemetry]\nenabled = true\n").expect_err("should reject");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telemetry"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[vault]\nkdf_iterations = \"many\"\n")
        .expect_err("should reject string iterations");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("kdf_iterations"))),
        "got: {errors:?}"
    );
}

#[test]
fn weak_kdf_fails_validation() {
    let errors = load_and_validate_str("[vault]\nkdf_iterations = 1000\n")
        .expect_err("weak KDF must be rejected");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("kdf_iterations"))));
}

#[test]
fn salt_length_is_not_configurable() {
    let errors = load_and_validate_str("[vault]\nsalt_len = 32\n")
        .expect_err("the record format fixes the salt at 16 bytes");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "salt_len")),
        "got: {errors:?}"
    );
}
