// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. Prompting and printing stay in `main`.

use std::path::{Path, PathBuf};

use quire_config::QuireConfig;
use quire_core::QuireError;
use quire_vault::VaultManager;
use quire_vault::hash::{hash_content, parse_content_hash, verify_hash};
use secrecy::SecretString;
use serde::Serialize;

/// Errors surfaced by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Vault(#[from] QuireError),

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("decrypted content does not match the expected hash")]
    HashMismatch,

    #[error("invalid expected hash {value:?}: use sha256:<64 hex digits>")]
    InvalidHash { value: String },

    #[error("failed to format output: {0}")]
    Output(String),
}

impl CliError {
    /// Message printed to the terminal on failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Vault(e) => e.user_message().to_string(),
            Self::Io { .. } | Self::HashMismatch | Self::InvalidHash { .. } => self.to_string(),
            Self::Output(_) => "An internal error occurred.".to_string(),
        }
    }
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub record_name: String,
    pub storage_root: String,
}

pub async fn run_status(
    vault: &VaultManager,
    config: &QuireConfig,
) -> Result<StatusResponse, CliError> {
    let status = vault.status().await?;
    Ok(StatusResponse {
        status: status.to_string(),
        record_name: config.vault.record_name.clone(),
        storage_root: config.storage.root_dir.clone(),
    })
}

pub async fn run_init(
    vault: &VaultManager,
    password: &SecretString,
    identity: &str,
) -> Result<(), CliError> {
    vault.setup(password, identity).await?;
    Ok(())
}

pub async fn run_unlock(vault: &VaultManager, password: &SecretString) -> Result<(), CliError> {
    vault.unlock(password).await?;
    Ok(())
}

pub async fn run_passwd(
    vault: &VaultManager,
    current: &SecretString,
    new: &SecretString,
    identity: &str,
) -> Result<(), CliError> {
    vault.change_password(current, new, identity).await?;
    vault.lock();
    Ok(())
}

/// Encrypt `input` into `output`. Returns the plaintext's content hash.
pub async fn run_encrypt_file(
    vault: &VaultManager,
    password: &SecretString,
    input: &Path,
    output: &Path,
) -> Result<String, CliError> {
    let plaintext = read_file(input).await?;
    vault.unlock(password).await?;
    let sealed = vault.encrypt(&plaintext);
    vault.lock();
    write_file(output, &sealed?).await?;
    Ok(hash_content(&plaintext))
}

/// Decrypt `input` into `output`, optionally checking the plaintext hash
/// before anything is written. A malformed `expect_hash` is rejected before
/// the vault is unlocked.
pub async fn run_decrypt_file(
    vault: &VaultManager,
    password: &SecretString,
    input: &Path,
    output: &Path,
    expect_hash: Option<&str>,
) -> Result<(), CliError> {
    if let Some(expected) = expect_hash {
        parse_content_hash(expected).map_err(|_| CliError::InvalidHash {
            value: expected.to_string(),
        })?;
    }
    let blob = read_file(input).await?;
    vault.unlock(password).await?;
    let opened = vault.decrypt(&blob);
    vault.lock();
    let plaintext = opened?;

    if let Some(expected) = expect_hash {
        if !verify_hash(&plaintext, expected) {
            return Err(CliError::HashMismatch);
        }
    }
    write_file(output, &plaintext).await
}

pub async fn run_encrypt_text(
    vault: &VaultManager,
    password: &SecretString,
    text: &str,
) -> Result<String, CliError> {
    vault.unlock(password).await?;
    let sealed = vault.encrypt_string(text);
    vault.lock();
    Ok(sealed?)
}

pub async fn run_decrypt_text(
    vault: &VaultManager,
    password: &SecretString,
    ciphertext: &str,
) -> Result<String, CliError> {
    vault.unlock(password).await?;
    let opened = vault.decrypt_string(ciphertext);
    vault.lock();
    Ok(opened?)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path).await.map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}
