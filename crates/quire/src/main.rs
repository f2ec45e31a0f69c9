// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quire - password-protected envelope encryption for notes and attachments.
//!
//! This is the binary entry point.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use quire_config::QuireConfig;
use quire_storage::FsBlobStore;
use quire_vault::prompt::{get_new_vault_password_with_confirm, get_vault_password};
use quire_vault::{VaultManager, VaultParams};
use tracing::debug;

use crate::commands::CliError;

/// Quire - password-protected envelope encryption.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show whether a vault exists.
    Status {
        /// Output JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Create the vault and bind it to an identity token.
    Init {
        #[arg(long)]
        identity: String,
    },
    /// Check the vault password.
    Unlock,
    /// Change the vault password.
    Passwd {
        #[arg(long)]
        identity: String,
    },
    /// Encrypt a file into the blob format.
    Encrypt { input: PathBuf, output: PathBuf },
    /// Decrypt a file produced by `encrypt`.
    Decrypt {
        input: PathBuf,
        output: PathBuf,
        /// Refuse to write output unless the plaintext has this hash.
        #[arg(long)]
        expect_hash: Option<String>,
    },
    /// Encrypt a short text into `iv:ciphertext` form.
    EncryptText { text: String },
    /// Decrypt a string produced by `encrypt-text`.
    DecryptText { ciphertext: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => quire_config::load_and_validate_path(path),
        None => quire_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            quire_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let Some(command) = cli.command else {
        println!("quire: use --help for available commands");
        return;
    };

    let store = Arc::new(FsBlobStore::from_config(&config.storage));
    let vault = VaultManager::new(store, VaultParams::from(&config.vault));

    if let Err(e) = run(command, &vault, &config).await {
        debug!(error = %e, "command failed");
        eprintln!("quire: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Commands, vault: &VaultManager, config: &QuireConfig) -> Result<(), CliError> {
    match command {
        Commands::Status { json } => {
            let status = commands::run_status(vault, config).await?;
            if json {
                let out = serde_json::to_string_pretty(&status)
                    .map_err(|e| CliError::Output(e.to_string()))?;
                println!("{out}");
            } else {
                println!("vault: {}", status.status);
                println!("record: {}", status.record_name);
                println!("storage: {}", status.storage_root);
            }
        }
        Commands::Init { identity } => {
            let password = get_new_vault_password_with_confirm()?;
            commands::run_init(vault, &password, &identity).await?;
            println!("Vault created.");
        }
        Commands::Unlock => {
            let password = get_vault_password()?;
            commands::run_unlock(vault, &password).await?;
            println!("Password accepted.");
        }
        Commands::Passwd { identity } => {
            let current = get_vault_password()?;
            let new = get_new_vault_password_with_confirm()?;
            commands::run_passwd(vault, &current, &new, &identity).await?;
            println!("Password changed.");
        }
        Commands::Encrypt { input, output } => {
            let password = get_vault_password()?;
            let hash = commands::run_encrypt_file(vault, &password, &input, &output).await?;
            println!("{hash}");
        }
        Commands::Decrypt {
            input,
            output,
            expect_hash,
        } => {
            let password = get_vault_password()?;
            commands::run_decrypt_file(vault, &password, &input, &output, expect_hash.as_deref())
                .await?;
        }
        Commands::EncryptText { text } => {
            let password = get_vault_password()?;
            println!("{}", commands::run_encrypt_text(vault, &password, &text).await?);
        }
        Commands::DecryptText { ciphertext } => {
            let password = get_vault_password()?;
            println!("{}", commands::run_decrypt_text(vault, &password, &ciphertext).await?);
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quire={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
