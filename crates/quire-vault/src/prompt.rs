// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password acquisition via TTY prompt or environment variables.

use quire_core::QuireError;
use secrecy::SecretString;

/// Environment variable holding the current vault password.
pub const VAULT_PASSWORD_ENV: &str = "QUIRE_VAULT_PASSWORD";

/// Environment variable holding the new password for `passwd`/`init`.
pub const NEW_VAULT_PASSWORD_ENV: &str = "QUIRE_VAULT_NEW_PASSWORD";

/// Get the current vault password.
///
/// Priority:
/// 1. `QUIRE_VAULT_PASSWORD` environment variable (scripts, CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_vault_password() -> Result<SecretString, QuireError> {
    if let Some(password) = from_env(VAULT_PASSWORD_ENV) {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let password = prompt("Vault password: ")?;
        return non_empty(password);
    }

    Err(no_password(VAULT_PASSWORD_ENV))
}

/// Get a new vault password, prompting twice on a terminal.
///
/// The environment variable needs no confirmation.
pub fn get_new_vault_password_with_confirm() -> Result<SecretString, QuireError> {
    if let Some(password) = from_env(NEW_VAULT_PASSWORD_ENV) {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = prompt("New vault password: ")?;
        let second = prompt("Confirm vault password: ")?;
        if first != second {
            return Err(QuireError::Config("passwords do not match".to_string()));
        }
        return non_empty(first);
    }

    Err(no_password(NEW_VAULT_PASSWORD_ENV))
}

fn from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

fn prompt(label: &str) -> Result<String, QuireError> {
    eprint!("{label}");
    rpassword::read_password()
        .map_err(|e| QuireError::Internal(format!("failed to read password: {e}")))
}

fn non_empty(password: String) -> Result<SecretString, QuireError> {
    if password.is_empty() {
        return Err(QuireError::Config("empty password not allowed".to_string()));
    }
    Ok(SecretString::from(password))
}

fn no_password(var: &str) -> QuireError {
    QuireError::Config(format!(
        "No password provided. Set {var} or run interactively."
    ))
}
