// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owned 256-bit symmetric key that is overwritten when dropped.

use quire_core::QuireError;
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// A 256-bit AES-GCM key, used both as the content key (DEK) and as the
/// password-derived wrapping key (KEK).
///
/// The bytes live in a [`Zeroizing`] buffer; dropping the key wipes them.
/// Debug output never shows the key.
pub struct SymmetricKey(Zeroizing<[u8; KEY_LEN]>);

impl SymmetricKey {
    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(key.as_mut());
        Self(key)
    }

    /// Import raw key bytes. The slice must be exactly [`KEY_LEN`] bytes.
    pub fn import(raw: &[u8]) -> Result<Self, QuireError> {
        if raw.len() != KEY_LEN {
            return Err(QuireError::Crypto(format!(
                "expected a {KEY_LEN}-byte key, got {} bytes",
                raw.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(raw);
        Ok(Self(key))
    }

    /// Raw key bytes, for wrapping under another key.
    pub fn export(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub(crate) fn from_zeroizing(bytes: Zeroizing<[u8; KEY_LEN]>) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}
