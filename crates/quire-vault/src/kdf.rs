// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a password.
//!
//! Derives the 32-byte wrapping key (KEK). Deterministic for a given
//! password, salt, and iteration count.

use std::num::NonZeroU32;

use quire_core::QuireError;
use ring::pbkdf2;
use zeroize::Zeroizing;

use crate::crypto::random_bytes;
use crate::key::{KEY_LEN, SymmetricKey};

pub use quire_config::model::MIN_KDF_ITERATIONS;

/// Salt length written into every record.
pub const SALT_LEN: usize = 16;

/// Derive a 32-byte key from `password` and `salt`.
///
/// Rejects iteration counts below [`MIN_KDF_ITERATIONS`].
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<SymmetricKey, QuireError> {
    if iterations < MIN_KDF_ITERATIONS {
        return Err(QuireError::Crypto(format!(
            "PBKDF2 iteration count {iterations} is below the minimum of {MIN_KDF_ITERATIONS}"
        )));
    }
    let iterations = NonZeroU32::new(iterations)
        .ok_or_else(|| QuireError::Crypto("PBKDF2 iteration count must be non-zero".to_string()))?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        password,
        output.as_mut(),
    );

    Ok(SymmetricKey::from_zeroizing(output))
}

/// Generate a random salt of `len` bytes.
pub fn generate_salt(len: usize) -> Vec<u8> {
    random_bytes(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_produces_consistent_output() {
        let salt = [1u8; 16];
        let key1 = derive_key(b"test password", &salt, MIN_KDF_ITERATIONS).unwrap();
        let key2 = derive_key(b"test password", &salt, MIN_KDF_ITERATIONS).unwrap();
        assert_eq!(key1.export(), key2.export());
    }

    #[test]
    fn different_password_produces_different_output() {
        let salt = [2u8; 16];
        let key1 = derive_key(b"password one", &salt, MIN_KDF_ITERATIONS).unwrap();
        let key2 = derive_key(b"password two", &salt, MIN_KDF_ITERATIONS).unwrap();
        assert_ne!(key1.export(), key2.export());
    }

    #[test]
    fn different_salt_produces_different_output() {
        let key1 = derive_key(b"same", &[1u8; 16], MIN_KDF_ITERATIONS).unwrap();
        let key2 = derive_key(b"same", &[2u8; 16], MIN_KDF_ITERATIONS).unwrap();
        assert_ne!(key1.export(), key2.export());
    }

    #[test]
    fn matches_known_pbkdf2_vector() {
        // PBKDF2-HMAC-SHA256, P = "password", S = "salt", c = 100000, dkLen = 32.
        let key = derive_key(b"password", b"salt", 100_000).unwrap();
        assert_eq!(
            hex::encode(key.export()),
            "0394a2ede332c9a13eb82e9b24631604c31df978b4e2f0fbd2c549944f9d79a5"
        );
    }

    #[test]
    fn low_iteration_count_is_rejected() {
        let result = derive_key(b"pw", &[0u8; 16], 1000);
        assert!(matches!(result, Err(QuireError::Crypto(_))));
    }

    #[test]
    fn generate_salt_produces_random_values() {
        let salt1 = generate_salt(SALT_LEN);
        let salt2 = generate_salt(SALT_LEN);
        assert_eq!(salt1.len(), SALT_LEN);
        assert_ne!(salt1, salt2);
    }
}
