// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations and the two ciphertext wire
//! formats.
//!
//! Every call to [`seal`] draws a fresh random 96-bit nonce from the OS
//! CSPRNG. A `(key, nonce)` pair must never encrypt two plaintexts; nothing in
//! this module accepts a caller-supplied nonce for sealing.
//!
//! Wire formats:
//! - blob: `iv (12 bytes) || ciphertext || tag (16 bytes)`
//! - string: `base64(iv) ":" base64(ciphertext || tag)`

use quire_core::QuireError;
use rand::RngCore;
use rand::rngs::OsRng;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use zeroize::Zeroizing;

use crate::encoding::{from_base64, to_base64};
use crate::key::SymmetricKey;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Output of [`seal`]: the nonce and the ciphertext with its tag appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// `n` bytes from the OS CSPRNG.
///
/// Panics if the platform RNG is unavailable; there is no way to continue
/// safely without it.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut out = vec![0u8; n];
    OsRng.fill_bytes(&mut out);
    out
}

/// A fresh random 256-bit content key.
pub fn generate_symmetric_key() -> SymmetricKey {
    SymmetricKey::generate()
}

fn aead_key(key: &SymmetricKey) -> Result<LessSafeKey, QuireError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.export())
        .map_err(|_| QuireError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` with a freshly generated nonce.
pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> Result<Sealed, QuireError> {
    let aead = aead_key(key)?;

    let mut iv = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut iv);

    let mut in_out = plaintext.to_vec();
    aead.seal_in_place_append_tag(Nonce::assume_unique_for_key(iv), Aad::empty(), &mut in_out)
        .map_err(|_| QuireError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok(Sealed {
        iv,
        ciphertext: in_out,
    })
}

/// Decrypt and authenticate `ciphertext` (tag appended).
///
/// A wrong key and tampered data both yield [`QuireError::AuthenticationFailed`];
/// the two cases are indistinguishable.
pub fn open(
    ciphertext: &[u8],
    key: &SymmetricKey,
    iv: &[u8; NONCE_LEN],
) -> Result<Zeroizing<Vec<u8>>, QuireError> {
    let aead = aead_key(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = aead
        .open_in_place(Nonce::assume_unique_for_key(*iv), Aad::empty(), &mut in_out)
        .map_err(|_| QuireError::AuthenticationFailed)?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

/// Seal into a single self-contained blob: `iv || ciphertext || tag`.
pub fn seal_blob(plaintext: &[u8], key: &SymmetricKey) -> Result<Vec<u8>, QuireError> {
    let sealed = seal(plaintext, key)?;
    let mut blob = Vec::with_capacity(NONCE_LEN + sealed.ciphertext.len());
    blob.extend_from_slice(&sealed.iv);
    blob.extend_from_slice(&sealed.ciphertext);
    Ok(blob)
}

/// Inverse of [`seal_blob`]. Blobs too short to hold a nonce and a tag fail
/// authentication like any other corrupted input.
pub fn open_blob(blob: &[u8], key: &SymmetricKey) -> Result<Zeroizing<Vec<u8>>, QuireError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(QuireError::AuthenticationFailed);
    }
    let (iv, ciphertext) = blob.split_at(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(iv);
    open(ciphertext, key, &nonce)
}

/// Seal UTF-8 text into the `base64(iv):base64(ciphertext)` format.
pub fn seal_string(text: &str, key: &SymmetricKey) -> Result<String, QuireError> {
    let sealed = seal(text.as_bytes(), key)?;
    Ok(format!(
        "{}:{}",
        to_base64(&sealed.iv),
        to_base64(&sealed.ciphertext)
    ))
}

/// Split a string ciphertext into its nonce and ciphertext parts.
///
/// The input must contain exactly one `:` and a 12-byte nonce.
pub fn decode_sealed_string(encoded: &str) -> Result<Sealed, QuireError> {
    let mut parts = encoded.split(':');
    let (Some(iv_b64), Some(ct_b64), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(QuireError::Encoding(
            "string ciphertext must be `iv:ciphertext`".to_string(),
        ));
    };

    let iv: [u8; NONCE_LEN] = from_base64(iv_b64)?.try_into().map_err(|v: Vec<u8>| {
        QuireError::Encoding(format!("expected a {NONCE_LEN}-byte iv, got {} bytes", v.len()))
    })?;
    let ciphertext = from_base64(ct_b64)?;

    Ok(Sealed { iv, ciphertext })
}

/// Inverse of [`seal_string`].
pub fn open_string(encoded: &str, key: &SymmetricKey) -> Result<String, QuireError> {
    let sealed = decode_sealed_string(encoded)?;
    let plaintext = open(&sealed.ciphertext, key, &sealed.iv)?;
    String::from_utf8(plaintext.to_vec())
        .map_err(|_| QuireError::Encoding("decrypted text is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seal_open_roundtrip() {
        let key = generate_symmetric_key();
        let sealed = seal(b"meeting notes", &key).unwrap();
        let opened = open(&sealed.ciphertext, &key, &sealed.iv).unwrap();
        assert_eq!(opened.as_slice(), b"meeting notes");
    }

    #[test]
    fn ciphertext_carries_a_16_byte_tag() {
        let key = generate_symmetric_key();
        let sealed = seal(b"hello", &key).unwrap();
        assert_eq!(sealed.ciphertext.len(), 5 + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let key = generate_symmetric_key();
        let blob = seal_blob(b"", &key).unwrap();
        assert_eq!(blob.len(), NONCE_LEN + TAG_LEN);
        assert!(open_blob(&blob, &key).unwrap().is_empty());
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let sealed = seal(b"secret", &generate_symmetric_key()).unwrap();
        let result = open(&sealed.ciphertext, &generate_symmetric_key(), &sealed.iv);
        assert!(matches!(result, Err(QuireError::AuthenticationFailed)));
    }

    #[test]
    fn nonces_do_not_repeat() {
        let key = generate_symmetric_key();
        let mut seen = HashSet::new();
        for _ in 0..5000 {
            let sealed = seal(b"x", &key).unwrap();
            assert!(seen.insert(sealed.iv), "nonce reused");
        }
    }

    #[test]
    fn blob_layout_is_iv_then_ciphertext() {
        let key = generate_symmetric_key();
        let blob = seal_blob(b"file body", &key).unwrap();
        let mut iv = [0u8; NONCE_LEN];
        iv.copy_from_slice(&blob[..NONCE_LEN]);
        let opened = open(&blob[NONCE_LEN..], &key, &iv).unwrap();
        assert_eq!(opened.as_slice(), b"file body");
    }

    #[test]
    fn short_blob_fails_authentication() {
        let key = generate_symmetric_key();
        assert!(matches!(
            open_blob(&[0u8; 10], &key),
            Err(QuireError::AuthenticationFailed)
        ));
    }

    #[test]
    fn string_format_has_exactly_one_colon() {
        let key = generate_symmetric_key();
        let encoded = seal_string("hello", &key).unwrap();
        assert_eq!(encoded.matches(':').count(), 1);
        assert_eq!(open_string(&encoded, &key).unwrap(), "hello");
    }

    #[test]
    fn malformed_string_ciphertext_is_an_encoding_error() {
        let key = generate_symmetric_key();
        for bad in ["no-colon", "a:b:c", "AAAA:AAAA", "!!:AAAA"] {
            assert!(
                matches!(open_string(bad, &key), Err(QuireError::Encoding(_))),
                "{bad} should be rejected as malformed"
            );
        }
    }

    #[test]
    fn random_bytes_has_requested_length() {
        assert_eq!(random_bytes(16).len(), 16);
        assert_eq!(random_bytes(0).len(), 0);
        assert_ne!(random_bytes(32), random_bytes(32));
    }
}
