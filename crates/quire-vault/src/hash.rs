// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SHA-256 helpers: content digests and the recovery binding.

use quire_core::QuireError;
use ring::digest::{SHA256, SHA256_OUTPUT_LEN, digest};
use subtle::ConstantTimeEq;

use crate::encoding::{from_hex, to_base64, to_hex};

/// Prefix used on content digests.
pub const CONTENT_HASH_PREFIX: &str = "sha256:";

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    to_hex(digest(&SHA256, data).as_ref())
}

/// Content digest in the `sha256:<hex>` form used for file integrity.
pub fn hash_content(data: &[u8]) -> String {
    format!("{CONTENT_HASH_PREFIX}{}", sha256_hex(data))
}

/// Decode a content digest given with or without the `sha256:` prefix.
///
/// Fails with [`QuireError::Encoding`] unless the rest is 64 hex digits.
pub fn parse_content_hash(expected: &str) -> Result<Vec<u8>, QuireError> {
    let hex = expected.strip_prefix(CONTENT_HASH_PREFIX).unwrap_or(expected);
    let bytes = from_hex(hex)?;
    if bytes.len() != SHA256_OUTPUT_LEN {
        return Err(QuireError::Encoding(format!(
            "expected a {SHA256_OUTPUT_LEN}-byte SHA-256 digest, got {} bytes",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Check `data` against an expected digest given with or without the
/// `sha256:` prefix. A malformed digest never matches.
pub fn verify_hash(data: &[u8], expected: &str) -> bool {
    let Ok(expected) = parse_content_hash(expected) else {
        return false;
    };
    digest(&SHA256, data)
        .as_ref()
        .ct_eq(expected.as_slice())
        .into()
}

/// Recovery binding between an identity token and a salt epoch:
/// hex SHA-256 of the UTF-8 string `identity_token ++ base64(salt)`.
pub fn recovery_hash(identity_token: &str, salt: &[u8]) -> String {
    let mut material = String::with_capacity(identity_token.len() + salt.len() * 2);
    material.push_str(identity_token);
    material.push_str(&to_base64(salt));
    sha256_hex(material.as_bytes())
}

/// Constant-time check of an identity token against a stored recovery hash.
pub fn recovery_hash_matches(identity_token: &str, salt: &[u8], stored: &str) -> bool {
    constant_time_eq_hex(&recovery_hash(identity_token, salt), stored)
}

fn constant_time_eq_hex(computed: &str, expected: &str) -> bool {
    let expected = expected.to_ascii_lowercase();
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}
