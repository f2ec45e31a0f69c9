// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary/text encodings used by the vault record and ciphertext formats.
//!
//! Base64 is the standard alphabet with padding; hex is lowercase.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quire_core::QuireError;

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(text: &str) -> Result<Vec<u8>, QuireError> {
    STANDARD
        .decode(text)
        .map_err(|e| QuireError::Encoding(format!("invalid base64: {e}")))
}

pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn from_hex(text: &str) -> Result<Vec<u8>, QuireError> {
    hex::decode(text).map_err(|e| QuireError::Encoding(format!("invalid hex: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_matches_browser_btoa() {
        // btoa(String.fromCharCode(0, 1, 2, 253, 254, 255))
        assert_eq!(to_base64(&[0, 1, 2, 253, 254, 255]), "AAEC/f7/");
        assert_eq!(to_base64(b"hi"), "aGk=");
        assert_eq!(from_base64("aGk=").unwrap(), b"hi");
    }

    #[test]
    fn invalid_base64_is_an_encoding_error() {
        assert!(matches!(from_base64("not base64!"), Err(QuireError::Encoding(_))));
    }

    #[test]
    fn hex_is_lowercase() {
        assert_eq!(to_hex(&[0xDE, 0xAD, 0xBE, 0xEF]), "deadbeef");
        assert_eq!(from_hex("DEADBEEF").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(from_hex("abc").is_err());
    }
}
