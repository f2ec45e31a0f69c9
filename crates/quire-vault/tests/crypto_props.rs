// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for the AEAD primitives.

use proptest::prelude::*;
use quire_core::QuireError;
use quire_vault::SymmetricKey;
use quire_vault::crypto::{open, open_blob, open_string, seal, seal_blob, seal_string};
use quire_vault::kdf::{MIN_KDF_ITERATIONS, derive_key};

fn key_from(bytes: [u8; 32]) -> SymmetricKey {
    SymmetricKey::import(&bytes).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seal_open_round_trip(
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
        key in any::<[u8; 32]>(),
    ) {
        let key = key_from(key);
        let sealed = seal(&plaintext, &key).unwrap();
        let opened = open(&sealed.ciphertext, &key, &sealed.iv).unwrap();
        prop_assert_eq!(opened.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn blob_round_trip(
        plaintext in proptest::collection::vec(any::<u8>(), 0..2048),
        key in any::<[u8; 32]>(),
    ) {
        let key = key_from(key);
        let blob = seal_blob(&plaintext, &key).unwrap();
        let opened = open_blob(&blob, &key).unwrap();
        prop_assert_eq!(opened.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn string_round_trip(text in ".{0,256}", key in any::<[u8; 32]>()) {
        let key = key_from(key);
        let encoded = seal_string(&text, &key).unwrap();
        prop_assert_eq!(encoded.matches(':').count(), 1);
        prop_assert_eq!(open_string(&encoded, &key).unwrap(), text);
    }

    #[test]
    fn flipping_a_ciphertext_bit_fails_authentication(
        plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        key in any::<[u8; 32]>(),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = key_from(key);
        let mut sealed = seal(&plaintext, &key).unwrap();
        let i = index.index(sealed.ciphertext.len());
        sealed.ciphertext[i] ^= 1 << bit;
        let result = open(&sealed.ciphertext, &key, &sealed.iv);
        prop_assert!(matches!(result, Err(QuireError::AuthenticationFailed)));
    }

    #[test]
    fn flipping_an_iv_bit_fails_authentication(
        plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        key in any::<[u8; 32]>(),
        index in 0usize..12,
        bit in 0u8..8,
    ) {
        let key = key_from(key);
        let mut sealed = seal(&plaintext, &key).unwrap();
        sealed.iv[index] ^= 1 << bit;
        let result = open(&sealed.ciphertext, &key, &sealed.iv);
        prop_assert!(matches!(result, Err(QuireError::AuthenticationFailed)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn derivation_is_deterministic(
        password in proptest::collection::vec(any::<u8>(), 0..64),
        salt in any::<[u8; 16]>(),
    ) {
        let a = derive_key(&password, &salt, MIN_KDF_ITERATIONS).unwrap();
        let b = derive_key(&password, &salt, MIN_KDF_ITERATIONS).unwrap();
        prop_assert_eq!(a.export(), b.export());
    }
}
