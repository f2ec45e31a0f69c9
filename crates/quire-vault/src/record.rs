// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted vault record: the wrapped content key and its recovery
//! binding, stored as one JSON blob.
//!
//! ```json
//! {
//!   "version": 1,
//!   "salt": "<base64, 16 bytes>",
//!   "iv": "<base64, 12 bytes>",
//!   "encryptedDEK": "<base64, ciphertext+tag>",
//!   "recoveryHash": "<hex sha-256>",
//!   "createdAt": "2026-01-02T03:04:05.678Z",
//!   "updatedAt": "2026-01-02T03:04:05.678Z",
//!   "kdfIterations": 200000
//! }
//! ```
//!
//! `kdfIterations` is only written when the wrapping key used a count other
//! than [`DEFAULT_KDF_ITERATIONS`], so default records stay byte-compatible
//! with clients that do not know the field. Every mutation rewrites the whole
//! record.

use chrono::{DateTime, Utc};
use quire_core::QuireError;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, NONCE_LEN};
use crate::encoding::{from_base64, to_base64};
use crate::hash;
use crate::kdf::MIN_KDF_ITERATIONS;
use crate::key::SymmetricKey;

/// Record schema version written by this crate.
pub const RECORD_VERSION: u32 = 1;

/// PBKDF2 iteration count of a record that carries no `kdfIterations`.
pub const DEFAULT_KDF_ITERATIONS: u32 = MIN_KDF_ITERATIONS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub version: u32,
    pub salt: String,
    pub iv: String,
    #[serde(rename = "encryptedDEK")]
    pub encrypted_dek: String,
    pub recovery_hash: String,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso8601_opt"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf_iterations: Option<u32>,
}

impl VaultRecord {
    /// Wrap `dek` under `kek` with a fresh iv and bind the recovery hash to
    /// `identity_token` and `salt`. `kdf_iterations` is the count `kek` was
    /// derived with.
    pub fn wrap(
        dek: &SymmetricKey,
        kek: &SymmetricKey,
        salt: &[u8],
        kdf_iterations: u32,
        identity_token: &str,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<Self, QuireError> {
        let sealed = crypto::seal(dek.export(), kek)?;
        Ok(Self {
            version: RECORD_VERSION,
            salt: to_base64(salt),
            iv: to_base64(&sealed.iv),
            encrypted_dek: to_base64(&sealed.ciphertext),
            recovery_hash: hash::recovery_hash(identity_token, salt),
            created_at,
            updated_at,
            kdf_iterations: (kdf_iterations != DEFAULT_KDF_ITERATIONS).then_some(kdf_iterations),
        })
    }

    /// Iteration count needed to re-derive this record's wrapping key.
    pub fn kdf_iterations(&self) -> u32 {
        self.kdf_iterations.unwrap_or(DEFAULT_KDF_ITERATIONS)
    }

    /// Unwrap the content key with a password-derived key.
    ///
    /// Any failure (undecodable fields, tag mismatch, wrong key length) is
    /// reported as [`QuireError::AuthenticationFailed`].
    pub fn unwrap_dek(&self, kek: &SymmetricKey) -> Result<SymmetricKey, QuireError> {
        let iv = self.iv_bytes().map_err(|_| QuireError::AuthenticationFailed)?;
        let wrapped =
            from_base64(&self.encrypted_dek).map_err(|_| QuireError::AuthenticationFailed)?;
        let raw = crypto::open(&wrapped, kek, &iv)?;
        SymmetricKey::import(&raw).map_err(|_| QuireError::AuthenticationFailed)
    }

    pub fn salt_bytes(&self) -> Result<Vec<u8>, QuireError> {
        from_base64(&self.salt)
    }

    pub fn iv_bytes(&self) -> Result<[u8; NONCE_LEN], QuireError> {
        from_base64(&self.iv)?.try_into().map_err(|v: Vec<u8>| {
            QuireError::Encoding(format!("expected a {NONCE_LEN}-byte iv, got {} bytes", v.len()))
        })
    }

    /// Whether `identity_token` is the one bound to the current salt epoch.
    pub fn recovery_matches(&self, identity_token: &str) -> bool {
        match self.salt_bytes() {
            Ok(salt) => hash::recovery_hash_matches(identity_token, &salt, &self.recovery_hash),
            Err(_) => false,
        }
    }

    /// Parse a record read from the blob store, rejecting unknown versions.
    pub fn from_json(value: serde_json::Value) -> Result<Self, QuireError> {
        let record: Self = serde_json::from_value(value)?;
        if record.version != RECORD_VERSION {
            return Err(QuireError::MalformedRecord(format!(
                "unsupported record version {}",
                record.version
            )));
        }
        if record.kdf_iterations() < MIN_KDF_ITERATIONS {
            return Err(QuireError::MalformedRecord(format!(
                "kdfIterations {} is below the minimum of {MIN_KDF_ITERATIONS}",
                record.kdf_iterations()
            )));
        }
        Ok(record)
    }

    /// Compact JSON bytes for storage.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, QuireError> {
        serde_json::to_vec(self).map_err(|e| QuireError::Internal(format!("record encoding: {e}")))
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

mod iso8601_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => super::iso8601::serialize(dt, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let text: Option<String> = Option::deserialize(d)?;
        text.map(|t| {
            DateTime::parse_from_rfc3339(&t)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
