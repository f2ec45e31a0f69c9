// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Quire vault.
//!
//! Display strings never carry key material, passwords, identity tokens, or
//! salts. Use [`QuireError::user_message`] for anything shown to an end user.

use thiserror::Error;

/// The closed error type used by the primitives, the vault manager, and every
/// [`BlobStore`](crate::traits::BlobStore) implementation.
#[derive(Debug, Error)]
pub enum QuireError {
    /// No vault record has been persisted yet.
    #[error("vault not found")]
    VaultNotFound,

    /// `setup` was called while a vault record already exists.
    #[error("vault already exists")]
    VaultAlreadyExists,

    /// AEAD tag verification failed. Covers both a wrong key and tampered data.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The identity token does not match the record's recovery hash.
    #[error("recovery not authorized for this identity")]
    RecoveryUnauthorized,

    /// Recovery needs the content key from a live session, and none is held.
    #[error("content key unavailable: recovery requires an unlocked session")]
    DekUnavailable,

    /// Encrypt/decrypt was called while the vault is locked.
    #[error("vault is not unlocked")]
    NotUnlocked,

    /// Blob store backend failure (I/O, transport, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A blob id was referenced that the store does not know.
    #[error("blob not found: {blob_id}")]
    BlobNotFound { blob_id: String },

    /// The blob changed since it was read (revision mismatch), or a blob with
    /// the same name already exists on create.
    #[error("concurrent modification of blob {blob_id}")]
    Conflict { blob_id: String },

    /// The persisted vault record could not be parsed.
    #[error("malformed vault record: {0}")]
    MalformedRecord(String),

    /// Base64/hex/UTF-8 or wire-format decoding failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Invalid cryptographic parameters (e.g. iteration count below the floor).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuireError {
    /// Wrap any backend error as [`QuireError::Storage`].
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// A message safe to show to an end user.
    ///
    /// A failed unlock always reads "Incorrect password." whether the tag did
    /// not verify or the record was unreadable.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed | Self::MalformedRecord(_) => "Incorrect password.",
            Self::VaultNotFound => "No vault has been set up yet.",
            Self::VaultAlreadyExists => "A vault already exists.",
            Self::RecoveryUnauthorized => "This account is not allowed to recover the vault.",
            Self::DekUnavailable => "Unlock the vault before resetting its password.",
            Self::NotUnlocked => "The vault is locked.",
            Self::Storage { .. } | Self::BlobNotFound { .. } => {
                "The storage backend could not be reached. Try again."
            }
            Self::Conflict { .. } => "The vault was modified elsewhere. Reload and try again.",
            Self::Encoding(_) => "The encrypted data is not in a recognized format.",
            Self::Crypto(_) | Self::Config(_) | Self::Internal(_) => "An internal error occurred.",
        }
    }

    /// Whether the error came from the storage layer and may be retried by
    /// the caller. The vault itself never retries.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::BlobNotFound { .. } | Self::Conflict { .. }
        )
    }
}

impl From<serde_json::Error> for QuireError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedRecord(e.to_string())
    }
}
