// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope-encryption vault for Quire.
//!
//! A random 256-bit content key (DEK) encrypts user content with
//! AES-256-GCM. The DEK is wrapped by a key derived from the user's password
//! with PBKDF2-HMAC-SHA256 and persisted as one JSON record through a
//! [`BlobStore`](quire_core::BlobStore). Changing the password re-wraps the
//! DEK; content is never re-encrypted.
//!
//! The primitives in [`crypto`], [`kdf`], [`hash`] and [`encoding`] are
//! stateless. [`VaultManager`] owns the lifecycle.

pub mod crypto;
pub mod encoding;
pub mod hash;
pub mod kdf;
pub mod key;
pub mod manager;
pub mod params;
pub mod prompt;
pub mod record;

pub use crypto::{NONCE_LEN, Sealed, TAG_LEN};
pub use key::{KEY_LEN, SymmetricKey};
pub use manager::VaultManager;
pub use params::VaultParams;
pub use record::{RECORD_VERSION, VaultRecord};
