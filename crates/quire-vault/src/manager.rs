// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: setup, unlock, lock, password rotation, and content
//! encryption under the held content key.
//!
//! The vault uses envelope encryption:
//! - A random content key (DEK) encrypts user content. It never changes.
//! - The DEK is wrapped by a key derived from the password (KEK) and the
//!   wrapped form is persisted as a single JSON record in the blob store.
//! - Changing the password only re-wraps the DEK; content is never
//!   re-encrypted.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::Utc;
use quire_core::{BlobRef, BlobStore, QuireError, VaultStatus};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf;
use crate::key::SymmetricKey;
use crate::params::VaultParams;
use crate::record::VaultRecord;

/// Owns the single content key of one vault.
///
/// Constructed explicitly and passed to whoever needs it; several managers
/// over different stores can coexist in one process.
pub struct VaultManager {
    store: Arc<dyn BlobStore>,
    params: VaultParams,
    /// The unwrapped content key. Only in memory, never on disk.
    dek: RwLock<Option<SymmetricKey>>,
    /// Serializes every operation that reads-then-writes the record.
    record_lock: Mutex<()>,
}

impl std::fmt::Debug for VaultManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultManager")
            .field("params", &self.params)
            .field("dek", &"[REDACTED]")
            .field("unlocked", &self.is_ready())
            .finish()
    }
}

impl VaultManager {
    pub fn new(store: Arc<dyn BlobStore>, params: VaultParams) -> Self {
        Self {
            store,
            params,
            dek: RwLock::new(None),
            record_lock: Mutex::new(()),
        }
    }

    pub fn params(&self) -> &VaultParams {
        &self.params
    }

    /// Whether a vault record exists in the blob store.
    pub async fn has_vault(&self) -> Result<bool, QuireError> {
        Ok(self.locate().await?.is_some())
    }

    /// Create the vault: fresh DEK and salt, wrap, persist, then unlock.
    ///
    /// Fails with [`QuireError::VaultAlreadyExists`] if a record is present.
    pub async fn setup(
        &self,
        password: &SecretString,
        identity_token: &str,
    ) -> Result<(), QuireError> {
        let _guard = self.record_lock.lock().await;

        if self.locate().await?.is_some() {
            return Err(QuireError::VaultAlreadyExists);
        }

        let dek = crypto::generate_symmetric_key();
        let salt = kdf::generate_salt(kdf::SALT_LEN);
        let iterations = self.params.kdf_iterations;
        let kek = self.derive(password, &salt, iterations).await?;
        let record = VaultRecord::wrap(
            &dek,
            &kek,
            &salt,
            iterations,
            identity_token,
            Utc::now(),
            None,
        )?;

        let container = self.store.root_container_id().await?;
        let blob = self
            .store
            .create_blob(
                &self.params.record_name,
                &record.to_json_bytes()?,
                &self.params.record_mime,
                &container,
            )
            .await?;

        self.install(dek);
        info!(
            blob_id = %blob.id,
            kdf_iterations = self.params.kdf_iterations,
            "vault created"
        );
        Ok(())
    }

    /// Unwrap the DEK with `password` and hold it in memory.
    ///
    /// A wrong password leaves the manager in whatever state it was in.
    pub async fn unlock(&self, password: &SecretString) -> Result<(), QuireError> {
        let _guard = self.record_lock.lock().await;
        self.unlock_inner(password).await
    }

    /// Whether `identity_token` is bound to the current record.
    pub async fn can_recover(&self, identity_token: &str) -> Result<bool, QuireError> {
        let (_, record) = self.load().await?;
        Ok(record.recovery_matches(identity_token))
    }

    /// Re-wrap the in-memory DEK under `new_password`.
    ///
    /// Requires the identity binding to match and a DEK to be held from an
    /// earlier unlock. A fresh salt and iv are generated; `createdAt` is kept.
    pub async fn recover_with_new_password(
        &self,
        new_password: &SecretString,
        identity_token: &str,
    ) -> Result<(), QuireError> {
        let _guard = self.record_lock.lock().await;
        self.rewrap_inner(new_password, identity_token).await
    }

    /// Verify `current_password`, then re-wrap under `new_password`.
    pub async fn change_password(
        &self,
        current_password: &SecretString,
        new_password: &SecretString,
        identity_token: &str,
    ) -> Result<(), QuireError> {
        let _guard = self.record_lock.lock().await;
        self.unlock_inner(current_password).await?;
        self.rewrap_inner(new_password, identity_token).await
    }

    /// Drop the DEK. Calling it while locked does nothing.
    pub fn lock(&self) {
        let previous = self
            .dek
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            info!("vault locked");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.read_key().is_some()
    }

    pub async fn status(&self) -> Result<VaultStatus, QuireError> {
        if self.is_ready() {
            return Ok(VaultStatus::Unlocked);
        }
        if self.has_vault().await? {
            Ok(VaultStatus::Locked)
        } else {
            Ok(VaultStatus::NoVault)
        }
    }

    /// Encrypt a payload into the blob format (`iv || ciphertext+tag`).
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, QuireError> {
        self.with_key(|key| crypto::seal_blob(plaintext, key))
    }

    /// Decrypt a payload produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>, QuireError> {
        self.with_key(|key| crypto::open_blob(blob, key))
    }

    /// Encrypt a text field into `base64(iv):base64(ciphertext+tag)`.
    pub fn encrypt_string(&self, text: &str) -> Result<String, QuireError> {
        self.with_key(|key| crypto::seal_string(text, key))
    }

    pub fn decrypt_string(&self, encoded: &str) -> Result<String, QuireError> {
        self.with_key(|key| crypto::open_string(encoded, key))
    }

    async fn unlock_inner(&self, password: &SecretString) -> Result<(), QuireError> {
        let (blob, record) = self.load().await?;

        let salt = match record.salt_bytes() {
            Ok(salt) => salt,
            Err(_) => {
                debug!(blob_id = %blob.id, "unlock rejected");
                return Err(QuireError::AuthenticationFailed);
            }
        };
        let kek = self
            .derive(password, &salt, record.kdf_iterations())
            .await?;

        match record.unwrap_dek(&kek) {
            Ok(dek) => {
                self.install(dek);
                info!(blob_id = %blob.id, "vault unlocked");
                Ok(())
            }
            Err(_) => {
                debug!(blob_id = %blob.id, "unlock rejected");
                Err(QuireError::AuthenticationFailed)
            }
        }
    }

    async fn rewrap_inner(
        &self,
        new_password: &SecretString,
        identity_token: &str,
    ) -> Result<(), QuireError> {
        let (blob, current) = self.load().await?;

        if !current.recovery_matches(identity_token) {
            return Err(QuireError::RecoveryUnauthorized);
        }
        if !self.is_ready() {
            return Err(QuireError::DekUnavailable);
        }

        let salt = kdf::generate_salt(kdf::SALT_LEN);
        let iterations = self.params.kdf_iterations;
        let kek = self.derive(new_password, &salt, iterations).await?;

        let record = {
            let held = self.read_key();
            let dek = held.as_ref().ok_or(QuireError::DekUnavailable)?;
            VaultRecord::wrap(
                dek,
                &kek,
                &salt,
                iterations,
                identity_token,
                current.created_at,
                Some(Utc::now()),
            )?
        };

        let result = self
            .store
            .update_blob(
                &blob.id,
                &record.to_json_bytes()?,
                &self.params.record_mime,
                Some(&blob.revision),
            )
            .await;

        match result {
            Ok(updated) => {
                info!(blob_id = %updated.id, "vault password rotated");
                Ok(())
            }
            Err(e) => {
                if matches!(e, QuireError::Conflict { .. }) {
                    warn!(blob_id = %blob.id, "vault record changed concurrently, rotation aborted");
                }
                Err(e)
            }
        }
    }

    async fn locate(&self) -> Result<Option<BlobRef>, QuireError> {
        let container = self.store.root_container_id().await?;
        self.store
            .find_named_blob(&self.params.record_name, &container)
            .await
    }

    async fn load(&self) -> Result<(BlobRef, VaultRecord), QuireError> {
        let blob = self.locate().await?.ok_or(QuireError::VaultNotFound)?;
        let value = self.store.read_blob_as_json(&blob.id).await?;
        let record = VaultRecord::from_json(value)?;
        Ok((blob, record))
    }

    /// Run PBKDF2 off the async executor.
    async fn derive(
        &self,
        password: &SecretString,
        salt: &[u8],
        iterations: u32,
    ) -> Result<SymmetricKey, QuireError> {
        let password = Zeroizing::new(password.expose_secret().as_bytes().to_vec());
        let salt = salt.to_vec();

        tokio::task::spawn_blocking(move || kdf::derive_key(&password, &salt, iterations))
            .await
            .map_err(|e| QuireError::Internal(format!("key derivation task failed: {e}")))?
    }

    fn install(&self, dek: SymmetricKey) {
        *self.dek.write().unwrap_or_else(PoisonError::into_inner) = Some(dek);
    }

    fn read_key(&self) -> RwLockReadGuard<'_, Option<SymmetricKey>> {
        self.dek.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_key<T>(
        &self,
        f: impl FnOnce(&SymmetricKey) -> Result<T, QuireError>,
    ) -> Result<T, QuireError> {
        let held = self.read_key();
        let key = held.as_ref().ok_or(QuireError::NotUnlocked)?;
        f(key)
    }
}
