// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-process write lock for one container directory.
//!
//! The lock is a `.lock` file claimed with `create_new`, which the OS makes
//! atomic across processes. It is removed when the guard drops, including
//! when the owning future is cancelled.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use quire_core::QuireError;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File name of the lock inside a container directory.
pub const LOCK_FILE: &str = ".lock";

const RETRY_INTERVAL: Duration = Duration::from_millis(10);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Writers hold the lock for milliseconds; anything older was left by a
/// crashed process.
const STALE_AFTER: Duration = Duration::from_secs(30);

/// Held lock on a container. Dropping it releases the lock.
#[derive(Debug)]
pub struct ContainerLock {
    path: PathBuf,
}

impl ContainerLock {
    /// Claim the lock in `dir`, waiting for other writers to finish.
    ///
    /// The directory must exist. Fails with a storage error if the lock
    /// cannot be taken within the acquire timeout.
    pub async fn acquire(dir: &Path) -> Result<Self, QuireError> {
        let path = dir.join(LOCK_FILE);
        let deadline = Instant::now() + ACQUIRE_TIMEOUT;

        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    let owner = format!("{}\n", std::process::id());
                    // Owner pid is informational; the file's existence is the lock.
                    let _ = file.write_all(owner.as_bytes()).await;
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path).await {
                        warn!(path = %path.display(), "removing stale container lock");
                        let _ = tokio::fs::remove_file(&path).await;
                        continue;
                    }
                    if Instant::now() >= deadline {
                        return Err(QuireError::storage(std::io::Error::new(
                            ErrorKind::WouldBlock,
                            format!("timed out waiting for {}", path.display()),
                        )));
                    }
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err(e) => return Err(QuireError::storage(e)),
            }
        }
    }
}

impl Drop for ContainerLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn is_stale(path: &Path) -> bool {
    let Ok(meta) = tokio::fs::metadata(path).await else {
        return false;
    };
    meta.modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > STALE_AFTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn lock_file_exists_only_while_held() {
        let dir = TempDir::new().unwrap();
        let lock = ContainerLock::acquire(dir.path()).await.unwrap();
        assert!(dir.path().join(LOCK_FILE).exists());
        drop(lock);
        assert!(!dir.path().join(LOCK_FILE).exists());
    }

    #[tokio::test]
    async fn second_acquire_waits_for_release() {
        let dir = TempDir::new().unwrap();
        let first = ContainerLock::acquire(dir.path()).await.unwrap();

        let path = dir.path().to_path_buf();
        let waiter = tokio::spawn(async move { ContainerLock::acquire(&path).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        let second = waiter.await.unwrap().unwrap();
        assert!(dir.path().join(LOCK_FILE).exists());
        drop(second);
    }

    #[tokio::test]
    async fn missing_directory_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let err = ContainerLock::acquire(&dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }
}
