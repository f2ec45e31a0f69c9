// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the vault.
//!
//! Traits use `#[async_trait]` so they can be held as `Arc<dyn ...>`.

pub mod blob_store;

pub use blob_store::BlobStore;
