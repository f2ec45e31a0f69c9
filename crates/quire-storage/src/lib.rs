// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-directory blob store for the Quire vault.
//!
//! Stands in for a cloud drive folder: containers are sub-directories, each
//! blob is a content file plus a JSON metadata sidecar, and every write goes
//! through a temp file and a rename so readers never see a partial blob.

pub mod fs_store;
pub mod lock;
pub mod meta;

pub use fs_store::FsBlobStore;
