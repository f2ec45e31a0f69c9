// SPDX-FileCopyrightText: 2026 Quire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Quire.
//!
//! - [`MemoryBlobStore`] - in-memory blob store with revisions, write
//!   counting, fault injection, and raw content access for tamper tests.

pub mod memory_store;

pub use memory_store::MemoryBlobStore;
