// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Backing key-value store.
//!
//! The engine needs very little from its backend: two named collections of
//! byte values, and transactions scoped to a set of collections with an
//! access mode. Writes are staged in the transaction and only become
//! visible to other transactions on [`BackendTransaction::commit`].

use crate::error::Result;
use async_trait::async_trait;

/// A named key-value collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Path -> encoded [`Entry`](crate::Entry).
    Entries,
    /// Path -> raw file bytes.
    Content,
}

impl Collection {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Entries => "entries",
            Collection::Content => "content",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const ALL_COLLECTIONS: &[Collection] = &[Collection::Entries, Collection::Content];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AccessMode::ReadOnly => "readonly",
            AccessMode::ReadWrite => "readwrite",
        })
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Prepares the store. Called once, before the first transaction.
    async fn open(&self) -> Result<()>;

    /// Starts a transaction over `scope`.
    async fn transaction(
        &self,
        scope: &[Collection],
        mode: AccessMode,
    ) -> Result<Box<dyn BackendTransaction>>;
}

#[async_trait]
pub trait BackendTransaction: Send + Sync {
    fn mode(&self) -> AccessMode;

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>>;

    /// Inserts or replaces.
    async fn put(&self, collection: Collection, key: &str, value: Vec<u8>) -> Result<()>;

    /// Inserts; fails if the key is already present.
    async fn add(&self, collection: Collection, key: &str, value: Vec<u8>) -> Result<()>;

    async fn delete(&self, collection: Collection, key: &str) -> Result<()>;

    /// All pairs whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, collection: Collection, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;

    /// Number of staged, uncommitted writes.
    fn pending(&self) -> usize;

    /// Publishes staged writes. The transaction accepts no further writes.
    async fn commit(&self) -> Result<()>;

    /// Discards staged writes.
    fn rollback(&self);
}
