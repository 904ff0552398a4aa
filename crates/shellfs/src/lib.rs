// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A virtual, multi-user file store over an asynchronous key-value backend.
//!
//! Entries live in a flat map from normalized absolute path to
//! [`Entry`]; directories, files and links carry an owner and a
//! three-digit [`Mode`]. All writes go through a [`TransactionQueue`]
//! that admits one writer at a time, in request order. Readers never
//! queue and only see committed state.
//!
//! ```no_run
//! # async fn demo() -> shellfs::Result<()> {
//! use shellfs::{CreateOptions, FileStore, UserId};
//!
//! let fs = FileStore::in_memory().await?;
//! let root = UserId::root();
//! fs.create_file("/etc/motd", CreateOptions::new(root.clone()).recursive(), b"hello")
//!     .await?;
//! assert_eq!(fs.read_file("/etc/motd", &root).await?, b"hello");
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod connection;
pub mod entry;
pub mod error;
pub mod memory;
pub mod mode;
pub mod options;
pub mod path;
pub mod queue;
pub mod seed;
pub mod store;
pub mod transaction;
pub mod user;

mod fs;
mod ops;

pub use backend::{AccessMode, Backend, BackendTransaction, Collection};
pub use config::StoreConfig;
pub use connection::{ConnectionId, ContentUpdate, ContentWriter, FileConnection};
pub use entry::{DirectoryEntry, Entry, EntryKind, FileEntry, LinkEntry};
pub use error::{Error, OpKind, Result};
pub use fs::FileStore;
pub use memory::MemoryBackend;
pub use mode::{Mode, Operation, Permission, Scope, validate};
pub use ops::apply_write;
pub use options::{
    CreateOptions, LinkOptions, OpenOptions, RemoveOptions, TransferOptions, UnlinkOptions, WriteKind,
    WriteOptions,
};
pub use queue::{Admission, TransactionQueue};
pub use seed::{Seed, SeedBody, SeedNode, SeedReport};
pub use store::{EntryStore, Resolved};
pub use transaction::Transaction;
pub use user::UserId;

#[cfg(test)]
mod tests;
