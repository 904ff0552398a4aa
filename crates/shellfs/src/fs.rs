// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::backend::Backend;
use crate::config::StoreConfig;
use crate::connection::ConnectionHub;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::memory::MemoryBackend;
use crate::mode::{Operation, validate};
use crate::path;
use crate::queue::{Admission, TransactionQueue};
use crate::store::EntryStore;
use crate::user::UserId;
use chrono::Utc;
use diagnostics::{debug, info};
use std::sync::Arc;

/// The file store: every operation goes through here.
///
/// Cloning is cheap; clones share the queue, configuration and live
/// connections.
#[derive(Clone)]
pub struct FileStore {
    queue: TransactionQueue,
    config: Arc<StoreConfig>,
    hub: ConnectionHub,
}

impl FileStore {
    /// Opens a store over `backend`, creating the root directory if the
    /// backend is empty.
    pub async fn new(backend: Arc<dyn Backend>, config: StoreConfig) -> Result<Self> {
        let queue = TransactionQueue::with_timeout(backend, config.admission_timeout);
        let store = Self {
            queue,
            config: Arc::new(config),
            hub: ConnectionHub::default(),
        };
        store.bootstrap().await?;
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self> {
        Self::new(Arc::new(MemoryBackend::new()), StoreConfig::default()).await
    }

    async fn bootstrap(&self) -> Result<()> {
        let store = self.begin_write().await?;
        if store.entry(path::ROOT).await?.is_some() {
            debug!("root directory present");
            return store.commit().await;
        }
        let root = Entry::directory(path::ROOT, UserId::root(), self.config.bootstrap_mode, Utc::now());
        store.put_entry(path::ROOT, &root).await?;
        store.commit().await?;
        info!("created root directory with mode {mode}", mode: self.config.bootstrap_mode.to_string());
        Ok(())
    }

    #[must_use]
    pub fn queue(&self) -> &TransactionQueue {
        &self.queue
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn hub(&self) -> &ConnectionHub {
        &self.hub
    }

    /// A read-only view of committed state.
    pub async fn begin_read(&self) -> Result<EntryStore> {
        let txn = self.queue.read().await?;
        Ok(EntryStore::new(txn, self.config.link_limit))
    }

    /// Waits for the writer slot. Dropping the store without committing
    /// discards its writes.
    pub async fn begin_write(&self) -> Result<EntryStore> {
        let txn = self.queue.write().await?;
        Ok(EntryStore::new(txn, self.config.link_limit))
    }

    pub async fn begin_write_with(&self, admission: Admission) -> Result<EntryStore> {
        let txn = self.queue.write_with(admission).await?;
        Ok(EntryStore::new(txn, self.config.link_limit))
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("queue", &self.queue)
            .field("config", &self.config)
            .finish()
    }
}

/// Fails with `Unauthorized` unless `user` may perform `op` on `entry`.
pub(crate) fn authorize(entry: &Entry, at: &str, user: &UserId, op: Operation) -> Result<()> {
    if validate(entry.mode(), entry.owner(), user, op) {
        Ok(())
    } else {
        Err(Error::unauthorized(at, op))
    }
}
