// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory backend.
//!
//! Committed data lives in ordered maps behind a shared lock; each
//! read-write transaction keeps its writes in a private overlay until
//! commit. Suitable for tests, the CLI and embedding.

use crate::backend::{AccessMode, Backend, BackendTransaction, Collection};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

#[derive(Debug, Default)]
struct Tables {
    entries: BTreeMap<String, Vec<u8>>,
    content: BTreeMap<String, Vec<u8>>,
}

impl Tables {
    fn table(&self, collection: Collection) -> &BTreeMap<String, Vec<u8>> {
        match collection {
            Collection::Entries => &self.entries,
            Collection::Content => &self.content,
        }
    }

    fn table_mut(&mut self, collection: Collection) -> &mut BTreeMap<String, Vec<u8>> {
        match collection {
            Collection::Entries => &mut self.entries,
            Collection::Content => &mut self.content,
        }
    }
}

/// In-memory persistence for the file store
#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<RwLock<Tables>>,
    failure: Option<String>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `open` always fails with `reason`.
    pub fn failing<S: Into<String>>(reason: S) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Committed keys of `collection`, in order.
    pub fn keys(&self, collection: Collection) -> Result<Vec<String>> {
        let tables = self.tables.read().map_err(|e| Error::Backend(e.to_string()))?;
        Ok(tables.table(collection).keys().cloned().collect())
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryBackend{{}}")
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn open(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(Error::Backend(reason.clone())),
            None => Ok(()),
        }
    }

    async fn transaction(
        &self,
        scope: &[Collection],
        mode: AccessMode,
    ) -> Result<Box<dyn BackendTransaction>> {
        Ok(Box::new(MemoryTransaction {
            tables: self.tables.clone(),
            scope: scope.to_vec(),
            mode,
            staged: Mutex::new(Staged::default()),
        }))
    }
}

#[derive(Debug, Clone)]
enum Write {
    Put(Vec<u8>),
    Delete,
}

#[derive(Debug, Default)]
struct Staged {
    writes: BTreeMap<(Collection, String), Write>,
    finished: bool,
}

pub struct MemoryTransaction {
    tables: Arc<RwLock<Tables>>,
    scope: Vec<Collection>,
    mode: AccessMode,
    staged: Mutex<Staged>,
}

impl MemoryTransaction {
    fn check_scope(&self, collection: Collection) -> Result<()> {
        if self.scope.contains(&collection) {
            Ok(())
        } else {
            Err(Error::Backend(format!(
                "collection {collection} is outside the transaction scope"
            )))
        }
    }

    fn writable(&self, collection: Collection) -> Result<MutexGuard<'_, Staged>> {
        self.check_scope(collection)?;
        if self.mode != AccessMode::ReadWrite {
            return Err(Error::Backend("write in a readonly transaction".to_string()));
        }
        let staged = self.staged()?;
        if staged.finished {
            return Err(Error::Backend("transaction already finished".to_string()));
        }
        Ok(staged)
    }

    fn staged(&self) -> Result<MutexGuard<'_, Staged>> {
        self.staged.lock().map_err(|e| Error::Backend(e.to_string()))
    }

    fn staged_write(&self, collection: Collection, key: &str) -> Result<Option<Write>> {
        let staged = self.staged()?;
        Ok(staged.writes.get(&(collection, key.to_string())).cloned())
    }

    fn committed(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>> {
        let tables = self.tables.read().map_err(|e| Error::Backend(e.to_string()))?;
        Ok(tables.table(collection).get(key).cloned())
    }
}

#[async_trait]
impl BackendTransaction for MemoryTransaction {
    fn mode(&self) -> AccessMode {
        self.mode
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>> {
        self.check_scope(collection)?;
        match self.staged_write(collection, key)? {
            Some(Write::Put(value)) => Ok(Some(value)),
            Some(Write::Delete) => Ok(None),
            None => self.committed(collection, key),
        }
    }

    async fn put(&self, collection: Collection, key: &str, value: Vec<u8>) -> Result<()> {
        let mut staged = self.writable(collection)?;
        _ = staged
            .writes
            .insert((collection, key.to_string()), Write::Put(value));
        Ok(())
    }

    async fn add(&self, collection: Collection, key: &str, value: Vec<u8>) -> Result<()> {
        drop(self.writable(collection)?);
        let exists = match self.staged_write(collection, key)? {
            Some(Write::Put(_)) => true,
            Some(Write::Delete) => false,
            None => self.committed(collection, key)?.is_some(),
        };
        if exists {
            return Err(Error::Backend(format!("key already present in {collection}: {key}")));
        }
        self.put(collection, key, value).await
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        let mut staged = self.writable(collection)?;
        _ = staged
            .writes
            .insert((collection, key.to_string()), Write::Delete);
        Ok(())
    }

    async fn scan_prefix(&self, collection: Collection, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.check_scope(collection)?;
        let mut merged: BTreeMap<String, Vec<u8>> = {
            let tables = self.tables.read().map_err(|e| Error::Backend(e.to_string()))?;
            tables
                .table(collection)
                .range(prefix.to_string()..)
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        };
        let staged = self.staged()?;
        for ((c, key), write) in &staged.writes {
            if *c != collection || !key.starts_with(prefix) {
                continue;
            }
            match write {
                Write::Put(value) => {
                    _ = merged.insert(key.clone(), value.clone());
                }
                Write::Delete => {
                    _ = merged.remove(key);
                }
            }
        }
        Ok(merged.into_iter().collect())
    }

    fn pending(&self) -> usize {
        self.staged.lock().map(|s| s.writes.len()).unwrap_or(0)
    }

    async fn commit(&self) -> Result<()> {
        let mut staged = self.staged()?;
        if staged.finished {
            return Err(Error::Backend("transaction already finished".to_string()));
        }
        staged.finished = true;
        if staged.writes.is_empty() {
            return Ok(());
        }
        let mut tables = self.tables.write().map_err(|e| Error::Backend(e.to_string()))?;
        for ((collection, key), write) in std::mem::take(&mut staged.writes) {
            let table = tables.table_mut(collection);
            match write {
                Write::Put(value) => {
                    _ = table.insert(key, value);
                }
                Write::Delete => {
                    _ = table.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn rollback(&self) {
        if let Ok(mut staged) = self.staged.lock() {
            staged.writes.clear();
            staged.finished = true;
        }
    }
}
