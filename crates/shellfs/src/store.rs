// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Typed view of one backend transaction.
//!
//! Entries are stored flat, keyed by normalized absolute path. The tree is
//! never stored: a directory's children are the keys whose parent is the
//! directory, found by prefix scan.

use crate::backend::Collection;
use crate::entry::Entry;
use crate::error::{Error, OpKind, Result};
use crate::path;
use crate::transaction::Transaction;
use std::collections::VecDeque;

/// Outcome of following links through a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The path after link substitution.
    pub path: String,
    /// The entry found there, or `None` for a missing or broken target.
    pub entry: Option<Entry>,
}

impl Resolved {
    pub(crate) fn require(self, kind: OpKind, requested: &str) -> Result<(String, Entry)> {
        match self.entry {
            Some(entry) => Ok((self.path, entry)),
            None => Err(Error::not_found(kind, requested)),
        }
    }
}

pub struct EntryStore {
    txn: Transaction,
    link_limit: u32,
}

impl EntryStore {
    pub(crate) fn new(txn: Transaction, link_limit: u32) -> Self {
        Self { txn, link_limit }
    }

    pub async fn entry(&self, at: &str) -> Result<Option<Entry>> {
        match self.txn.backend().get(Collection::Entries, at).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The entry at `at` itself, never following a link.
    pub async fn require(&self, at: &str, kind: OpKind) -> Result<Entry> {
        self.entry(at)
            .await?
            .ok_or_else(|| Error::not_found(kind, at))
    }

    pub async fn put_entry(&self, at: &str, entry: &Entry) -> Result<()> {
        self.txn.require_write()?;
        let bytes = serde_json::to_vec(entry)?;
        self.txn.backend().put(Collection::Entries, at, bytes).await
    }

    /// Inserts a new entry; the path must be free.
    pub async fn add_entry(&self, at: &str, entry: &Entry, kind: OpKind) -> Result<()> {
        self.txn.require_write()?;
        if self.entry(at).await?.is_some() {
            return Err(Error::already_exists(kind, at));
        }
        let bytes = serde_json::to_vec(entry)?;
        self.txn.backend().add(Collection::Entries, at, bytes).await
    }

    /// Deletes the entry and any content stored for it.
    pub async fn delete_entry(&self, at: &str) -> Result<()> {
        self.txn.require_write()?;
        self.txn.backend().delete(Collection::Entries, at).await?;
        self.txn.backend().delete(Collection::Content, at).await
    }

    /// File bytes at `at`; missing content reads as empty.
    pub async fn content(&self, at: &str) -> Result<Vec<u8>> {
        Ok(self
            .txn
            .backend()
            .get(Collection::Content, at)
            .await?
            .unwrap_or_default())
    }

    pub async fn put_content(&self, at: &str, bytes: Vec<u8>) -> Result<()> {
        self.txn.require_write()?;
        self.txn.backend().put(Collection::Content, at, bytes).await
    }

    /// Immediate children of `dir`, in key order.
    pub async fn children(&self, dir: &str) -> Result<Vec<(String, Entry)>> {
        let mut found = Vec::new();
        for (key, entry) in self.descendants(dir).await? {
            if path::parent_of(dir, &key) {
                found.push((key, entry));
            }
        }
        Ok(found)
    }

    /// Every entry strictly below `dir`, in key order.
    pub async fn descendants(&self, dir: &str) -> Result<Vec<(String, Entry)>> {
        let prefix = if dir == path::ROOT {
            path::ROOT.to_string()
        } else {
            format!("{dir}/")
        };
        let mut found = Vec::new();
        for (key, bytes) in self.txn.backend().scan_prefix(Collection::Entries, &prefix).await? {
            if key != dir {
                found.push((key, serde_json::from_slice(&bytes)?));
            }
        }
        Ok(found)
    }

    /// Follows links through every component of `at`, including the last.
    pub async fn resolve(&self, at: &str, kind: OpKind) -> Result<Resolved> {
        self.walk(at, true, kind).await
    }

    /// Follows links through the parent components of `at` only; the final
    /// component names the entry itself, even if it is a link.
    pub async fn locate(&self, at: &str, kind: OpKind) -> Result<Resolved> {
        self.walk(at, false, kind).await
    }

    async fn walk(&self, at: &str, follow_final: bool, kind: OpKind) -> Result<Resolved> {
        let requested = path::normalize_path(at);
        let mut pending: VecDeque<String> = path::segments(&requested).map(str::to_string).collect();
        let mut current = path::ROOT.to_string();
        let mut hops = 0u32;

        while let Some(segment) = pending.pop_front() {
            let next = path::normalize(&[current.as_str(), segment.as_str()]);
            let last = pending.is_empty();
            match self.entry(&next).await? {
                Some(Entry::Link(link)) if follow_final || !last => {
                    hops += 1;
                    if hops > self.link_limit {
                        return Err(Error::link_loop(kind, &requested));
                    }
                    for part in path::segments(&link.target_path).collect::<Vec<_>>().into_iter().rev() {
                        pending.push_front(part.to_string());
                    }
                    current = path::ROOT.to_string();
                }
                _ => current = next,
            }
        }

        let entry = self.entry(&current).await?;
        Ok(Resolved {
            path: current,
            entry,
        })
    }

    pub async fn commit(self) -> Result<()> {
        self.txn.commit().await
    }

    pub fn rollback(self) {
        self.txn.rollback();
    }
}
