// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::connection::ConnectionId;
use crate::entry::Entry;
use crate::error::{Error, OpKind, Result};
use crate::fs::{FileStore, authorize};
use crate::mode::Operation;
use crate::options::{WriteKind, WriteOptions};
use crate::store::EntryStore;
use crate::user::UserId;
use chrono::Utc;
use diagnostics::debug;
use std::sync::Arc;

/// Combines `current` content with `data` according to `kind`.
///
/// `position` is clamped to the current length.
#[must_use]
pub fn apply_write(current: &[u8], kind: WriteKind, position: usize, data: &[u8]) -> Vec<u8> {
    let position = position.min(current.len());
    match kind {
        WriteKind::Rewrite => data.to_vec(),
        WriteKind::Append => [current, data].concat(),
        WriteKind::Prepend => [data, current].concat(),
        WriteKind::Insert => [&current[..position], data, &current[position..]].concat(),
        WriteKind::Override => {
            let end = position + data.len();
            let tail: &[u8] = if end < current.len() { &current[end..] } else { &[] };
            [&current[..position], data, tail].concat()
        }
    }
}

impl FileStore {
    pub async fn read_file(&self, at: &str, user: &UserId) -> Result<Vec<u8>> {
        let store = self.begin_read().await?;
        let bytes = self.read_file_in(&store, at, user).await?;
        store.commit().await?;
        Ok(bytes)
    }

    pub async fn read_file_in(&self, store: &EntryStore, at: &str, user: &UserId) -> Result<Vec<u8>> {
        let (resolved, entry) = store.resolve(at, OpKind::Read).await?.require(OpKind::Read, at)?;
        if !entry.is_file() {
            return Err(Error::not_a_file(OpKind::Read, at));
        }
        authorize(&entry, &resolved, user, Operation::Read)?;
        store.content(&resolved).await
    }

    /// Changes the content of an existing file and notifies every open
    /// connection on it.
    pub async fn write_to_file(&self, at: &str, options: WriteOptions, data: &[u8]) -> Result<()> {
        _ = self.write_from(at, &options, data, None).await?;
        Ok(())
    }

    /// Writes on behalf of connection `origin`, which is not notified.
    /// Returns the resolved path and the new content.
    pub(crate) async fn write_from(
        &self,
        at: &str,
        options: &WriteOptions,
        data: &[u8],
        origin: Option<ConnectionId>,
    ) -> Result<(String, Arc<[u8]>)> {
        let store = self.begin_write().await?;
        let (resolved, content) = write_in(&store, at, options, data).await?;
        store.commit().await?;
        self.hub().publish(&resolved, origin, content.clone());
        Ok((resolved, content))
    }
}

async fn write_in(
    store: &EntryStore,
    at: &str,
    options: &WriteOptions,
    data: &[u8],
) -> Result<(String, Arc<[u8]>)> {
    let (resolved, mut entry) = store.resolve(at, OpKind::Write).await?.require(OpKind::Write, at)?;
    if !matches!(entry, Entry::File(_)) {
        return Err(Error::not_a_file(OpKind::Write, at));
    }
    authorize(&entry, &resolved, &options.user, Operation::Write)?;

    let current = store.content(&resolved).await?;
    let updated = apply_write(&current, options.kind, options.position, data);
    store.put_content(&resolved, updated.clone()).await?;
    entry.touch(Utc::now());
    store.put_entry(&resolved, &entry).await?;
    debug!("wrote {size} bytes to {path}", size: updated.len(), path: resolved.as_str());
    Ok((resolved, Arc::from(updated)))
}
