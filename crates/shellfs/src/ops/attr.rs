// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Metadata: modes, owners, listings, sizes and lookups.

use crate::entry::Entry;
use crate::error::{Error, OpKind, Result};
use crate::fs::{FileStore, authorize};
use crate::mode::{Mode, Operation};
use crate::path;
use crate::store::{EntryStore, Resolved};
use crate::user::UserId;

impl FileStore {
    /// Sets the mode of the entry at `at` from user input such as `"750"`.
    pub async fn change_mode(&self, at: &str, value: &str, user: &UserId) -> Result<Mode> {
        let kind = OpKind::Write;
        let mode = Mode::format(value)
            .ok_or_else(|| Error::invalid_argument(kind, at, format!("not a mode: {value:?}")))?;
        let store = self.begin_write().await?;
        let (resolved, mut entry) = store.resolve(at, kind).await?.require(kind, at)?;
        authorize(&entry, &resolved, user, Operation::Write)?;
        entry.set_mode(mode);
        store.put_entry(&resolved, &entry).await?;
        store.commit().await?;
        Ok(mode)
    }

    /// Gives the entry at `at` to `owner`. Only root and the current owner
    /// may do this.
    pub async fn change_owner(&self, at: &str, owner: UserId, user: &UserId) -> Result<()> {
        let kind = OpKind::Write;
        let store = self.begin_write().await?;
        let (resolved, mut entry) = store.resolve(at, kind).await?.require(kind, at)?;
        if !user.is_root() && entry.owner() != user {
            return Err(Error::unauthorized(&resolved, Operation::Write));
        }
        entry.set_owner(owner);
        store.put_entry(&resolved, &entry).await?;
        store.commit().await
    }

    /// Base names of the children of a directory, sorted.
    pub async fn list_directory(&self, at: &str, user: &UserId) -> Result<Vec<String>> {
        let kind = OpKind::Read;
        let store = self.begin_read().await?;
        let (resolved, entry) = store.resolve(at, kind).await?.require(kind, at)?;
        if !entry.is_directory() {
            return Err(Error::not_a_directory(kind, at));
        }
        authorize(&entry, &resolved, user, Operation::Read)?;
        let mut names: Vec<String> = store
            .children(&resolved)
            .await?
            .into_iter()
            .map(|(_, child)| child.base_name().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Content length of a file, or the total over every file below a
    /// directory. Links inside a directory are not followed.
    pub async fn get_size(&self, at: &str) -> Result<u64> {
        let kind = OpKind::Read;
        let store = self.begin_read().await?;
        let (resolved, entry) = store.resolve(at, kind).await?.require(kind, at)?;
        match entry {
            Entry::File(_) => Ok(store.content(&resolved).await?.len() as u64),
            Entry::Directory(_) => {
                let mut total = 0u64;
                for (key, child) in store.descendants(&resolved).await? {
                    if child.is_file() {
                        total += store.content(&key).await?.len() as u64;
                    }
                }
                Ok(total)
            }
            Entry::Link(_) => Ok(0),
        }
    }

    /// The entry `at` refers to, following links. Requires read access to
    /// the containing directory.
    pub async fn stat(&self, at: &str, user: &UserId) -> Result<Entry> {
        let kind = OpKind::Read;
        let store = self.begin_read().await?;
        let (resolved, entry) = store.resolve(at, kind).await?.require(kind, at)?;
        check_listing(&store, &resolved, user).await?;
        Ok(entry)
    }

    /// The entry stored at `at` itself, even when it is a link.
    pub async fn lstat(&self, at: &str, user: &UserId) -> Result<Entry> {
        let kind = OpKind::Read;
        let store = self.begin_read().await?;
        let (located, entry) = store.locate(at, kind).await?.require(kind, at)?;
        check_listing(&store, &located, user).await?;
        Ok(entry)
    }

    /// Whether an entry is stored at `at`. A broken link exists.
    pub async fn exists(&self, at: &str) -> Result<bool> {
        let store = self.begin_read().await?;
        Ok(store.locate(at, OpKind::Read).await?.entry.is_some())
    }

    /// Follows every link in `at`.
    pub async fn resolve(&self, at: &str) -> Result<Resolved> {
        let store = self.begin_read().await?;
        store.resolve(at, OpKind::Read).await
    }
}

async fn check_listing(store: &EntryStore, at: &str, user: &UserId) -> Result<()> {
    let Some(parent_path) = path::dirname(at) else {
        return Ok(());
    };
    let parent = store.require(&parent_path, OpKind::Read).await?;
    authorize(&parent, &parent_path, user, Operation::Read)
}
