// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::entry::Entry;
use crate::error::{Error, OpKind, Result};
use crate::fs::{FileStore, authorize};
use crate::mode::Operation;
use crate::options::{RemoveOptions, UnlinkOptions};
use crate::path;
use crate::store::EntryStore;
use crate::user::UserId;
use diagnostics::debug;

/// Rules for one removal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Removal {
    pub kind: OpKind,
    pub recursive: bool,
    /// Ignore outstanding link references.
    pub force: bool,
}

impl FileStore {
    /// Removes the entry at `at`. A link is removed, not its target.
    pub async fn remove(&self, at: &str, options: RemoveOptions) -> Result<()> {
        let rules = Removal {
            kind: OpKind::Delete,
            recursive: options.recursive,
            force: false,
        };
        let store = self.begin_write().await?;
        _ = remove_in(&store, at, &options.user, rules).await?;
        store.commit().await
    }

    /// Like [`FileStore::remove`], but `force` also removes entries that
    /// are still link targets, and implies `recursive`.
    pub async fn unlink(&self, at: &str, options: UnlinkOptions) -> Result<()> {
        let rules = Removal {
            kind: OpKind::Unlink,
            recursive: options.recursive || options.force,
            force: options.force,
        };
        let store = self.begin_write().await?;
        _ = remove_in(&store, at, &options.user, rules).await?;
        store.commit().await
    }
}

/// Removes `at` and, for a directory, everything below it. Returns the
/// number of entries removed. Any violation fails the whole call; the
/// caller's transaction then discards the partial work.
pub(crate) async fn remove_in(store: &EntryStore, at: &str, user: &UserId, rules: Removal) -> Result<usize> {
    let kind = rules.kind;
    let (target, entry) = store.locate(at, kind).await?.require(kind, at)?;
    if target == path::ROOT {
        return Err(Error::invalid_argument(kind, at, "the root directory cannot be removed"));
    }

    let mut doomed = Vec::new();
    if entry.is_directory() {
        let below = store.descendants(&target).await?;
        if !below.is_empty() && !rules.recursive {
            return Err(Error::not_empty(kind, at));
        }
        doomed = below;
    }
    doomed.push((target.clone(), entry));

    // Links going away release their targets first, so a link and its
    // target can leave together.
    for (_, entry) in &doomed {
        let Some(link) = entry.as_link() else {
            continue;
        };
        if let Some(mut pointee) = store.entry(&link.target_path).await? {
            pointee.drop_link();
            store.put_entry(&link.target_path, &pointee).await?;
        }
    }

    doomed.sort_by_key(|(key, _)| std::cmp::Reverse(path::depth(key)));
    for (key, _) in &doomed {
        let Some(current) = store.entry(key).await? else {
            continue;
        };
        if current.links() > 0 && !rules.force {
            return Err(Error::has_links(kind, key, current.links()));
        }
        check_parent(store, key, user, kind).await?;
        store.delete_entry(key).await?;
    }
    debug!("removed {count} entries at {path}", count: doomed.len(), path: target.as_str());
    Ok(doomed.len())
}

async fn check_parent(store: &EntryStore, key: &str, user: &UserId, kind: OpKind) -> Result<()> {
    let Some(parent_path) = path::dirname(key) else {
        return Ok(());
    };
    let parent: Entry = store.require(&parent_path, kind).await?;
    authorize(&parent, &parent_path, user, Operation::Write)
}
