// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::place;
use super::remove::{Removal, remove_in};
use crate::entry::Entry;
use crate::error::{Error, OpKind, Result};
use crate::fs::{FileStore, authorize};
use crate::mode::Operation;
use crate::options::TransferOptions;
use crate::path;
use crate::store::EntryStore;
use chrono::Utc;
use diagnostics::debug;

/// Source and destination of a move or copy, checked and resolved.
struct Route {
    from: String,
    entry: Entry,
    to: String,
}

impl FileStore {
    /// Moves an entry, and everything below a directory, to `to`.
    ///
    /// Links elsewhere that pointed into the moved tree follow it.
    pub async fn move_entry(&self, from: &str, to: &str, options: TransferOptions) -> Result<()> {
        let kind = OpKind::Write;
        let store = self.begin_write().await?;
        let route = route(&store, from, to, &options, kind).await?;
        let from_parent = path::dirname(&route.from).unwrap_or_else(|| path::ROOT.to_string());
        let parent = store.require(&from_parent, kind).await?;
        authorize(&parent, &from_parent, &options.user, Operation::Write)?;

        let mut moving = store.descendants(&route.from).await?;
        moving.insert(0, (route.from.clone(), route.entry));
        for (key, mut entry) in moving.iter().cloned() {
            let moved = path::rebase(&key, &route.from, &route.to);
            let content = if entry.is_file() {
                Some(store.content(&key).await?)
            } else {
                None
            };
            store.delete_entry(&key).await?;
            entry.relocate(&moved);
            store.put_entry(&moved, &entry).await?;
            if let Some(bytes) = content.filter(|bytes| !bytes.is_empty()) {
                store.put_content(&moved, bytes).await?;
            }
        }

        for (key, entry) in store.descendants(path::ROOT).await? {
            let Entry::Link(mut link) = entry else {
                continue;
            };
            if link.target_path == route.from || path::is_descendant(&route.from, &link.target_path) {
                link.target_path = path::rebase(&link.target_path, &route.from, &route.to);
                store.put_entry(&key, &Entry::Link(link)).await?;
            }
        }

        debug!("moved {count} entries from {from} to {to}", count: moving.len(), from: route.from.as_str(), to: route.to.as_str());
        store.commit().await
    }

    /// Copies an entry, and everything below a directory, to `to`.
    ///
    /// Copies belong to the requesting user, except that root keeps the
    /// original owners.
    pub async fn copy_entry(&self, from: &str, to: &str, options: TransferOptions) -> Result<()> {
        let kind = OpKind::Read;
        let store = self.begin_write().await?;
        let route = route(&store, from, to, &options, kind).await?;

        let mut copying = store.descendants(&route.from).await?;
        copying.insert(0, (route.from.clone(), route.entry));
        let now = Utc::now();
        for (key, entry) in &copying {
            authorize(entry, key, &options.user, Operation::Read)?;
            let owner = if options.user.is_root() {
                entry.owner().clone()
            } else {
                options.user.clone()
            };
            let copied = path::rebase(key, &route.from, &route.to);
            let duplicate = entry.duplicate(&copied, owner, now);
            store.put_entry(&copied, &duplicate).await?;
            if entry.is_file() {
                let bytes = store.content(key).await?;
                if !bytes.is_empty() {
                    store.put_content(&copied, bytes).await?;
                }
            }
            if let Some(link) = duplicate.as_link() {
                if let Some(mut pointee) = store.entry(&link.target_path).await? {
                    pointee.add_link();
                    store.put_entry(&link.target_path, &pointee).await?;
                }
            }
        }

        debug!("copied {count} entries from {from} to {to}", count: copying.len(), from: route.from.as_str(), to: route.to.as_str());
        store.commit().await
    }
}

/// Locates the source without following a final link, places the
/// destination, and clears it when `force` allows.
async fn route(store: &EntryStore, from: &str, to: &str, options: &TransferOptions, kind: OpKind) -> Result<Route> {
    let (source, mut entry) = store.locate(from, kind).await?.require(kind, from)?;
    if source == path::ROOT {
        return Err(Error::invalid_argument(kind, from, "the root directory cannot be moved or copied"));
    }

    let placement = place(store, to, kind).await?;
    let target = placement.at;
    if target == source || path::is_descendant(&source, &target) {
        return Err(Error::invalid_argument(kind, to, format!("cannot place {source} inside itself")));
    }
    if path::is_descendant(&target, &source) {
        return Err(Error::invalid_argument(kind, to, format!("{target} contains {source}")));
    }
    authorize(&placement.parent, &placement.parent_path, &options.user, Operation::Write)?;

    if let Some(existing) = store.entry(&target).await? {
        if !options.force {
            return Err(Error::already_exists(kind, &target));
        }
        authorize(&existing, &target, &options.user, Operation::ReadWrite)?;
        let replaced = Removal {
            kind: OpKind::Delete,
            recursive: true,
            force: false,
        };
        _ = remove_in(store, &target, &options.user, replaced).await?;
        // The removed entry may have been a link to the source.
        entry = store.require(&source, kind).await?;
    }

    Ok(Route {
        from: source,
        entry,
        to: target,
    })
}
