// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{Placement, place};
use crate::entry::{Entry, EntryKind};
use crate::error::{Error, OpKind, Result};
use crate::fs::{FileStore, authorize};
use crate::mode::Operation;
use crate::options::CreateOptions;
use crate::path;
use crate::store::EntryStore;
use chrono::Utc;
use diagnostics::debug;
use futures::FutureExt;
use futures::future::BoxFuture;

/// What to do once the target path is known to be free or taken.
enum Slot {
    Free(Placement),
    Taken(Entry),
}

impl FileStore {
    pub async fn create_directory(&self, at: &str, options: CreateOptions) -> Result<Entry> {
        let store = self.begin_write().await?;
        let entry = self.create_directory_in(&store, at, &options).await?;
        store.commit().await?;
        Ok(entry)
    }

    /// Creates a file holding `content`. With `soft`, an existing file is
    /// returned untouched.
    pub async fn create_file(&self, at: &str, options: CreateOptions, content: &[u8]) -> Result<Entry> {
        let store = self.begin_write().await?;
        let entry = self.create_file_in(&store, at, &options, content).await?;
        store.commit().await?;
        Ok(entry)
    }

    pub fn create_directory_in<'a>(
        &'a self,
        store: &'a EntryStore,
        at: &'a str,
        options: &'a CreateOptions,
    ) -> BoxFuture<'a, Result<Entry>> {
        async move {
            match self.claim(store, at, options, EntryKind::Directory).await? {
                Slot::Taken(existing) => Ok(existing),
                Slot::Free(placement) => {
                    let mode = options.mode.unwrap_or(self.config().directory_mode);
                    let entry = Entry::directory(&placement.at, options.owner_or_user(), mode, Utc::now());
                    store.add_entry(&placement.at, &entry, OpKind::Create).await?;
                    debug!("created directory {path}", path: placement.at.as_str());
                    Ok(entry)
                }
            }
        }
        .boxed()
    }

    pub async fn create_file_in(
        &self,
        store: &EntryStore,
        at: &str,
        options: &CreateOptions,
        content: &[u8],
    ) -> Result<Entry> {
        match self.claim(store, at, options, EntryKind::File).await? {
            Slot::Taken(existing) => Ok(existing),
            Slot::Free(placement) => {
                let mode = options.mode.unwrap_or(self.config().file_mode);
                let entry = Entry::file(&placement.at, options.owner_or_user(), mode, Utc::now());
                store.add_entry(&placement.at, &entry, OpKind::Create).await?;
                if !content.is_empty() {
                    store.put_content(&placement.at, content.to_vec()).await?;
                }
                debug!("created file {path} with {size} bytes", path: placement.at.as_str(), size: content.len());
                Ok(entry)
            }
        }
    }

    /// Finds the parent, creating it first when `recursive`, and decides
    /// whether the name is free.
    async fn claim(
        &self,
        store: &EntryStore,
        at: &str,
        options: &CreateOptions,
        kind: EntryKind,
    ) -> Result<Slot> {
        let requested = path::normalize_path(at);
        if requested == path::ROOT {
            let root = store.require(path::ROOT, OpKind::Create).await?;
            return taken(root, &requested, options, kind);
        }

        let placement = match place(store, &requested, OpKind::Create).await {
            Err(Error::NotFound { .. }) if options.recursive => {
                let parent = path::dirname(&requested).unwrap_or_else(|| path::ROOT.to_string());
                let parent_options = CreateOptions {
                    mode: match kind {
                        EntryKind::Directory => options.mode,
                        _ => None,
                    },
                    soft: true,
                    ..options.clone()
                };
                _ = self.create_directory_in(store, &parent, &parent_options).await?;
                place(store, &requested, OpKind::Create).await?
            }
            other => other?,
        };

        if let Some(existing) = store.entry(&placement.at).await? {
            return taken(existing, &placement.at, options, kind);
        }
        authorize(&placement.parent, &placement.parent_path, &options.user, Operation::Write)?;
        Ok(Slot::Free(placement))
    }
}

fn taken(existing: Entry, at: &str, options: &CreateOptions, kind: EntryKind) -> Result<Slot> {
    if !options.soft {
        return Err(Error::already_exists(OpKind::Create, at));
    }
    match (kind, existing.kind()) {
        (wanted, found) if wanted == found => Ok(Slot::Taken(existing)),
        (EntryKind::Directory, _) => Err(Error::not_a_directory(OpKind::Create, at)),
        _ => Err(Error::not_a_file(OpKind::Create, at)),
    }
}
