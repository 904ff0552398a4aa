// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::place;
use crate::entry::Entry;
use crate::error::{Error, OpKind, Result};
use crate::fs::{FileStore, authorize};
use crate::mode::Operation;
use crate::options::LinkOptions;
use chrono::Utc;
use diagnostics::debug;

impl FileStore {
    /// Creates a link at `to` pointing at the entry at `from`.
    ///
    /// If `from` is itself a link, the new link points at that link, not
    /// at its target.
    pub async fn create_link(&self, from: &str, to: &str, options: LinkOptions) -> Result<Entry> {
        let kind = OpKind::Link;
        let store = self.begin_write().await?;
        let (target, mut pointee) = store.locate(from, kind).await?.require(kind, from)?;

        let placement = place(&store, to, kind).await?;
        if store.entry(&placement.at).await?.is_some() {
            return Err(Error::already_exists(kind, to));
        }
        authorize(&placement.parent, &placement.parent_path, &options.user, Operation::Write)?;

        pointee.add_link();
        store.put_entry(&target, &pointee).await?;

        let owner = options.owner.unwrap_or_else(|| options.user.clone());
        let mode = options.mode.unwrap_or(self.config().link_mode);
        let link = Entry::link(&placement.at, &target, owner, mode, Utc::now());
        store.add_entry(&placement.at, &link, kind).await?;
        store.commit().await?;

        debug!("linked {link} to {target}", link: placement.at.as_str(), target: target.as_str());
        Ok(link)
    }
}
