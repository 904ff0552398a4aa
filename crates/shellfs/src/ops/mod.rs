// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The operation set of [`FileStore`](crate::FileStore), one file per family.
//!
//! Public operations open their own transaction and commit it on success.
//! The `*_in` variants run inside a caller's [`EntryStore`](crate::EntryStore)
//! so several steps can share one transaction.

mod attr;
mod create;
mod io;
mod link;
mod remove;
mod transfer;

pub use io::apply_write;

use crate::entry::Entry;
use crate::error::{Error, OpKind, Result};
use crate::path;
use crate::store::EntryStore;

/// Where a new name lands: the resolved parent directory and the final
/// path under it.
pub(crate) struct Placement {
    pub parent_path: String,
    pub parent: Entry,
    pub at: String,
}

/// Resolves the parent of `at` and requires it to be a directory.
pub(crate) async fn place(store: &EntryStore, at: &str, kind: OpKind) -> Result<Placement> {
    let requested = path::normalize_path(at);
    let (Some(parent_name), Some(base)) = (path::dirname(&requested), path::basename(&requested)) else {
        return Err(Error::invalid_argument(kind, &requested, "the root directory cannot be replaced"));
    };
    let (parent_path, parent) = store.resolve(&parent_name, kind).await?.require(kind, &parent_name)?;
    if !parent.is_directory() {
        return Err(Error::not_a_directory(kind, parent_name));
    }
    let at = path::normalize(&[parent_path.as_str(), base.as_str()]);
    Ok(Placement {
        parent_path,
        parent,
        at,
    })
}
