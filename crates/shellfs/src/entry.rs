// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::mode::Mode;
use crate::path;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of an entry, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Link,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntryKind::Directory => "directory",
            EntryKind::File => "file",
            EntryKind::Link => "link",
        })
    }
}

/// A record in the path-keyed entry table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    Directory(DirectoryEntry),
    File(FileEntry),
    Link(LinkEntry),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub owner: UserId,
    pub mode: Mode,
    pub links: u32,
    pub created: DateTime<Utc>,
    pub base_name: String,
    /// `None` only for the root.
    pub parent_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub owner: UserId,
    pub mode: Mode,
    pub links: u32,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub base_name: String,
    pub extension: String,
    pub parent_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    /// Normalized absolute path of the entry this link points at.
    pub target_path: String,
    pub owner: UserId,
    pub mode: Mode,
    pub links: u32,
    pub created: DateTime<Utc>,
    pub base_name: String,
    pub extension: Option<String>,
    pub parent_path: Option<String>,
}

impl Entry {
    pub fn directory(at: &str, owner: UserId, mode: Mode, now: DateTime<Utc>) -> Self {
        let parsed = path::parse(at);
        Entry::Directory(DirectoryEntry {
            owner,
            mode,
            links: 0,
            created: now,
            base_name: parsed.base,
            parent_path: path::dirname(&parsed.full),
        })
    }

    pub fn file(at: &str, owner: UserId, mode: Mode, now: DateTime<Utc>) -> Self {
        let parsed = path::parse(at);
        Entry::File(FileEntry {
            owner,
            mode,
            links: 0,
            created: now,
            updated: now,
            base_name: parsed.base,
            extension: parsed.extension,
            parent_path: path::dirname(&parsed.full),
        })
    }

    pub fn link(at: &str, target: &str, owner: UserId, mode: Mode, now: DateTime<Utc>) -> Self {
        let parsed = path::parse(at);
        Entry::Link(LinkEntry {
            target_path: path::normalize_path(target),
            owner,
            mode,
            links: 0,
            created: now,
            base_name: parsed.base,
            extension: Some(parsed.extension).filter(|ext| !ext.is_empty()),
            parent_path: path::dirname(&parsed.full),
        })
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Directory(_) => EntryKind::Directory,
            Entry::File(_) => EntryKind::File,
            Entry::Link(_) => EntryKind::Link,
        }
    }

    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory(_))
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File(_))
    }

    #[must_use]
    pub fn as_link(&self) -> Option<&LinkEntry> {
        match self {
            Entry::Link(link) => Some(link),
            _ => None,
        }
    }

    #[must_use]
    pub fn owner(&self) -> &UserId {
        match self {
            Entry::Directory(d) => &d.owner,
            Entry::File(f) => &f.owner,
            Entry::Link(l) => &l.owner,
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Entry::Directory(d) => d.mode,
            Entry::File(f) => f.mode,
            Entry::Link(l) => l.mode,
        }
    }

    #[must_use]
    pub fn links(&self) -> u32 {
        match self {
            Entry::Directory(d) => d.links,
            Entry::File(f) => f.links,
            Entry::Link(l) => l.links,
        }
    }

    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        match self {
            Entry::Directory(d) => d.created,
            Entry::File(f) => f.created,
            Entry::Link(l) => l.created,
        }
    }

    #[must_use]
    pub fn base_name(&self) -> &str {
        match self {
            Entry::Directory(d) => &d.base_name,
            Entry::File(f) => &f.base_name,
            Entry::Link(l) => &l.base_name,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        match self {
            Entry::Directory(d) => d.mode = mode,
            Entry::File(f) => f.mode = mode,
            Entry::Link(l) => l.mode = mode,
        }
    }

    pub fn set_owner(&mut self, owner: UserId) {
        match self {
            Entry::Directory(d) => d.owner = owner,
            Entry::File(f) => f.owner = owner,
            Entry::Link(l) => l.owner = owner,
        }
    }

    fn links_mut(&mut self) -> &mut u32 {
        match self {
            Entry::Directory(d) => &mut d.links,
            Entry::File(f) => &mut f.links,
            Entry::Link(l) => &mut l.links,
        }
    }

    pub fn add_link(&mut self) {
        let links = self.links_mut();
        *links = links.saturating_add(1);
    }

    pub fn drop_link(&mut self) {
        let links = self.links_mut();
        *links = links.saturating_sub(1);
    }

    /// Rewrites the path-derived fields after the entry moves to `at`.
    pub fn relocate(&mut self, at: &str) {
        let parsed = path::parse(at);
        let parent = path::dirname(&parsed.full);
        match self {
            Entry::Directory(d) => {
                d.base_name = parsed.base;
                d.parent_path = parent;
            }
            Entry::File(f) => {
                f.base_name = parsed.base;
                f.extension = parsed.extension;
                f.parent_path = parent;
            }
            Entry::Link(l) => {
                l.base_name = parsed.base;
                l.extension = Some(parsed.extension).filter(|ext| !ext.is_empty());
                l.parent_path = parent;
            }
        }
    }

    /// A fresh record for a copy placed at `at`: no links, new timestamps.
    #[must_use]
    pub fn duplicate(&self, at: &str, owner: UserId, now: DateTime<Utc>) -> Self {
        let mut copy = self.clone();
        copy.relocate(at);
        copy.set_owner(owner);
        *copy.links_mut() = 0;
        match &mut copy {
            Entry::Directory(d) => d.created = now,
            Entry::File(f) => {
                f.created = now;
                f.updated = now;
            }
            Entry::Link(l) => l.created = now,
        }
        copy
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if let Entry::File(f) = self {
            f.updated = now;
        }
    }
}
