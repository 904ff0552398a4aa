// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Per-call options. Every operation is performed on behalf of a user;
//! the remaining fields default to the conservative choice.

use crate::mode::Mode;
use crate::user::UserId;

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub user: UserId,
    /// Owner of the new entry; the requesting user when absent.
    pub owner: Option<UserId>,
    /// Mode of the new entry; the configured default when absent.
    pub mode: Option<Mode>,
    /// Create missing parent directories.
    pub recursive: bool,
    /// Return an existing entry of the same kind instead of failing.
    pub soft: bool,
}

impl CreateOptions {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    #[must_use]
    pub fn soft(mut self) -> Self {
        self.soft = true;
        self
    }

    pub(crate) fn owner_or_user(&self) -> UserId {
        self.owner.clone().unwrap_or_else(|| self.user.clone())
    }
}

/// How new bytes combine with a file's existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteKind {
    /// Overwrite starting at the position, extending the file as needed.
    #[default]
    Override,
    Append,
    Prepend,
    /// Splice in at the position without overwriting.
    Insert,
    /// Replace the whole content.
    Rewrite,
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub user: UserId,
    pub kind: WriteKind,
    /// Byte offset for `Override` and `Insert`; clamped to the content length.
    pub position: usize,
}

impl WriteOptions {
    pub fn new(user: UserId, kind: WriteKind) -> Self {
        Self {
            user,
            kind,
            position: 0,
        }
    }

    #[must_use]
    pub fn at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    pub user: UserId,
    pub recursive: bool,
}

impl RemoveOptions {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            recursive: false,
        }
    }

    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnlinkOptions {
    pub user: UserId,
    /// Remove entries that are still link targets. Implies `recursive`.
    pub force: bool,
    pub recursive: bool,
}

impl UnlinkOptions {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }
}

/// Options for move and copy.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    pub user: UserId,
    /// Replace an existing destination.
    pub force: bool,
}

impl TransferOptions {
    pub fn new(user: UserId) -> Self {
        Self { user, force: false }
    }

    #[must_use]
    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
    pub user: UserId,
    pub owner: Option<UserId>,
    pub mode: Option<Mode>,
}

impl LinkOptions {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    pub user: UserId,
    /// Create an empty file when none exists.
    pub create: bool,
}

impl OpenOptions {
    pub fn new(user: UserId) -> Self {
        Self { user, create: false }
    }

    #[must_use]
    pub fn create(mut self) -> Self {
        self.create = true;
        self
    }
}
