// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::mode::Operation;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// The kind of file operation that failed, carried by every domain error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Read,
    Write,
    Delete,
    Create,
    Link,
    Unlink,
    Execute,
    Open,
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OpKind::Read => "read",
            OpKind::Write => "write",
            OpKind::Delete => "delete",
            OpKind::Create => "create",
            OpKind::Link => "link",
            OpKind::Unlink => "unlink",
            OpKind::Execute => "execute",
            OpKind::Open => "open",
        };
        f.write_str(name)
    }
}

/// Represents errors that can occur in file store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind}: no such file or directory: {path}")]
    NotFound { kind: OpKind, path: String },

    #[error("{kind}: entry already exists: {path}")]
    AlreadyExists { kind: OpKind, path: String },

    #[error("{kind}: not a directory: {path}")]
    NotADirectory { kind: OpKind, path: String },

    #[error("{kind}: not a file: {path}")]
    NotAFile { kind: OpKind, path: String },

    #[error("{kind}: directory not empty: {path}")]
    NotEmpty { kind: OpKind, path: String },

    #[error("{kind}: {path} is the target of {links} link(s)")]
    HasLinks {
        kind: OpKind,
        path: String,
        links: u32,
    },

    #[error("permission denied ({op}): {path}")]
    Unauthorized { path: String, op: Operation },

    #[error("{kind}: invalid argument for {path}: {message}")]
    InvalidArgument {
        kind: OpKind,
        path: String,
        message: String,
    },

    #[error("{kind}: too many levels of links: {path}")]
    LinkLoop { kind: OpKind, path: String },

    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("gave up waiting for write admission after {0:?}")]
    AdmissionTimeout(Duration),

    #[error("write admission cancelled")]
    Cancelled,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("entry encoding error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found<P: AsRef<str>>(kind: OpKind, path: P) -> Self {
        Error::NotFound {
            kind,
            path: path.as_ref().to_string(),
        }
    }

    pub fn already_exists<P: AsRef<str>>(kind: OpKind, path: P) -> Self {
        Error::AlreadyExists {
            kind,
            path: path.as_ref().to_string(),
        }
    }

    pub fn not_a_directory<P: AsRef<str>>(kind: OpKind, path: P) -> Self {
        Error::NotADirectory {
            kind,
            path: path.as_ref().to_string(),
        }
    }

    pub fn not_a_file<P: AsRef<str>>(kind: OpKind, path: P) -> Self {
        Error::NotAFile {
            kind,
            path: path.as_ref().to_string(),
        }
    }

    pub fn not_empty<P: AsRef<str>>(kind: OpKind, path: P) -> Self {
        Error::NotEmpty {
            kind,
            path: path.as_ref().to_string(),
        }
    }

    pub fn has_links<P: AsRef<str>>(kind: OpKind, path: P, links: u32) -> Self {
        Error::HasLinks {
            kind,
            path: path.as_ref().to_string(),
            links,
        }
    }

    pub fn unauthorized<P: AsRef<str>>(path: P, op: Operation) -> Self {
        Error::Unauthorized {
            path: path.as_ref().to_string(),
            op,
        }
    }

    pub fn invalid_argument<P: AsRef<str>, M: Into<String>>(kind: OpKind, path: P, message: M) -> Self {
        Error::InvalidArgument {
            kind,
            path: path.as_ref().to_string(),
            message: message.into(),
        }
    }

    pub fn link_loop<P: AsRef<str>>(kind: OpKind, path: P) -> Self {
        Error::LinkLoop {
            kind,
            path: path.as_ref().to_string(),
        }
    }

    /// The operation kind of a domain error, if this is one.
    #[must_use]
    pub fn kind(&self) -> Option<OpKind> {
        match self {
            Error::NotFound { kind, .. }
            | Error::AlreadyExists { kind, .. }
            | Error::NotADirectory { kind, .. }
            | Error::NotAFile { kind, .. }
            | Error::NotEmpty { kind, .. }
            | Error::HasLinks { kind, .. }
            | Error::InvalidArgument { kind, .. }
            | Error::LinkLoop { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The path named by the error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::NotFound { path, .. }
            | Error::AlreadyExists { path, .. }
            | Error::NotADirectory { path, .. }
            | Error::NotAFile { path, .. }
            | Error::NotEmpty { path, .. }
            | Error::HasLinks { path, .. }
            | Error::Unauthorized { path, .. }
            | Error::InvalidArgument { path, .. }
            | Error::LinkLoop { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_kind_and_path() {
        let err = Error::not_found(OpKind::Read, "/etc/motd");
        assert_eq!(err.to_string(), "read: no such file or directory: /etc/motd");
        assert_eq!(err.kind(), Some(OpKind::Read));
        assert_eq!(err.path(), Some("/etc/motd"));

        let err = Error::unauthorized("/home/alice/notes", Operation::Write);
        assert_eq!(err.to_string(), "permission denied (w): /home/alice/notes");
        assert_eq!(err.kind(), None);
    }
}
