// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Reserved name of the identity that bypasses every permission check.
pub const ROOT_NAME: &str = "root";

/// Identity of a requester or an entry owner.
///
/// `None` is the anonymous guest. Names are opaque: authentication happens
/// outside the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Option<String>);

impl UserId {
    #[must_use]
    pub fn guest() -> Self {
        Self(None)
    }

    #[must_use]
    pub fn root() -> Self {
        Self(Some(ROOT_NAME.to_string()))
    }

    pub fn named<S: Into<String>>(name: S) -> Self {
        Self(Some(name.into()))
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.name() == Some(ROOT_NAME)
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.0.is_none()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name().unwrap_or("guest"))
    }
}

impl From<&str> for UserId {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<Option<String>> for UserId {
    fn from(name: Option<String>) -> Self {
        Self(name)
    }
}
