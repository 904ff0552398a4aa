// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

mod create_remove;
mod permissions;
mod seeding;

use crate::fs::FileStore;
use crate::options::CreateOptions;
use crate::user::UserId;

pub(crate) async fn new_fs() -> FileStore {
    FileStore::in_memory().await.unwrap()
}

pub(crate) fn root() -> UserId {
    UserId::root()
}

pub(crate) fn alice() -> UserId {
    UserId::named("alice")
}

pub(crate) fn bob() -> UserId {
    UserId::named("bob")
}

/// A store with `/home/alice` owned by alice.
pub(crate) async fn with_home() -> FileStore {
    let fs = new_fs().await;
    _ = fs
        .create_directory("/home/alice", CreateOptions::new(root()).owner(alice()).recursive())
        .await
        .unwrap();
    fs
}
