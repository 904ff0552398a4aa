// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};

use crate::common::Session;

/// Prints the stored entry as YAML. With `no_follow` a link is shown
/// itself rather than what it points at.
pub async fn stat_command(session: &Session, at: &str, no_follow: bool) -> Result<String> {
    let entry = if no_follow {
        session.fs.lstat(at, &session.user).await?
    } else {
        session.fs.stat(at, &session.user).await?
    };
    serde_yaml_ng::to_string(&entry).with_context(|| format!("could not render entry {at}"))
}
