// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::{Session, kind_marker};
use shellfs::path;

/// One name per line, or `ls -l` style rows with `long`.
pub async fn ls_command(session: &Session, dir: &str, long: bool) -> Result<String> {
    let names = session.fs.list_directory(dir, &session.user).await?;
    if !long {
        return Ok(names.join("\n"));
    }

    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        let child = path::join(&[dir, name.as_str()]);
        let entry = session.fs.lstat(&child, &session.user).await?;
        let size = if entry.is_file() {
            session.fs.get_size(&child).await?
        } else {
            0
        };
        let mut row = format!(
            "{}{} {:<8} {:>6} {}",
            kind_marker(&entry),
            entry.mode().symbolic(),
            entry.owner().to_string(),
            size,
            name
        );
        if let Some(link) = entry.as_link() {
            row.push_str(&format!(" -> {}", link.target_path));
        }
        rows.push(row);
    }
    Ok(rows.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;
    use shellfs::LinkOptions;

    #[tokio::test]
    async fn test_short_listing() {
        let session = test_session().await;
        assert_eq!(ls_command(&session, "/", false).await.unwrap(), "etc\nhome\nroot\ntmp");
    }

    #[tokio::test]
    async fn test_long_listing_shows_links() {
        let session = test_session().await;
        _ = session
            .fs
            .create_link("/etc/motd", "/tmp/motd", LinkOptions::new(session.user.clone()))
            .await
            .unwrap();
        let listing = ls_command(&session, "/tmp", true).await.unwrap();
        assert_eq!(listing, "lrwxrwxrwx root          0 motd -> /etc/motd");

        let etc = ls_command(&session, "/etc", true).await.unwrap();
        assert!(etc.contains("-rw-r--r-- root          9 motd"), "{etc}");
    }
}
