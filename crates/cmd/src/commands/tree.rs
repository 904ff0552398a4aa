// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Renders a directory hierarchy with box-drawing connectors.

use anyhow::Result;
use futures::future::BoxFuture;

use crate::common::Session;
use shellfs::path;

struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

pub async fn tree_command(session: &Session, at: &str) -> Result<String> {
    let root = build(session, at.to_string(), path::normalize_path(at)).await?;
    let mut output = format!("{}\n", root.label);
    render(&mut output, &root.children, "");
    Ok(output)
}

fn build(session: &Session, at: String, label: String) -> BoxFuture<'_, Result<TreeNode>> {
    Box::pin(async move {
        let entry = session.fs.lstat(&at, &session.user).await?;
        let label = match entry.as_link() {
            Some(link) => format!("{label} -> {}", link.target_path),
            None => label,
        };
        let mut children = Vec::new();
        if entry.is_directory() {
            for name in session.fs.list_directory(&at, &session.user).await? {
                let child = path::join(&[at.as_str(), name.as_str()]);
                children.push(build(session, child, name).await?);
            }
        }
        Ok(TreeNode { label, children })
    })
}

fn render(output: &mut String, children: &[TreeNode], prefix: &str) {
    for (index, child) in children.iter().enumerate() {
        let last = index + 1 == children.len();
        let (connector, carry) = match (last, child.children.is_empty()) {
            (true, true) => ("└──", ' '),
            (false, true) => ("├──", '│'),
            (true, false) => ("└─┬", ' '),
            (false, false) => ("├─┬", '│'),
        };
        output.push_str(&format!("{prefix}{connector} {}\n", child.label));
        if !child.children.is_empty() {
            render(output, &child.children, &format!("{prefix}{carry} "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_session;
    use shellfs::{CreateOptions, LinkOptions};

    #[tokio::test]
    async fn test_tree_of_seeded_store() {
        let session = test_session().await;
        let output = tree_command(&session, "/").await.unwrap();
        assert_eq!(
            output,
            "/\n├─┬ etc\n│ ├── hostname\n│ └── motd\n├── home\n├── root\n└── tmp\n"
        );
    }

    #[tokio::test]
    async fn test_tree_labels_links() {
        let session = test_session().await;
        let user = session.user.clone();
        _ = session
            .fs
            .create_directory("/tmp/a/b", CreateOptions::new(user.clone()).recursive())
            .await
            .unwrap();
        _ = session
            .fs
            .create_link("/etc", "/tmp/a/conf", LinkOptions::new(user))
            .await
            .unwrap();

        let output = tree_command(&session, "/tmp").await.unwrap();
        assert_eq!(output, "/tmp\n└─┬ a\n  ├── b\n  └── conf -> /etc\n");
    }
}
