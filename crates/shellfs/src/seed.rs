// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Initial filesystem contents.
//!
//! A seed is a nested literal: each name maps to `[mode, body]`, where the
//! body is a string for a file or a map for a directory.
//!
//! ```yaml
//! etc:
//!   - 755
//!   - motd: [644, "welcome\n"]
//! tmp: [777, {}]
//! ```

use crate::error::{Error, Result};
use crate::fs::FileStore;
use crate::mode::Mode;
use crate::options::CreateOptions;
use crate::path;
use crate::user::UserId;
use diagnostics::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(pub BTreeMap<String, SeedNode>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedNode(pub u16, pub SeedBody);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedBody {
    Content(String),
    Tree(BTreeMap<String, SeedNode>),
}

impl SeedNode {
    pub fn file<S: Into<String>>(mode: u16, content: S) -> Self {
        Self(mode, SeedBody::Content(content.into()))
    }

    pub fn directory<I: IntoIterator<Item = (String, SeedNode)>>(mode: u16, children: I) -> Self {
        Self(mode, SeedBody::Tree(children.into_iter().collect()))
    }
}

impl Seed {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml_ng::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// The usual top-level layout of a fresh system.
    #[must_use]
    pub fn standard() -> Self {
        let mut top = BTreeMap::new();
        _ = top.insert(
            "etc".to_string(),
            SeedNode::directory(
                755,
                [
                    ("motd".to_string(), SeedNode::file(644, "Welcome.\n")),
                    ("hostname".to_string(), SeedNode::file(644, "shellfs\n")),
                ],
            ),
        );
        _ = top.insert("home".to_string(), SeedNode(755, SeedBody::Tree(BTreeMap::new())));
        _ = top.insert("root".to_string(), SeedNode(700, SeedBody::Tree(BTreeMap::new())));
        _ = top.insert("tmp".to_string(), SeedNode(777, SeedBody::Tree(BTreeMap::new())));
        Self(top)
    }

    /// Number of entries the seed describes.
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(nodes: &BTreeMap<String, SeedNode>) -> usize {
            nodes
                .values()
                .map(|SeedNode(_, body)| match body {
                    SeedBody::Content(_) => 1,
                    SeedBody::Tree(children) => 1 + count(children),
                })
                .sum()
        }
        count(&self.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What seeding did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    /// Entries that were already present and left alone.
    pub existing: Vec<String>,
}

impl FileStore {
    /// Creates every entry of `seed` that does not exist yet, as root, in
    /// one transaction. Existing entries keep their mode and content.
    pub async fn seed(&self, seed: &Seed) -> Result<SeedReport> {
        let root = UserId::root();
        let store = self.begin_write().await?;
        let mut report = SeedReport::default();
        let mut pending: VecDeque<(String, &SeedNode)> = seed
            .0
            .iter()
            .map(|(name, node)| (path::normalize(&[path::ROOT, name.as_str()]), node))
            .collect();

        while let Some((at, SeedNode(mode, body))) = pending.pop_front() {
            let existed = store.entry(&at).await?.is_some();
            let options = CreateOptions::new(root.clone())
                .mode(Mode::from_number(u32::from(*mode)))
                .soft();
            match body {
                SeedBody::Content(content) => {
                    _ = self.create_file_in(&store, &at, &options, content.as_bytes()).await?;
                }
                SeedBody::Tree(children) => {
                    _ = self.create_directory_in(&store, &at, &options).await?;
                    pending.extend(
                        children
                            .iter()
                            .map(|(name, node)| (path::normalize(&[at.as_str(), name.as_str()]), node)),
                    );
                }
            }
            if existed {
                report.existing.push(at);
            } else {
                report.created.push(at);
            }
        }

        store.commit().await?;
        info!("seeded {created} entries, {existing} already present", created: report.created.len(), existing: report.existing.len());
        Ok(report)
    }
}
