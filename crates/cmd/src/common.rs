// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};
use diagnostics::debug;
use shellfs::{Entry, FileStore, MemoryBackend, Seed, StoreConfig, UserId};
use std::sync::Arc;

/// Environment variable naming the store configuration file; read by clap.
pub const CONFIG_ENV: &str = "SHELLFS_CONFIG";

/// Name that selects the anonymous user on the command line.
pub const GUEST_NAME: &str = "guest";

/// A seeded store and the user commands run as.
pub struct Session {
    pub fs: FileStore,
    pub user: UserId,
}

impl Session {
    pub async fn open(config: Option<&Path>, seed: Option<&Path>, user: Option<&str>) -> Result<Self> {
        let config = load_config(config)?;
        let seed = load_seed(seed)?;
        let fs = FileStore::new(Arc::new(MemoryBackend::new()), config).await?;
        let report = fs.seed(&seed).await?;
        debug!("session seeded with {count} entries", count: report.created.len());
        Ok(Self {
            fs,
            user: parse_user(user),
        })
    }
}

/// Reads the configuration from `file`, or uses the defaults. The CLI
/// fills `file` from `--config` or `$SHELLFS_CONFIG`.
pub fn load_config(file: Option<&Path>) -> Result<StoreConfig> {
    let Some(file) = file else {
        return Ok(StoreConfig::default());
    };
    debug!("loading configuration from {file}", file: file.display().to_string());
    StoreConfig::from_file(file).with_context(|| format!("could not load {}", file.display()))
}

/// Reads a JSON or YAML seed, chosen by extension; the standard layout
/// when no file is given.
pub fn load_seed(file: Option<&Path>) -> Result<Seed> {
    let Some(file) = file else {
        return Ok(Seed::standard());
    };
    let text = std::fs::read_to_string(file).with_context(|| format!("could not read {}", file.display()))?;
    let seed = match file.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Seed::from_json(&text)?,
        _ => Seed::from_yaml(&text)?,
    };
    Ok(seed)
}

/// `None` means root; `guest` is the anonymous user.
pub fn parse_user(name: Option<&str>) -> UserId {
    match name {
        None => UserId::root(),
        Some(GUEST_NAME) => UserId::guest(),
        Some(name) => UserId::named(name),
    }
}

/// One-letter kind marker, as in `ls -l`.
pub fn kind_marker(entry: &Entry) -> char {
    match entry {
        Entry::Directory(_) => 'd',
        Entry::File(_) => '-',
        Entry::Link(_) => 'l',
    }
}

pub fn format_file_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{size}B")
    }
}
