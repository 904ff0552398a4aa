// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{new_fs, root};
use crate::mode::Mode;
use crate::options::{WriteKind, WriteOptions};
use crate::seed::Seed;

const LAYOUT: &str = r#"{
    "etc": [755, {"motd": [644, "welcome\n"], "skel": [755, {".profile": [644, "PS1='$ '\n"]}]}],
    "home": [755, {}],
    "tmp": [777, {}]
}"#;

#[tokio::test]
async fn test_seed_creates_tree_as_root() {
    let fs = new_fs().await;
    let report = fs.seed(&Seed::from_json(LAYOUT).unwrap()).await.unwrap();
    assert_eq!(report.created.len(), 6);
    assert!(report.existing.is_empty());

    assert_eq!(fs.read_file("/etc/motd", &root()).await.unwrap(), b"welcome\n");
    let profile = fs.stat("/etc/skel/.profile", &root()).await.unwrap();
    assert!(profile.owner().is_root());
    assert_eq!(profile.mode(), Mode::from_number(644));
    assert_eq!(fs.stat("/tmp", &root()).await.unwrap().mode(), Mode::from_number(777));
}

#[tokio::test]
async fn test_seeding_twice_is_idempotent() {
    let fs = new_fs().await;
    let seed = Seed::from_json(LAYOUT).unwrap();
    _ = fs.seed(&seed).await.unwrap();
    fs.write_to_file("/etc/motd", WriteOptions::new(root(), WriteKind::Rewrite), b"edited")
        .await
        .unwrap();

    let report = fs.seed(&seed).await.unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.existing.len(), 6);
    assert_eq!(fs.read_file("/etc/motd", &root()).await.unwrap(), b"edited");
    assert_eq!(
        fs.list_directory("/", &root()).await.unwrap(),
        vec!["etc".to_string(), "home".to_string(), "tmp".to_string()]
    );
}

#[tokio::test]
async fn test_standard_seed() {
    let fs = new_fs().await;
    let report = fs.seed(&Seed::standard()).await.unwrap();
    assert_eq!(report.created.len(), Seed::standard().len());
    assert_eq!(fs.stat("/root", &root()).await.unwrap().mode(), Mode::from_number(700));
}

#[tokio::test]
async fn test_bootstrap_mode_applies_to_root_only() {
    let config = crate::config::StoreConfig {
        bootstrap_mode: Mode::from_number(711),
        ..Default::default()
    };
    let fs = crate::fs::FileStore::new(std::sync::Arc::new(crate::memory::MemoryBackend::new()), config)
        .await
        .unwrap();
    _ = fs.seed(&Seed::from_json(LAYOUT).unwrap()).await.unwrap();
    assert_eq!(fs.stat("/", &root()).await.unwrap().mode(), Mode::from_number(711));
    assert_eq!(fs.stat("/tmp", &root()).await.unwrap().mode(), Mode::from_number(777));
    assert_eq!(fs.stat("/etc/motd", &root()).await.unwrap().mode(), Mode::from_number(644));
}
