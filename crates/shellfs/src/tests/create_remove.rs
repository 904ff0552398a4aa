// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{alice, new_fs, root, with_home};
use crate::entry::{Entry, EntryKind};
use crate::error::Error;
use crate::mode::Mode;
use crate::options::{CreateOptions, RemoveOptions, UnlinkOptions};

#[tokio::test]
async fn test_root_exists_after_open() {
    let fs = new_fs().await;
    let root_entry = fs.stat("/", &root()).await.unwrap();
    assert!(root_entry.is_directory());
    assert!(root_entry.owner().is_root());
    assert_eq!(root_entry.mode(), Mode::from_number(755));
}

#[tokio::test]
async fn test_create_file_round_trip() {
    let fs = new_fs().await;
    _ = fs
        .create_file("/notes.txt", CreateOptions::new(root()), b"content")
        .await
        .unwrap();
    assert!(fs.exists("/notes.txt").await.unwrap());
    assert_eq!(fs.read_file("/notes.txt", &root()).await.unwrap(), b"content");

    fs.remove("/notes.txt", RemoveOptions::new(root())).await.unwrap();
    assert!(!fs.exists("/notes.txt").await.unwrap());
}

#[tokio::test]
async fn test_create_uses_configured_defaults() {
    let fs = with_home().await;
    let dir = fs
        .create_directory("/home/alice/docs", CreateOptions::new(alice()))
        .await
        .unwrap();
    assert_eq!(dir.mode(), Mode::from_number(775));
    assert_eq!(dir.owner(), &alice());

    let file = fs
        .create_file("/home/alice/docs/a.md", CreateOptions::new(alice()), b"")
        .await
        .unwrap();
    assert_eq!(file.mode(), Mode::from_number(664));
    let Entry::File(f) = file else {
        panic!("expected a file");
    };
    assert_eq!(f.extension, "md");
    assert_eq!(f.parent_path.as_deref(), Some("/home/alice/docs"));
}

#[tokio::test]
async fn test_missing_parent_needs_recursive() {
    let fs = new_fs().await;
    let result = fs.create_directory("/a/b/c", CreateOptions::new(root())).await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
    assert!(!fs.exists("/a").await.unwrap());

    _ = fs
        .create_directory("/a/b/c", CreateOptions::new(root()).mode(Mode::from_number(700)).recursive())
        .await
        .unwrap();
    for dir in ["/a", "/a/b", "/a/b/c"] {
        let entry = fs.stat(dir, &root()).await.unwrap();
        assert_eq!(entry.kind(), EntryKind::Directory);
        assert_eq!(entry.mode(), Mode::from_number(700), "{dir}");
    }
}

#[tokio::test]
async fn test_recursive_file_parents_get_directory_defaults() {
    let fs = new_fs().await;
    _ = fs
        .create_file("/var/log/boot.log", CreateOptions::new(root()).mode(Mode::from_number(600)).recursive(), b"ok")
        .await
        .unwrap();
    assert_eq!(fs.stat("/var/log", &root()).await.unwrap().mode(), Mode::from_number(775));
    assert_eq!(fs.stat("/var/log/boot.log", &root()).await.unwrap().mode(), Mode::from_number(600));
}

#[tokio::test]
async fn test_soft_create_is_idempotent() {
    let fs = new_fs().await;
    let first = fs.create_directory("/tmp", CreateOptions::new(root())).await.unwrap();
    let again = fs.create_directory("/tmp", CreateOptions::new(root()).soft()).await.unwrap();
    assert_eq!(first, again);

    let result = fs.create_directory("/tmp", CreateOptions::new(root())).await;
    assert!(matches!(result, Err(Error::AlreadyExists { .. })));

    let result = fs.create_file("/tmp", CreateOptions::new(root()).soft(), b"").await;
    assert!(matches!(result, Err(Error::NotAFile { .. })));

    _ = fs.create_file("/tmp/x", CreateOptions::new(root()), b"one").await.unwrap();
    _ = fs
        .create_file("/tmp/x", CreateOptions::new(root()).soft(), b"two")
        .await
        .unwrap();
    assert_eq!(fs.read_file("/tmp/x", &root()).await.unwrap(), b"one");
}

#[tokio::test]
async fn test_parent_must_be_a_directory() {
    let fs = new_fs().await;
    _ = fs.create_file("/plain", CreateOptions::new(root()), b"").await.unwrap();
    let result = fs.create_file("/plain/child", CreateOptions::new(root()), b"").await;
    assert!(matches!(result, Err(Error::NotADirectory { .. })));
}

#[tokio::test]
async fn test_non_empty_directory_needs_recursive() {
    let fs = new_fs().await;
    _ = fs
        .create_directory("/a/b/c", CreateOptions::new(root()).recursive())
        .await
        .unwrap();
    _ = fs.create_file("/a/b/c/f", CreateOptions::new(root()), b"data").await.unwrap();

    let result = fs.remove("/a", RemoveOptions::new(root())).await;
    assert!(matches!(result, Err(Error::NotEmpty { .. })));
    assert!(fs.exists("/a/b/c/f").await.unwrap());

    fs.remove("/a", RemoveOptions::new(root()).recursive()).await.unwrap();
    let store = fs.begin_read().await.unwrap();
    assert!(store.descendants("/a").await.unwrap().is_empty());
    assert!(store.entry("/a").await.unwrap().is_none());
    assert!(store.content("/a/b/c/f").await.unwrap().is_empty());
    assert_eq!(fs.list_directory("/", &root()).await.unwrap(), Vec::<String>::new());
}

#[tokio::test]
async fn test_root_cannot_be_removed() {
    let fs = new_fs().await;
    let result = fs.remove("/", RemoveOptions::new(root()).recursive()).await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    let result = fs.unlink("/", UnlinkOptions::new(root()).force()).await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    assert!(fs.exists("/").await.unwrap());
}

#[tokio::test]
async fn test_remove_missing_entry() {
    let fs = new_fs().await;
    let result = fs.remove("/ghost", RemoveOptions::new(root())).await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_size_sums_directory_files() {
    let fs = new_fs().await;
    _ = fs
        .create_file("/d/a", CreateOptions::new(root()).recursive(), b"12345")
        .await
        .unwrap();
    _ = fs
        .create_file("/d/e/b", CreateOptions::new(root()).recursive(), b"123")
        .await
        .unwrap();
    assert_eq!(fs.get_size("/d/a").await.unwrap(), 5);
    assert_eq!(fs.get_size("/d").await.unwrap(), 8);
    assert_eq!(fs.get_size("/").await.unwrap(), 8);
    assert!(matches!(fs.get_size("/nope").await, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_listing_is_sorted_base_names() {
    let fs = new_fs().await;
    for name in ["/zeta", "/alpha", "/mid"] {
        _ = fs.create_directory(name, CreateOptions::new(root())).await.unwrap();
    }
    _ = fs.create_file("/alpha/inner", CreateOptions::new(root()), b"").await.unwrap();
    assert_eq!(
        fs.list_directory("/", &root()).await.unwrap(),
        vec!["alpha".to_string(), "mid".to_string(), "zeta".to_string()]
    );
    assert!(matches!(
        fs.list_directory("/alpha/inner", &root()).await,
        Err(Error::NotADirectory { .. })
    ));
}
