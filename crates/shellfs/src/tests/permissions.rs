// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{alice, bob, root, with_home};
use crate::error::Error;
use crate::mode::{Mode, Operation};
use crate::options::{CreateOptions, RemoveOptions, WriteKind, WriteOptions};
use crate::user::UserId;

#[tokio::test]
async fn test_non_owner_cannot_write_private_file() {
    let fs = with_home().await;
    _ = fs
        .create_file(
            "/home/alice/secret",
            CreateOptions::new(alice()).mode(Mode::from_number(600)),
            b"mine",
        )
        .await
        .unwrap();

    let result = fs
        .write_to_file("/home/alice/secret", WriteOptions::new(bob(), WriteKind::Append), b"!")
        .await;
    assert!(matches!(
        result,
        Err(Error::Unauthorized { ref path, op: Operation::Write }) if path == "/home/alice/secret"
    ));
    assert!(matches!(
        fs.read_file("/home/alice/secret", &UserId::guest()).await,
        Err(Error::Unauthorized { op: Operation::Read, .. })
    ));

    // The owner and root may
    fs.write_to_file("/home/alice/secret", WriteOptions::new(alice(), WriteKind::Append), b"!")
        .await
        .unwrap();
    fs.write_to_file("/home/alice/secret", WriteOptions::new(root(), WriteKind::Append), b"?")
        .await
        .unwrap();
    assert_eq!(fs.read_file("/home/alice/secret", &alice()).await.unwrap(), b"mine!?");
}

#[tokio::test]
async fn test_directory_write_controls_create_and_remove() {
    let fs = with_home().await;
    _ = fs
        .create_file("/home/alice/shared", CreateOptions::new(alice()).mode(Mode::from_number(666)), b"")
        .await
        .unwrap();
    fs.change_mode("/home/alice", "755", &alice()).await.unwrap();

    let result = fs.create_file("/home/alice/intruder", CreateOptions::new(bob()), b"").await;
    assert!(matches!(result, Err(Error::Unauthorized { .. })));

    let result = fs.remove("/home/alice/shared", RemoveOptions::new(bob())).await;
    assert!(matches!(result, Err(Error::Unauthorized { .. })));

    // File mode alone still lets bob write the content
    fs.write_to_file("/home/alice/shared", WriteOptions::new(bob(), WriteKind::Rewrite), b"hi")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_guest_digit_applies_to_anonymous_users() {
    let fs = with_home().await;
    _ = fs
        .create_file("/home/alice/board", CreateOptions::new(alice()).mode(Mode::from_number(664)), b"post")
        .await
        .unwrap();
    assert_eq!(fs.read_file("/home/alice/board", &bob()).await.unwrap(), b"post");
    assert_eq!(fs.read_file("/home/alice/board", &UserId::guest()).await.unwrap(), b"post");
    let result = fs
        .write_to_file("/home/alice/board", WriteOptions::new(UserId::guest(), WriteKind::Append), b"x")
        .await;
    assert!(matches!(result, Err(Error::Unauthorized { .. })));
    fs.write_to_file("/home/alice/board", WriteOptions::new(bob(), WriteKind::Append), b"x")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_change_mode_parses_input() {
    let fs = with_home().await;
    let mode = fs.change_mode("/home/alice", "1759", &alice()).await.unwrap();
    assert_eq!(mode, Mode::from_number(757));

    let result = fs.change_mode("/home/alice", "rwx", &alice()).await;
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));

    let result = fs.change_mode("/home/alice", "777", &bob()).await;
    assert!(matches!(result, Err(Error::Unauthorized { .. })));
    assert_eq!(fs.stat("/home/alice", &bob()).await.unwrap().mode(), Mode::from_number(757));
}

#[tokio::test]
async fn test_change_owner_is_limited_to_owner_and_root() {
    let fs = with_home().await;
    let result = fs.change_owner("/home/alice", bob(), &bob()).await;
    assert!(matches!(result, Err(Error::Unauthorized { .. })));

    fs.change_owner("/home/alice", bob(), &alice()).await.unwrap();
    assert_eq!(fs.stat("/home/alice", &root()).await.unwrap().owner(), &bob());

    fs.change_owner("/home/alice", alice(), &root()).await.unwrap();
    assert_eq!(fs.stat("/home/alice", &root()).await.unwrap().owner(), &alice());
}

#[tokio::test]
async fn test_listing_requires_read() {
    let fs = with_home().await;
    fs.change_mode("/home/alice", "700", &alice()).await.unwrap();
    assert!(fs.list_directory("/home/alice", &alice()).await.unwrap().is_empty());
    assert!(matches!(
        fs.list_directory("/home/alice", &bob()).await,
        Err(Error::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn test_recursive_remove_stops_at_nested_violation() {
    let fs = with_home().await;
    _ = fs
        .create_directory("/home/alice/sub", CreateOptions::new(root()).mode(Mode::from_number(755)))
        .await
        .unwrap();
    _ = fs.create_file("/home/alice/sub/f", CreateOptions::new(root()), b"kept").await.unwrap();

    // alice may write /home/alice but not the root-owned directory below it
    let result = fs.remove("/home/alice/sub", RemoveOptions::new(alice()).recursive()).await;
    assert!(matches!(
        result,
        Err(Error::Unauthorized { ref path, op: Operation::Write }) if path == "/home/alice/sub"
    ));
    assert!(fs.exists("/home/alice/sub").await.unwrap());
    assert_eq!(fs.read_file("/home/alice/sub/f", &root()).await.unwrap(), b"kept");
}
