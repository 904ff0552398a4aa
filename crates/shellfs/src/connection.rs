// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Live handles on open files.
//!
//! Every committed write publishes the new content on a broadcast channel
//! keyed by the file's resolved path. Each [`FileConnection`] holds a
//! receiver and a cached copy of the content, so handles opened on the same
//! file see each other's writes without reopening.

use crate::error::{Error, OpKind, Result};
use crate::fs::{FileStore, authorize};
use crate::mode::Operation;
use crate::options::{CreateOptions, OpenOptions, WriteKind, WriteOptions};
use crate::user::UserId;
use diagnostics::debug;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{broadcast, oneshot};

const UPDATE_CAPACITY: usize = 16;

/// Identifies one open connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(uuid7::Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(uuid7::uuid7())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// New content of a file, as committed.
#[derive(Debug, Clone)]
pub struct ContentUpdate {
    pub path: String,
    /// The connection that wrote it, if any.
    pub origin: Option<ConnectionId>,
    pub content: Arc<[u8]>,
}

/// Broadcast channels, one per path with open connections.
#[derive(Clone, Default)]
pub(crate) struct ConnectionHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<ContentUpdate>>>>,
}

impl ConnectionHub {
    fn subscribe(&self, at: &str) -> broadcast::Receiver<ContentUpdate> {
        let mut channels = self.channels.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        // Drop channels whose connections have all closed.
        channels.retain(|_, sender| sender.receiver_count() > 0);
        channels
            .entry(at.to_string())
            .or_insert_with(|| broadcast::channel(UPDATE_CAPACITY).0)
            .subscribe()
    }

    pub(crate) fn publish(&self, at: &str, origin: Option<ConnectionId>, content: Arc<[u8]>) {
        let mut channels = self.channels.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(sender) = channels.get(at) else {
            return;
        };
        let update = ContentUpdate {
            path: at.to_string(),
            origin,
            content,
        };
        if sender.send(update).is_err() {
            // Every connection on this path has closed.
            _ = channels.remove(at);
        }
    }

    /// Number of open connections on `at`.
    pub(crate) fn listeners(&self, at: &str) -> usize {
        let mut channels = self.channels.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let count = channels.get(at).map_or(0, broadcast::Sender::receiver_count);
        if count == 0 {
            _ = channels.remove(at);
        }
        count
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.channels.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }
}

impl FileStore {
    /// Opens a live connection on a file, following links.
    pub async fn open(&self, at: &str, options: OpenOptions) -> Result<FileConnection> {
        let kind = OpKind::Open;
        if options.create {
            _ = self
                .create_file(at, CreateOptions::new(options.user.clone()).soft(), &[])
                .await?;
        }

        let store = self.begin_read().await?;
        let (resolved, entry) = store.resolve(at, kind).await?.require(kind, at)?;
        if !entry.is_file() {
            return Err(Error::not_a_file(kind, at));
        }
        authorize(&entry, &resolved, &options.user, Operation::Read)?;

        // Subscribe before reading so no committed write is missed.
        let updates = self.hub().subscribe(&resolved);
        let content: Arc<[u8]> = Arc::from(store.content(&resolved).await?);
        let connection = FileConnection {
            id: ConnectionId::new(),
            path: resolved,
            user: options.user,
            store: self.clone(),
            content,
            position: 0,
            updates,
        };
        debug!("opened connection {id} on {path}", id: connection.id.to_string(), path: connection.path.as_str());
        Ok(connection)
    }

    /// Number of live connections on the file `at` resolves to.
    pub async fn connections(&self, at: &str) -> Result<usize> {
        let resolved = self.resolve(at).await?;
        Ok(self.hub().listeners(&resolved.path))
    }
}

/// A live view of one file's content.
pub struct FileConnection {
    id: ConnectionId,
    path: String,
    user: UserId,
    store: FileStore,
    content: Arc<[u8]>,
    position: usize,
    updates: broadcast::Receiver<ContentUpdate>,
}

impl FileConnection {
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The resolved path of the file.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Content as of the last write or update seen.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the cursor used by `Override` and `Insert` writes and by
    /// [`FileConnection::reader`]; clamped to the content length.
    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.content.len());
    }

    /// Waits for a write from anyone but this connection and adopts it.
    pub async fn changed(&mut self) -> Result<Arc<[u8]>> {
        loop {
            match self.updates.recv().await {
                Ok(update) if update.origin == Some(self.id) => continue,
                Ok(update) => {
                    self.adopt(update.content);
                    return Ok(self.content.clone());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("connection {id} skipped {skipped} updates", id: self.id.to_string(), skipped: skipped);
                    self.refresh().await?;
                    return Ok(self.content.clone());
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(Error::ConnectionClosed(self.path.clone()));
                }
            }
        }
    }

    /// Applies any pending updates without waiting. Returns the newest
    /// content if something changed.
    pub fn poll_update(&mut self) -> Option<Arc<[u8]>> {
        let mut latest = None;
        loop {
            match self.updates.try_recv() {
                Ok(update) if update.origin == Some(self.id) => {}
                Ok(update) => latest = Some(update.content),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
        let content = latest?;
        self.adopt(content);
        Some(self.content.clone())
    }

    /// Rereads the committed content.
    pub async fn refresh(&mut self) -> Result<()> {
        let bytes = self.store.read_file(&self.path, &self.user).await?;
        self.adopt(Arc::from(bytes));
        Ok(())
    }

    /// Writes through this connection. Other connections on the file are
    /// notified; this one is not.
    pub async fn write(&mut self, kind: WriteKind, data: &[u8]) -> Result<()> {
        let options = WriteOptions {
            user: self.user.clone(),
            kind,
            position: self.position,
        };
        let (_, content) = self
            .store
            .write_from(&self.path, &options, data, Some(self.id))
            .await?;
        self.position = match kind {
            WriteKind::Override | WriteKind::Insert => self.position + data.len(),
            WriteKind::Prepend => data.len(),
            WriteKind::Append | WriteKind::Rewrite => content.len(),
        };
        self.adopt(content);
        Ok(())
    }

    /// Streams the cached content from the current position.
    #[must_use]
    pub fn reader(&self) -> Pin<Box<dyn AsyncRead + Send>> {
        let start = self.position.min(self.content.len());
        Box::pin(std::io::Cursor::new(self.content[start..].to_vec()))
    }

    /// Buffers bytes and writes them with `kind` on shutdown. The write is
    /// published to every connection, this one included.
    #[must_use]
    pub fn writer(&self, kind: WriteKind) -> ContentWriter {
        ContentWriter {
            buffer: Vec::new(),
            target: Some(WriteTarget {
                store: self.store.clone(),
                path: self.path.clone(),
                options: WriteOptions {
                    user: self.user.clone(),
                    kind,
                    position: self.position,
                },
            }),
            completion_rx: None,
        }
    }

    fn adopt(&mut self, content: Arc<[u8]>) {
        self.content = content;
        self.position = self.position.min(self.content.len());
    }
}

impl std::fmt::Debug for FileConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConnection")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("user", &self.user)
            .field("size", &self.content.len())
            .field("position", &self.position)
            .finish()
    }
}

struct WriteTarget {
    store: FileStore,
    path: String,
    options: WriteOptions,
}

/// `AsyncWrite` that collects bytes and commits them in one write on
/// shutdown.
pub struct ContentWriter {
    buffer: Vec<u8>,
    target: Option<WriteTarget>,
    completion_rx: Option<oneshot::Receiver<Result<()>>>,
}

impl AsyncWrite for ContentWriter {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        let this = self.get_mut();
        if this.target.is_none() {
            return Poll::Ready(Err(std::io::Error::other("writer already shut down")));
        }
        this.buffer.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();

        if this.completion_rx.is_none() {
            let Some(target) = this.target.take() else {
                return Poll::Ready(Ok(()));
            };
            let buffer = std::mem::take(&mut this.buffer);
            let (tx, rx) = oneshot::channel();
            this.completion_rx = Some(rx);
            _ = tokio::spawn(async move {
                let result = target
                    .store
                    .write_from(&target.path, &target.options, &buffer, None)
                    .await
                    .map(|_| ());
                _ = tx.send(result);
            });
        }

        let Some(rx) = this.completion_rx.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(Ok(result)) => {
                this.completion_rx = None;
                Poll::Ready(result.map_err(std::io::Error::other))
            }
            Poll::Ready(Err(_)) => {
                this.completion_rx = None;
                Poll::Ready(Err(std::io::Error::other("write task was cancelled")))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
