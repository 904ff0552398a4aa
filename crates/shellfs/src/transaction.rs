// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::backend::{AccessMode, BackendTransaction};
use crate::error::{Error, Result};
use crate::queue::WriterSlot;
use diagnostics::debug;

/// Handle on one backend transaction.
///
/// Read-write handles hold the queue's writer slot. The slot is released
/// when the handle commits, rolls back, or is dropped; a dropped handle
/// that was never finished rolls back its staged writes.
pub struct Transaction {
    inner: Box<dyn BackendTransaction>,
    mode: AccessMode,
    slot: Option<WriterSlot>,
    finished: bool,
}

impl Transaction {
    pub(crate) fn new(inner: Box<dyn BackendTransaction>, slot: Option<WriterSlot>) -> Self {
        let mode = inner.mode();
        Self {
            inner,
            mode,
            slot,
            finished: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Queue ticket of a writer; `None` for readers.
    #[must_use]
    pub fn ticket(&self) -> Option<u64> {
        self.slot.as_ref().map(WriterSlot::ticket)
    }

    /// Direct access to the underlying backend transaction.
    #[must_use]
    pub fn backend(&self) -> &dyn BackendTransaction {
        self.inner.as_ref()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.pending()
    }

    /// Publishes staged writes and releases the writer slot.
    pub async fn commit(mut self) -> Result<()> {
        self.finished = true;
        let pending = self.inner.pending();
        let result = self.inner.commit().await;
        match &result {
            Ok(()) => {
                debug!("{mode} transaction committed {pending} writes", mode: self.mode.to_string(), pending: pending);
            }
            Err(e) => {
                let reason = e.to_string();
                debug!("{mode} transaction failed to commit: {reason}", mode: self.mode.to_string(), reason: reason.as_str());
                self.inner.rollback();
            }
        }
        result
    }

    /// Discards staged writes and releases the writer slot.
    pub fn rollback(mut self) {
        self.finished = true;
        let pending = self.inner.pending();
        self.inner.rollback();
        debug!("{mode} transaction rolled back {pending} writes", mode: self.mode.to_string(), pending: pending);
    }

    /// Ends the transaction: commits writes, releases readers.
    pub async fn close(self) -> Result<()> {
        self.commit().await
    }

    pub(crate) fn require_write(&self) -> Result<()> {
        if self.mode == AccessMode::ReadWrite && !self.finished {
            Ok(())
        } else {
            Err(Error::Backend("write requested in a readonly transaction".to_string()))
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let pending = self.inner.pending();
        self.inner.rollback();
        if pending > 0 {
            debug!("{mode} transaction dropped with {pending} uncommitted writes", mode: self.mode.to_string(), pending: pending);
        }
        // The slot field drops after this body, handing the queue on.
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("mode", &self.mode)
            .field("ticket", &self.ticket())
            .field("finished", &self.finished)
            .finish()
    }
}
