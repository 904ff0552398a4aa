// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Write admission.
//!
//! At most one read-write transaction is open at a time. Requests are
//! admitted in the order they arrive; each waiter owns a oneshot channel
//! that fires when it reaches the head of the queue. Read-only transactions
//! skip the queue and only wait for the backend to be ready.

use crate::backend::{ALL_COLLECTIONS, AccessMode, Backend};
use crate::error::{Error, Result};
use crate::transaction::Transaction;
use diagnostics::{debug, error, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{OnceCell, oneshot};
use tokio_util::sync::CancellationToken;

/// How long, and under what conditions, a writer is willing to wait.
#[derive(Debug, Clone, Default)]
pub struct Admission {
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl Admission {
    #[must_use]
    pub fn timeout(limit: Duration) -> Self {
        Self {
            timeout: Some(limit),
            cancel: None,
        }
    }

    #[must_use]
    pub fn cancellable(token: CancellationToken) -> Self {
        Self {
            timeout: None,
            cancel: Some(token),
        }
    }
}

struct Waiter {
    ticket: u64,
    notify: oneshot::Sender<()>,
}

#[derive(Default)]
struct Slots {
    holder: Option<u64>,
    next_ticket: u64,
    waiters: VecDeque<Waiter>,
}

impl Slots {
    /// Hands the slot to the first waiter still listening.
    fn grant_next(&mut self) {
        self.holder = None;
        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.notify.send(()).is_ok() {
                self.holder = Some(waiter.ticket);
                return;
            }
        }
    }
}

pub(crate) struct QueueInner {
    backend: Arc<dyn Backend>,
    ready: OnceCell<std::result::Result<(), String>>,
    slots: Mutex<Slots>,
    default_timeout: Option<Duration>,
}

impl QueueInner {
    fn slots(&self) -> MutexGuard<'_, Slots> {
        // Slots are never left half-updated, so a poisoned lock is still usable.
        self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn release(&self, ticket: u64) {
        let mut slots = self.slots();
        if slots.holder == Some(ticket) {
            slots.grant_next();
            debug!("write slot {ticket} released", ticket: ticket);
        } else {
            warn!("write slot {ticket} released but not held", ticket: ticket);
        }
    }

    /// A waiter gave up: leave the queue, or pass the slot on if it was
    /// granted in the meantime.
    fn abandon(&self, ticket: u64) {
        let mut slots = self.slots();
        if let Some(pos) = slots.waiters.iter().position(|w| w.ticket == ticket) {
            _ = slots.waiters.remove(pos);
        } else if slots.holder == Some(ticket) {
            slots.grant_next();
        }
    }
}

/// Proof of holding the writer slot; releases it on drop.
pub(crate) struct WriterSlot {
    inner: Arc<QueueInner>,
    ticket: u64,
}

impl WriterSlot {
    pub(crate) fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for WriterSlot {
    fn drop(&mut self) {
        self.inner.release(self.ticket);
    }
}

/// A queued writer. Dropping it before admission leaves the queue cleanly.
struct PendingAdmission {
    inner: Arc<QueueInner>,
    ticket: u64,
    settled: bool,
}

impl PendingAdmission {
    fn into_slot(mut self) -> WriterSlot {
        self.settled = true;
        WriterSlot {
            inner: self.inner.clone(),
            ticket: self.ticket,
        }
    }
}

impl Drop for PendingAdmission {
    fn drop(&mut self) {
        if !self.settled {
            debug!("write request {ticket} left the queue", ticket: self.ticket);
            self.inner.abandon(self.ticket);
        }
    }
}

/// Arbitrates access to the backend.
#[derive(Clone)]
pub struct TransactionQueue {
    inner: Arc<QueueInner>,
}

impl TransactionQueue {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_timeout(backend, None)
    }

    /// A queue whose writers give up after `default_timeout` unless their
    /// [`Admission`] says otherwise.
    pub fn with_timeout(backend: Arc<dyn Backend>, default_timeout: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                backend,
                ready: OnceCell::new(),
                slots: Mutex::new(Slots::default()),
                default_timeout,
            }),
        }
    }

    /// Opens a transaction in the given mode with default admission.
    pub async fn open(&self, mode: AccessMode) -> Result<Transaction> {
        match mode {
            AccessMode::ReadOnly => self.read().await,
            AccessMode::ReadWrite => self.write().await,
        }
    }

    pub async fn read(&self) -> Result<Transaction> {
        self.ensure_ready().await?;
        let inner = self
            .inner
            .backend
            .transaction(ALL_COLLECTIONS, AccessMode::ReadOnly)
            .await?;
        Ok(Transaction::new(inner, None))
    }

    pub async fn write(&self) -> Result<Transaction> {
        self.write_with(Admission::default()).await
    }

    pub async fn write_with(&self, admission: Admission) -> Result<Transaction> {
        self.ensure_ready().await?;
        let slot = self.admit(admission).await?;
        // On failure the slot drops here and the next writer proceeds.
        let inner = self
            .inner
            .backend
            .transaction(ALL_COLLECTIONS, AccessMode::ReadWrite)
            .await?;
        debug!("write transaction {ticket} admitted", ticket: slot.ticket());
        Ok(Transaction::new(inner, Some(slot)))
    }

    /// Number of writers waiting behind the current holder.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.inner.slots().waiters.len()
    }

    /// Whether a writer currently holds the slot.
    #[must_use]
    pub fn is_writing(&self) -> bool {
        self.inner.slots().holder.is_some()
    }

    async fn ensure_ready(&self) -> Result<()> {
        let state = self
            .inner
            .ready
            .get_or_init(|| async {
                match self.inner.backend.open().await {
                    Ok(()) => {
                        debug!("backend ready");
                        Ok(())
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        error!("backend failed to open: {reason}", reason: reason.as_str());
                        Err(reason)
                    }
                }
            })
            .await;
        state.clone().map_err(Error::ConnectionClosed)
    }

    async fn admit(&self, admission: Admission) -> Result<WriterSlot> {
        let (ticket, rx) = {
            let mut slots = self.inner.slots();
            let ticket = slots.next_ticket;
            slots.next_ticket += 1;
            if slots.holder.is_none() && slots.waiters.is_empty() {
                slots.holder = Some(ticket);
                return Ok(WriterSlot {
                    inner: self.inner.clone(),
                    ticket,
                });
            }
            let (notify, rx) = oneshot::channel();
            slots.waiters.push_back(Waiter { ticket, notify });
            debug!("write request {ticket} queued at depth {depth}", ticket: ticket, depth: slots.waiters.len());
            (ticket, rx)
        };

        let pending = PendingAdmission {
            inner: self.inner.clone(),
            ticket,
            settled: false,
        };
        let limit = admission.timeout.or(self.inner.default_timeout);
        let cancel = admission.cancel.unwrap_or_default();

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            turn = wait_for_turn(rx, limit) => turn.map(|()| pending.into_slot()),
        }
    }
}

async fn wait_for_turn(rx: oneshot::Receiver<()>, limit: Option<Duration>) -> Result<()> {
    let received = match limit {
        Some(limit) => match tokio::time::timeout(limit, rx).await {
            Ok(received) => received,
            Err(_) => return Err(Error::AdmissionTimeout(limit)),
        },
        None => rx.await,
    };
    received.map_err(|_| Error::ConnectionClosed("write queue dropped".to_string()))
}

impl std::fmt::Debug for TransactionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionQueue{{waiting: {}}}", self.waiting())
    }
}
