//! Pending request registry.
//!
//! Tracks, per [`RequestKey`], the one request currently in flight together
//! with the [`Canceller`] that can abort it. Admitting a key that is already
//! present cancels the previous holder and takes its place, so the registry
//! always points at the newest request for a path.
//!
//! Each admission is issued a [`Ticket`]. [`PendingRegistry::release`] only
//! removes an entry whose ticket matches: the superseded request still calls
//! `release` from its own failure path, and that call must not evict its
//! successor.
//!
//! A [`Lease`] ties a ticket to the lifetime of the in-flight call: dropping
//! it releases the entry, so a caller that abandons the call does not leave
//! its key pending.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::debug;

use crate::RequestKey;

/// One-shot abort handle for an in-flight request.
#[derive(Debug)]
pub struct Canceller {
    tx: oneshot::Sender<String>,
}

impl Canceller {
    /// Creates a canceller and the signal its request listens on.
    #[must_use]
    pub fn pair() -> (Self, CancelSignal) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, CancelSignal { rx })
    }

    /// Abort the request with `reason`.
    ///
    /// Consumes the handle; a request that already settled ignores it.
    pub fn cancel(self, reason: impl Into<String>) {
        // the receiver is gone once the request settled
        let _ = self.tx.send(reason.into());
    }
}

/// Receiving end of a [`Canceller`].
#[derive(Debug)]
pub struct CancelSignal {
    rx: oneshot::Receiver<String>,
}

impl CancelSignal {
    /// Resolves with the cancellation reason.
    ///
    /// If the canceller is dropped without firing, this never resolves.
    pub async fn cancelled(self) -> String {
        match self.rx.await {
            Ok(reason) => reason,
            Err(_) => std::future::pending().await,
        }
    }
}

/// Proof of admission, needed to release an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: RequestKey,
    id: u64,
}

impl Ticket {
    /// Key this ticket was issued for.
    #[must_use]
    pub const fn key(&self) -> &RequestKey {
        &self.key
    }
}

/// Result of [`PendingRegistry::admit_or_cancel`].
#[derive(Debug)]
pub struct Admission {
    /// Ticket of the newly admitted request.
    pub ticket: Ticket,
    /// Whether a previous request for the same key was cancelled.
    pub superseded: bool,
}

/// Admission held by an in-flight request.
///
/// Released explicitly when the request settles, or on drop otherwise.
#[derive(Debug)]
pub struct Lease {
    registry: Arc<PendingRegistry>,
    ticket: Ticket,
    released: bool,
}

impl Lease {
    /// Holds `ticket` against `registry`.
    #[must_use]
    pub const fn new(registry: Arc<PendingRegistry>, ticket: Ticket) -> Self {
        Self {
            registry,
            ticket,
            released: false,
        }
    }

    /// The held ticket.
    #[must_use]
    pub const fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// Release the entry now.
    ///
    /// Same result as [`PendingRegistry::release`].
    pub fn release(mut self) -> bool {
        self.released = true;
        self.registry.release(&self.ticket)
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if !self.released && self.registry.release(&self.ticket) {
            debug!(key = %self.ticket.key, "released abandoned request");
            crate::observe::pending(self.registry.len());
        }
    }
}

#[derive(Debug)]
struct Entry {
    id: u64,
    canceller: Canceller,
}

/// Set of in-flight request keys with their cancellers.
#[derive(Debug)]
pub struct PendingRegistry {
    entries: Mutex<HashMap<RequestKey, Entry>>,
    next_id: AtomicU64,
    reason: String,
}

impl Default for PendingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingRegistry {
    /// Registry using the default duplicate reason.
    #[must_use]
    pub fn new() -> Self {
        Self::with_reason(crate::config::DUPLICATE_REASON)
    }

    /// Registry cancelling duplicates with a custom reason.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            reason: reason.into(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit `key`, cancelling whichever request held it before.
    pub fn admit_or_cancel(&self, key: RequestKey, canceller: Canceller) -> Admission {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let previous = self.lock().insert(key.clone(), Entry { id, canceller });

        let superseded = previous.is_some();
        if let Some(previous) = previous {
            previous.canceller.cancel(self.reason.as_str());
        }

        Admission {
            ticket: Ticket { key, id },
            superseded,
        }
    }

    /// Remove the entry held by `ticket`.
    ///
    /// Returns `false` (and changes nothing) when the key is absent or is now
    /// held by a newer request.
    pub fn release(&self, ticket: &Ticket) -> bool {
        let mut entries = self.lock();
        let owned = entries
            .get(&ticket.key)
            .is_some_and(|entry| entry.id == ticket.id);
        if owned {
            entries.remove(&ticket.key);
        }
        owned
    }

    /// Whether a request for `key` is in flight.
    #[must_use]
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of in-flight keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the in-flight keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<RequestKey> {
        let mut keys: Vec<_> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}
