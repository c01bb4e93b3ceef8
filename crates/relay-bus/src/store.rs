//! # In-Memory Backing Store
//!
//! A process-local stand-in for the shared pub/sub store (a distributed
//! deployment would put a real broker behind the same address contract).
//! Fan-out uses `tokio::sync::broadcast` for multi-producer, multi-consumer
//! semantics.

use crate::{BusError, DEFAULT_CHANNEL_CAPACITY, RELAY_CHANNEL};
use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Shared state behind a running store and every address cloned from it.
pub(crate) struct StoreInner {
    /// Store instance identifier (for log correlation).
    pub(crate) id: Uuid,
    /// Broadcast sender for the relay domain's single shared channel.
    pub(crate) sender: broadcast::Sender<Bytes>,
    /// Whether the store accepts new connections and publishes.
    pub(crate) accepting: AtomicBool,
    /// Total raw messages accepted for fan-out.
    pub(crate) published: AtomicU64,
    /// Messages accepted while no subscriber was attached.
    pub(crate) dropped: AtomicU64,
    /// Per-subscriber buffer capacity.
    capacity: usize,
}

/// The pub/sub backing store, modeled purely as a lifecycle collaborator.
///
/// [`start`](BackingStore::start) yields a store whose [`address`]
/// (BackingStore::address) is the only thing consumers may depend on.
/// [`stop`](BackingStore::stop) is idempotent; a stopped store refuses new
/// connections and fails in-flight publishes with
/// [`BusError::ConnectionReset`].
pub struct BackingStore {
    inner: Arc<StoreInner>,
}

impl BackingStore {
    /// Start a store with the default per-subscriber capacity.
    #[must_use]
    pub fn start() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Start a store with an explicit per-subscriber capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let inner = Arc::new(StoreInner {
            id: Uuid::new_v4(),
            sender,
            accepting: AtomicBool::new(true),
            published: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            capacity,
        });
        let store = Self { inner };
        info!(address = %store.address(), capacity, "Backing store started");
        store
    }

    /// The opaque connection address for this store.
    #[must_use]
    pub fn address(&self) -> StoreAddress {
        StoreAddress {
            inner: self.inner.clone(),
        }
    }

    /// Stop the store. Idempotent.
    ///
    /// Existing subscribers keep draining already-buffered messages; new
    /// connections are refused and new publishes fail.
    pub fn stop(&self) {
        if self.inner.accepting.swap(false, Ordering::SeqCst) {
            info!(address = %self.address(), "Backing store stopped");
        } else {
            debug!(address = %self.address(), "Backing store already stopped");
        }
    }

    /// Whether the store is accepting connections.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.accepting.load(Ordering::SeqCst)
    }

    /// Number of currently attached subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    /// Total raw messages accepted for fan-out.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Messages accepted while no subscriber was attached.
    #[must_use]
    pub fn messages_dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Per-subscriber buffer capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl fmt::Debug for BackingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackingStore")
            .field("id", &self.inner.id)
            .field("running", &self.is_running())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Opaque, cloneable address of a running [`BackingStore`].
///
/// Holding an address does not keep the store accepting: once the store is
/// stopped, connects against any address clone are refused.
#[derive(Clone)]
pub struct StoreAddress {
    pub(crate) inner: Arc<StoreInner>,
}

impl StoreAddress {
    /// Dial check shared by both connection kinds.
    pub(crate) fn ensure_accepting(&self) -> Result<(), BusError> {
        if self.inner.accepting.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BusError::ConnectionRefused {
                address: self.to_string(),
            })
        }
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.inner.id.simple().to_string();
        write!(f, "bus://{}/{}", &id[..8], RELAY_CHANNEL)
    }
}

impl fmt::Debug for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreAddress({self})")
    }
}
