//! Snapshot store and subscription registry for the live feed.
//!
//! The [`SnapshotStore`] owns the single authoritative "current"
//! [`FleetSnapshot`] and the broadcast channel that fans each new
//! snapshot out to subscribers. The tick driver is the only writer;
//! everything else reads.
//!
//! # Consistency
//!
//! Publication replaces the whole `Arc<FleetSnapshot>` -- never a field
//! at a time -- so a concurrent reader observes either the previous or
//! the new snapshot, never a torn one. The swap and the broadcast send
//! happen under the same write lock, and [`subscribe`] captures the
//! current snapshot and its receiver under the read lock. A subscriber
//! therefore gets every snapshot published after its join snapshot with
//! no gap; the sequence filter in [`FeedSubscription::next`] guarantees
//! the join snapshot itself is never delivered twice.
//!
//! # Slow subscribers
//!
//! The broadcast channel gives every subscriber an independent bounded
//! queue. A subscriber that falls more than `BROADCAST_CAPACITY`
//! snapshots behind is lagged: it skips to the newest message and keeps
//! going. Nothing a subscriber does can delay the tick driver or
//! another subscriber.
//!
//! [`subscribe`]: SnapshotStore::subscribe

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::debug;

use plantwatch_types::{FleetSnapshot, SubscriberId};

/// Capacity of each subscriber's broadcast queue.
///
/// A subscriber that falls behind by more than this many snapshots
/// receives a [`broadcast::error::RecvError::Lagged`] and resumes from
/// the most recent snapshot.
const BROADCAST_CAPACITY: usize = 256;

/// Owner of the current snapshot and the subscriber fan-out.
#[derive(Debug)]
pub struct SnapshotStore {
    /// The latest published snapshot, replaced wholesale each tick.
    current: RwLock<Arc<FleetSnapshot>>,
    /// Broadcast sender feeding every subscriber queue.
    tx: broadcast::Sender<Arc<FleetSnapshot>>,
    /// Identifiers of currently registered subscribers.
    active: Mutex<BTreeSet<SubscriberId>>,
}

impl SnapshotStore {
    /// Create a store holding the empty sequence-0 snapshot.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            current: RwLock::new(Arc::new(FleetSnapshot::empty())),
            tx,
            active: Mutex::new(BTreeSet::new()),
        }
    }

    /// Return the latest snapshot without blocking on an in-progress
    /// tick.
    ///
    /// Ticks are assembled entirely outside the lock; only the pointer
    /// swap holds the write side, so this read is effectively
    /// instantaneous.
    pub async fn current(&self) -> Arc<FleetSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Publish a new snapshot: swap it in as current and fan it out.
    ///
    /// Returns the number of subscriber queues the snapshot was
    /// delivered to (0 when nobody is connected, which is not an
    /// error).
    pub async fn publish(&self, snapshot: FleetSnapshot) -> usize {
        let shared = Arc::new(snapshot);
        let mut current = self.current.write().await;
        *current = Arc::clone(&shared);
        // Send while still holding the lock so a concurrent subscribe
        // either sees this snapshot as its join snapshot or receives it
        // through its queue -- never neither, never both.
        self.tx.send(shared).unwrap_or(0)
    }

    /// Register a new subscriber.
    ///
    /// The returned subscription carries the snapshot that was current
    /// at join time (to be delivered immediately, before any broadcast)
    /// and a receiver for every snapshot published afterwards.
    pub async fn subscribe(&self) -> FeedSubscription {
        let joined = {
            let current = self.current.read().await;
            // Subscribing under the read lock: publish holds the write
            // lock across swap + send, so the receiver can only see
            // snapshots published strictly after `joined`.
            let rx = self.tx.subscribe();
            (Arc::clone(&*current), rx)
        };
        let (join_snapshot, rx) = joined;

        let id = SubscriberId::new();
        self.active.lock().await.insert(id);
        debug!(subscriber = %id, sequence = join_snapshot.sequence, "feed subscriber registered");

        FeedSubscription {
            id,
            join_snapshot,
            rx,
        }
    }

    /// Remove a subscriber from the registry.
    ///
    /// Idempotent: unsubscribing an unknown or already-removed ID is a
    /// no-op. Returns whether the ID was still registered.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.active.lock().await.remove(&id);
        if removed {
            debug!(subscriber = %id, "feed subscriber removed");
        }
        removed
    }

    /// Return the number of currently registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.active.lock().await.len()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's view of the feed.
///
/// Holds the join snapshot for immediate delivery plus the broadcast
/// receiver for everything after it. Dropping the subscription frees
/// the queue; call [`SnapshotStore::unsubscribe`] with [`id`](Self::id)
/// to also clear the registry entry.
#[derive(Debug)]
pub struct FeedSubscription {
    /// This subscriber's registry identifier.
    id: SubscriberId,
    /// The snapshot that was current when the subscriber joined.
    join_snapshot: Arc<FleetSnapshot>,
    /// Queue of snapshots published after the join.
    rx: broadcast::Receiver<Arc<FleetSnapshot>>,
}

impl FeedSubscription {
    /// Return this subscriber's identifier.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Return the snapshot to deliver immediately on join.
    pub fn join_snapshot(&self) -> Arc<FleetSnapshot> {
        Arc::clone(&self.join_snapshot)
    }

    /// Wait for the next snapshot published after the join snapshot.
    ///
    /// Skips anything at or below the join snapshot's sequence (so the
    /// join snapshot is never delivered twice) and skips ahead past
    /// lagged gaps. Returns `None` once the store is gone and the
    /// channel has closed.
    pub async fn next(&mut self) -> Option<Arc<FleetSnapshot>> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => {
                    if snapshot.sequence <= self.join_snapshot.sequence {
                        continue;
                    }
                    return Some(snapshot);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(subscriber = %self.id, skipped, "feed subscriber lagged, skipping ahead");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
