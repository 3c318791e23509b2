//! Channel traits shared by every transport backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::{Claim, TransportResult};

/// Sending half of a broadcast channel.  Shared by the decision cycle.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send `claim` to every other subscriber.  Fire-and-forget: success
    /// means the datagram left, not that anyone received it.
    async fn publish(&self, claim: &Claim) -> TransportResult<()>;
}

/// Receiving half of a broadcast channel.  Owned by one receiver.
#[async_trait]
pub trait Subscriber: Send {
    /// Wait for the next well-formed claim.  `None` once the channel is
    /// closed for good.
    async fn recv(&mut self) -> Option<Claim>;

    /// Next claim already delivered, without waiting.
    fn try_recv(&mut self) -> Option<Claim>;
}

/// What an agent gets when it joins a transport.
pub struct Link {
    pub publisher:  Arc<dyn Publisher>,
    pub subscriber: Box<dyn Subscriber>,
}

/// A shared broadcast medium agents join and leave at will.
pub trait Medium: Send + Sync {
    /// Attach a new endpoint.  Its subscriber sees only datagrams sent after
    /// this call.
    fn join(&self) -> Link;

    fn stats(&self) -> Arc<TransportStats>;
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Counters shared by all endpoints of one transport.
#[derive(Debug, Default)]
pub struct TransportStats {
    published: AtomicU64,
    delivered: AtomicU64,
    malformed: AtomicU64,
    lost:      AtomicU64,
}

/// Point-in-time copy of [`TransportStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub malformed: u64,
    pub lost:      u64,
}

impl TransportStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lost(&self, n: u64) {
        self.lost.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            lost:      self.lost.load(Ordering::Relaxed),
        }
    }
}
