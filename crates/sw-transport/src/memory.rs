//! In-process broadcast bus.
//!
//! Claims travel as encoded datagrams through a `tokio::sync::broadcast`
//! channel, so the wire codec is exercised exactly as it is over UDP.  Every
//! subscriber sees every datagram, including its own; filtering the sender
//! is the receiver's job.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use sw_core::SimRng;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;

use crate::channel::{Link, Medium, Publisher, Subscriber, TransportStats};
use crate::{Claim, TransportResult};

/// One datagram as it sits in the channel.
pub(crate) type Datagram = Arc<[u8]>;

/// Default channel capacity.  Covers a fleet of tens of agents at one
/// claim per agent per cycle.
pub const DEFAULT_CAPACITY: usize = 1024;

// ── MemoryBus ─────────────────────────────────────────────────────────────────

/// Fan-out bus shared by every agent of an in-process fleet.
#[derive(Clone)]
pub struct MemoryBus {
    tx:    broadcast::Sender<Datagram>,
    loss:  f64,
    rng:   Arc<Mutex<SimRng>>,
    stats: Arc<TransportStats>,
}

impl MemoryBus {
    /// A reliable bus.
    pub fn new(capacity: usize) -> Self {
        Self::lossy(capacity, 0.0, 0)
    }

    /// A bus that drops each published datagram with probability `loss`,
    /// drawn from an RNG seeded with `seed`.
    pub fn lossy(capacity: usize, loss: f64, seed: u64) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            loss: loss.clamp(0.0, 1.0),
            rng: Arc::new(Mutex::new(SimRng::new(seed))),
            stats: TransportStats::new(),
        }
    }

    /// Join the bus.  The subscriber only sees datagrams sent after this
    /// call.
    pub fn join(&self) -> Link {
        Link {
            publisher: Arc::new(MemoryPublisher {
                tx:    self.tx.clone(),
                loss:  self.loss,
                rng:   Arc::clone(&self.rng),
                stats: Arc::clone(&self.stats),
            }),
            subscriber: Box::new(FanoutSubscriber::new(self.tx.subscribe(), Arc::clone(&self.stats))),
        }
    }

    /// Push raw bytes onto the bus, bypassing the encoder.
    pub fn inject_raw(&self, raw: &[u8]) {
        let _ = self.tx.send(Arc::from(raw));
    }

    pub fn stats(&self) -> Arc<TransportStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Medium for MemoryBus {
    fn join(&self) -> Link {
        MemoryBus::join(self)
    }

    fn stats(&self) -> Arc<TransportStats> {
        MemoryBus::stats(self)
    }
}

// ── Publisher ─────────────────────────────────────────────────────────────────

struct MemoryPublisher {
    tx:    broadcast::Sender<Datagram>,
    loss:  f64,
    rng:   Arc<Mutex<SimRng>>,
    stats: Arc<TransportStats>,
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(&self, claim: &Claim) -> TransportResult<()> {
        self.stats.record_published();
        if self.loss > 0.0 {
            let dropped = self
                .rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .chance(self.loss);
            if dropped {
                self.stats.record_lost(1);
                return Ok(());
            }
        }
        // No live receivers just means nobody is listening.
        let _ = self.tx.send(Arc::from(claim.encode().into_bytes()));
        Ok(())
    }
}

// ── Subscriber ────────────────────────────────────────────────────────────────

/// Decoding subscriber over a broadcast receiver of raw datagrams.
///
/// Shared by the in-memory bus and the UDP multicast fan-out.
pub struct FanoutSubscriber {
    rx:    broadcast::Receiver<Datagram>,
    stats: Arc<TransportStats>,
}

impl FanoutSubscriber {
    pub(crate) fn new(rx: broadcast::Receiver<Datagram>, stats: Arc<TransportStats>) -> Self {
        Self { rx, stats }
    }

    fn accept(&self, datagram: &[u8]) -> Option<Claim> {
        match Claim::decode(datagram) {
            Ok(claim) => {
                self.stats.record_delivered();
                Some(claim)
            }
            Err(e) => {
                debug!(error = %e, "dropping datagram");
                self.stats.record_malformed();
                None
            }
        }
    }
}

#[async_trait]
impl Subscriber for FanoutSubscriber {
    async fn recv(&mut self) -> Option<Claim> {
        loop {
            match self.rx.recv().await {
                Ok(datagram) => {
                    if let Some(claim) = self.accept(&datagram) {
                        return Some(claim);
                    }
                }
                Err(RecvError::Lagged(n)) => self.stats.record_lost(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn try_recv(&mut self) -> Option<Claim> {
        loop {
            match self.rx.try_recv() {
                Ok(datagram) => {
                    if let Some(claim) = self.accept(&datagram) {
                        return Some(claim);
                    }
                }
                Err(TryRecvError::Lagged(n)) => self.stats.record_lost(n),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
