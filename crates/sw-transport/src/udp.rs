//! UDP multicast transport.
//!
//! One socket per process joins the multicast group.  A pump task reads
//! datagrams off the socket and fans them out to every local subscriber, so
//! several agents in one process can share the port; one agent per process
//! (the deployed layout) works the same way.  Outgoing claims are sent
//! straight to the group address.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::channel::{Link, Medium, Publisher, TransportStats};
use crate::memory::{DEFAULT_CAPACITY, Datagram, FanoutSubscriber};
use crate::wire::MAX_DATAGRAM;
use crate::{Claim, TransportResult};

// ── Config ────────────────────────────────────────────────────────────────────

/// Multicast group and socket options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticastConfig {
    /// Group address claims are sent to.
    pub group:     Ipv4Addr,
    /// UDP port bound for receiving and used as the destination port.
    pub port:      u16,
    /// IP multicast TTL.
    pub ttl:       u32,
    /// Deliver our own datagrams back to this host.  Required when several
    /// agents share one host.
    pub loopback:  bool,
    /// Local interface used to join the group.
    pub interface: Ipv4Addr,
}

impl Default for MulticastConfig {
    fn default() -> Self {
        Self {
            group:     Ipv4Addr::new(235, 1, 1, 1),
            port:      9100,
            ttl:       64,
            loopback:  true,
            interface: Ipv4Addr::UNSPECIFIED,
        }
    }
}

// ── UdpMulticast ──────────────────────────────────────────────────────────────

/// A joined multicast group.  Dropping it stops the receive pump.
pub struct UdpMulticast {
    socket: Arc<UdpSocket>,
    dest:   SocketAddrV4,
    fanout: broadcast::Sender<Datagram>,
    stats:  Arc<TransportStats>,
    pump:   JoinHandle<()>,
}

impl UdpMulticast {
    /// Bind the port, join the group, and start the receive pump.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn bind(config: &MulticastConfig) -> TransportResult<Self> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port)).await?;
        socket.join_multicast_v4(config.group, config.interface)?;
        socket.set_multicast_ttl_v4(config.ttl)?;
        socket.set_multicast_loop_v4(config.loopback)?;
        let socket = Arc::new(socket);

        let (fanout, _) = broadcast::channel(DEFAULT_CAPACITY);
        let pump = tokio::spawn(pump(Arc::clone(&socket), fanout.clone()));
        debug!(group = %config.group, port = config.port, "joined multicast group");

        Ok(Self {
            socket,
            dest: SocketAddrV4::new(config.group, config.port),
            fanout,
            stats: TransportStats::new(),
            pump,
        })
    }

    /// Join as one more local agent.
    pub fn join(&self) -> Link {
        Link {
            publisher: Arc::new(UdpPublisher {
                socket: Arc::clone(&self.socket),
                dest:   self.dest,
                stats:  Arc::clone(&self.stats),
            }),
            subscriber: Box::new(FanoutSubscriber::new(self.fanout.subscribe(), Arc::clone(&self.stats))),
        }
    }

    pub fn stats(&self) -> Arc<TransportStats> {
        Arc::clone(&self.stats)
    }
}

impl Medium for UdpMulticast {
    fn join(&self) -> Link {
        UdpMulticast::join(self)
    }

    fn stats(&self) -> Arc<TransportStats> {
        UdpMulticast::stats(self)
    }
}

impl Drop for UdpMulticast {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Consecutive receive failures after which the pump gives up.
const MAX_RECEIVE_FAILURES: u32 = 20;

const BACKOFF_MIN: Duration = Duration::from_millis(10);
const BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Delay schedule for a failing socket: doubles from [`BACKOFF_MIN`] up to
/// [`BACKOFF_MAX`], reset by any successful receive.
#[derive(Debug, Default)]
pub(crate) struct ReceiveBackoff {
    failures: u32,
}

impl ReceiveBackoff {
    pub(crate) fn succeeded(&mut self) {
        self.failures = 0;
    }

    /// Record a failure.  `None` once the socket should be abandoned.
    pub(crate) fn failed(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures >= MAX_RECEIVE_FAILURES {
            return None;
        }
        let shift = (self.failures - 1).min(16);
        Some(BACKOFF_MIN.saturating_mul(1 << shift).min(BACKOFF_MAX))
    }
}

async fn pump(socket: Arc<UdpSocket>, fanout: broadcast::Sender<Datagram>) {
    let mut buf = [0u8; MAX_DATAGRAM];
    let mut backoff = ReceiveBackoff::default();
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((n, _from)) => {
                backoff.succeeded();
                let _ = fanout.send(Arc::from(&buf[..n]));
            }
            Err(e) => match backoff.failed() {
                Some(delay) => {
                    warn!(error = %e, retry_ms = delay.as_millis() as u64, "multicast receive failed");
                    tokio::time::sleep(delay).await;
                }
                None => {
                    error!(error = %e, failures = MAX_RECEIVE_FAILURES, "multicast receive keeps failing; pump stopped");
                    return;
                }
            },
        }
    }
}

// ── Publisher ─────────────────────────────────────────────────────────────────

struct UdpPublisher {
    socket: Arc<UdpSocket>,
    dest:   SocketAddrV4,
    stats:  Arc<TransportStats>,
}

#[async_trait]
impl Publisher for UdpPublisher {
    async fn publish(&self, claim: &Claim) -> TransportResult<()> {
        self.socket.send_to(claim.encode().as_bytes(), self.dest).await?;
        self.stats.record_published();
        Ok(())
    }
}
