//! What one agent believes its peers are tracking.
//!
//! # Implicit releases
//!
//! Peers never announce that they dropped a target; they just stop claiming
//! it.  To keep a fresh claimant from racing a peer that is mid-handoff, each
//! coordinated cycle ends with [`NeighborView::age`]: every fresh claim moves
//! into the record's `pending` slot and the record becomes
//! [`PeerClaim::Transitioning`].  A transitioning record still blocks its
//! pending target for exactly one more cycle; if the peer's next claim
//! arrives it overwrites the record, otherwise the following `age` clears the
//! pending target and the claim expires.
//!
//! Records are keyed by `AgentId` in a `BTreeMap` so conflict checks visit
//! peers in a deterministic order.  Records are never removed; a crashed peer
//! simply ages out.

use std::collections::BTreeMap;

use sw_core::{AgentId, TargetId};
use sw_transport::Claim;

// ── PeerClaim ─────────────────────────────────────────────────────────────────

/// The freshness-aware state of one peer's claim.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PeerClaim {
    /// Peer reported tracking nothing, or was told locally to yield.
    #[default]
    Idle,
    /// Peer claimed this target since our last cycle.
    Target(TargetId),
    /// No claim heard from the peer since our last cycle.
    Transitioning,
}

// ── NeighborRecord ────────────────────────────────────────────────────────────

/// Latest-received state of one peer.  Last write wins.
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborRecord {
    pub peer: AgentId,

    pub claim: PeerClaim,

    /// The claim this record held before the last `age`.
    pub pending: Option<TargetId>,

    /// Distance the peer reported with its latest claim.
    pub last_distance: f64,

    /// Number of claims received from this peer.
    pub updates: u64,
}

impl NeighborRecord {
    fn new(peer: AgentId, target: Option<TargetId>, distance: f64) -> Self {
        Self {
            peer,
            claim: target.map_or(PeerClaim::Idle, PeerClaim::Target),
            pending: target,
            last_distance: distance,
            updates: 1,
        }
    }

    /// The target from the peer's latest fresh claim.
    #[inline]
    pub fn last_target(&self) -> Option<TargetId> {
        match self.claim {
            PeerClaim::Target(t) => Some(t),
            PeerClaim::Idle | PeerClaim::Transitioning => None,
        }
    }

    /// `true` if the peer currently blocks `target`, either by a fresh claim
    /// or by a handoff still in flight.
    pub fn claims(&self, target: TargetId) -> bool {
        match self.claim {
            PeerClaim::Target(t)     => t == target,
            PeerClaim::Transitioning => self.pending == Some(target),
            PeerClaim::Idle          => false,
        }
    }

    /// Locally mark the peer as having yielded.  Its own next claim, if any,
    /// overwrites this.
    pub fn mark_yielded(&mut self) {
        self.claim = PeerClaim::Idle;
    }
}

// ── NeighborView ──────────────────────────────────────────────────────────────

/// One agent's view of every peer it has heard from.
#[derive(Clone, Debug)]
pub struct NeighborView {
    owner:   AgentId,
    records: BTreeMap<AgentId, NeighborRecord>,
}

impl NeighborView {
    pub fn new(owner: AgentId) -> Self {
        Self { owner, records: BTreeMap::new() }
    }

    pub fn owner(&self) -> AgentId {
        self.owner
    }

    /// Upsert the record for `peer`.  Idempotent; no ordering is enforced.
    ///
    /// Returns `false` (and changes nothing) when `peer` is the owner; the
    /// view is never authoritative for its own agent.
    pub fn apply_update(&mut self, peer: AgentId, target: Option<TargetId>, distance: f64) -> bool {
        if peer == self.owner {
            return false;
        }
        match self.records.get_mut(&peer) {
            Some(record) => {
                record.claim = target.map_or(PeerClaim::Idle, PeerClaim::Target);
                record.last_distance = distance;
                record.updates += 1;
            }
            None => {
                self.records.insert(peer, NeighborRecord::new(peer, target, distance));
            }
        }
        true
    }

    /// [`apply_update`][Self::apply_update] from a received claim.
    pub fn apply_claim(&mut self, claim: &Claim) -> bool {
        self.apply_update(claim.sender, claim.target, claim.distance)
    }

    /// End-of-cycle aging: fresh claims become pending for one cycle.
    pub fn age(&mut self) {
        for record in self.records.values_mut() {
            record.pending = record.last_target();
            record.claim = PeerClaim::Transitioning;
        }
    }

    pub fn get(&self, peer: AgentId) -> Option<&NeighborRecord> {
        self.records.get(&peer)
    }

    /// Records in ascending peer order.
    pub fn iter(&self) -> impl Iterator<Item = &NeighborRecord> {
        self.records.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NeighborRecord> {
        self.records.values_mut()
    }

    /// `true` if any peer blocks `target`.
    pub fn is_claimed(&self, target: TargetId) -> bool {
        self.records.values().any(|r| r.claims(target))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
