//! Hooks for watching a fleet run.

use sw_behavior::{Decision, ServiceError};
use sw_core::{AgentId, Tick};
use sw_transport::Claim;

/// Callbacks invoked by agent runtimes.
///
/// Shared by every agent of a fleet and, under [`Fleet`][crate::Fleet],
/// called from many tasks at once; implementations use interior mutability.
/// All methods default to no-ops.
pub trait CycleObserver: Send + Sync {
    /// A cycle completed and its side effects were applied.
    fn on_cycle_end(&self, _agent: AgentId, _tick: Tick, _decision: &Decision) {}

    /// A cycle was skipped because an external service failed.
    fn on_cycle_skipped(&self, _agent: AgentId, _tick: Tick, _error: &ServiceError) {}

    /// A peer's claim was applied to `agent`'s neighbor view.
    fn on_claim(&self, _agent: AgentId, _claim: &Claim) {}

    fn on_crash(&self, _agent: AgentId) {}

    fn on_restart(&self, _agent: AgentId) {}
}

/// A [`CycleObserver`] that does nothing.
pub struct NoopObserver;

impl CycleObserver for NoopObserver {}
