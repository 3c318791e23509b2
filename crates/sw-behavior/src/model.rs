//! The `DecisionModel` trait, the seam between runtime and algorithm.

use sw_agent::{AgentState, NeighborView};

use crate::{CycleInputs, Decision, ProtocolConfig};

/// Pluggable per-cycle decision logic.
///
/// The runtime calls [`decide`][Self::decide] once per tick with the agent's
/// lock held, so implementations must be pure computation: no I/O, no
/// blocking.  All external data arrives through [`CycleInputs`].
///
/// Implementations are shared across every agent of a fleet and must keep
/// no per-agent state of their own; it all lives in `AgentState` and
/// `NeighborView`.
pub trait DecisionModel: Send + Sync + 'static {
    /// Run one cycle.  Mutates the agent's claim state and its view of peers
    /// and returns the side effects to perform.
    fn decide(
        &self,
        state:     &mut AgentState,
        neighbors: &mut NeighborView,
        inputs:    &CycleInputs,
    ) -> Decision;

    /// Parameters the runtime needs to assemble `CycleInputs`.
    fn config(&self) -> &ProtocolConfig;
}
