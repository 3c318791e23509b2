//! The single lock guarding an agent's state.

use std::sync::{Arc, Mutex, PoisonError};

use sw_core::AgentId;
use sw_transport::Claim;
use tracing::trace;

use crate::{AgentState, NeighborView};

/// Everything the decision cycle and the receiver task both touch.
#[derive(Clone, Debug)]
pub struct AgentCell {
    pub state:     AgentState,
    pub neighbors: NeighborView,
}

impl AgentCell {
    pub fn new(id: AgentId) -> Self {
        Self { state: AgentState::new(id), neighbors: NeighborView::new(id) }
    }
}

/// Shared handle to one agent's [`AgentCell`].
///
/// Cloning the handle shares the cell.  Callers never hold the lock across
/// an await point; [`with`][Self::with] scopes it to a closure.
#[derive(Clone, Debug)]
pub struct SharedAgent {
    id:   AgentId,
    cell: Arc<Mutex<AgentCell>>,
}

impl SharedAgent {
    pub fn new(id: AgentId) -> Self {
        Self { id, cell: Arc::new(Mutex::new(AgentCell::new(id))) }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Run `f` with exclusive access to the cell.
    ///
    /// A poisoned lock is recovered: the cell holds plain data that is
    /// always left consistent between statements.
    pub fn with<R>(&self, f: impl FnOnce(&mut AgentCell) -> R) -> R {
        let mut guard = self.cell.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Receiver-side update: apply one claim under the lock.
    ///
    /// Returns `false` for the agent's own claims, which are ignored.
    pub fn apply_claim(&self, claim: &Claim) -> bool {
        let applied = self.with(|cell| cell.neighbors.apply_claim(claim));
        if applied {
            trace!(agent = %self.id, peer = %claim.sender, target = ?claim.target, "peer claim");
        }
        applied
    }

    /// Copy of the agent's own state.
    pub fn state(&self) -> AgentState {
        self.with(|cell| cell.state.clone())
    }
}
