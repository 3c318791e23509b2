//! Fleet runtime configuration.

use std::time::Duration;

use sw_behavior::ProtocolConfig;

use crate::{SimError, SimResult};

/// Default decision-cycle interval.
pub const DEFAULT_TICK: Duration = Duration::from_millis(1);

/// Per-fleet runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Interval between an agent's decision cycles.
    pub tick: Duration,

    pub protocol: ProtocolConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK, protocol: ProtocolConfig::default() }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.tick.is_zero() {
            return Err(SimError::Config("tick interval must be non-zero".into()));
        }
        self.protocol.validate()?;
        Ok(())
    }
}
