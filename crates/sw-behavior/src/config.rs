//! Decision engine parameters.

use sw_core::{CoordinationMode, CoreError, CoreResult};

/// Default sensing range in canvas units.
pub const DEFAULT_SENSING_RANGE: f64 = 600.0;

/// Default covered-zone limit on the x axis.
pub const DEFAULT_COVERED_ZONE: f64 = 1200.0;

/// Default number of uncontested cycles after which a lost claim is
/// re-asserted.
pub const DEFAULT_RECLAIM_AFTER: u32 = 25;

/// Parameters shared by every agent in a fleet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProtocolConfig {
    /// Maximum agent-to-target distance for a target to be visible, and the
    /// initial bound of the nearest-candidate search.
    pub sensing_range: f64,

    /// Targets with `x` beyond this limit are outside the fleet's zone.
    pub covered_zone: f64,

    /// Re-assert the previously held target once it has gone this many
    /// consecutive cycles without a peer contesting it.  Higher values keep
    /// stale claims out longer after a crash; lower values reclaim sooner
    /// but risk reclaiming a target a peer is quietly taking over.  `None`
    /// disables reclaiming.
    pub reclaim_after: Option<u32>,

    pub mode: CoordinationMode,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            sensing_range: DEFAULT_SENSING_RANGE,
            covered_zone:  DEFAULT_COVERED_ZONE,
            reclaim_after: Some(DEFAULT_RECLAIM_AFTER),
            mode:          CoordinationMode::Coordinated,
        }
    }
}

impl ProtocolConfig {
    pub fn with_mode(mut self, mode: CoordinationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !(self.sensing_range.is_finite() && self.sensing_range > 0.0) {
            return Err(CoreError::Config(format!(
                "sensing_range must be positive, got {}",
                self.sensing_range
            )));
        }
        if !self.covered_zone.is_finite() {
            return Err(CoreError::Config(format!(
                "covered_zone must be finite, got {}",
                self.covered_zone
            )));
        }
        Ok(())
    }
}
