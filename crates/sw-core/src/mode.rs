//! Coordination mode shared by every crate that cares whether agents talk.
//!
//! In `Uncoordinated` mode there is no transport at all and each agent
//! decides from its own sensing; duplicate tracking is possible and is not
//! prevented.  In `Coordinated` mode agents broadcast their claim after every
//! cycle and defer to peers' claims.

use std::str::FromStr;

use crate::CoreError;

/// Whether agents exchange claims over a broadcast channel.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CoordinationMode {
    /// No transport; agents rely on their own sensing only.
    Uncoordinated,
    /// Agents publish and subscribe to claims.
    #[default]
    Coordinated,
}

impl CoordinationMode {
    /// `true` when a broadcast channel is in use.
    #[inline]
    pub fn is_coordinated(self) -> bool {
        matches!(self, CoordinationMode::Coordinated)
    }

    /// Human-readable label, used in log records and CSV columns.
    pub fn as_str(self) -> &'static str {
        match self {
            CoordinationMode::Uncoordinated => "uncoordinated",
            CoordinationMode::Coordinated   => "coordinated",
        }
    }
}

impl FromStr for CoordinationMode {
    type Err = CoreError;

    /// Accepts the canonical names plus the `none` / `udp` protocol names
    /// the tracking scripts were launched with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coordinated" | "udp"    => Ok(CoordinationMode::Coordinated),
            "uncoordinated" | "none" => Ok(CoordinationMode::Uncoordinated),
            other => Err(CoreError::UnknownMode(other.to_owned())),
        }
    }
}

impl std::fmt::Display for CoordinationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
