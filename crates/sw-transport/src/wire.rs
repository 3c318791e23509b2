//! Claim payload and its text wire format.
//!
//! A datagram is three whitespace-delimited fields:
//!
//! ```text
//! <sender agent id> <target id | -1> <distance>
//! ```
//!
//! `-1` is the "tracking nothing" sentinel.  There is no version field and
//! no checksum beyond what the underlying transport provides.

use sw_core::{AgentId, TargetId};

use crate::{TransportError, TransportResult};

/// Target field value meaning "no target".
pub const NONE_SENTINEL: i64 = -1;

/// Largest datagram a subscriber will read.
pub const MAX_DATAGRAM: usize = 1500;

/// One agent's complete claim state, published once per decision cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Claim {
    pub sender:   AgentId,
    /// The target the sender tracks this cycle, if any.
    pub target:   Option<TargetId>,
    /// Sender's distance to `target` when the claim was made.
    pub distance: f64,
}

impl Claim {
    pub fn new(sender: AgentId, target: Option<TargetId>, distance: f64) -> Self {
        Self { sender, target, distance }
    }

    /// Render the datagram text.
    pub fn encode(&self) -> String {
        let target = self.target.map_or(NONE_SENTINEL, |t| i64::from(t.0));
        format!("{} {} {}", self.sender.0, target, self.distance)
    }

    /// Parse a datagram.  Anything that is not exactly three well-formed
    /// fields is rejected.
    pub fn decode(buf: &[u8]) -> TransportResult<Claim> {
        let text = std::str::from_utf8(buf)
            .map_err(|_| TransportError::Malformed("not utf-8".into()))?;

        let mut fields = text.split_whitespace();
        let (Some(sender), Some(target), Some(distance), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(TransportError::Malformed(format!("expected 3 fields in {text:?}")));
        };

        let sender = sender
            .parse::<i64>()
            .ok()
            .and_then(|n| AgentId::try_from(n).ok())
            .ok_or_else(|| TransportError::Malformed(format!("bad sender id {sender:?}")))?;

        let target = match target.parse::<i64>() {
            Ok(NONE_SENTINEL) => None,
            Ok(n) => Some(
                TargetId::try_from(n)
                    .map_err(|_| TransportError::Malformed(format!("bad target id {n}")))?,
            ),
            Err(_) => return Err(TransportError::Malformed(format!("bad target id {target:?}"))),
        };

        let distance = distance
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| TransportError::Malformed(format!("bad distance {distance:?}")))?;

        Ok(Claim { sender, target, distance })
    }
}
