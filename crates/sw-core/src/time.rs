//! Decision-cycle time model.
//!
//! # Design
//!
//! Every agent decides on a fixed tick.  The lockstep driver counts ticks
//! explicitly; the concurrent driver runs on a wall-clock interval but still
//! reports progress in ticks so both drivers log the same way.
//!
//!   elapsed = current_tick * tick_duration
//!
//! Integer ticks keep cycle arithmetic (reclaim thresholds, stagger
//! schedules) exact.

use std::fmt;
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute decision-cycle counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── CycleClock ────────────────────────────────────────────────────────────────

/// Converts between tick counts and elapsed (virtual) time.
#[derive(Clone, Debug)]
pub struct CycleClock {
    /// How much time one tick represents.
    pub tick_duration: Duration,
    pub current_tick:  Tick,
}

impl CycleClock {
    /// Create a clock at tick 0 with the given resolution.
    ///
    /// A zero duration is bumped to one microsecond so tick conversions never
    /// divide by zero.
    pub fn new(tick_duration: Duration) -> Self {
        let tick_duration = tick_duration.max(Duration::from_micros(1));
        Self { tick_duration, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.next();
    }

    /// Virtual time since tick 0.
    pub fn elapsed(&self) -> Duration {
        self.tick_duration.saturating_mul(self.current_tick.0.min(u32::MAX as u64) as u32)
    }

    /// How many ticks span `span`? (rounds up, never less than one for a
    /// non-zero span)
    pub fn ticks_for(&self, span: Duration) -> u64 {
        let tick = self.tick_duration.as_nanos();
        span.as_nanos().div_ceil(tick) as u64
    }
}

impl fmt::Display for CycleClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3} s)", self.current_tick, self.elapsed().as_secs_f64())
    }
}
