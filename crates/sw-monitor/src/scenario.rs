//! Scenario descriptions, target layout, and the standard suite.

use std::time::Duration;

use sw_core::{AgentId, Position, SimRng, TargetId};

// ── CrashPlan ─────────────────────────────────────────────────────────────────

/// Which agents to kill before targets are introduced.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CrashPlan {
    #[default]
    None,
    /// Exactly these agents.
    Agents(Vec<AgentId>),
    /// `k` distinct agents chosen at random.
    Random(usize),
    /// One random agent from each half of the roster.
    SplitHalves,
}

impl CrashPlan {
    /// Pick concrete victims from `roster` (ascending ids).
    pub fn resolve(&self, roster: &[AgentId], rng: &mut SimRng) -> Vec<AgentId> {
        match self {
            CrashPlan::None => Vec::new(),
            CrashPlan::Agents(list) => list.clone(),
            CrashPlan::Random(k) => rng.sample(roster, *k),
            CrashPlan::SplitHalves => {
                if roster.len() < 2 {
                    return roster.to_vec();
                }
                let mid = (roster.len() - 1) / 2;
                let (low, high) = roster.split_at(mid + 1);
                let first = rng.choose(low).copied();
                let second = rng.choose(high).copied();
                first.into_iter().chain(second).collect()
            }
        }
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// One monitored episode.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub id:   String,
    pub name: String,

    /// Targets to move into range, in introduction order.
    pub targets: Vec<TargetId>,

    /// Pause after each target is moved in.
    pub stagger: Duration,

    pub crash: CrashPlan,

    /// Pause between the stop timer and moving targets out.
    pub settle: Duration,

    /// Pause after the scenario, with every target out of range.
    pub cooldown: Duration,
}

impl Scenario {
    pub fn new(id: impl Into<String>, name: impl Into<String>, targets: Vec<TargetId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            targets,
            stagger:  Duration::ZERO,
            crash:    CrashPlan::None,
            settle:   Duration::ZERO,
            cooldown: Duration::ZERO,
        }
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_crash(mut self, crash: CrashPlan) -> Self {
        self.crash = crash;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Where targets go when moved into and out of range, and where agents are
/// deployed.
///
/// Slots fill two columns `column_gap` apart, row by row, every `row_gap`
/// units: slot 0 at `(x, y0)`, slot 1 at `(x + column_gap, y0)`, slot 2 at
/// `(x, y0 + row_gap)`, and so on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Left column of the in-range slots.
    pub in_x:       f64,
    /// Left column of the parking slots, beyond the covered zone.
    pub out_x:      f64,
    pub y0:         f64,
    pub column_gap: f64,
    pub out_gap:    f64,
    pub row_gap:    f64,
    /// Vertical spacing of agent deploy positions.
    pub agent_gap:  f64,
    /// Height of the band agents deploy into.  Larger rosters are packed
    /// closer than `agent_gap` to stay inside it.
    pub agent_span: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            in_x:       200.0,
            out_x:      1300.0,
            y0:         100.0,
            column_gap: 200.0,
            out_gap:    100.0,
            row_gap:    150.0,
            agent_gap:  70.0,
            agent_span: 490.0,
        }
    }
}

impl Layout {
    /// In-range slot for the `i`-th introduced target (0-based).
    pub fn slot_in(&self, i: usize) -> Position {
        self.slot(self.in_x, self.column_gap, i)
    }

    /// Parking slot for the `i`-th roster target (0-based).
    pub fn slot_out(&self, i: usize) -> Position {
        self.slot(self.out_x, self.out_gap, i)
    }

    /// Deploy (standby) position of the `i`-th of `roster` agents: a single
    /// column between the two in-range columns, within `agent_span` of `y0`.
    pub fn agent_home(&self, i: usize, roster: usize) -> Position {
        Position::new(self.in_x + self.column_gap / 2.0, self.y0 + self.agent_spacing(roster) * i as f64)
    }

    fn agent_spacing(&self, roster: usize) -> f64 {
        match roster {
            0 | 1 => 0.0,
            n => self.agent_gap.min(self.agent_span / (n - 1) as f64),
        }
    }

    fn slot(&self, x: f64, gap: f64, i: usize) -> Position {
        let column = (i % 2) as f64;
        let row = (i / 2) as f64;
        Position::new(x + column * gap, self.y0 + row * self.row_gap)
    }
}

// ── Standard suite ────────────────────────────────────────────────────────────

const STAGGER:  Duration = Duration::from_secs(2);
const COOLDOWN: Duration = Duration::from_secs(5);

/// The ten standard scenarios over `targets` (the full target roster).
///
/// "Out of order" scenarios shuffle the introduction order with a
/// [`SimRng`] seeded from `seed`; partial scenarios take the first six
/// targets (of the shuffled order, where shuffled).  Crash victims are
/// chosen when the scenario runs.
pub fn standard_suite(targets: &[TargetId], seed: u64) -> Vec<Scenario> {
    let mut rng = SimRng::new(seed);
    let mut shuffled = || {
        let mut t = targets.to_vec();
        rng.shuffle(&mut t);
        t
    };
    let six = |t: Vec<TargetId>| t.into_iter().take(6).collect::<Vec<_>>();

    vec![
        Scenario::new("1a", "Move all targets within range - 2 second interval between", targets.to_vec())
            .with_stagger(STAGGER),
        Scenario::new("1b", "Move all targets within range - 2 second interval between - Out of Order", shuffled())
            .with_stagger(STAGGER),
        Scenario::new("2a", "Move 6 out of 8 targets within range - 2 second interval between", six(targets.to_vec()))
            .with_stagger(STAGGER),
        Scenario::new(
            "2b",
            "Move 6 out of 8 targets within range - 2 second interval between - Out of Order",
            six(shuffled()),
        )
        .with_stagger(STAGGER),
        Scenario::new("3a", "Move all targets within range", targets.to_vec())
            .with_settle(Duration::from_secs(2)),
        Scenario::new("3b", "Move all targets within range - Out of Order", shuffled())
            .with_settle(Duration::from_secs(2)),
        Scenario::new("4", "Crash 1 UAV and move all targets within range", shuffled())
            .with_crash(CrashPlan::Random(1))
            .with_settle(Duration::from_secs(5)),
        Scenario::new("5", "Crash 2 UAV and move all targets within range", shuffled())
            .with_crash(CrashPlan::SplitHalves)
            .with_settle(Duration::from_secs(5)),
        Scenario::new("6a", "Move 6 out of 8 targets within range", six(targets.to_vec()))
            .with_settle(Duration::from_secs(5)),
        Scenario::new("6b", "Move 6 out of 8 targets within range - Out of Order", six(shuffled()))
            .with_settle(Duration::from_secs(5)),
    ]
    .into_iter()
    .map(|s| s.with_cooldown(COOLDOWN))
    .collect()
}
