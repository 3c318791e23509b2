//! CSV suite loader.
//!
//! # CSV format
//!
//! One row per scenario, run in file order.  Durations are milliseconds.
//!
//! ```csv
//! id,name,targets,stagger_ms,crash,settle_ms,cooldown_ms
//! 1a,Staggered introduction,all,2000,none,0,5000
//! 2b,Six shuffled,shuffle:6,2000,none,0,5000
//! 4,One crash,shuffle,0,random:1,5000,5000
//! 7,Pinned crash,11 12 13,0,agents:3 7,0,5000
//! ```
//!
//! **`targets`** field:
//!
//! | Value        | Meaning                                          |
//! |--------------|--------------------------------------------------|
//! | `all`        | every roster target, in roster order             |
//! | `shuffle`    | every roster target, shuffled                    |
//! | `shuffle:N`  | the first `N` of a shuffled roster               |
//! | *ids*        | space-separated target ids, in that order        |
//!
//! **`crash`** field: `none`, `random:K`, `split`, or `agents:<ids>`.
//!
//! `cooldown_ms` must be positive.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use sw_core::{AgentId, SimRng, TargetId};

use crate::{CrashPlan, MonitorError, MonitorResult, Scenario};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SuiteRecord {
    id:          String,
    name:        String,
    targets:     String,
    stagger_ms:  u64,
    crash:       String,
    settle_ms:   u64,
    cooldown_ms: u64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a suite from a CSV file.  `roster` is every target in the session;
/// `seed` drives the `shuffle` selectors.
pub fn load_suite_path(path: &Path, roster: &[TargetId], seed: u64) -> MonitorResult<Vec<Scenario>> {
    let file = std::fs::File::open(path)?;
    load_suite_reader(file, roster, seed)
}

/// Like [`load_suite_path`] but accepts any `Read` source.
pub fn load_suite_reader<R: Read>(reader: R, roster: &[TargetId], seed: u64) -> MonitorResult<Vec<Scenario>> {
    let mut rng = SimRng::new(seed);
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut suite = Vec::new();

    for result in csv_reader.deserialize::<SuiteRecord>() {
        let row = result.map_err(|e| MonitorError::Parse(e.to_string()))?;
        let targets = parse_targets(&row.targets, roster, &mut rng)?;
        let crash = parse_crash(&row.crash)?;
        if row.cooldown_ms == 0 {
            return Err(MonitorError::Parse(format!(
                "scenario {}: cooldown_ms must be positive so agents release before the next scenario",
                row.id
            )));
        }
        suite.push(
            Scenario::new(row.id, row.name, targets)
                .with_stagger(Duration::from_millis(row.stagger_ms))
                .with_crash(crash)
                .with_settle(Duration::from_millis(row.settle_ms))
                .with_cooldown(Duration::from_millis(row.cooldown_ms)),
        );
    }

    Ok(suite)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_targets(s: &str, roster: &[TargetId], rng: &mut SimRng) -> MonitorResult<Vec<TargetId>> {
    let s = s.trim();
    if s == "all" {
        return Ok(roster.to_vec());
    }
    if let Some(rest) = s.strip_prefix("shuffle") {
        let mut targets = roster.to_vec();
        rng.shuffle(&mut targets);
        if let Some(n) = rest.strip_prefix(':') {
            let n: usize = n
                .trim()
                .parse()
                .map_err(|_| MonitorError::Parse(format!("invalid shuffle count {n:?}")))?;
            targets.truncate(n);
        } else if !rest.is_empty() {
            return Err(MonitorError::Parse(format!("invalid targets selector {s:?}")));
        }
        return Ok(targets);
    }

    let targets: Vec<TargetId> = parse_ids(s)?.into_iter().map(TargetId).collect();
    if let Some(t) = targets.iter().find(|t| !roster.contains(t)) {
        return Err(MonitorError::Parse(format!("target {} is not in the session", t.0)));
    }
    Ok(targets)
}

fn parse_crash(s: &str) -> MonitorResult<CrashPlan> {
    let s = s.trim();
    match s {
        "" | "none" => return Ok(CrashPlan::None),
        "split" => return Ok(CrashPlan::SplitHalves),
        _ => {}
    }
    if let Some(k) = s.strip_prefix("random:") {
        return k
            .trim()
            .parse()
            .map(CrashPlan::Random)
            .map_err(|_| MonitorError::Parse(format!("invalid crash count {k:?}")));
    }
    if let Some(ids) = s.strip_prefix("agents:") {
        return Ok(CrashPlan::Agents(parse_ids(ids)?.into_iter().map(AgentId).collect()));
    }
    Err(MonitorError::Parse(format!(
        "invalid crash plan {s:?}: expected \"none\", \"split\", \"random:K\", or \"agents:<ids>\""
    )))
}

fn parse_ids(s: &str) -> MonitorResult<Vec<u32>> {
    s.split_whitespace()
        .map(|n| n.parse::<u32>().map_err(|_| MonitorError::Parse(format!("invalid id {n:?}"))))
        .collect()
}
