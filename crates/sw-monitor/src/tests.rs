//! Unit tests for sw-monitor.

use std::sync::Arc;
use std::time::Duration;

use sw_behavior::{ClaimProtocol, ProtocolConfig, Services};
use sw_core::{AgentId, CoordinationMode, TargetId};
use sw_sim::{FleetBuilder, RuntimeConfig, ScenarioHost, Sim};
use sw_transport::MemoryBus;
use sw_world::World;

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

const AGENTS:  [u32; 8] = [1, 2, 3, 4, 6, 7, 8, 9];
const TARGETS: [u32; 8] = [11, 12, 13, 14, 16, 17, 18, 19];

fn agents() -> Vec<AgentId> {
    AGENTS.iter().map(|&a| AgentId(a)).collect()
}

fn targets() -> Vec<TargetId> {
    TARGETS.iter().map(|&t| TargetId(t)).collect()
}

/// Agents deployed in a column, every target parked out of range.
fn session() -> Arc<World> {
    let layout = Layout::default();
    let world = World::new();
    for (i, a) in agents().into_iter().enumerate() {
        world.add_agent(a, layout.agent_home(i, AGENTS.len())).unwrap();
    }
    for (i, t) in targets().into_iter().enumerate() {
        world.add_target(t, layout.slot_out(i)).unwrap();
    }
    Arc::new(world)
}

async fn fleet(world: &Arc<World>, mode: CoordinationMode) -> Sim<ClaimProtocol> {
    let config = RuntimeConfig {
        protocol: ProtocolConfig::default().with_mode(mode),
        ..Default::default()
    };
    FleetBuilder::new(config.clone(), ClaimProtocol::new(config.protocol))
        .agents(agents())
        .services(Services::shared(Arc::clone(world)))
        .medium(Arc::new(MemoryBus::default()))
        .build_sim()
        .await
        .unwrap()
}

fn monitor(world: &Arc<World>) -> ConvergenceMonitor {
    ConvergenceMonitor::new(world.clone(), MonitorConfig { poll: Duration::from_millis(10), max_polls: 300 })
}

fn driver(world: &Arc<World>) -> ScenarioDriver {
    ScenarioDriver::new(world.clone(), monitor(world), Layout::default(), targets(), 42)
}

fn quick(id: &str, targets: Vec<TargetId>) -> Scenario {
    Scenario::new(id, id, targets)
        .with_stagger(Duration::from_millis(20))
        .with_cooldown(Duration::from_millis(50))
}

fn ledger_of(entries: &[(u32, &[u32])]) -> ClaimLedger {
    let mut ledger = ClaimLedger::new();
    for &(agent, claims) in entries {
        for &t in claims {
            ledger.observe(AgentId(agent), Some(TargetId(t)));
            ledger.observe(AgentId(agent), None);
        }
    }
    ledger
}

fn ids(ts: &[u32]) -> Vec<TargetId> {
    ts.iter().map(|&t| TargetId(t)).collect()
}

// ── ClaimLedger ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod ledger_tests {
    use super::*;

    #[test]
    fn appends_only_on_change() {
        let mut ledger = ClaimLedger::new();
        assert!(ledger.observe(AgentId(1), Some(TargetId(11))));
        assert!(!ledger.observe(AgentId(1), Some(TargetId(11))));
        assert!(ledger.observe(AgentId(1), Some(TargetId(12))));
        assert_eq!(ledger.history(AgentId(1)), &[TargetId(11), TargetId(12)]);
    }

    #[test]
    fn none_is_never_recorded() {
        let mut ledger = ClaimLedger::new();
        assert!(!ledger.observe(AgentId(1), None));
        assert!(ledger.is_empty());
        ledger.observe(AgentId(1), Some(TargetId(11)));
        ledger.observe(AgentId(1), None);
        ledger.observe(AgentId(1), Some(TargetId(11)));
        assert_eq!(ledger.history(AgentId(1)), &[TargetId(11), TargetId(11)]);
    }

    #[test]
    fn tracking_count_follows_latest_poll() {
        let mut ledger = ClaimLedger::new();
        ledger.observe(AgentId(1), Some(TargetId(11)));
        ledger.observe(AgentId(2), Some(TargetId(12)));
        assert_eq!(ledger.tracking_count(), 2);
        ledger.observe(AgentId(2), None);
        assert_eq!(ledger.tracking_count(), 1);
        assert_eq!(ledger.current(AgentId(2)), None);
        assert_eq!(ledger.current(AgentId(1)), Some(TargetId(11)));
    }

    #[test]
    fn display_lists_histories() {
        let ledger = ledger_of(&[(2, &[12, 14]), (1, &[11])]);
        assert_eq!(ledger.to_string(), "{1: [11], 2: [12, 14]}");
        assert_eq!(ClaimLedger::new().to_string(), "{}");
    }
}

// ── Verdicts ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod verdict_tests {
    use super::*;

    #[test]
    fn convergence_needs_every_agent_when_targets_suffice() {
        assert!(convergence_reached(8, 8, 8));
        assert!(!convergence_reached(7, 8, 8));
        assert!(convergence_reached(7, 7, 8));
    }

    #[test]
    fn convergence_with_fewer_targets_than_agents() {
        assert!(convergence_reached(6, 8, 6));
        assert!(convergence_reached(7, 8, 6));
        assert!(!convergence_reached(5, 8, 6));
    }

    #[test]
    fn exact_cover_passes_in_any_order() {
        let ledger = ledger_of(&[(1, &[13]), (2, &[11]), (3, &[12])]);
        assert!(uniqueness_verdict(&ledger, &ids(&[11, 12, 13]), 3));
    }

    #[test]
    fn shared_target_fails() {
        let ledger = ledger_of(&[(1, &[11]), (2, &[11]), (3, &[12])]);
        assert!(!uniqueness_verdict(&ledger, &ids(&[11, 12, 13]), 3));
    }

    #[test]
    fn distinct_claims_per_live_agent_pass() {
        // Seven live agents, eight targets: one left unclaimed.
        let ledger = ledger_of(&[(1, &[11]), (2, &[12]), (3, &[13]), (4, &[14]), (6, &[16]), (7, &[17]), (8, &[18])]);
        assert!(uniqueness_verdict(&ledger, &targets(), 7));
    }

    #[test]
    fn duplicate_among_live_agents_fails() {
        let ledger = ledger_of(&[(1, &[11]), (2, &[11])]);
        assert!(!uniqueness_verdict(&ledger, &ids(&[11, 12, 13]), 2));
    }

    #[test]
    fn switching_agent_fails() {
        let ledger = ledger_of(&[(1, &[11, 12]), (2, &[13])]);
        assert!(!uniqueness_verdict(&ledger, &ids(&[11, 12]), 2));
    }
}

// ── Scenarios and layout ──────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use sw_core::{Position, SimRng};

    use super::*;

    #[test]
    fn slots_fill_two_columns() {
        let layout = Layout::default();
        assert_eq!(layout.slot_in(0), Position::new(200.0, 100.0));
        assert_eq!(layout.slot_in(1), Position::new(400.0, 100.0));
        assert_eq!(layout.slot_in(2), Position::new(200.0, 250.0));
        assert_eq!(layout.slot_in(7), Position::new(400.0, 550.0));
        assert_eq!(layout.slot_out(0), Position::new(1300.0, 100.0));
        assert_eq!(layout.slot_out(3), Position::new(1400.0, 250.0));
    }

    #[test]
    fn every_slot_in_range_of_every_agent() {
        let layout = Layout::default();
        let range = ProtocolConfig::default().sensing_range;
        for a in 0..8 {
            for t in 0..8 {
                assert!(layout.agent_home(a, 8).distance(layout.slot_in(t)) < range);
            }
        }
    }

    #[test]
    fn large_roster_stays_in_range() {
        let layout = Layout::default();
        let range = ProtocolConfig::default().sensing_range;
        let roster = 40;
        let last = layout.agent_home(roster - 1, roster);
        assert!((last.y - (layout.y0 + layout.agent_span)).abs() < 1e-9, "{last}");
        for a in 0..roster {
            for t in 0..8 {
                assert!(layout.agent_home(a, roster).distance(layout.slot_in(t)) < range);
            }
        }
    }

    #[test]
    fn small_roster_keeps_agent_gap() {
        let layout = Layout::default();
        assert_eq!(layout.agent_home(0, 1), Position::new(300.0, 100.0));
        assert_eq!(layout.agent_home(2, 3), Position::new(300.0, 240.0));
        assert_eq!(layout.agent_home(7, 8), Position::new(300.0, 590.0));
    }

    #[test]
    fn standard_suite_order_and_shape() {
        let suite = standard_suite(&targets(), 7);
        let ids: Vec<_> = suite.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1a", "1b", "2a", "2b", "3a", "3b", "4", "5", "6a", "6b"]);

        assert_eq!(suite[0].targets, targets());
        assert_eq!(suite[0].stagger, Duration::from_secs(2));
        assert_eq!(suite[2].targets, targets()[..6]);
        assert_eq!(suite[3].targets.len(), 6);
        assert_eq!(suite[6].crash, CrashPlan::Random(1));
        assert_eq!(suite[7].crash, CrashPlan::SplitHalves);
        assert!(suite.iter().all(|s| s.cooldown == Duration::from_secs(5)));

        let mut shuffled = suite[1].targets.clone();
        shuffled.sort();
        assert_eq!(shuffled, targets());
    }

    #[test]
    fn standard_suite_is_seeded() {
        assert_eq!(standard_suite(&targets(), 9), standard_suite(&targets(), 9));
    }

    #[test]
    fn crash_plans_resolve() {
        let roster = agents();
        let mut rng = SimRng::new(3);
        assert!(CrashPlan::None.resolve(&roster, &mut rng).is_empty());
        assert_eq!(CrashPlan::Agents(vec![AgentId(4)]).resolve(&roster, &mut rng), vec![AgentId(4)]);

        let picked = CrashPlan::Random(2).resolve(&roster, &mut rng);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0], picked[1]);

        let split = CrashPlan::SplitHalves.resolve(&roster, &mut rng);
        assert_eq!(split.len(), 2);
        assert!(split[0].0 <= 4, "first victim from the low half");
        assert!(split[1].0 >= 6, "second victim from the high half");
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use std::io::Cursor;

    use super::*;

    const SUITE: &str = "\
id,name,targets,stagger_ms,crash,settle_ms,cooldown_ms
1a,Staggered,all,2000,none,0,5000
2b,Six shuffled,shuffle:6,2000,none,0,5000
4,One crash,shuffle,0,random:1,5000,5000
5,Split crash,shuffle,0,split,5000,5000
7,Pinned,11 12 13,0,agents:3 7,0,100
";

    #[test]
    fn loads_every_row() {
        let suite = load_suite_reader(Cursor::new(SUITE), &targets(), 1).unwrap();
        assert_eq!(suite.len(), 5);

        assert_eq!(suite[0].targets, targets());
        assert_eq!(suite[0].stagger, Duration::from_millis(2000));
        assert_eq!(suite[1].targets.len(), 6);
        assert_eq!(suite[2].crash, CrashPlan::Random(1));
        assert_eq!(suite[2].settle, Duration::from_millis(5000));
        assert_eq!(suite[3].crash, CrashPlan::SplitHalves);
        assert_eq!(suite[4].targets, ids(&[11, 12, 13]));
        assert_eq!(suite[4].crash, CrashPlan::Agents(vec![AgentId(3), AgentId(7)]));
        assert_eq!(suite[4].cooldown, Duration::from_millis(100));
    }

    #[test]
    fn rejects_bad_crash_plan() {
        let csv = "id,name,targets,stagger_ms,crash,settle_ms,cooldown_ms\nx,x,all,0,explode,0,100\n";
        let err = load_suite_reader(Cursor::new(csv), &targets(), 1).unwrap_err();
        assert!(matches!(err, MonitorError::Parse(_)));
    }

    #[test]
    fn rejects_unknown_target() {
        let csv = "id,name,targets,stagger_ms,crash,settle_ms,cooldown_ms\nx,x,11 99,0,none,0,100\n";
        let err = load_suite_reader(Cursor::new(csv), &targets(), 1).unwrap_err();
        assert!(matches!(err, MonitorError::Parse(_)));
    }

    #[test]
    fn rejects_zero_cooldown() {
        let csv = "id,name,targets,stagger_ms,crash,settle_ms,cooldown_ms\nx,x,all,0,none,0,0\n";
        let err = load_suite_reader(Cursor::new(csv), &targets(), 1).unwrap_err();
        assert!(matches!(&err, MonitorError::Parse(m) if m.contains("cooldown_ms")), "{err}");
    }

    #[test]
    fn rejects_missing_column() {
        let csv = "id,name,targets\nx,x,all\n";
        assert!(load_suite_reader(Cursor::new(csv), &targets(), 1).is_err());
    }
}

// ── Monitor and driver ────────────────────────────────────────────────────────

#[cfg(test)]
mod driver_tests {
    use sw_behavior::{ServiceError, ServiceResult, SessionControl};
    use sw_core::{NodeId, Position};

    use super::*;

    #[tokio::test]
    async fn staggered_full_introduction_converges_uniquely() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        let record = driver(&world).run(&mut sim, &quick("1a", targets())).await.unwrap();

        assert!(record.converged);
        assert!(record.unique, "{}", record.ledger);
        assert_eq!(record.ledger.tracking_count(), 8);
        assert!(record.latency() >= Duration::from_millis(170));
    }

    #[tokio::test]
    async fn fewer_targets_than_agents() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        let record = driver(&world).run(&mut sim, &quick("2a", targets()[..6].to_vec())).await.unwrap();

        assert!(record.converged);
        assert!(record.unique, "{}", record.ledger);
        assert_eq!(record.ledger.all_claims().len(), 6);
    }

    #[tokio::test]
    async fn crashed_agent_leaves_one_target_unclaimed() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        let scenario = quick("4", targets()).with_crash(CrashPlan::Agents(vec![AgentId(3)]));
        let record = driver(&world).run(&mut sim, &scenario).await.unwrap();

        assert!(record.converged);
        assert!(record.unique, "{}", record.ledger);
        assert_eq!(record.crashed, vec![AgentId(3)]);
        assert!(record.ledger.history(AgentId(3)).is_empty());
        assert_eq!(record.ledger.all_claims().len(), 7);
        assert_eq!(sim.live_agents().len(), 8, "crashed agent restarted");
    }

    /// Session whose position writes always fail.
    struct Frozen(Arc<World>);

    #[async_trait::async_trait]
    impl SessionControl for Frozen {
        async fn position(&self, node: NodeId) -> ServiceResult<Position> {
            self.0.position(node).await
        }
        async fn set_position(&self, _: NodeId, _: Position) -> ServiceResult<()> {
            Err(ServiceError::Unavailable("frozen".into()))
        }
        async fn record_target(&self, agent: AgentId, target: Option<TargetId>) -> ServiceResult<()> {
            self.0.record_target(agent, target).await
        }
        async fn recorded_target(&self, agent: AgentId) -> ServiceResult<Option<TargetId>> {
            self.0.recorded_target(agent).await
        }
    }

    #[tokio::test]
    async fn failed_target_move_still_restarts_crashed_agents() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        let frozen: Arc<dyn SessionControl> = Arc::new(Frozen(world.clone()));
        let mut driver = ScenarioDriver::new(frozen, monitor(&world), Layout::default(), targets(), 42);
        let scenario = quick("4", targets()).with_crash(CrashPlan::Agents(vec![AgentId(3), AgentId(7)]));

        let err = driver.run(&mut sim, &scenario).await.unwrap_err();
        assert!(matches!(err, MonitorError::Service(_)), "{err}");
        assert_eq!(sim.live_agents(), agents());
    }

    #[tokio::test]
    async fn record_carries_fleet_mode() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Uncoordinated).await;
        let record = driver(&world).run(&mut sim, &quick("1a", targets()[..1].to_vec())).await.unwrap();
        assert_eq!(record.mode, CoordinationMode::Uncoordinated);
    }

    #[tokio::test]
    async fn teardown_parks_targets_and_frees_agents() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        driver(&world).run(&mut sim, &quick("3a", targets())).await.unwrap();

        for t in targets() {
            assert!(world.position_of(t).unwrap().x >= 1300.0);
        }
        for a in agents() {
            assert_eq!(world.indicator(a), None);
        }
    }

    #[tokio::test]
    async fn suite_runs_back_to_back() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        let suite = vec![
            quick("1a", targets()),
            quick("4", targets()).with_crash(CrashPlan::Random(1)),
            quick("6a", targets()[..6].to_vec()),
        ];
        let records = driver(&world).run_suite(&mut sim, &suite).await.unwrap();
        assert_eq!(records.len(), 3);
        for r in &records {
            assert!(r.converged && r.unique, "{}: {}", r.id, r.ledger);
        }
        assert!(records[1].started >= records[0].stopped);
    }

    #[tokio::test]
    async fn uncoordinated_fleet_fails_uniqueness() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Uncoordinated).await;
        let record = driver(&world).run(&mut sim, &quick("1a", targets())).await.unwrap();

        // Everyone locks onto the first target introduced.
        assert!(record.converged);
        assert!(!record.unique);
        assert!(agents().iter().all(|&a| record.ledger.history(a) == [TargetId(11)]));
    }

    #[tokio::test]
    async fn crashing_everyone_is_rejected() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        let scenario = quick("x", targets()).with_crash(CrashPlan::Random(8));
        let err = driver(&world).run(&mut sim, &scenario).await.unwrap_err();
        assert!(matches!(err, MonitorError::Scenario { .. }));
    }

    #[tokio::test]
    async fn timeout_returns_partial_ledger() {
        let world = session();
        let mut sim = fleet(&world, CoordinationMode::Coordinated).await;
        world.set_position(TargetId(11).into(), Layout::default().slot_in(0)).await.unwrap();

        let outcome = monitor(&world).await_convergence(&mut sim, 8, 8, 5).await;
        assert!(!outcome.converged);
        assert_eq!(outcome.polls, 5);
        assert_eq!(outcome.ledger.tracking_count(), 1);
        assert_eq!(outcome.elapsed, Duration::from_millis(50));
    }
}
