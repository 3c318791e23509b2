//! Unit tests for sw-sim.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sw_behavior::{ClaimProtocol, Decision, ProtocolConfig, ServiceError, Services};
use sw_core::{AgentId, CoordinationMode, Position, Tick, TargetId};
use sw_transport::{Claim, MemoryBus};
use sw_world::World;

use crate::{CycleObserver, FleetBuilder, RuntimeConfig, ScenarioHost, Sim, SimError};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn world(agents: &[(u32, f64, f64)], targets: &[(u32, f64, f64)]) -> Arc<World> {
    let w = World::new();
    for &(id, x, y) in agents {
        w.add_agent(AgentId(id), Position::new(x, y)).unwrap();
    }
    for &(id, x, y) in targets {
        w.add_target(TargetId(id), Position::new(x, y)).unwrap();
    }
    Arc::new(w)
}

/// Eight agents in a column and eight targets in the two-column test layout;
/// every target is within sensing range of every agent.
fn full_world() -> Arc<World> {
    let agents: Vec<_> = (1..=8).map(|i| (i, 300.0, 100.0 + 70.0 * f64::from(i - 1))).collect();
    let targets: Vec<_> = (0..8)
        .map(|i| {
            let x = if i % 2 == 0 { 200.0 } else { 400.0 };
            (11 + i, x, 100.0 + 150.0 * f64::from(i / 2))
        })
        .collect();
    world(&agents, &targets)
}

fn builder(mode: CoordinationMode, world: &Arc<World>, ids: &[u32]) -> FleetBuilder<ClaimProtocol> {
    let config = RuntimeConfig {
        protocol: ProtocolConfig::default().with_mode(mode),
        ..Default::default()
    };
    FleetBuilder::new(config.clone(), ClaimProtocol::new(config.protocol))
        .agents(ids.iter().map(|&i| AgentId(i)))
        .services(Services::shared(Arc::clone(world)))
        .medium(Arc::new(MemoryBus::default()))
}

async fn lockstep(mode: CoordinationMode, world: &Arc<World>, ids: &[u32]) -> Sim<ClaimProtocol> {
    builder(mode, world, ids).build_sim().await.unwrap()
}

fn indicators(world: &World, ids: &[u32]) -> Vec<Option<u32>> {
    ids.iter().map(|&i| world.indicator(AgentId(i)).map(|t| t.0)).collect()
}

fn all_distinct(claims: &[Option<u32>]) -> bool {
    let held: Vec<u32> = claims.iter().flatten().copied().collect();
    held.len() == claims.len() && held.iter().collect::<BTreeSet<_>>().len() == held.len()
}

#[derive(Default)]
struct Counting {
    cycles:  AtomicUsize,
    skipped: AtomicUsize,
    claims:  AtomicUsize,
    crashes: AtomicUsize,
}

impl CycleObserver for Counting {
    fn on_cycle_end(&self, _: AgentId, _: Tick, _: &Decision) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }
    fn on_cycle_skipped(&self, _: AgentId, _: Tick, _: &ServiceError) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }
    fn on_claim(&self, _: AgentId, _: &Claim) {
        self.claims.fetch_add(1, Ordering::Relaxed);
    }
    fn on_crash(&self, _: AgentId) {
        self.crashes.fetch_add(1, Ordering::Relaxed);
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[tokio::test]
    async fn rejects_empty_roster() {
        let w = world(&[], &[]);
        let err = builder(CoordinationMode::Coordinated, &w, &[]).build_sim().await.err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[tokio::test]
    async fn rejects_duplicate_agents() {
        let w = world(&[(1, 0.0, 0.0)], &[]);
        let err = builder(CoordinationMode::Coordinated, &w, &[1, 1]).build_sim().await.err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[tokio::test]
    async fn coordinated_needs_a_medium() {
        let w = world(&[(1, 0.0, 0.0)], &[]);
        let err = FleetBuilder::new(RuntimeConfig::default(), ClaimProtocol::default())
            .agents([AgentId(1)])
            .services(Services::shared(Arc::clone(&w)))
            .build_sim()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SimError::MissingMedium));
    }

    #[tokio::test]
    async fn uncoordinated_needs_no_medium() {
        let w = world(&[(1, 0.0, 0.0)], &[]);
        let config = RuntimeConfig {
            protocol: ProtocolConfig::default().with_mode(CoordinationMode::Uncoordinated),
            ..Default::default()
        };
        let sim = FleetBuilder::new(config, ClaimProtocol::default())
            .agents([AgentId(1)])
            .services(Services::shared(Arc::clone(&w)))
            .build_sim()
            .await;
        assert!(sim.is_ok());
    }

    #[tokio::test]
    async fn rejects_zero_tick() {
        let w = world(&[(1, 0.0, 0.0)], &[]);
        let config = RuntimeConfig { tick: Duration::ZERO, ..Default::default() };
        let err = FleetBuilder::new(config, ClaimProtocol::default())
            .agents([AgentId(1)])
            .services(Services::shared(Arc::clone(&w)))
            .medium(Arc::new(MemoryBus::default()))
            .build_sim()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[tokio::test]
    async fn roster_is_sorted() {
        let w = world(&[(3, 0.0, 0.0), (1, 0.0, 10.0)], &[]);
        let sim = lockstep(CoordinationMode::Coordinated, &w, &[3, 1]).await;
        assert_eq!(sim.agents(), vec![AgentId(1), AgentId(3)]);
    }
}

// ── AgentRuntime ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod runtime_tests {
    use super::*;
    use sw_behavior::SessionControl;

    #[tokio::test]
    async fn cycle_records_claim_and_waypoint() {
        let w = world(&[(1, 0.0, 0.0)], &[(11, 100.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1]).await;
        sim.step().await;
        assert_eq!(w.indicator(AgentId(1)), Some(TargetId(11)));
        assert_eq!(w.waypoint(AgentId(1)), Some(Position::new(100.0, 0.0)));
    }

    #[tokio::test]
    async fn losing_all_targets_returns_to_standby() {
        let w = world(&[(1, 0.0, 0.0)], &[(11, 100.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1]).await;
        sim.step().await;

        w.set_position(TargetId(11).into(), Position::new(1300.0, 0.0)).await.unwrap();
        sim.step().await;
        assert_eq!(w.indicator(AgentId(1)), None);
        assert_eq!(w.waypoint(AgentId(1)), Some(Position::new(0.0, 0.0)));
    }

    #[tokio::test]
    async fn unreachable_agent_skips_with_state_untouched() {
        let w = world(&[(1, 0.0, 0.0)], &[(11, 100.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1]).await;
        w.set_unreachable(AgentId(1), true);
        assert_eq!(sim.step().await, 1);
        let state = sim.agent(AgentId(1)).unwrap().state();
        assert_eq!(state.cycles, 0);
        assert_eq!(state.current_target, None);

        w.set_unreachable(AgentId(1), false);
        assert_eq!(sim.step().await, 0);
        assert_eq!(sim.agent(AgentId(1)).unwrap().state().current_target, Some(TargetId(11)));
    }

    #[tokio::test]
    async fn unreachable_target_skips_the_cycle() {
        let w = world(&[(1, 0.0, 0.0)], &[(11, 100.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1]).await;
        w.set_unreachable(TargetId(11), true);
        assert_eq!(sim.step().await, 1);
    }

    #[tokio::test]
    async fn observer_sees_cycles_and_claims() {
        let w = world(&[(1, 0.0, 0.0), (2, 0.0, 50.0)], &[(11, 100.0, 0.0)]);
        let counting = Arc::new(Counting::default());
        let mut sim = builder(CoordinationMode::Coordinated, &w, &[1, 2])
            .observer(counting.clone())
            .build_sim()
            .await
            .unwrap();
        sim.run_ticks(10).await;
        assert_eq!(counting.cycles.load(Ordering::Relaxed), 20);
        assert_eq!(counting.skipped.load(Ordering::Relaxed), 0);
        assert!(counting.claims.load(Ordering::Relaxed) >= 18);
    }
}

// ── Lockstep Sim ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod sim_tests {
    use super::*;

    #[tokio::test]
    async fn advance_runs_virtual_time() {
        let w = world(&[(1, 0.0, 0.0)], &[]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1]).await;
        sim.advance(Duration::from_millis(100)).await;
        assert_eq!(sim.tick(), Tick(100));
        assert_eq!(sim.elapsed(), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn coordinated_pair_splits_targets() {
        let w = world(&[(1, 0.0, 0.0), (2, 10.0, 0.0)], &[(11, 100.0, 0.0), (12, 300.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1, 2]).await;
        sim.run_ticks(50).await;
        let claims = indicators(&w, &[1, 2]);
        assert!(all_distinct(&claims), "{claims:?}");
    }

    #[tokio::test]
    async fn uncoordinated_pair_collides() {
        let w = world(&[(1, 0.0, 0.0), (2, 10.0, 0.0)], &[(11, 100.0, 0.0), (12, 300.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Uncoordinated, &w, &[1, 2]).await;
        sim.run_ticks(50).await;
        assert_eq!(indicators(&w, &[1, 2]), vec![Some(11), Some(11)]);
    }

    #[tokio::test]
    async fn full_fleet_converges_to_distinct_targets() {
        let w = full_world();
        let ids: Vec<u32> = (1..=8).collect();
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &ids).await;
        sim.run_ticks(200).await;
        let claims = indicators(&w, &ids);
        assert!(all_distinct(&claims), "{claims:?}");
    }

    #[tokio::test]
    async fn crashed_holder_frees_its_target() {
        let w = world(&[(1, 0.0, 0.0), (2, 50.0, 0.0)], &[(11, 100.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1, 2]).await;
        sim.run_ticks(10).await;
        assert_eq!(indicators(&w, &[1, 2]), vec![Some(11), None]);

        sim.crash(AgentId(1)).unwrap();
        sim.run_ticks(5).await;
        // The crashed agent's indicator is frozen at its last value.
        assert_eq!(indicators(&w, &[1, 2]), vec![Some(11), Some(11)]);
        assert_eq!(sim.live_agents(), vec![AgentId(2)]);
    }

    #[tokio::test]
    async fn restart_boots_fresh() {
        let w = world(&[(1, 0.0, 0.0), (2, 50.0, 0.0)], &[(11, 100.0, 0.0)]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1, 2]).await;
        sim.run_ticks(10).await;
        sim.crash(AgentId(1)).unwrap();
        sim.run_ticks(5).await;

        sim.restart(AgentId(1)).await.unwrap();
        assert_eq!(w.indicator(AgentId(1)), None);
        assert_eq!(sim.agent(AgentId(1)).unwrap().state().cycles, 0);

        sim.run_ticks(20).await;
        // Agent 2 now holds the target; the newcomer defers.
        assert_eq!(indicators(&w, &[1, 2]), vec![None, Some(11)]);
    }

    #[tokio::test]
    async fn crash_and_restart_errors() {
        let w = world(&[(1, 0.0, 0.0), (2, 50.0, 0.0)], &[]);
        let mut sim = lockstep(CoordinationMode::Coordinated, &w, &[1, 2]).await;
        assert!(matches!(sim.crash(AgentId(9)), Err(SimError::UnknownAgent(_))));
        assert!(matches!(sim.restart(AgentId(2)).await, Err(SimError::AlreadyLive(_))));
        sim.crash(AgentId(2)).unwrap();
        assert!(matches!(sim.crash(AgentId(2)), Err(SimError::NotLive(_))));
        assert_eq!(sim.agents(), vec![AgentId(1), AgentId(2)]);
    }

    #[tokio::test]
    async fn lossy_bus_still_converges() {
        let w = full_world();
        let ids: Vec<u32> = (1..=8).collect();
        let mut sim = builder(CoordinationMode::Coordinated, &w, &ids)
            .medium(Arc::new(MemoryBus::lossy(1024, 0.2, 7)))
            .build_sim()
            .await
            .unwrap();
        sim.run_ticks(500).await;
        let held = indicators(&w, &ids).into_iter().flatten().count();
        assert!(held >= 6, "most agents should be tracking, got {held}");
    }
}

// ── Concurrent Fleet ──────────────────────────────────────────────────────────

#[cfg(test)]
mod fleet_tests {
    use super::*;
    use std::sync::Mutex;
    use sw_agent::SharedAgent;
    use crate::AgentRuntime;

    #[tokio::test(start_paused = true)]
    async fn contended_pair_resolves() {
        let w = world(&[(1, 0.0, 0.0), (2, 10.0, 0.0)], &[(11, 100.0, 0.0), (12, 300.0, 0.0)]);
        let mut fleet = builder(CoordinationMode::Coordinated, &w, &[1, 2]).spawn_fleet().await.unwrap();
        fleet.advance(Duration::from_millis(200)).await;
        let claims = indicators(&w, &[1, 2]);
        assert!(all_distinct(&claims), "{claims:?}");
        fleet.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_follows_tokio_time() {
        let w = world(&[(1, 0.0, 0.0)], &[]);
        let mut fleet = builder(CoordinationMode::Coordinated, &w, &[1]).spawn_fleet().await.unwrap();
        fleet.advance(Duration::from_millis(250)).await;
        assert!(fleet.elapsed() >= Duration::from_millis(250));
        let cycles = fleet.agent(AgentId(1)).unwrap().state().cycles;
        assert!(cycles >= 200, "expected ~250 cycles, got {cycles}");
    }

    #[tokio::test(start_paused = true)]
    async fn crashed_agent_stops_cycling() {
        let w = world(&[(1, 0.0, 0.0), (2, 50.0, 0.0)], &[(11, 100.0, 0.0)]);
        let counting = Arc::new(Counting::default());
        let mut fleet = builder(CoordinationMode::Coordinated, &w, &[1, 2])
            .observer(counting.clone())
            .spawn_fleet()
            .await
            .unwrap();
        fleet.advance(Duration::from_millis(20)).await;

        let victim = fleet.agent(AgentId(1)).unwrap().clone();
        fleet.crash(AgentId(1)).unwrap();
        let frozen = victim.state().cycles;
        fleet.advance(Duration::from_millis(50)).await;

        assert_eq!(victim.state().cycles, frozen);
        assert_eq!(fleet.live_agents(), vec![AgentId(2)]);
        assert_eq!(counting.crashes.load(Ordering::Relaxed), 1);
        assert_eq!(w.indicator(AgentId(2)), Some(TargetId(11)));
    }

    /// Records the tick of every finished cycle.
    #[derive(Default)]
    struct Ticks(Mutex<Vec<Tick>>);

    impl CycleObserver for Ticks {
        fn on_cycle_end(&self, _: AgentId, tick: Tick, _: &Decision) {
            self.0.lock().unwrap().push(tick);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_task_advances_tick() {
        let w = world(&[(1, 0.0, 0.0)], &[(11, 100.0, 0.0)]);
        let ticks = Arc::new(Ticks::default());
        let runtime = AgentRuntime::new(
            SharedAgent::new(AgentId(1)),
            Arc::new(ClaimProtocol::default()),
            Services::shared(w),
            None,
            ticks.clone(),
        );
        let task = tokio::spawn(crate::fleet::drive(runtime, Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(35)).await;
        task.abort();

        let seen = ticks.0.lock().unwrap().clone();
        assert!(seen.len() >= 3, "{seen:?}");
        let expected: Vec<Tick> = (0..seen.len() as u64).map(Tick).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_rejoins_transport() {
        let w = world(&[(1, 0.0, 0.0), (2, 50.0, 0.0)], &[(11, 100.0, 0.0), (12, 400.0, 0.0)]);
        let mut fleet = builder(CoordinationMode::Coordinated, &w, &[1, 2]).spawn_fleet().await.unwrap();
        fleet.advance(Duration::from_millis(20)).await;
        fleet.crash(AgentId(2)).unwrap();
        fleet.advance(Duration::from_millis(20)).await;
        fleet.restart(AgentId(2)).await.unwrap();
        fleet.advance(Duration::from_millis(100)).await;

        let claims = indicators(&w, &[1, 2]);
        assert!(all_distinct(&claims), "{claims:?}");
        assert_eq!(fleet.live_agents(), vec![AgentId(1), AgentId(2)]);
    }
}
