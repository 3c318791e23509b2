//! fleet — target-assignment scenario runner.
//!
//! Deploys a fleet of agents and a set of targets into an in-memory
//! session, then runs the scenario suite against it: targets are moved into
//! sensing range, agents are crashed, and the convergence monitor judges
//! whether every live agent ends up on a distinct target.
//!
//! Results go to `latency.log` and `scenario_results.csv` in the output
//! directory; a one-line summary per scenario is printed to stdout.
//!
//! ```text
//! fleet suite                          # standard suite, lockstep, coordinated
//! fleet --mode none suite              # same suite without claim exchange
//! fleet --driver concurrent scenario 4 # one scenario on tokio tasks
//! fleet --config fleet.yaml --suite my_suite.csv suite
//! ```

mod config;
mod logging;


use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sw_behavior::{ClaimProtocol, Decision, ServiceError, Services};
use sw_core::{AgentId, CoordinationMode, TargetId, Tick};
use sw_monitor::{ConvergenceMonitor, Layout, Scenario, ScenarioDriver, load_suite_path, standard_suite};
use sw_output::{CsvWriter, LogWriter, ReportSink};
use sw_sim::{CycleObserver, FleetBuilder, ScenarioHost};
use sw_transport::{Claim, Medium, MemoryBus, UdpMulticast};
use sw_world::World;
use tracing::info;

use crate::config::{DriverKind, FleetConfig, TransportKind};

/// In-memory bus queue depth per subscriber.
const BUS_CAPACITY: usize = 1_024;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "fleet", version, about = "Runs target-assignment scenarios against a simulated fleet")]
struct Cli {
    /// YAML configuration file.
    #[arg(short, long, env = "SWARM_CONFIG")]
    config: Option<PathBuf>,

    /// Claim exchange: coordinated/udp or uncoordinated/none.
    #[arg(long)]
    mode: Option<CoordinationMode>,

    #[arg(long, value_enum)]
    driver: Option<DriverKind>,

    #[arg(long, value_enum)]
    transport: Option<TransportKind>,

    #[arg(long)]
    seed: Option<u64>,

    /// Directory for latency.log and scenario_results.csv.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// CSV suite to run instead of the standard suite.
    #[arg(long)]
    suite: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every scenario of the suite.
    Suite,
    /// Run the scenario(s) with this id.
    Scenario { id: String },
}

impl Cli {
    fn apply(&self, config: &mut FleetConfig) {
        if let Some(mode) = self.mode {
            config.protocol.mode = mode;
        }
        if let Some(driver) = self.driver {
            config.driver = driver;
        }
        if let Some(kind) = self.transport {
            config.transport.kind = kind;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(suite) = &self.suite {
            config.suite = Some(suite.clone());
        }
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Fleet-wide counters, printed after the suite.
#[derive(Default)]
struct CycleStats {
    cycles:   AtomicU64,
    skipped:  AtomicU64,
    claims:   AtomicU64,
    crashes:  AtomicU64,
    restarts: AtomicU64,
}

impl CycleObserver for CycleStats {
    fn on_cycle_end(&self, _agent: AgentId, _tick: Tick, _decision: &Decision) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    fn on_cycle_skipped(&self, _agent: AgentId, _tick: Tick, _error: &ServiceError) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn on_claim(&self, _agent: AgentId, _claim: &Claim) {
        self.claims.fetch_add(1, Ordering::Relaxed);
    }

    fn on_crash(&self, _agent: AgentId) {
        self.crashes.fetch_add(1, Ordering::Relaxed);
    }

    fn on_restart(&self, _agent: AgentId) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// Place agents at their home slots and targets at their parking slots.
fn deploy(config: &FleetConfig, layout: &Layout) -> Result<(Arc<World>, Vec<AgentId>, Vec<TargetId>)> {
    let world = Arc::new(World::new());
    let agents: Vec<AgentId> = config.agents.iter().copied().map(AgentId).collect();
    let targets: Vec<TargetId> = config.targets.iter().copied().map(TargetId).collect();

    for (i, &agent) in agents.iter().enumerate() {
        world.add_agent(agent, layout.agent_home(i, agents.len()))?;
    }
    for (i, &target) in targets.iter().enumerate() {
        world.add_target(target, layout.slot_out(i))?;
    }
    Ok((world, agents, targets))
}

async fn medium(config: &FleetConfig) -> Result<Arc<dyn Medium>> {
    let medium: Arc<dyn Medium> = match config.transport.kind {
        TransportKind::Memory if config.transport.loss > 0.0 => {
            Arc::new(MemoryBus::lossy(BUS_CAPACITY, config.transport.loss, config.seed))
        }
        TransportKind::Memory => Arc::new(MemoryBus::new(BUS_CAPACITY)),
        TransportKind::Udp => {
            let udp = config.multicast();
            let bus = UdpMulticast::bind(&udp)
                .await
                .with_context(|| format!("Failed to join multicast group {}:{}", udp.group, udp.port))?;
            Arc::new(bus)
        }
    };
    Ok(medium)
}

fn suite(config: &FleetConfig, targets: &[TargetId], command: &Command) -> Result<Vec<Scenario>> {
    let mut scenarios = match &config.suite {
        Some(path) => load_suite_path(path, targets, config.seed)
            .with_context(|| format!("Failed to load suite {}", path.display()))?,
        None => standard_suite(targets, config.seed),
    };
    if let Command::Scenario { id } = command {
        scenarios.retain(|s| &s.id == id);
        if scenarios.is_empty() {
            bail!("No scenario with id {id}");
        }
    }
    Ok(scenarios)
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = FleetConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    logging::init(&config.logging)?;

    let layout = Layout::default();
    let (world, agents, targets) = deploy(&config, &layout)?;
    let scenarios = suite(&config, &targets, &cli.command)?;

    let stats = Arc::new(CycleStats::default());
    let mut builder = FleetBuilder::new(config.runtime(), ClaimProtocol::new(config.protocol.clone()))
        .agents(agents.iter().copied())
        .services(Services::shared(world.clone()))
        .observer(stats.clone());
    if config.protocol.mode.is_coordinated() {
        builder = builder.medium(medium(&config).await?);
    }

    let mut host: Box<dyn ScenarioHost> = match config.driver {
        DriverKind::Lockstep => Box::new(builder.build_sim().await?),
        DriverKind::Concurrent => Box::new(builder.spawn_fleet().await?),
    };

    info!(
        agents = agents.len(),
        targets = targets.len(),
        scenarios = scenarios.len(),
        mode = ?config.protocol.mode,
        driver = ?config.driver,
        "fleet deployed"
    );

    let monitor = ConvergenceMonitor::new(world.clone(), config.monitor());
    let mut driver = ScenarioDriver::new(world.clone(), monitor, layout, targets, config.seed);
    driver.park_targets().await?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    let writers = (LogWriter::create(&config.output_dir)?, CsvWriter::new(&config.output_dir)?);
    let mut sink = ReportSink::new(writers);

    let wall = Instant::now();
    for scenario in &scenarios {
        let record = driver.run(host.as_mut(), scenario).await?;
        let row = sink.record(&record);
        println!(
            "{:<4} {:<48} {:>8.3}s  {}  {}",
            row.id,
            row.name,
            row.latency_secs,
            if row.unique { "PASSED" } else { "FAILED" },
            row.pairs,
        );
    }
    sink.finish();
    if let Some(e) = sink.take_error() {
        return Err(e).context("Failed to write scenario report");
    }

    let summary = sink.summary();
    println!(
        "\n{} scenario(s): {} unique, {} duplicate  ({:.1?} wall, {:.1?} fleet time)",
        summary.total(),
        summary.unique,
        summary.duplicate,
        wall.elapsed(),
        host.elapsed(),
    );
    println!(
        "{} cycles, {} skipped, {} peer claims applied, {} crashes, {} restarts",
        stats.cycles.load(Ordering::Relaxed),
        stats.skipped.load(Ordering::Relaxed),
        stats.claims.load(Ordering::Relaxed),
        stats.crashes.load(Ordering::Relaxed),
        stats.restarts.load(Ordering::Relaxed),
    );
    Ok(())
}
