//! Layered configuration: defaults, then YAML, then `SWARM_*` environment
//! variables.  CLI flags are applied on top by `main`.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use sw_behavior::ProtocolConfig;
use sw_monitor::{DEFAULT_MAX_POLLS, DEFAULT_POLL, MonitorConfig};
use sw_sim::RuntimeConfig;
use sw_transport::MulticastConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {0} roster: must be non-empty with unique, non-zero ids")]
    InvalidRoster(&'static str),

    #[error("Node id {0} is used by both an agent and a target")]
    SharedNodeId(u32),

    #[error("Invalid {0}: must be positive")]
    NotPositive(&'static str),

    #[error("Invalid loss rate: {0}. Must be in [0, 1)")]
    InvalidLoss(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid protocol settings: {0}")]
    Protocol(String),
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Deterministic ticks, virtual time.
    Lockstep,
    /// One tokio task per agent, wall-clock time.
    Concurrent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Memory,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    pub poll_ms:   u64,
    pub max_polls: u32,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self { poll_ms: DEFAULT_POLL.as_millis() as u64, max_polls: DEFAULT_MAX_POLLS }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSection {
    pub kind:  TransportKind,
    /// Drop rate of the in-memory bus.
    pub loss:  f64,
    pub group: Ipv4Addr,
    pub port:  u16,
    pub ttl:   u32,
}

impl Default for TransportSection {
    fn default() -> Self {
        let udp = MulticastConfig::default();
        Self { kind: TransportKind::Memory, loss: 0.0, group: udp.group, port: udp.port, ttl: udp.ttl }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level:  String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { level: "info".into(), format: LogFormat::Pretty }
    }
}

// ── FleetConfig ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub agents:     Vec<u32>,
    pub targets:    Vec<u32>,
    pub seed:       u64,
    pub driver:     DriverKind,
    pub tick_ms:    u64,
    pub protocol:   ProtocolConfig,
    pub monitor:    MonitorSection,
    pub transport:  TransportSection,
    pub output_dir: PathBuf,
    /// CSV suite to run instead of the standard suite.
    pub suite:      Option<PathBuf>,
    pub logging:    LoggingSection,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            agents:     vec![1, 2, 3, 4, 6, 7, 8, 9],
            targets:    vec![11, 12, 13, 14, 16, 17, 18, 19],
            seed:       42,
            driver:     DriverKind::Lockstep,
            tick_ms:    1,
            protocol:   ProtocolConfig::default(),
            monitor:    MonitorSection::default(),
            transport:  TransportSection::default(),
            output_dir: PathBuf::from("."),
            suite:      None,
            logging:    LoggingSection::default(),
        }
    }
}

impl FleetConfig {
    /// Defaults, then `file` if given, then `SWARM_*` variables (`__`
    /// separates nested keys, e.g. `SWARM_MONITOR__POLL_MS`).
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(FleetConfig::default()));
        if let Some(path) = file {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed("SWARM_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let agents = unique_roster(&self.agents).ok_or(ConfigError::InvalidRoster("agent"))?;
        let targets = unique_roster(&self.targets).ok_or(ConfigError::InvalidRoster("target"))?;
        if let Some(&shared) = agents.intersection(&targets).next() {
            return Err(ConfigError::SharedNodeId(shared));
        }

        if self.tick_ms == 0 {
            return Err(ConfigError::NotPositive("tick_ms"));
        }
        if self.monitor.poll_ms == 0 {
            return Err(ConfigError::NotPositive("monitor.poll_ms"));
        }
        if self.monitor.max_polls == 0 {
            return Err(ConfigError::NotPositive("monitor.max_polls"));
        }
        if !(0.0..1.0).contains(&self.transport.loss) {
            return Err(ConfigError::InvalidLoss(self.transport.loss));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        self.protocol.validate().map_err(|e| ConfigError::Protocol(e.to_string()))
    }

    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig { tick: Duration::from_millis(self.tick_ms), protocol: self.protocol.clone() }
    }

    pub fn monitor(&self) -> MonitorConfig {
        MonitorConfig { poll: Duration::from_millis(self.monitor.poll_ms), max_polls: self.monitor.max_polls }
    }

    pub fn multicast(&self) -> MulticastConfig {
        MulticastConfig {
            group: self.transport.group,
            port: self.transport.port,
            ttl: self.transport.ttl,
            ..MulticastConfig::default()
        }
    }
}

fn unique_roster(ids: &[u32]) -> Option<BTreeSet<u32>> {
    let set: BTreeSet<u32> = ids.iter().copied().collect();
    (!ids.is_empty() && set.len() == ids.len() && !set.contains(&0)).then_some(set)
}
