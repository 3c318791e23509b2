//! `tracing` subscriber setup.

use std::io;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingSection};

/// Install the global subscriber.  `RUST_LOG` directives win over the
/// configured level.  Logs go to stderr so stdout stays the report.
pub fn init(config: &LoggingSection) -> Result<()> {
    let level: LevelFilter = config
        .level
        .parse()
        .with_context(|| format!("Invalid log level: {}", config.level))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    match config.format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_target(true);
            tracing_subscriber::registry().with(env_filter).with(layer).try_init()
        }
        LogFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false);
            tracing_subscriber::registry().with(env_filter).with(layer).try_init()
        }
    }
    .context("Failed to install tracing subscriber")
}
