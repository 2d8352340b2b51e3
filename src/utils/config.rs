//! Runtime configuration: constant defaults with optional environment overrides.
//!
//! - `TRACKSIM_INTERVAL_MS` — generation interval (default 1000 ms)
//! - `TRACKSIM_PACING` — `blocking` (default) or `spin`
//! - `TRACKSIM_RUN_SECS` — stop after this many seconds (default: run until Ctrl-C)
//!
//! Invalid values are logged and ignored; the default stays in effect.

use std::{env, time::Duration};
use log::warn;

pub const DEFAULT_INTERVAL_MS: u64 = 1_000;

pub const ENV_INTERVAL_MS: &str = "TRACKSIM_INTERVAL_MS";
pub const ENV_PACING: &str = "TRACKSIM_PACING";
pub const ENV_RUN_SECS: &str = "TRACKSIM_RUN_SECS";

/// How the generator waits for its next release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Channel timeout on the shutdown signal; cancellation interrupts the wait.
    #[default]
    Blocking,
    /// `SpinSleeper`: tighter release jitter, cancellation seen at the next release.
    Spin,
}

impl Pacing {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "blocking" => Some(Pacing::Blocking),
            "spin" => Some(Pacing::Spin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub interval: Duration,
    pub pacing: Pacing,
    /// None = run until cancelled externally
    pub run_for: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            pacing: Pacing::default(),
            run_for: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_INTERVAL_MS) {
            match parse_positive(&raw) {
                Some(ms) => config.interval = Duration::from_millis(ms),
                None => warn!("{}={:?} is not a positive integer; using {} ms", ENV_INTERVAL_MS, raw, DEFAULT_INTERVAL_MS),
            }
        }

        if let Some(raw) = lookup(ENV_PACING) {
            match Pacing::parse(&raw) {
                Some(pacing) => config.pacing = pacing,
                None => warn!("{}={:?} is not 'blocking' or 'spin'; using {:?}", ENV_PACING, raw, config.pacing),
            }
        }

        if let Some(raw) = lookup(ENV_RUN_SECS) {
            match parse_positive(&raw) {
                Some(secs) => config.run_for = Some(Duration::from_secs(secs)),
                None => warn!("{}={:?} is not a positive integer; running until interrupted", ENV_RUN_SECS, raw),
            }
        }

        config
    }
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|v| *v > 0)
}
