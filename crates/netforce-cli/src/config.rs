//! CLI configuration management.
//!
//! Precedence, lowest first: built-in defaults, the JSON file given with
//! `--config`, environment variables (a `.env` file is honoured), then
//! explicit command-line flags.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use netforce_layout::{Algorithm, LayoutConfig};
use serde::{Deserialize, Serialize};

pub const ENV_MAX_ITERATIONS: &str = "NETFORCE_MAX_ITERATIONS";
pub const ENV_TIMEOUT_SECONDS: &str = "NETFORCE_TIMEOUT_SECONDS";
pub const ENV_SEED: &str = "NETFORCE_SEED";

/// Force model names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmKind {
    Spring,
    Atlas2,
}

/// Effective layout configuration for one invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub layout: LayoutConfig,
}

impl Config {
    /// Defaults, then the optional config file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let layout: LayoutConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(Self { layout })
    }

    /// Override from environment variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_ITERATIONS) {
            self.layout.simulation.max_iterations = value.trim().parse().with_context(|| {
                format!("{ENV_MAX_ITERATIONS} must be an integer, got {value:?}")
            })?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECONDS) {
            let seconds: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECONDS} must be a number, got {value:?}"))?;
            self.layout.simulation.timeout_seconds = Some(seconds);
        }
        if let Some(value) = lookup(ENV_SEED) {
            let seed: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_SEED} must be an integer, got {value:?}"))?;
            self.set_seed(seed);
        }
        Ok(())
    }

    /// Switch force model. Parameters are kept when the kind is unchanged.
    ///
    /// Otherwise the target preset's model parameters are used, and its
    /// opening angle and timeout replace the current ones unless those were
    /// customised away from the current preset.
    pub fn set_algorithm(&mut self, kind: AlgorithmKind) {
        let (from, to) = match (kind, &self.layout.algorithm) {
            (AlgorithmKind::Spring, Algorithm::Spring(_))
            | (AlgorithmKind::Atlas2, Algorithm::Atlas2(_)) => return,
            (AlgorithmKind::Spring, _) => (LayoutConfig::atlas2(), LayoutConfig::spring()),
            (AlgorithmKind::Atlas2, _) => (LayoutConfig::spring(), LayoutConfig::atlas2()),
        };

        let simulation = &mut self.layout.simulation;
        if simulation.opening_angle == from.simulation.opening_angle {
            simulation.opening_angle = to.simulation.opening_angle;
        }
        if simulation.timeout_seconds == from.simulation.timeout_seconds {
            simulation.timeout_seconds = to.simulation.timeout_seconds;
        }
        self.layout.algorithm = to.algorithm;
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.layout.setup = self.layout.setup.clone().with_seed(seed);
    }
}
