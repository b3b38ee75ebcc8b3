//! Layout configuration.
//!
//! Every struct here deserializes from partial documents (missing fields take
//! their defaults) and has a `validate` method run before a layout starts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::setup::SetupKind;
use crate::{LayoutError, Result};

/// Knobs shared by every force model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Upper bound on simulation steps.
    pub max_iterations: usize,
    /// Wall-clock budget, polled between steps. `None` disables it.
    pub timeout_seconds: Option<f64>,
    /// The run is settled once total kinetic energy is at or below this.
    pub min_energy_threshold: f64,
    /// Pull movable points toward the layout center.
    pub center_attraction_enabled: bool,
    /// Barnes-Hut opening angle: a cell is treated as one body when
    /// `size / distance < opening_angle`. 0 means exact pairwise repulsion.
    pub opening_angle: f64,
    /// Let fixed points push movable ones away.
    pub repulsion_from_fixed_points: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            timeout_seconds: Some(10.0),
            min_energy_threshold: 0.001,
            center_attraction_enabled: true,
            opening_angle: 0.8,
            repulsion_from_fixed_points: true,
        }
    }
}

impl SimulationParameters {
    /// Fewer steps and a coarser far field.
    pub fn fast() -> Self {
        Self {
            max_iterations: 200,
            timeout_seconds: Some(1.0),
            opening_angle: 1.2,
            ..Default::default()
        }
    }

    /// More steps and a finer far field.
    pub fn thorough() -> Self {
        Self {
            max_iterations: 5000,
            timeout_seconds: Some(60.0),
            min_energy_threshold: 1e-5,
            opening_angle: 0.5,
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs_f64)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(t) = self.timeout_seconds {
            if !(t.is_finite() && t >= 0.0) {
                return Err(LayoutError::invalid(
                    "timeout_seconds",
                    format!("must be a finite, non-negative number of seconds, got {t}"),
                ));
            }
        }
        non_negative("min_energy_threshold", self.min_energy_threshold)?;
        non_negative("opening_angle", self.opening_angle)?;
        Ok(())
    }
}

/// Spring-embedder model: inverse-square repulsion, Hooke springs, damped
/// velocity integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParameters {
    /// Repulsion strength.
    pub repulsion: f64,
    /// Spring stiffness along edges.
    pub stiffness: f64,
    /// Rest length of an edge.
    pub spring_length: f64,
    /// Velocity kept per step (0-1, lower = more damping).
    pub damping: f64,
    /// Velocity magnitude cap.
    pub max_speed: f64,
    /// Integration time step.
    pub time_step: f64,
    /// Strength of the pull toward the layout center.
    pub center_attraction: f64,
}

impl Default for SpringParameters {
    fn default() -> Self {
        Self {
            repulsion: 5000.0,
            stiffness: 0.05,
            spring_length: 100.0,
            damping: 0.5,
            max_speed: 100.0,
            time_step: 1.0,
            center_attraction: 0.01,
        }
    }
}

impl SpringParameters {
    pub fn validate(&self) -> Result<()> {
        non_negative("repulsion", self.repulsion)?;
        non_negative("stiffness", self.stiffness)?;
        non_negative("spring_length", self.spring_length)?;
        non_negative("center_attraction", self.center_attraction)?;
        positive("max_speed", self.max_speed)?;
        positive("time_step", self.time_step)?;
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(LayoutError::invalid(
                "damping",
                format!("must be in (0, 1], got {}", self.damping),
            ));
        }
        Ok(())
    }
}

/// ForceAtlas2-style model: degree-weighted masses and adaptive speeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atlas2Parameters {
    /// Repulsion scaling.
    pub repulsion: f64,
    /// Edge attraction scaling.
    pub attraction: f64,
    /// Gravity toward the layout center.
    pub gravity: f64,
    /// Logarithmic edge attraction.
    pub lin_log: bool,
    /// Gravity grows with distance instead of being constant.
    pub strong_gravity: bool,
    /// Multiplier on every point's speed.
    pub speed_factor: f64,
    /// Largest displacement a point may make in one step.
    pub max_speed_factor: f64,
    /// How much swinging is tolerated before the global speed drops.
    pub swing_tolerance: f64,
    /// Largest ratio between two consecutive global speeds.
    pub max_global_speed_increase_ratio: f64,
}

impl Default for Atlas2Parameters {
    fn default() -> Self {
        Self {
            repulsion: 10.0,
            attraction: 1.0,
            gravity: 1.0,
            lin_log: false,
            strong_gravity: false,
            speed_factor: 1.0,
            max_speed_factor: 10.0,
            swing_tolerance: 1.0,
            max_global_speed_increase_ratio: 1.5,
        }
    }
}

impl Atlas2Parameters {
    pub fn validate(&self) -> Result<()> {
        non_negative("repulsion", self.repulsion)?;
        non_negative("attraction", self.attraction)?;
        non_negative("gravity", self.gravity)?;
        positive("speed_factor", self.speed_factor)?;
        positive("max_speed_factor", self.max_speed_factor)?;
        positive("swing_tolerance", self.swing_tolerance)?;
        if !(self.max_global_speed_increase_ratio >= 1.0) {
            return Err(LayoutError::invalid(
                "max_global_speed_increase_ratio",
                format!("must be >= 1, got {}", self.max_global_speed_increase_ratio),
            ));
        }
        Ok(())
    }
}

/// Force model selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Algorithm {
    Spring(SpringParameters),
    Atlas2(Atlas2Parameters),
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Spring(SpringParameters::default())
    }
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Spring(_) => "spring",
            Algorithm::Atlas2(_) => "atlas2",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Algorithm::Spring(p) => p.validate(),
            Algorithm::Atlas2(p) => p.validate(),
        }
    }
}

/// Everything a layout run needs besides the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub simulation: SimulationParameters,
    pub algorithm: Algorithm,
    pub setup: SetupKind,
}

impl LayoutConfig {
    pub fn spring() -> Self {
        Self::default()
    }

    pub fn atlas2() -> Self {
        Self {
            simulation: SimulationParameters {
                opening_angle: 0.5,
                timeout_seconds: None,
                ..Default::default()
            },
            algorithm: Algorithm::Atlas2(Atlas2Parameters::default()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.algorithm.validate()?;
        self.setup.validate()
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LayoutError::invalid(
            name,
            format!("must be finite and >= 0, got {value}"),
        ))
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LayoutError::invalid(
            name,
            format!("must be finite and > 0, got {value}"),
        ))
    }
}
