//! Force-directed layout.
//!
//! Nodes repel like charged particles, edges pull like springs toward a rest
//! length and a weak centering force keeps the system bounded. [`Layout`]
//! advances the simulation one `tick` at a time and reports total kinetic
//! energy so a driver knows when to stop animating.

mod engine;
pub mod point;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use engine::{BoundingBox, Layout, Nearest};
pub use point::{Point, Spring};

/// Forces weaker than this are discarded entirely.
pub const DEAD_ZONE: f64 = 1.0;
/// Accepted forces are clamped to this magnitude before use.
pub const MAX_FORCE: f64 = 100.0;
/// Centering pull per unit distance, as a fraction of the repulsion constant.
pub const CENTERING_FACTOR: f64 = 0.02;
/// Below this kinetic energy a point's velocity snaps to zero.
pub const ACTIVATION_ENERGY: f64 = 0.01;
/// Mass given to a point while it is being dragged.
pub const DRAG_MASS: f64 = 1e4;
pub const DEFAULT_MASS: f64 = 1.0;
pub const DEFAULT_REST_LENGTH: f64 = 1.0;

/// Numeric-stability constants of the force model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConstants {
    pub dead_zone: f64,
    pub max_force: f64,
    pub centering_factor: f64,
    pub activation_energy: f64,
}

impl Default for ForceConstants {
    fn default() -> Self {
        Self {
            dead_zone: DEAD_ZONE,
            max_force: MAX_FORCE,
            centering_factor: CENTERING_FACTOR,
            activation_energy: ACTIVATION_ENERGY,
        }
    }
}

/// Configuration for a [`Layout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Spring constant `k` (default: 800.0).
    pub stiffness: f64,
    /// Repulsion constant `r` (default: 400.0). Also scales the centering force.
    pub repulsion: f64,
    /// Velocity multiplier applied every tick, in `[0, 1]` (default: 0.25).
    /// Zero freezes the simulation.
    pub damping: f64,
    /// Total kinetic energy below which the layout counts as settled (default: 0.01).
    pub energy_threshold: f64,
    /// Velocity clamp; `None` leaves speed unbounded (default).
    pub max_speed: Option<f64>,
    /// Half-extent of the initial placement square and of the minimum bounding box (default: 2.0).
    pub domain_size: f64,
    /// Bounding box padding as a fraction of its extent (default: 0.075).
    pub domain_padding: f64,
    /// Seed for initial point placement (default: 0).
    pub seed: u64,
    pub forces: ForceConstants,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            stiffness: 800.0,
            repulsion: 400.0,
            damping: 0.25,
            energy_threshold: 0.01,
            max_speed: None,
            domain_size: 2.0,
            domain_padding: 0.075,
            seed: 0,
            forces: ForceConstants::default(),
        }
    }
}

impl LayoutConfig {
    pub fn new(stiffness: f64, repulsion: f64, damping: f64) -> Self {
        Self {
            stiffness,
            repulsion,
            damping,
            ..Self::default()
        }
    }

    pub fn with_energy_threshold(mut self, energy_threshold: f64) -> Self {
        self.energy_threshold = energy_threshold;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every field against the range the simulation can handle.
    pub fn validate(&self) -> Result<()> {
        non_negative("stiffness", self.stiffness)?;
        non_negative("repulsion", self.repulsion)?;
        check_damping(self.damping)?;
        non_negative("energy_threshold", self.energy_threshold)?;
        if let Some(max_speed) = self.max_speed {
            ensure(
                "max_speed",
                max_speed > 0.0,
                format!("must be positive, got {max_speed}"),
            )?;
        }
        ensure(
            "domain_size",
            self.domain_size.is_finite() && self.domain_size > 0.0,
            format!("must be positive and finite, got {}", self.domain_size),
        )?;
        non_negative("domain_padding", self.domain_padding)?;

        let forces = &self.forces;
        non_negative("forces.dead_zone", forces.dead_zone)?;
        ensure(
            "forces.max_force",
            forces.max_force > 0.0,
            format!("must be positive, got {}", forces.max_force),
        )?;
        non_negative("forces.centering_factor", forces.centering_factor)?;
        non_negative("forces.activation_energy", forces.activation_energy)
    }

    pub(crate) fn speed_limit(&self) -> f64 {
        self.max_speed.unwrap_or(f64::INFINITY)
    }
}

pub(crate) fn check_damping(damping: f64) -> Result<()> {
    ensure(
        "damping",
        (0.0..=1.0).contains(&damping),
        format!("must lie in [0, 1], got {damping}"),
    )
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    ensure(
        field,
        value.is_finite() && value >= 0.0,
        format!("must be finite and non-negative, got {value}"),
    )
}

fn ensure(field: &'static str, ok: bool, reason: String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidConfig { field, reason })
    }
}
