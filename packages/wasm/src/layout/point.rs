//! Per-entity simulation state.
//!
//! A [`Point`] holds the kinetic state of one node and a [`Spring`] the
//! elastic state of one edge. Springs refer to their endpoints by `NodeId`;
//! the owning [`Layout`](super::Layout) resolves those ids to points.

use serde::{Deserialize, Serialize};

use super::ForceConstants;
use crate::graph::NodeId;
use crate::vector::Vector2;

/// Kinetic state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub position: Vector2,
    pub velocity: Vector2,
    /// Accumulated since the last integration step
    pub acceleration: Vector2,
    pub mass: f64,
    /// Pinned points ignore forces and never move on their own.
    pub pinned: bool,
}

impl Point {
    pub fn new(position: Vector2, mass: f64) -> Self {
        Self {
            position,
            velocity: Vector2::zero(),
            acceleration: Vector2::zero(),
            mass,
            pinned: false,
        }
    }

    /// Add `force` into the acceleration accumulator.
    ///
    /// Forces below the dead-zone or with non-finite components are dropped;
    /// the rest are clamped to `max_force` and divided by mass. Returns
    /// whether the force was accepted.
    pub fn apply_force(&mut self, force: Vector2, constants: &ForceConstants) -> bool {
        if self.pinned || !force.is_finite() || force.magnitude() < constants.dead_zone {
            return false;
        }
        self.acceleration = self.acceleration + force.clip_norm(constants.max_force) / self.mass;
        true
    }

    /// Advance one step of length `dt`.
    ///
    /// Velocity is damped, snapped to zero below `activation_energy`,
    /// otherwise clamped to `max_speed` and applied to the position.
    pub fn integrate(&mut self, dt: f64, damping: f64, max_speed: f64, activation_energy: f64) {
        let velocity = (self.velocity + self.acceleration * dt) * damping;
        self.acceleration = Vector2::zero();

        if self.pinned || self.energy_at(velocity.magnitude()) < activation_energy {
            self.velocity = Vector2::zero();
            return;
        }

        self.velocity = velocity.clip_norm(max_speed);
        self.position = self.position + self.velocity * dt;
    }

    /// Kinetic energy at the current velocity.
    #[inline]
    pub fn energy(&self) -> f64 {
        self.energy_at(self.velocity.magnitude())
    }

    /// Kinetic energy this point would have at `speed`.
    #[inline]
    pub fn energy_at(&self, speed: f64) -> f64 {
        0.5 * self.mass * speed * speed
    }
}

/// Elastic state of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub source: NodeId,
    pub target: NodeId,
    /// Equilibrium length: the separation at which the spring exerts no force
    pub rest_length: f64,
    pub stiffness: f64,
}

impl Spring {
    pub fn new(source: NodeId, target: NodeId, rest_length: f64, stiffness: f64) -> Self {
        Self {
            source,
            target,
            rest_length,
            stiffness,
        }
    }

    /// Force on the source endpoint given both endpoint positions. The
    /// target receives the negation.
    ///
    /// Coincident endpoints have no defined direction and yield zero.
    pub fn force(&self, source: Vector2, target: Vector2) -> Vector2 {
        let delta = target - source;
        let displacement = self.rest_length - delta.magnitude();
        delta.direction() * (-self.stiffness * displacement)
    }

    /// Elastic potential energy when stretched to `length`.
    #[inline]
    pub fn energy(&self, length: f64) -> f64 {
        let displacement = self.rest_length - length;
        0.5 * self.stiffness * displacement * displacement
    }
}
