//! Components attached to moving entities.
use bevy::prelude::*;
use bevy_rapier3d::dynamics::Velocity;

use super::controller::{OrbitConfig, OrbitalMotionController};

/// Requests an orbit around `center`. Bound to an [`OrbitController`] on the next fixed step.
///
/// A disabled orbit is still placed on its circle but holds its angle until enabled.
#[derive(Component, Debug, Clone)]
pub struct OrbitalMotion {
    pub config: OrbitConfig,
    pub center: Option<Entity>,
    pub enabled: bool,
}

impl OrbitalMotion {
    pub fn new(config: OrbitConfig, center: Entity) -> Self {
        Self {
            config,
            center: Some(center),
            enabled: true,
        }
    }
}

/// Live controller for an initialised orbiter.
#[derive(Component, Debug)]
pub struct OrbitController(pub OrbitalMotionController);

/// Orbiter simulated by rapier: the controller commands its [`Velocity`]
/// instead of writing its pose.
#[derive(Component, Debug, Clone, Copy)]
#[require(Velocity)]
pub struct DynamicBody {
    pub rotation_target: Option<Quat>,
    /// Maximum turn rate toward `rotation_target`, radians per second.
    pub max_turn_rate: f32,
}

impl DynamicBody {
    pub fn with_turn_rate(max_turn_rate: f32) -> Self {
        Self {
            rotation_target: None,
            max_turn_rate: max_turn_rate.max(0.0),
        }
    }
}

/// Opts an orbiter into emitting animation trigger messages.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct OrbitAnimator;

/// Constant-velocity translation along a fixed direction.
#[derive(Component, Debug, Clone, Copy)]
pub struct LinearMotion {
    direction: Vec3,
    speed: f32,
    pub enabled: bool,
}

impl LinearMotion {
    /// The direction is normalised; a zero direction never moves.
    pub fn new(direction: Vec3, speed: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            speed,
            enabled: true,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn velocity(&self) -> Vec3 {
        if self.enabled {
            self.direction * self.speed
        } else {
            Vec3::ZERO
        }
    }
}
