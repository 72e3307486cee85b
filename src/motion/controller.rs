//! Orbit controller: angular integration and body placement around a moving center.
use std::collections::HashSet;

use bevy::math::{Quat, Vec3};
use bevy::transform::components::Transform;

use super::capabilities::{AnimationSink, AxisSource, BodyBinding, MotionTarget};
use super::errors::{BodyKind, MotionDiagnostic, MotionError, MotionWarning, OrbitDirection};

/// Look vectors shorter than this (squared) leave orientation untouched.
pub const LOOK_EPSILON_SQUARED: f32 = 1e-4;

const DEFAULT_CLOCKWISE_TRIGGER: &str = "OrbitingClockwise";
const DEFAULT_COUNTERCLOCKWISE_TRIGGER: &str = "OrbitingCounterclockwise";

/// Where the angular speed comes from each step.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveMode {
    Auto,
    InputDriven { axis: String },
}

/// Trigger names fired on the animation sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationTriggers {
    pub clockwise: Option<String>,
    pub counterclockwise: Option<String>,
}

impl AnimationTriggers {
    pub fn new(clockwise: impl Into<String>, counterclockwise: impl Into<String>) -> Self {
        Self {
            clockwise: Some(clockwise.into()),
            counterclockwise: Some(counterclockwise.into()),
        }
    }

    /// Configured name for a direction; blank names count as unset.
    pub fn name_for(&self, direction: OrbitDirection) -> Option<&str> {
        let name = match direction {
            OrbitDirection::Clockwise => self.clockwise.as_deref(),
            OrbitDirection::Counterclockwise => self.counterclockwise.as_deref(),
        };
        name.filter(|name| !name.trim().is_empty())
    }
}

/// Per-instance orbit parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitConfig {
    pub radius: f32,
    pub initial_angle_deg: f32,
    pub auto_angular_speed_deg: f32,
    pub max_angular_speed_deg: f32,
    pub tidal_lock: bool,
    pub drive_mode: DriveMode,
    pub input_deadzone: f32,
    pub require_dynamic_body: bool,
    pub triggers: AnimationTriggers,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            radius: 5.0,
            initial_angle_deg: 0.0,
            auto_angular_speed_deg: 30.0,
            max_angular_speed_deg: 180.0,
            tidal_lock: true,
            drive_mode: DriveMode::Auto,
            input_deadzone: 0.05,
            require_dynamic_body: false,
            triggers: AnimationTriggers::new(
                DEFAULT_CLOCKWISE_TRIGGER,
                DEFAULT_COUNTERCLOCKWISE_TRIGGER,
            ),
        }
    }
}

impl OrbitConfig {
    /// Offset from the center at the given angle, in the XZ plane.
    pub fn offset(&self, angle_deg: f32) -> Vec3 {
        let theta = angle_deg.to_radians();
        Vec3::new(theta.cos(), 0.0, theta.sin()) * self.radius
    }

    fn validate(&self, body_kind: BodyKind) -> Result<(), MotionError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(MotionError::invalid_radius(self.radius));
        }
        if self.require_dynamic_body && body_kind != BodyKind::Dynamic {
            return Err(MotionError::MissingPhysicsBody);
        }
        Ok(())
    }
}

/// Mutable kinematic state advanced every fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub current_angle_deg: f32,
    pub last_center_position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerStatus {
    Active,
    Disabled(MotionError),
}

/// What a single successful step computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSample {
    pub applied_angular_speed_deg: f32,
    pub angle_deg: f32,
    pub desired_position: Vec3,
    pub center_velocity: Vec3,
    /// Velocity handed to the physics binding; `None` for kinematic bodies.
    pub commanded_velocity: Option<Vec3>,
    pub trigger: Option<OrbitDirection>,
}

#[derive(Debug, Clone)]
pub struct OrbitalMotionController {
    config: OrbitConfig,
    state: OrbitState,
    body_kind: BodyKind,
    status: ControllerStatus,
    warned_triggers: HashSet<OrbitDirection>,
    pending: Vec<MotionDiagnostic>,
}

impl OrbitalMotionController {
    /// Binds a controller and places the body at its starting point on the orbit.
    ///
    /// Configuration errors never fail construction: the returned controller is
    /// disabled and carries a single queued diagnostic.
    pub fn initialize(
        config: OrbitConfig,
        target: Option<&dyn MotionTarget>,
        body: BodyBinding<'_>,
    ) -> Self {
        let body_kind = body.kind();
        let mut controller = Self {
            state: OrbitState {
                current_angle_deg: config.initial_angle_deg,
                last_center_position: Vec3::ZERO,
            },
            config,
            body_kind,
            status: ControllerStatus::Active,
            warned_triggers: HashSet::new(),
            pending: Vec::new(),
        };

        let center = match target {
            Some(target) => controller
                .config
                .validate(body_kind)
                .map(|_| target.position()),
            None => Err(MotionError::MissingTarget),
        };

        match center {
            Ok(center) => {
                controller.state.last_center_position = center;
                let start = center + controller.config.offset(controller.state.current_angle_deg);
                match body {
                    BodyBinding::Kinematic(body) => {
                        body.set_position(start);
                        if controller.config.tidal_lock {
                            if let Some(rotation) = look_rotation(start, center) {
                                body.set_rotation(rotation);
                            }
                        }
                    }
                    BodyBinding::Dynamic(physics) => physics.place(start),
                }
            }
            Err(error) => controller.disable(error),
        }

        controller
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn state(&self) -> &OrbitState {
        &self.state
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn status(&self) -> &ControllerStatus {
        &self.status
    }

    pub fn body_kind(&self) -> BodyKind {
        self.body_kind
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ControllerStatus::Active)
    }

    /// Drains diagnostics queued since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<MotionDiagnostic> {
        std::mem::take(&mut self.pending)
    }

    /// Angular speed (deg/s) the next step would apply for the given input.
    pub fn applied_angular_speed(&self, input: &dyn AxisSource) -> f32 {
        match &self.config.drive_mode {
            DriveMode::Auto => self.config.auto_angular_speed_deg,
            DriveMode::InputDriven { axis } => {
                let signal = input.read_axis(axis).unwrap_or(0.0);
                let signal = if signal.is_finite() {
                    signal.clamp(-1.0, 1.0)
                } else {
                    0.0
                };
                if signal.abs() < self.config.input_deadzone {
                    0.0
                } else {
                    // Negative input orbits clockwise (positive speed).
                    -signal * self.config.max_angular_speed_deg
                }
            }
        }
    }

    /// Advances the orbit by one fixed step.
    ///
    /// Returns `None` without touching anything when the controller is
    /// disabled, `dt` is not strictly positive, or the target is gone.
    pub fn step(
        &mut self,
        dt: f32,
        target: Option<&dyn MotionTarget>,
        input: &dyn AxisSource,
        body: BodyBinding<'_>,
        animation: Option<&mut dyn AnimationSink>,
    ) -> Option<OrbitSample> {
        if !self.is_active() || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        if body.kind() != self.body_kind {
            self.disable(MotionError::body_kind_changed(self.body_kind));
            return None;
        }
        let center = target?.position();

        let applied = self.applied_angular_speed(input);
        self.state.current_angle_deg += applied * dt;
        let angle_deg = self.state.current_angle_deg;

        let desired_position = center + self.config.offset(angle_deg);
        let center_velocity = (center - self.state.last_center_position) / dt;
        self.state.last_center_position = center;

        let commanded_velocity = match body {
            BodyBinding::Kinematic(body) => {
                body.set_position(desired_position);
                if self.config.tidal_lock {
                    if let Some(rotation) = look_rotation(desired_position, center) {
                        body.set_rotation(rotation);
                    }
                }
                None
            }
            BodyBinding::Dynamic(physics) => {
                let velocity =
                    orbital_velocity(angle_deg, self.config.radius, applied) + center_velocity;
                physics.set_linear_velocity(velocity);
                if self.config.tidal_lock {
                    if let Some(rotation) = look_rotation(physics.position(), center) {
                        physics.rotate_toward(rotation);
                    }
                }
                Some(velocity)
            }
        };

        let trigger = animation.and_then(|sink| self.fire_animation(applied, sink));

        Some(OrbitSample {
            applied_angular_speed_deg: applied,
            angle_deg,
            desired_position,
            center_velocity,
            commanded_velocity,
            trigger,
        })
    }

    /// Keeps a paused orbiter where it is.
    ///
    /// The angle is frozen and a dynamic body is stopped. The center is
    /// re-sampled so the first step after resuming does not read the whole
    /// pause as center motion.
    pub fn hold(&mut self, target: Option<&dyn MotionTarget>, body: BodyBinding<'_>) {
        if !self.is_active() {
            return;
        }
        if body.kind() != self.body_kind {
            self.disable(MotionError::body_kind_changed(self.body_kind));
            return;
        }
        if let Some(target) = target {
            self.state.last_center_position = target.position();
        }
        if let BodyBinding::Dynamic(physics) = body {
            physics.set_linear_velocity(Vec3::ZERO);
        }
    }

    fn fire_animation(
        &mut self,
        applied_deg: f32,
        sink: &mut dyn AnimationSink,
    ) -> Option<OrbitDirection> {
        let direction = OrbitDirection::from_speed(applied_deg)?;
        match self.config.triggers.name_for(direction) {
            Some(name) => {
                sink.fire_trigger(name);
                Some(direction)
            }
            None => {
                if self.warned_triggers.insert(direction) {
                    self.pending
                        .push(MotionDiagnostic::Warning(MotionWarning::BlankTrigger {
                            direction,
                        }));
                }
                None
            }
        }
    }

    fn disable(&mut self, error: MotionError) {
        self.pending.push(MotionDiagnostic::Error(error.clone()));
        self.status = ControllerStatus::Disabled(error);
    }
}

/// Tangential velocity of a point on the orbit at `angle_deg` moving at `angular_speed_deg`.
pub fn orbital_velocity(angle_deg: f32, radius: f32, angular_speed_deg: f32) -> Vec3 {
    let theta = angle_deg.to_radians();
    let omega = angular_speed_deg.to_radians();
    Vec3::new(-theta.sin(), 0.0, theta.cos()) * radius * omega
}

/// Rotation facing from `from` toward `to`, or `None` when the two nearly coincide.
pub fn look_rotation(from: Vec3, to: Vec3) -> Option<Quat> {
    if (to - from).length_squared() < LOOK_EPSILON_SQUARED {
        return None;
    }
    Some(Transform::from_translation(from).looking_at(to, Vec3::Y).rotation)
}
