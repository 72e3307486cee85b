//! Narrow capability seams the orbit controller talks to.
//!
//! The controller never touches ECS storage directly; the systems in
//! `motion::systems` wrap components in small adapters implementing these.
use bevy::math::{Quat, Vec3};

use super::errors::{AxisReadError, BodyKind};

/// The point an orbiter circles. Read once per step, never mutated.
pub trait MotionTarget {
    fn position(&self) -> Vec3;
}

impl MotionTarget for Vec3 {
    fn position(&self) -> Vec3 {
        *self
    }
}

/// A body whose pose is overwritten directly each step.
pub trait KinematicBody {
    fn set_position(&mut self, position: Vec3);
    fn set_rotation(&mut self, rotation: Quat);
}

/// A body whose motion is integrated by a physics step after commands are issued.
pub trait PhysicsBinding {
    fn position(&self) -> Vec3;
    /// Teleports the body. Only used for the initial placement.
    fn place(&mut self, position: Vec3);
    fn set_linear_velocity(&mut self, velocity: Vec3);
    /// Requests a rotation the body turns toward over subsequent steps.
    fn rotate_toward(&mut self, rotation: Quat);
}

/// Source of named scalar input axes in `[-1, 1]`.
pub trait AxisSource {
    fn read_axis(&self, name: &str) -> Result<f32, AxisReadError>;
}

/// Receiver for named animation triggers.
pub trait AnimationSink {
    fn fire_trigger(&mut self, name: &str);
}

/// An axis source with nothing bound; every read fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl AxisSource for NoInput {
    fn read_axis(&self, name: &str) -> Result<f32, AxisReadError> {
        Err(AxisReadError::unbound(name))
    }
}

/// The body a controller drives this step.
pub enum BodyBinding<'a> {
    Kinematic(&'a mut dyn KinematicBody),
    Dynamic(&'a mut dyn PhysicsBinding),
}

impl BodyBinding<'_> {
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Kinematic(_) => BodyKind::Kinematic,
            Self::Dynamic(_) => BodyKind::Dynamic,
        }
    }
}
