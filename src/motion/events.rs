//! Messages emitted by motion systems.
use bevy::prelude::{Entity, Message};

use super::errors::{MotionDiagnostic, OrbitDirection};

/// An orbiter asked its animator to fire a named trigger.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct AnimationTriggerEvent {
    pub entity: Entity,
    pub trigger: String,
    pub direction: OrbitDirection,
}

/// A configuration diagnostic raised by an orbiter.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct MotionDiagnosticEvent {
    pub entity: Entity,
    pub diagnostic: MotionDiagnostic,
}
