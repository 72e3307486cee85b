//! Motion plugin wiring orbit controllers, movers, and rapier into the fixed step.
use bevy::prelude::*;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin, TimestepMode};

use crate::core::{config::SimulationSettings, plugin::SimulationClock};
use crate::input::axes::InputAxes;
use crate::motion::{
    config::MotionSettings,
    events::{AnimationTriggerEvent, MotionDiagnosticEvent},
    systems::{
        apply_linear_motion, initialize_orbiters, log_animation_triggers, steer_dynamic_bodies,
        step_orbiters,
    },
};

/// Ordering of the fixed-step motion pipeline.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MotionSet {
    /// Linear movers; orbit centers settle before orbiters read them.
    Movers,
    Orbits,
    /// Angular velocity commands for dynamic bodies, consumed by the rapier step.
    Steer,
}

pub struct MotionPlugin {
    settings: MotionSettings,
}

impl MotionPlugin {
    pub fn with_settings(settings: MotionSettings) -> Self {
        Self { settings }
    }
}

impl Default for MotionPlugin {
    fn default() -> Self {
        Self::with_settings(MotionSettings::load_or_default())
    }
}

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        info!(
            "Motion configured: default radius {:.2}, auto speed {:.1} deg/s, steering turn rate {:.1} deg/s",
            self.settings.orbit_defaults.radius,
            self.settings.orbit_defaults.auto_angular_speed_deg,
            self.settings.steering.max_turn_rate.to_degrees()
        );

        // Rapier steps in FixedPostUpdate, after the velocity commands below.
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
            .insert_resource(self.settings.clone())
            .init_resource::<InputAxes>()
            .init_resource::<SimulationClock>()
            .add_message::<AnimationTriggerEvent>()
            .add_message::<MotionDiagnosticEvent>()
            .configure_sets(
                FixedUpdate,
                (MotionSet::Movers, MotionSet::Orbits, MotionSet::Steer).chain(),
            )
            .add_systems(
                FixedUpdate,
                (
                    apply_linear_motion.in_set(MotionSet::Movers),
                    (initialize_orbiters, step_orbiters)
                        .chain()
                        .in_set(MotionSet::Orbits),
                    steer_dynamic_bodies.in_set(MotionSet::Steer),
                ),
            )
            .add_systems(Update, log_animation_triggers);

        // Keep rapier's step length in line with the configured fixed rate.
        if let Some(simulation) = app.world().get_resource::<SimulationSettings>() {
            let dt = (1.0 / simulation.fixed_hz) as f32;
            app.insert_resource(TimestepMode::Fixed { dt, substeps: 1 });
        }
    }
}
