//! CorePlugin wires the fixed timestep, virtual time scale, and step bookkeeping.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use std::time::Duration;

use crate::core::config::{SimulationSettings, MIN_TIME_SCALE};

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Counts fixed simulation steps and the simulated time they covered.
#[derive(Resource, Debug, Default)]
pub struct SimulationClock {
    steps: u64,
    elapsed: Duration,
}

impl SimulationClock {
    /// Number of fixed steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Total simulated time covered by fixed steps.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Records one fixed step of the given length.
    pub fn tick(&mut self, step: Duration) {
        self.steps = self.steps.saturating_add(1);
        self.elapsed += step;
    }
}

/// Registers fixed-step timing resources and systems.
#[derive(Debug, Clone)]
pub struct CorePlugin {
    settings: SimulationSettings,
}

impl CorePlugin {
    /// Creates a CorePlugin from explicit settings.
    pub fn with_settings(settings: SimulationSettings) -> Self {
        Self { settings }
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_settings(SimulationSettings::load_or_default())
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(self.settings.fixed_hz))
            .insert_resource(self.settings.clone())
            .init_resource::<SimulationClock>()
            .add_systems(Startup, (apply_time_scale, log_startup_timing))
            .add_systems(FixedFirst, advance_simulation_clock);

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_fixed_ticks);
        }
    }
}

fn advance_simulation_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn apply_time_scale(settings: Res<SimulationSettings>, mut time: ResMut<Time<Virtual>>) {
    time.set_relative_speed(settings.time_scale.max(MIN_TIME_SCALE));
}

fn log_startup_timing(settings: Res<SimulationSettings>) {
    info!(
        "CorePlugin initialised: fixed step {:.1} Hz, time scale {:.3}",
        settings.fixed_hz, settings.time_scale
    );
}

#[cfg(feature = "core_debug")]
fn log_fixed_ticks(
    mut timer: ResMut<DebugTickTimer>,
    time: Res<Time<Real>>,
    clock: Res<SimulationClock>,
) {
    if timer.timer.tick(time.delta()).just_finished() {
        info!(
            target: "core_debug",
            "Fixed steps: {} | sim elapsed: {:.2}s",
            clock.steps(),
            clock.elapsed().as_secs_f32(),
        );
    }
}
