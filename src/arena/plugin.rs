//! ArenaPlugin loads the layout and spawns the environment and bodies at startup.
use bevy::prelude::*;

use crate::arena::{
    config::ArenaLayout,
    systems::{spawn_arena_bodies, spawn_arena_environment},
};
use crate::motion::config::MotionSettings;

pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        let defaults = app
            .world()
            .get_resource::<MotionSettings>()
            .map(|settings| settings.orbit_defaults.clone())
            .unwrap_or_default();
        let layout = ArenaLayout::load_or_default(&defaults);
        info!(
            "Arena layout loaded: {} anchor(s), {} mover(s), {} orbiter(s)",
            layout.anchors.len(),
            layout.movers.len(),
            layout.orbiters.len()
        );

        app.insert_resource(layout).add_systems(
            Startup,
            (spawn_arena_environment, spawn_arena_bodies),
        );
    }
}
