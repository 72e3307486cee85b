use bevy::prelude::*;

mod arena;
mod core;
mod input;
mod motion;

use crate::{
    arena::ArenaPlugin,
    core::CorePlugin,
    input::{axes::AxisBindings, InputPlugin},
    motion::MotionPlugin,
};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "orbit battle".to_string(),
                    ..default()
                }),
                ..default()
            }),
            CorePlugin::default(),
            InputPlugin::new(AxisBindings::load_or_default()),
            MotionPlugin::default(),
            ArenaPlugin, // After MotionPlugin to inherit its orbit defaults
        ))
        .run();
}
