//! Input plugin wiring axis bindings and per-frame sampling.
use bevy::prelude::*;

use crate::input::axes::{sample_input_axes, AxisBindings, InputAxes};

/// Samples bound axes every frame so fixed steps read the latest values.
pub struct InputPlugin {
    bindings: AxisBindings,
}

impl InputPlugin {
    pub fn new(bindings: AxisBindings) -> Self {
        Self { bindings }
    }
}

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        info!(
            "InputPlugin bound {} axis/axes: [{}]",
            self.bindings.axes.len(),
            self.bindings
                .axes
                .iter()
                .map(|axis| axis.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        app.insert_resource(self.bindings.clone())
            .init_resource::<InputAxes>()
            .add_systems(Update, sample_input_axes);
    }
}
