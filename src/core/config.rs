//! Simulation clock settings loaded from `config/simulation.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

const CONFIG_PATH: &str = "config/simulation.toml";

pub const DEFAULT_FIXED_HZ: f64 = 64.0;
pub const DEFAULT_TIME_SCALE: f32 = 1.0;
pub const MIN_TIME_SCALE: f32 = 0.001;
const MIN_FIXED_HZ: f64 = 1.0;

#[derive(Debug, Clone, Deserialize, Default)]
struct RawSimulationConfig {
    #[serde(default)]
    clock: RawClockSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawClockSection {
    fixed_hz: f64,
    time_scale: f32,
}

impl Default for RawClockSection {
    fn default() -> Self {
        Self {
            fixed_hz: DEFAULT_FIXED_HZ,
            time_scale: DEFAULT_TIME_SCALE,
        }
    }
}

/// Fixed-step rate and virtual time multiplier for the simulation.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub fixed_hz: f64,
    pub time_scale: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        RawSimulationConfig::default().into()
    }
}

impl SimulationSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml_or_default(&data),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }

    fn from_toml_or_default(data: &str) -> Self {
        match toml::from_str::<RawSimulationConfig>(data) {
            Ok(raw) => raw.into(),
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }
}

impl From<RawSimulationConfig> for SimulationSettings {
    fn from(value: RawSimulationConfig) -> Self {
        let clock = value.clock;
        let fixed_hz = if clock.fixed_hz.is_finite() {
            clock.fixed_hz.max(MIN_FIXED_HZ)
        } else {
            DEFAULT_FIXED_HZ
        };
        let time_scale = if clock.time_scale.is_finite() {
            clock.time_scale.max(MIN_TIME_SCALE)
        } else {
            DEFAULT_TIME_SCALE
        };

        Self {
            fixed_hz,
            time_scale,
        }
    }
}
