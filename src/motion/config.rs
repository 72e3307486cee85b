//! Motion defaults loaded from `config/motion.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use super::controller::{AnimationTriggers, DriveMode, OrbitConfig};

const CONFIG_PATH: &str = "config/motion.toml";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawMotionConfig {
    #[serde(default)]
    steering: RawSteering,
    #[serde(default)]
    orbit: RawOrbitDefaults,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawSteering {
    max_turn_rate_deg: f32,
}

impl Default for RawSteering {
    fn default() -> Self {
        Self {
            max_turn_rate_deg: 360.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawOrbitDefaults {
    radius: f32,
    auto_angular_speed_deg: f32,
    max_angular_speed_deg: f32,
    input_deadzone: f32,
    tidal_lock: bool,
    clockwise_trigger: String,
    counterclockwise_trigger: String,
}

impl Default for RawOrbitDefaults {
    fn default() -> Self {
        let defaults = OrbitConfig::default();
        Self {
            radius: defaults.radius,
            auto_angular_speed_deg: defaults.auto_angular_speed_deg,
            max_angular_speed_deg: defaults.max_angular_speed_deg,
            input_deadzone: defaults.input_deadzone,
            tidal_lock: defaults.tidal_lock,
            clockwise_trigger: defaults.triggers.clockwise.unwrap_or_default(),
            counterclockwise_trigger: defaults.triggers.counterclockwise.unwrap_or_default(),
        }
    }
}

/// How fast dynamic bodies turn toward a requested rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringSettings {
    /// Radians per second.
    pub max_turn_rate: f32,
}

/// Runtime motion settings: steering tuning plus defaults for new orbiters.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MotionSettings {
    pub steering: SteeringSettings,
    pub orbit_defaults: OrbitConfig,
}

impl Default for MotionSettings {
    fn default() -> Self {
        RawMotionConfig::default().into()
    }
}

impl MotionSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_or_default(&raw),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                Self::default()
            }
        }
    }

    fn from_toml_or_default(raw: &str) -> Self {
        match toml::from_str::<RawMotionConfig>(raw) {
            Ok(parsed) => parsed.into(),
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

impl From<RawMotionConfig> for MotionSettings {
    fn from(value: RawMotionConfig) -> Self {
        let steering = SteeringSettings {
            max_turn_rate: value.steering.max_turn_rate_deg.max(0.0).to_radians(),
        };

        let orbit = value.orbit;
        let orbit_defaults = OrbitConfig {
            radius: orbit.radius,
            auto_angular_speed_deg: orbit.auto_angular_speed_deg,
            max_angular_speed_deg: orbit.max_angular_speed_deg.abs(),
            input_deadzone: orbit.input_deadzone.clamp(0.0, 0.99),
            tidal_lock: orbit.tidal_lock,
            drive_mode: DriveMode::Auto,
            triggers: AnimationTriggers {
                clockwise: non_blank(orbit.clockwise_trigger),
                counterclockwise: non_blank(orbit.counterclockwise_trigger),
            },
            ..OrbitConfig::default()
        };

        Self {
            steering,
            orbit_defaults,
        }
    }
}

/// Trimmed trigger name, or `None` when blank.
pub(crate) fn non_blank(name: String) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
