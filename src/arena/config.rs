//! Arena layout loaded from `config/scene.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use crate::input::axes::ORBIT_AXIS;
use crate::motion::config::non_blank;
use crate::motion::controller::{AnimationTriggers, DriveMode, OrbitConfig};

const CONFIG_PATH: &str = "config/scene.toml";

#[derive(Debug, Clone, Deserialize)]
struct RawSceneConfig {
    #[serde(default)]
    anchors: Vec<RawAnchor>,
    #[serde(default)]
    movers: Vec<RawMover>,
    #[serde(default)]
    orbiters: Vec<RawOrbiter>,
}

impl Default for RawSceneConfig {
    fn default() -> Self {
        Self {
            anchors: vec![RawAnchor {
                name: "Core".to_string(),
                position: [0.0, 1.5, 0.0],
                size: 1.5,
            }],
            movers: vec![RawMover {
                name: "Comet".to_string(),
                position: [-24.0, 2.0, -10.0],
                direction: [1.0, 0.0, 0.35],
                speed: 1.5,
                size: 0.6,
            }],
            orbiters: vec![
                RawOrbiter {
                    name: "Planet".to_string(),
                    center: Some("Core".to_string()),
                    radius: Some(9.0),
                    auto_angular_speed_deg: Some(12.0),
                    ..RawOrbiter::default()
                },
                RawOrbiter {
                    name: "Moon".to_string(),
                    center: Some("Planet".to_string()),
                    body: RawBody::Dynamic,
                    drive: RawDrive::Input,
                    radius: Some(2.5),
                    require_dynamic_body: true,
                    animated: true,
                    size: 0.4,
                    ..RawOrbiter::default()
                },
                RawOrbiter {
                    name: "Probe".to_string(),
                    center: Some("Comet".to_string()),
                    radius: Some(1.5),
                    auto_angular_speed_deg: Some(-90.0),
                    size: 0.25,
                    ..RawOrbiter::default()
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawAnchor {
    name: String,
    #[serde(default)]
    position: [f32; 3],
    #[serde(default = "default_anchor_size")]
    size: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMover {
    name: String,
    #[serde(default)]
    position: [f32; 3],
    #[serde(default = "default_direction")]
    direction: [f32; 3],
    #[serde(default)]
    speed: f32,
    #[serde(default = "default_body_size")]
    size: f32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum RawBody {
    #[default]
    Kinematic,
    Dynamic,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum RawDrive {
    #[default]
    Auto,
    Input,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawOrbiter {
    name: String,
    center: Option<String>,
    body: RawBody,
    drive: RawDrive,
    axis: Option<String>,
    radius: Option<f32>,
    initial_angle_deg: Option<f32>,
    auto_angular_speed_deg: Option<f32>,
    max_angular_speed_deg: Option<f32>,
    input_deadzone: Option<f32>,
    tidal_lock: Option<bool>,
    clockwise_trigger: Option<String>,
    counterclockwise_trigger: Option<String>,
    require_dynamic_body: bool,
    auto_start: bool,
    animated: bool,
    size: f32,
}

impl Default for RawOrbiter {
    fn default() -> Self {
        Self {
            name: String::new(),
            center: None,
            body: RawBody::Kinematic,
            drive: RawDrive::Auto,
            axis: None,
            radius: None,
            initial_angle_deg: None,
            auto_angular_speed_deg: None,
            max_angular_speed_deg: None,
            input_deadzone: None,
            tidal_lock: None,
            clockwise_trigger: None,
            counterclockwise_trigger: None,
            require_dynamic_body: false,
            auto_start: true,
            animated: false,
            size: default_body_size(),
        }
    }
}

fn default_anchor_size() -> f32 {
    1.0
}

fn default_body_size() -> f32 {
    0.5
}

fn default_direction() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

/// A static, named orbit center.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSpec {
    pub name: String,
    pub position: Vec3,
    pub size: f32,
}

/// A named body translating at constant velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct MoverSpec {
    pub name: String,
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub size: f32,
}

/// A named orbiter and the center it refers to by name.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbiterSpec {
    pub name: String,
    pub center: Option<String>,
    pub dynamic: bool,
    pub animated: bool,
    pub auto_start: bool,
    pub size: f32,
    pub config: OrbitConfig,
}

/// Everything the arena spawns at startup.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ArenaLayout {
    pub anchors: Vec<AnchorSpec>,
    pub movers: Vec<MoverSpec>,
    pub orbiters: Vec<OrbiterSpec>,
}

impl ArenaLayout {
    /// Loads the layout, filling orbiter fields the file omits from `defaults`.
    pub fn load_or_default(defaults: &OrbitConfig) -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml_or_default(&data, defaults),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to the built-in arena.",
                    CONFIG_PATH, err
                );
                Self::resolve(RawSceneConfig::default(), defaults)
            }
        }
    }

    fn from_toml_or_default(data: &str, defaults: &OrbitConfig) -> Self {
        match toml::from_str::<RawSceneConfig>(data) {
            Ok(raw) => Self::resolve(raw, defaults),
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Falling back to the built-in arena.",
                    CONFIG_PATH, err
                );
                Self::resolve(RawSceneConfig::default(), defaults)
            }
        }
    }

    fn resolve(raw: RawSceneConfig, defaults: &OrbitConfig) -> Self {
        let anchors = raw
            .anchors
            .into_iter()
            .map(|anchor| AnchorSpec {
                name: anchor.name,
                position: Vec3::from_array(anchor.position),
                size: anchor.size.max(0.05),
            })
            .collect();

        let movers = raw
            .movers
            .into_iter()
            .map(|mover| MoverSpec {
                name: mover.name,
                position: Vec3::from_array(mover.position),
                direction: Vec3::from_array(mover.direction),
                speed: mover.speed,
                size: mover.size.max(0.05),
            })
            .collect();

        let orbiters = raw
            .orbiters
            .into_iter()
            .map(|orbiter| {
                let drive_mode = match orbiter.drive {
                    RawDrive::Auto => DriveMode::Auto,
                    RawDrive::Input => DriveMode::InputDriven {
                        axis: orbiter.axis.unwrap_or_else(|| ORBIT_AXIS.to_string()),
                    },
                };
                let config = OrbitConfig {
                    radius: orbiter.radius.unwrap_or(defaults.radius),
                    initial_angle_deg: orbiter
                        .initial_angle_deg
                        .unwrap_or(defaults.initial_angle_deg),
                    auto_angular_speed_deg: orbiter
                        .auto_angular_speed_deg
                        .unwrap_or(defaults.auto_angular_speed_deg),
                    max_angular_speed_deg: orbiter
                        .max_angular_speed_deg
                        .map(f32::abs)
                        .unwrap_or(defaults.max_angular_speed_deg),
                    input_deadzone: orbiter
                        .input_deadzone
                        .map(|deadzone| deadzone.clamp(0.0, 0.99))
                        .unwrap_or(defaults.input_deadzone),
                    tidal_lock: orbiter.tidal_lock.unwrap_or(defaults.tidal_lock),
                    drive_mode,
                    require_dynamic_body: orbiter.require_dynamic_body,
                    // An empty name in the scene clears the default trigger.
                    triggers: AnimationTriggers {
                        clockwise: orbiter
                            .clockwise_trigger
                            .map_or(defaults.triggers.clockwise.clone(), non_blank),
                        counterclockwise: orbiter
                            .counterclockwise_trigger
                            .map_or(defaults.triggers.counterclockwise.clone(), non_blank),
                    },
                };
                OrbiterSpec {
                    name: orbiter.name,
                    center: orbiter.center,
                    dynamic: orbiter.body == RawBody::Dynamic,
                    animated: orbiter.animated,
                    auto_start: orbiter.auto_start,
                    size: orbiter.size.max(0.05),
                    config,
                }
            })
            .collect();

        Self {
            anchors,
            movers,
            orbiters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_arena_chains_orbit_centers() {
        let layout = ArenaLayout::resolve(RawSceneConfig::default(), &OrbitConfig::default());
        assert_eq!(layout.anchors.len(), 1);
        assert_eq!(layout.movers.len(), 1);

        let moon = layout
            .orbiters
            .iter()
            .find(|orbiter| orbiter.name == "Moon")
            .expect("built-in arena has a moon");
        assert_eq!(moon.center.as_deref(), Some("Planet"));
        assert!(moon.dynamic);
        assert!(moon.config.require_dynamic_body);
        assert_eq!(
            moon.config.drive_mode,
            DriveMode::InputDriven {
                axis: ORBIT_AXIS.to_string()
            }
        );
    }

    #[test]
    fn orbiter_fields_fall_back_to_motion_defaults() {
        let defaults = OrbitConfig {
            radius: 4.0,
            auto_angular_speed_deg: 15.0,
            input_deadzone: 0.2,
            ..OrbitConfig::default()
        };
        let layout = ArenaLayout::from_toml_or_default(
            r#"
            [[orbiters]]
            name = "Scout"
            center = "Nowhere"
            drive = "input"
            axis = "orbit_secondary"
            max_angular_speed_deg = -45.0
            "#,
            &defaults,
        );

        assert!(layout.anchors.is_empty());
        let scout = &layout.orbiters[0];
        assert_eq!(scout.config.radius, 4.0);
        assert_eq!(scout.config.auto_angular_speed_deg, 15.0);
        assert_eq!(scout.config.input_deadzone, 0.2);
        assert_eq!(scout.config.max_angular_speed_deg, 45.0);
        assert!(!scout.dynamic);
        assert_eq!(
            scout.config.drive_mode,
            DriveMode::InputDriven {
                axis: "orbit_secondary".to_string()
            }
        );
    }

    #[test]
    fn orbiter_overrides_deadzone_triggers_and_auto_start() {
        let defaults = OrbitConfig::default();
        let layout = ArenaLayout::from_toml_or_default(
            r#"
            [[orbiters]]
            name = "Drone"
            center = "Core"
            input_deadzone = 1.4
            clockwise_trigger = " Spin "
            counterclockwise_trigger = ""
            auto_start = false

            [[orbiters]]
            name = "Scout"
            center = "Core"
            "#,
            &defaults,
        );

        let drone = &layout.orbiters[0];
        assert_eq!(drone.config.input_deadzone, 0.99);
        assert_eq!(drone.config.triggers.clockwise.as_deref(), Some("Spin"));
        assert_eq!(drone.config.triggers.counterclockwise, None);
        assert!(!drone.auto_start);

        let scout = &layout.orbiters[1];
        assert_eq!(scout.config.input_deadzone, defaults.input_deadzone);
        assert_eq!(scout.config.triggers, defaults.triggers);
        assert!(scout.auto_start);
    }

    #[test]
    fn malformed_scene_uses_built_in_arena() {
        let defaults = OrbitConfig::default();
        let layout = ArenaLayout::from_toml_or_default("[[orbiters]\nname = 3", &defaults);
        assert_eq!(
            layout,
            ArenaLayout::resolve(RawSceneConfig::default(), &defaults)
        );
    }
}
