//! Named input axes: bindings from `config/input.toml` and the sampled values.
use std::{collections::HashMap, fs, path::Path};

use bevy::input::gamepad::{Gamepad, GamepadAxis};
use bevy::prelude::*;
use serde::Deserialize;

use crate::motion::capabilities::AxisSource;
use crate::motion::errors::AxisReadError;

const CONFIG_PATH: &str = "config/input.toml";

pub const ORBIT_AXIS: &str = "orbit_horizontal";

#[derive(Debug, Clone, Deserialize)]
struct RawInputConfig {
    #[serde(default = "default_raw_axes")]
    axes: Vec<RawAxisBinding>,
}

impl Default for RawInputConfig {
    fn default() -> Self {
        Self {
            axes: default_raw_axes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawAxisBinding {
    name: String,
    #[serde(default)]
    negative: Option<String>,
    #[serde(default)]
    positive: Option<String>,
    #[serde(default)]
    gamepad_axis: Option<String>,
}

fn default_raw_axes() -> Vec<RawAxisBinding> {
    vec![RawAxisBinding {
        name: ORBIT_AXIS.to_string(),
        negative: Some("KeyA".to_string()),
        positive: Some("KeyD".to_string()),
        gamepad_axis: Some("LeftStickX".to_string()),
    }]
}

/// One named axis fed by a key pair and/or a gamepad stick.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBinding {
    pub name: String,
    pub negative: Option<KeyCode>,
    pub positive: Option<KeyCode>,
    pub gamepad_axis: Option<GamepadAxis>,
}

impl AxisBinding {
    /// Current value, or `None` when no bound device is present.
    pub fn sample(
        &self,
        keyboard: Option<&ButtonInput<KeyCode>>,
        gamepad: Option<&Gamepad>,
    ) -> Option<f32> {
        let keys = keyboard
            .filter(|_| self.negative.is_some() || self.positive.is_some())
            .map(|keyboard| {
                let mut value: f32 = 0.0;
                if self.negative.is_some_and(|key| keyboard.pressed(key)) {
                    value -= 1.0;
                }
                if self.positive.is_some_and(|key| keyboard.pressed(key)) {
                    value += 1.0;
                }
                value
            });
        let stick = self
            .gamepad_axis
            .and_then(|axis| gamepad.and_then(|gamepad| gamepad.get(axis)));

        match (keys, stick) {
            (None, None) => None,
            (keys, stick) => {
                let keys: f32 = keys.unwrap_or(0.0);
                let stick: f32 = stick.unwrap_or(0.0);
                let value = if stick.abs() > keys.abs() { stick } else { keys };
                Some(value.clamp(-1.0, 1.0))
            }
        }
    }
}

/// All configured axes.
#[derive(Resource, Debug, Clone, Default)]
pub struct AxisBindings {
    pub axes: Vec<AxisBinding>,
}

impl AxisBindings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml_or_default(&data),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawInputConfig::default().into()
            }
        }
    }

    fn from_toml_or_default(data: &str) -> Self {
        match toml::from_str::<RawInputConfig>(data) {
            Ok(raw) => raw.into(),
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawInputConfig::default().into()
            }
        }
    }
}

impl From<RawInputConfig> for AxisBindings {
    fn from(value: RawInputConfig) -> Self {
        let axes = value
            .axes
            .into_iter()
            .filter_map(|raw| {
                let name = raw.name.trim().to_string();
                if name.is_empty() {
                    warn!("Ignoring input axis with an empty name");
                    return None;
                }
                Some(AxisBinding {
                    negative: parse_bound(&name, raw.negative.as_deref(), parse_key_code),
                    positive: parse_bound(&name, raw.positive.as_deref(), parse_key_code),
                    gamepad_axis: parse_bound(
                        &name,
                        raw.gamepad_axis.as_deref(),
                        parse_gamepad_axis,
                    ),
                    name,
                })
            })
            .collect();

        Self { axes }
    }
}

fn parse_bound<T>(axis: &str, raw: Option<&str>, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw?.trim();
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!("Unknown input '{}' for axis '{}'; leaving it unbound", raw, axis);
    }
    parsed
}

/// Parses the key names accepted in `config/input.toml`.
pub fn parse_key_code(name: &str) -> Option<KeyCode> {
    let key = match name {
        "KeyA" => KeyCode::KeyA,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyJ" => KeyCode::KeyJ,
        "KeyL" => KeyCode::KeyL,
        "KeyQ" => KeyCode::KeyQ,
        "KeyS" => KeyCode::KeyS,
        "KeyW" => KeyCode::KeyW,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "Comma" => KeyCode::Comma,
        "Period" => KeyCode::Period,
        "Space" => KeyCode::Space,
        _ => return None,
    };
    Some(key)
}

/// Parses the stick names accepted in `config/input.toml`.
pub fn parse_gamepad_axis(name: &str) -> Option<GamepadAxis> {
    let axis = match name {
        "LeftStickX" => GamepadAxis::LeftStickX,
        "LeftStickY" => GamepadAxis::LeftStickY,
        "RightStickX" => GamepadAxis::RightStickX,
        "RightStickY" => GamepadAxis::RightStickY,
        _ => return None,
    };
    Some(axis)
}

/// Axis values sampled in `Update` and read by fixed-step systems.
///
/// A bound axis with no device present is stored as `None`.
#[derive(Resource, Debug, Default)]
pub struct InputAxes {
    values: HashMap<String, Option<f32>>,
}

impl InputAxes {
    pub fn record(&mut self, name: &str, value: Option<f32>) {
        self.values.insert(name.to_string(), value);
    }
}

impl AxisSource for InputAxes {
    fn read_axis(&self, name: &str) -> Result<f32, AxisReadError> {
        match self.values.get(name) {
            Some(Some(value)) => Ok(*value),
            Some(None) => Err(AxisReadError::device_unavailable(name)),
            None => Err(AxisReadError::unbound(name)),
        }
    }
}

/// Samples every bound axis from the keyboard and the first connected gamepad.
pub fn sample_input_axes(
    bindings: Res<AxisBindings>,
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    gamepads: Query<&Gamepad>,
    mut axes: ResMut<InputAxes>,
) {
    let gamepad = gamepads.iter().next();
    for binding in &bindings.axes {
        let value = binding.sample(keyboard.as_deref(), gamepad);
        axes.record(&binding.name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard_binding() -> AxisBinding {
        AxisBinding {
            name: ORBIT_AXIS.into(),
            negative: Some(KeyCode::KeyA),
            positive: Some(KeyCode::KeyD),
            gamepad_axis: None,
        }
    }

    #[test]
    fn key_pair_produces_signed_axis() {
        let binding = keyboard_binding();
        let mut keyboard = ButtonInput::<KeyCode>::default();

        assert_eq!(binding.sample(Some(&keyboard), None), Some(0.0));

        keyboard.press(KeyCode::KeyA);
        assert_eq!(binding.sample(Some(&keyboard), None), Some(-1.0));

        keyboard.press(KeyCode::KeyD);
        assert_eq!(binding.sample(Some(&keyboard), None), Some(0.0));
    }

    #[test]
    fn stronger_of_keys_and_stick_wins() {
        let binding = AxisBinding {
            gamepad_axis: Some(GamepadAxis::LeftStickX),
            ..keyboard_binding()
        };
        let mut keyboard = ButtonInput::<KeyCode>::default();
        let mut gamepad = Gamepad::default();
        gamepad.analog_mut().set(GamepadAxis::LeftStickX, 0.5);

        assert_eq!(binding.sample(Some(&keyboard), Some(&gamepad)), Some(0.5));

        keyboard.press(KeyCode::KeyA);
        assert_eq!(binding.sample(Some(&keyboard), Some(&gamepad)), Some(-1.0));

        keyboard.release(KeyCode::KeyA);
        gamepad.analog_mut().set(GamepadAxis::LeftStickX, -0.25);
        assert_eq!(binding.sample(Some(&keyboard), Some(&gamepad)), Some(-0.25));
        assert_eq!(binding.sample(None, Some(&gamepad)), Some(-0.25));
    }

    #[test]
    fn gamepad_only_axis_without_device_is_unavailable() {
        let binding = AxisBinding {
            name: "aim".into(),
            negative: None,
            positive: None,
            gamepad_axis: Some(GamepadAxis::RightStickX),
        };
        let keyboard = ButtonInput::<KeyCode>::default();
        assert_eq!(binding.sample(Some(&keyboard), None), None);
    }

    #[test]
    fn read_axis_distinguishes_missing_binding_and_device() {
        let mut axes = InputAxes::default();
        axes.record("aim", None);
        axes.record(ORBIT_AXIS, Some(0.25));

        assert_eq!(axes.read_axis(ORBIT_AXIS), Ok(0.25));
        assert_eq!(
            axes.read_axis("aim"),
            Err(AxisReadError::device_unavailable("aim"))
        );
        assert_eq!(
            axes.read_axis("zoom"),
            Err(AxisReadError::unbound("zoom"))
        );
    }

    #[test]
    fn parses_bindings_and_skips_unknown_inputs() {
        let bindings = AxisBindings::from_toml_or_default(
            r#"
            [[axes]]
            name = "orbit_horizontal"
            negative = "ArrowLeft"
            positive = "Banana"
            gamepad_axis = "LeftStickX"

            [[axes]]
            name = "   "
            "#,
        );

        assert_eq!(
            bindings.axes,
            vec![AxisBinding {
                name: ORBIT_AXIS.into(),
                negative: Some(KeyCode::ArrowLeft),
                positive: None,
                gamepad_axis: Some(GamepadAxis::LeftStickX),
            }]
        );
    }

    #[test]
    fn sampling_system_records_pressed_keys() {
        let mut app = App::new();
        app.insert_resource(AxisBindings {
            axes: vec![keyboard_binding()],
        })
        .init_resource::<InputAxes>()
        .init_resource::<ButtonInput<KeyCode>>()
        .add_systems(Update, sample_input_axes);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyD);
        app.update();

        let axes = app.world().resource::<InputAxes>();
        assert_eq!(axes.read_axis(ORBIT_AXIS), Ok(1.0));
    }
}
