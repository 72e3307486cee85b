//! Diagnostics raised by motion controllers.
use std::fmt;

/// Configuration errors that disable a controller instance.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    MissingTarget,
    MissingPhysicsBody,
    InvalidRadius { radius: f32 },
    BodyKindChanged { expected: BodyKind },
}

impl MotionError {
    pub fn invalid_radius(radius: f32) -> Self {
        Self::InvalidRadius { radius }
    }

    pub fn body_kind_changed(expected: BodyKind) -> Self {
        Self::BodyKindChanged { expected }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => write!(f, "orbit target reference is missing"),
            Self::MissingPhysicsBody => {
                write!(f, "a dynamic body is required but none is attached")
            }
            Self::InvalidRadius { radius } => {
                write!(f, "orbit radius must be positive (got {:.3})", radius)
            }
            Self::BodyKindChanged { expected } => {
                write!(f, "body binding changed after initialisation (expected {})", expected)
            }
        }
    }
}

impl std::error::Error for MotionError {}

/// Which body variant a controller was bound to at initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Kinematic,
    Dynamic,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Kinematic => "kinematic",
            Self::Dynamic => "dynamic",
        };
        write!(f, "{}", label)
    }
}

/// Orbit direction, used to name animation triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrbitDirection {
    Clockwise,
    Counterclockwise,
}

impl OrbitDirection {
    /// Direction implied by a signed angular speed; `None` when stationary.
    pub fn from_speed(angular_speed_deg: f32) -> Option<Self> {
        if angular_speed_deg > 0.0 {
            Some(Self::Clockwise)
        } else if angular_speed_deg < 0.0 {
            Some(Self::Counterclockwise)
        } else {
            None
        }
    }
}

impl fmt::Display for OrbitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Clockwise => "clockwise",
            Self::Counterclockwise => "counterclockwise",
        };
        write!(f, "{}", label)
    }
}

/// Non-fatal configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionWarning {
    BlankTrigger { direction: OrbitDirection },
}

impl fmt::Display for MotionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankTrigger { direction } => write!(
                f,
                "animation sink is bound but the {} trigger name is not set",
                direction
            ),
        }
    }
}

/// Reasons an input axis could not be read. Callers treat these as a zero signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisReadError {
    UnboundAxis { name: String },
    DeviceUnavailable { name: String },
}

impl AxisReadError {
    pub fn unbound(name: impl Into<String>) -> Self {
        Self::UnboundAxis { name: name.into() }
    }

    pub fn device_unavailable(name: impl Into<String>) -> Self {
        Self::DeviceUnavailable { name: name.into() }
    }
}

impl fmt::Display for AxisReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundAxis { name } => write!(f, "axis '{}' has no binding", name),
            Self::DeviceUnavailable { name } => {
                write!(f, "no device available for axis '{}'", name)
            }
        }
    }
}

impl std::error::Error for AxisReadError {}

/// A diagnostic queued by a controller for the host to report.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionDiagnostic {
    Error(MotionError),
    Warning(MotionWarning),
}

impl fmt::Display for MotionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(error) => write!(f, "configuration error: {}", error),
            Self::Warning(warning) => write!(f, "configuration warning: {}", warning),
        }
    }
}
