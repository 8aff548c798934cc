use crate::SensorId;
use serde::{Deserialize, Serialize};

pub const SENSOR_NAME_MAX_LEN: usize = 64;

/// Validation result for sensor names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorNameValidation {
    Valid,
    Empty,
    TooLong,
    InvalidCharacters,
}

impl SensorNameValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::Empty => Some("Sensor name must not be empty"),
            Self::TooLong => Some("Sensor name must be at most 64 characters"),
            Self::InvalidCharacters => Some(
                "Sensor name can only contain letters, numbers, spaces, \
                 dashes, and underscores",
            ),
        }
    }
}

/// Validate a sensor name.
///
/// Rules:
/// - 1-64 characters, ignoring surrounding whitespace
/// - ASCII letters, numbers, spaces, dashes, and underscores only
pub fn validate_sensor_name(name: &str) -> SensorNameValidation {
    let name = name.trim();
    if name.is_empty() {
        return SensorNameValidation::Empty;
    }
    if name.len() > SENSOR_NAME_MAX_LEN {
        return SensorNameValidation::TooLong;
    }
    let allowed =
        |c: char| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_');
    if !name.chars().all(allowed) {
        return SensorNameValidation::InvalidCharacters;
    }
    SensorNameValidation::Valid
}

/// Body of `POST /sensor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSensor {
    pub id: SensorId,
    pub name: String,
    pub value: f64,
}
