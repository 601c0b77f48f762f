//! # Actuator Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc, serde::ts_milliseconds};
use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Command published by the control exec for the actuator, once per received trajectory.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActuatorCommand {
    /// UTC timestamp at which the command was produced
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Normalised steering demand, between -1 and +1.
    pub steering_angle: f64,

    /// Left drive throttle demand
    pub left_throttle: f64,

    /// Right drive throttle demand
    pub right_throttle: f64,

    /// Front lights demand
    pub front_lights: bool,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_names() {
        let cmd = ActuatorCommand {
            timestamp: Utc::now(),
            steering_angle: -1.0,
            left_throttle: 0.2,
            right_throttle: 0.2,
            front_lights: false,
        };

        let value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(value["steeringAngle"], -1.0);
        assert_eq!(value["leftThrottle"], 0.2);
        assert_eq!(value["rightThrottle"], 0.2);
        assert_eq!(value["frontLights"], false);
        assert!(value["timestamp"].is_i64());
    }
}
