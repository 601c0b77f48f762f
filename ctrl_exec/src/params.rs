//! # Control Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{steer_ctrl, tuning::{TuningIncrements, TuningParameters}};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the control executable, loaded from `ctrl_exec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CtrlExecParams {
    /// Minimum log level, e.g. `"info"` or `"debug"`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Longest time to wait for a trajectory before checking for shutdown.
    ///
    /// Units: milliseconds
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: i32,

    /// Read tuning keys from the terminal. Disable when running without one.
    #[serde(default = "default_keyboard_tuning")]
    pub keyboard_tuning: bool,

    /// Initial gains and throttle speed
    #[serde(default)]
    pub tuning: TuningParameters,

    /// Steps applied by the tuning keys
    #[serde(default)]
    pub increments: TuningIncrements,

    #[serde(default)]
    pub steer_ctrl: steer_ctrl::Params,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".into()
}

fn default_recv_timeout_ms() -> i32 {
    500
}

fn default_keyboard_tuning() -> bool {
    true
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load() {
        let params: CtrlExecParams = util::params::from_str(r#"
            [tuning]
            kp = 0.003
            ki = 0.0
            kd = 0.0
            throttle_speed = 0.2

            [steer_ctrl]
            desired_x = 320.0
        "#).unwrap();

        assert_eq!(params.log_level, "info");
        assert!(params.keyboard_tuning);
        assert_eq!(params.tuning.kp, 0.003);
        assert_eq!(params.increments, TuningIncrements::default());
        assert_eq!(params.steer_ctrl.desired_x, 320.0);
        assert_eq!(params.steer_ctrl.sample_interval_s, 0.1);
        assert!(!params.steer_ctrl.reset_on_tuning_state);
    }

    #[test]
    fn test_missing_gain() {
        // Partial gain tables are rejected rather than silently zeroed
        let result: Result<CtrlExecParams, _> = util::params::from_str(r#"
            [tuning]
            kp = 0.003
        "#);

        assert!(result.is_err());
    }
}
