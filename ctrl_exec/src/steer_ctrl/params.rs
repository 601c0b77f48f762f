//! Parameters structure for SteerCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for steering control.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Params {
    /// Column the target point should be held at, normally the image centre.
    ///
    /// Units: pixels
    pub desired_x: f64,

    /// Nominal time between cycles used in the integral and derivative terms.
    ///
    /// Units: seconds
    pub sample_interval_s: f64,

    /// If true a tuning state pushed by the system manager resets the integral and derivative
    /// history.
    pub reset_on_tuning_state: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            desired_x: 320.0,
            sample_interval_s: 0.1,
            reset_on_tuning_state: false,
        }
    }
}
