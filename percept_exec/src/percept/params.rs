//! Perception parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for perception.
///
/// All rows are image rows counted from the top. The thresholds are compared against the
/// boundary estimate, so a larger value means the track edge is closer to the vehicle.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Params {

    /// Number of rows the boundary tracker moves per probe.
    pub boundary_step: usize,

    /// Row analysed while cruising on a straight.
    pub cruise_row: usize,

    /// Boundary at or beyond which a curve is entered.
    pub curve_enter_threshold: usize,

    /// Boundary below which a curve is left.
    ///
    /// Must be less than `curve_enter_threshold` to give hysteresis.
    pub curve_exit_threshold: usize,

    /// Boundary above which the approach ramp starts.
    pub lower_ramp: usize,

    /// Boundary up to which the approach ramp is linear. Between this and the curve threshold the
    /// row is pinned near the bottom of the image.
    pub upper_ramp: usize,

    /// Gradient of the approach ramp, rows per boundary row.
    pub ramp_gain: f64,

    /// Offset of the approach ramp, `row = ramp_gain * boundary - ramp_offset`.
    pub ramp_offset: f64,

    /// Number of rows kept clear of the bottom of the image by the ramp.
    pub bottom_margin: usize,

    /// Boundary movement between frames which re-anchors the row while in a curve.
    pub jump_threshold: usize,

    /// Boundary movement which re-anchors the row on the frame a curve is entered.
    pub entry_jump_threshold: usize,

    /// Minimum length of a run of lane surface, shorter runs are noise.
    pub min_run_len: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Defaults tuned for 640x480 frames at 0.2-0.4 throttle.
    fn default() -> Self {
        Self {
            boundary_step: 2,
            cruise_row: 240,
            curve_enter_threshold: 200,
            curve_exit_threshold: 150,
            lower_ramp: 100,
            upper_ramp: 170,
            ramp_gain: 3.4,
            ramp_offset: 100.0,
            bottom_margin: 2,
            jump_threshold: 20,
            entry_jump_threshold: 10,
            min_run_len: 2,
        }
    }
}
