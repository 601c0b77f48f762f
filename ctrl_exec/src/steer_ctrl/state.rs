//! Implementations for the SteerCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{Params, SteerCtrlError};
use crate::tuning::TuningParameters;
use comms_if::{eqpt::act::ActuatorCommand, tuning::TuningState};
use util::module::{State, TuningHandler};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Steering control module state
#[derive(Default)]
pub struct SteerCtrl {
    pub(crate) params: Params,

    pub(crate) state: ControllerState,

    pub(crate) report: StatusReport,
}

/// PID history carried between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControllerState {
    /// Accumulated integral term
    pub integral: f64,

    /// Error on the previous cycle, zero before the first
    pub prev_error: f64,

    /// Time of the previous cycle
    pub prev_timestamp: Option<DateTime<Utc>>,
}

/// Input data to steering control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Column of the target point
    ///
    /// Units: pixels
    pub actual_x: f64,

    /// Snapshot of the tuning values for this cycle
    pub tuning: TuningParameters,

    /// Time the target was received
    pub timestamp: DateTime<Utc>,
}

/// Status report for steering control processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Desired minus actual column
    pub error: f64,

    pub p_term: f64,
    pub i_term: f64,
    pub d_term: f64,

    /// Sum of the terms before saturation
    pub raw_output: f64,

    /// True if the raw output was outside [-1, 1]
    pub saturated: bool,

    /// Time since the previous cycle, `None` on the first cycle
    ///
    /// Units: seconds
    pub measured_period_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerCtrl {
    /// Create a new instance with the given parameters.
    pub fn new(params: Params) -> Result<Self, SteerCtrlError> {
        let mut ctrl = Self::default();
        ctrl.init(params)?;
        Ok(ctrl)
    }

    /// Clear the integral and derivative history.
    pub fn reset(&mut self) {
        self.state = ControllerState::default();
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn desired_x(&self) -> f64 {
        self.params.desired_x
    }
}

impl State for SteerCtrl {
    type InitData = Params;
    type InitError = SteerCtrlError;

    type InputData = InputData;
    type OutputData = ActuatorCommand;
    type StatusReport = StatusReport;
    type ProcError = SteerCtrlError;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if !(init_data.sample_interval_s > 0.0) {
            return Err(SteerCtrlError::InvalidSampleInterval(init_data.sample_interval_s))
        }

        self.params = init_data;
        self.reset();
        self.report = StatusReport::default();

        Ok(())
    }

    /// Compute the actuator command for one target point.
    ///
    /// The steering demand is the PID output clamped to [-1, 1] and then inverted, since a target
    /// to the left of centre (positive error) needs a negative steering angle on the vehicle. Both
    /// throttles are set to the current throttle speed and the lights are always off.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let dt = self.params.sample_interval_s;
        let gains = &input_data.tuning;

        self.report = StatusReport::default();

        let error = self.params.desired_x - input_data.actual_x;

        let p_term = gains.kp * error;
        let i_term = self.state.integral + gains.ki * error * dt;
        let d_term = gains.kd * (error - self.state.prev_error) / dt;

        let raw_output = p_term + i_term + d_term;
        if !raw_output.is_finite() {
            return Err(SteerCtrlError::NonFiniteOutput(raw_output))
        }

        let steering_angle = -raw_output.max(-1.0).min(1.0);

        self.report.error = error;
        self.report.p_term = p_term;
        self.report.i_term = i_term;
        self.report.d_term = d_term;
        self.report.raw_output = raw_output;
        self.report.saturated = raw_output.abs() > 1.0;
        self.report.measured_period_s = self.state.prev_timestamp
            .and_then(|t| util::time::duration_to_seconds(input_data.timestamp - t));

        self.state.integral = i_term;
        self.state.prev_error = error;
        self.state.prev_timestamp = Some(input_data.timestamp);

        trace!("SteerCtrl status: {:?}", self.report);

        let output = ActuatorCommand {
            timestamp: Utc::now(),
            steering_angle,
            left_throttle: gains.throttle_speed,
            right_throttle: gains.throttle_speed,
            front_lights: false
        };

        Ok((output, self.report))
    }
}

impl TuningHandler for SteerCtrl {
    fn on_tuning_state(&mut self, state: &TuningState) {
        info!("Received tuning state from the system manager: {:?}", state.values);

        if self.params.reset_on_tuning_state {
            info!("Resetting the steering controller");
            self.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
