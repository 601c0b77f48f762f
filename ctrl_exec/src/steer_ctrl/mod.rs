//! # Steering control module
//!
//! Turns the lateral position of the target point into a normalised steering demand with a PID
//! controller. The gains are not owned by the controller, a fresh snapshot of the shared tuning
//! values is passed in on every cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SteerCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SteerCtrlError {
    #[error("The sample interval must be positive, found {0} s")]
    InvalidSampleInterval(f64),

    #[error("The controller produced a non-finite output ({0}), check the gains")]
    NonFiniteOutput(f64),
}
