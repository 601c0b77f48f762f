//! # Control library.
//!
//! Steering control for the lane keeping vehicle, with live operator tuning. The executable in
//! `main.rs` runs the control loop on top of this library.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control client - receives trajectories and publishes actuator commands
pub mod ctrl_client;

/// Keyboard input - operator tuning of speed and gains
pub mod key_input;

/// Executable parameters
pub mod params;

/// Steering control module - PID on the target column
pub mod steer_ctrl;

/// Shared tuning values
pub mod tuning;
