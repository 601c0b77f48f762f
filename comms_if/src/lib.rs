//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the network abstraction and
//! the messages which travel between the perception exec, the control exec, and the external
//! processes around them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Messages exchanged with equipment (camera acquisition, actuators)
pub mod eqpt;

/// Network module
pub mod net;

/// Trajectory messages published by the perception exec
pub mod traj;

/// Tuning state pushed by the system manager
pub mod tuning;
