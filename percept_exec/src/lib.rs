//! # Perception library.
//!
//! Turns binary camera images into a single steering target per frame. The executable in
//! `main.rs` wraps this library with frame acquisition and publishing; the library itself does no
//! I/O apart from the frame sources and the server.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Binary (foreground/background) image type
pub mod binary_image;

/// Frame sources - where the raw camera images come from
pub mod frame_source;

/// Executable parameters
pub mod params;

/// Perception module - boundary tracking, lookahead selection and row segmentation
pub mod percept;

/// Perception server - publishes trajectories and receives tuning states
pub mod percept_server;

/// Image preprocessing - grayscale, threshold and morphological close
pub mod preproc;
