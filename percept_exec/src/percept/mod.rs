//! # Perception module
//!
//! Perception finds a single lateral steering target in each binary frame. It works in three
//! stages:
//!
//! 1. The boundary tracker follows the row at which the image's vertical centreline crosses from
//!    lane surface to track edge. On straights this boundary is far up the image, as a curve
//!    approaches it moves down towards the vehicle.
//! 2. The lookahead selector uses the boundary to choose which row to analyse. On straights a far
//!    row gives smooth control, when entering a curve a near row avoids cutting the corner.
//! 3. The row segmenter finds the longest run of lane surface on that row, whose midpoint is the
//!    target.
//!
//! All state persisting between frames lives in [`PerceptState`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod boundary;
pub mod lookahead;
pub mod params;
pub mod segment;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use boundary::*;
pub use lookahead::*;
pub use params::Params;
pub use segment::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during perception processing.
#[derive(Debug, thiserror::Error)]
pub enum PerceptError {
    #[error("The frame has no samples ({0}x{1})")]
    EmptyImage(usize, usize),

    #[error("Invalid perception parameters: {0}")]
    InvalidParams(String),
}
