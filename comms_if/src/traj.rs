//! # Trajectory messages
//!
//! The perception exec publishes one [`TrajectoryMsg`] per successfully segmented frame. The
//! control exec only uses the first point.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc, serde::ts_milliseconds};
use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Message wrapping the trajectory extracted from a single frame.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrajectoryMsg {
    /// UTC timestamp at which the source frame was processed
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub trajectory: Trajectory,
}

/// Target points in image coordinates, with the size of the image they were found in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Trajectory {
    pub points: Vec<TrajPoint>,

    /// Width of the source image in pixels
    pub width: u32,

    /// Height of the source image in pixels
    pub height: u32,
}

/// A pixel coordinate in the source image
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TrajPoint {
    pub x: u32,
    pub y: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrajectoryMsg {
    /// Build a message holding a single target point.
    pub fn single(point: TrajPoint, width: u32, height: u32) -> Self {
        Self {
            timestamp: Utc::now(),
            trajectory: Trajectory {
                points: vec![point],
                width,
                height
            }
        }
    }

    /// The point the controller steers towards, if the message has one.
    pub fn target(&self) -> Option<TrajPoint> {
        self.trajectory.points.first().copied()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_wire_format() {
        let msg: TrajectoryMsg = serde_json::from_str(r#"{
            "timestamp": 1700000000000,
            "trajectory": {
                "points": [ {"x": 140, "y": 240}, {"x": 10, "y": 20} ],
                "width": 640,
                "height": 480
            }
        }"#).unwrap();

        assert_eq!(msg.target(), Some(TrajPoint { x: 140, y: 240 }));
        assert_eq!(msg.trajectory.width, 640);
    }

    #[test]
    fn test_empty_points_has_no_target() {
        let msg: TrajectoryMsg = serde_json::from_str(r#"{
            "timestamp": 0,
            "trajectory": { "points": [], "width": 640, "height": 480 }
        }"#).unwrap();

        assert_eq!(msg.target(), None);
    }

    #[test]
    fn test_missing_trajectory_rejected() {
        let res = serde_json::from_str::<TrajectoryMsg>(r#"{ "timestamp": 0 }"#);

        assert!(res.is_err());
    }
}
