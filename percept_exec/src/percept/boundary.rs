//! # Boundary tracker
//!
//! Tracks the row at which the centre column of the image crosses from lane surface (foreground,
//! below) to track edge (background, above).
//!
//! The first frame is scanned in full. After that the previous estimate is probed and the tracker
//! steps away from it a few rows at a time until it finds the transition again, which costs a
//! handful of samples per frame since the boundary only moves a little between frames.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::binary_image::BinaryImage;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Persistent state of the boundary tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoundaryTracker {
    /// The current estimate, `None` until the first frame has been seen.
    estimate: Option<usize>,

    /// Height of the image the estimate was made in.
    height: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BoundaryTracker {
    /// The current boundary estimate.
    pub fn estimate(&self) -> Option<usize> {
        self.estimate
    }

    /// Update the estimate from the given image and return it.
    ///
    /// A full scan is made on the first frame, or if the image height has changed, otherwise the
    /// previous estimate is refined with [`warm_update`].
    ///
    /// The image must not be empty.
    pub fn update(&mut self, image: &BinaryImage, step: usize) -> usize {
        let x = image.centre_column();

        let boundary = match self.estimate {
            Some(prev_y) if self.height == image.height() =>
                warm_update(image, x, prev_y, step),
            _ => cold_start(image, x)
        };

        self.estimate = Some(boundary);
        self.height = image.height();

        boundary
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Scan column `x` from the bottom row upwards, returning the first background row.
///
/// If the whole column is lane surface the top row is returned.
pub fn cold_start(image: &BinaryImage, x: usize) -> usize {
    (0..image.height())
        .rev()
        .find(|&y| !image.get(x, y))
        .unwrap_or(0)
}

/// Refine the previous boundary `prev_y` in column `x`.
///
/// If `prev_y` is background the boundary has moved down, so step down until the first
/// foreground sample. If it is foreground the boundary has moved up, so step up until the first
/// background sample. Steps are `step` rows, clamped to the edge of the image, where the search
/// stops if nothing is found.
pub fn warm_update(image: &BinaryImage, x: usize, prev_y: usize, step: usize) -> usize {
    let last_row = image.height() - 1;
    let step = step.max(1);
    let mut y = prev_y.min(last_row);

    if !image.get(x, y) {
        while y < last_row {
            y = (y + step).min(last_row);
            if image.get(x, y) {
                break;
            }
        }
    }
    else {
        while y > 0 {
            y = y.saturating_sub(step);
            if !image.get(x, y) {
                break;
            }
        }
    }

    y
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A 64x100 image whose centre column is background down to `boundary` and foreground below.
    fn track_with_boundary(boundary: usize) -> BinaryImage {
        BinaryImage::from_fn(64, 100, |_, y| y > boundary)
    }

    #[test]
    fn test_cold_start() {
        assert_eq!(cold_start(&track_with_boundary(37), 32), 37);

        // All lane, returns the top row
        let all_lane = BinaryImage::from_fn(64, 100, |_, _| true);
        assert_eq!(cold_start(&all_lane, 32), 0);

        // No lane at all, the bottom row is already the edge
        let no_lane = BinaryImage::from_fn(64, 100, |_, _| false);
        assert_eq!(cold_start(&no_lane, 32), 99);
    }

    #[test]
    fn test_warm_update_moves_down() {
        // Previous estimate above the boundary, in the background
        let img = track_with_boundary(50);

        let y = warm_update(&img, 32, 44, 2);

        // First foreground row found stepping down from 44 is 52
        assert_eq!(y, 52);
        assert!((y as i64 - 50).abs() <= 2);
    }

    #[test]
    fn test_warm_update_moves_up() {
        let img = track_with_boundary(50);

        // 57 is foreground, stepping up finds background at 49
        let y = warm_update(&img, 32, 57, 2);
        assert_eq!(y, 49);

        // From just below the boundary the very first step finds it
        assert_eq!(warm_update(&img, 32, 52, 2), 50);
    }

    #[test]
    fn test_warm_update_converges() {
        let img = track_with_boundary(60);

        for offset in 0..8usize {
            for &prev_y in &[60 - offset, 60 + offset] {
                let y = warm_update(&img, 32, prev_y, 2);

                // Never further than a step from the true boundary
                assert!(
                    (y as i64 - 60).abs() <= 2,
                    "from {} got {}", prev_y, y
                );

                // Moved by a whole number of steps
                let moved = (y as i64 - prev_y as i64).abs() as usize;
                assert_eq!(moved % 2, 0);
            }
        }
    }

    #[test]
    fn test_warm_update_clamps_to_edges() {
        // Everything background, searching down for lane reaches the last row
        let no_lane = BinaryImage::from_fn(64, 99, |_, _| false);
        assert_eq!(warm_update(&no_lane, 32, 10, 2), 98);

        // Everything lane, searching up for the edge reaches the top row
        let all_lane = BinaryImage::from_fn(64, 99, |_, _| true);
        assert_eq!(warm_update(&all_lane, 32, 11, 2), 0);

        // Estimate from a taller image is clamped into this one
        assert_eq!(warm_update(&no_lane, 32, 500, 2), 98);
    }

    #[test]
    fn test_tracker_reseeds_on_height_change() {
        let mut tracker = BoundaryTracker::default();

        assert_eq!(tracker.update(&track_with_boundary(30), 2), 30);
        assert_eq!(tracker.estimate(), Some(30));

        // Warm update on the same size
        assert_eq!(tracker.update(&track_with_boundary(33), 2), 34);

        // Different height, full scan
        let taller = BinaryImage::from_fn(64, 200, |_, y| y > 150);
        assert_eq!(tracker.update(&taller, 2), 150);
    }
}
