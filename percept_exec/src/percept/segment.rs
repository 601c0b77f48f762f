//! # Row segmenter
//!
//! Finds runs of lane surface along a single row and picks the longest one as the lane.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use comms_if::traj::TrajPoint;
use crate::binary_image::BinaryImage;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A maximal run of foreground samples, covering columns `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WhiteRun {
    pub start: usize,
    pub end: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WhiteRun {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Centre column of the run.
    pub fn midpoint(&self) -> usize {
        (self.start + self.end) / 2
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Find all runs of foreground in `row` at least `min_len` samples long, left to right.
///
/// A run reaching the last column is closed at the end of the row.
pub fn find_runs(row: &[bool], min_len: usize) -> Vec<WhiteRun> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (x, &fg) in row.iter().enumerate() {
        match (fg, start) {
            (true, None) => start = Some(x),
            (false, Some(s)) => {
                push_run(&mut runs, s, x, min_len);
                start = None;
            },
            _ => ()
        }
    }

    if let Some(s) = start {
        push_run(&mut runs, s, row.len(), min_len);
    }

    runs
}

/// The longest run, the leftmost one if several are equally long.
pub fn longest_run(runs: &[WhiteRun]) -> Option<WhiteRun> {
    let mut best: Option<WhiteRun> = None;

    for run in runs {
        match best {
            Some(b) if run.len() <= b.len() => (),
            _ => best = Some(*run)
        }
    }

    best
}

/// Segment row `row` of the image, returning the centre of the longest run as the target point.
///
/// Returns `None` if the row has no runs of at least `min_len`.
pub fn segment_row(image: &BinaryImage, row: usize, min_len: usize) -> Option<TrajPoint> {
    let runs = find_runs(image.row(row), min_len);

    longest_run(&runs).map(|r| TrajPoint {
        x: r.midpoint() as u32,
        y: row as u32
    })
}

fn push_run(runs: &mut Vec<WhiteRun>, start: usize, end: usize, min_len: usize) {
    let run = WhiteRun { start, end };

    if run.len() >= min_len {
        runs.push(run);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
