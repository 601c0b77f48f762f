//! # Lookahead selector
//!
//! Chooses the image row to analyse for the steering target, based on the boundary estimate.
//!
//! While cruising a far row is used. As the boundary comes closer (larger row) the selected row
//! ramps down the image, and once the boundary passes the curve threshold the selector enters a
//! curve, where the row follows the boundary itself. The curve is only left once the boundary
//! retreats past a lower exit threshold, so a boundary hovering between the two thresholds does
//! not make the selection oscillate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::Serialize;

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Persistent state of the lookahead selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectorState {
    /// Current mode
    pub mode: LookaheadState,

    /// Row selected on the previous frame
    pub row: usize,

    /// Boundary estimate on the previous frame
    pub prev_boundary: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Modes of the lookahead selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LookaheadState {
    /// On a straight, looking far ahead.
    Cruising,

    /// First frame of a curve. Re-anchoring on the boundary is more sensitive here.
    EnteringCurve,

    /// In a curve, following the boundary.
    InCurve,
}

impl Default for LookaheadState {
    fn default() -> Self {
        LookaheadState::Cruising
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Select the row to analyse for the current frame.
///
/// `boundary` is this frame's boundary estimate and `height` the image height. The state is
/// advanced and the selected row, which is always inside the image, is returned.
pub fn select_row(
    params: &Params,
    state: &mut SelectorState,
    boundary: usize,
    height: usize
) -> usize {
    let last_row = height.saturating_sub(1);
    let bottom_row = height.saturating_sub(params.bottom_margin);

    let mut row = state.row;

    match state.mode {
        LookaheadState::Cruising => {
            if boundary >= params.curve_enter_threshold {
                debug!("Entering curve (boundary {})", boundary);
                state.mode = LookaheadState::EnteringCurve;
                row = boundary;
            }
            else if boundary > params.lower_ramp {
                row = if boundary <= params.upper_ramp {
                    ramp_row(params, boundary, bottom_row)
                }
                else {
                    bottom_row
                };
            }
            else {
                row = params.cruise_row;
            }
        },
        LookaheadState::EnteringCurve | LookaheadState::InCurve => {
            let prev = state.prev_boundary;

            // Boundary retreating back towards the cruise row
            let retreating = row < boundary && boundary <= params.cruise_row;

            // Boundary jumped closer
            let jumped = boundary > prev + params.jump_threshold;

            let entry_jump = state.mode == LookaheadState::EnteringCurve
                && boundary > prev + params.entry_jump_threshold;

            if retreating || jumped || entry_jump {
                row = boundary;
            }

            if boundary < params.curve_exit_threshold {
                debug!("Leaving curve (boundary {})", boundary);
                state.mode = LookaheadState::Cruising;
                row = params.cruise_row;
            }
            else {
                state.mode = LookaheadState::InCurve;
            }
        }
    }

    state.prev_boundary = boundary;
    state.row = row.min(last_row);

    state.row
}

/// Row on the approach ramp for the given boundary, clamped to `[0, bottom_row]`.
fn ramp_row(params: &Params, boundary: usize, bottom_row: usize) -> usize {
    let row = params.ramp_gain * boundary as f64 - params.ramp_offset;

    if row <= 0.0 {
        0
    }
    else {
        (row as usize).min(bottom_row)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const HEIGHT: usize = 480;

    fn cruising_from(prev_boundary: usize) -> SelectorState {
        SelectorState {
            mode: LookaheadState::Cruising,
            row: 240,
            prev_boundary
        }
    }

    #[test]
    fn test_straight_uses_cruise_row() {
        let params = Params::default();
        let mut state = cruising_from(50);

        assert_eq!(select_row(&params, &mut state, 50, HEIGHT), 240);
        assert_eq!(state.mode, LookaheadState::Cruising);

        // Up to and including the lower ramp limit stays on the cruise row
        assert_eq!(select_row(&params, &mut state, 100, HEIGHT), 240);
    }

    #[test]
    fn test_approach_ramp() {
        let params = Params::default();
        let mut state = cruising_from(100);

        // 3.4 * 120 - 100 = 308
        assert_eq!(select_row(&params, &mut state, 120, HEIGHT), 308);

        // 3.4 * 101 - 100 = 243.4
        assert_eq!(select_row(&params, &mut state, 101, HEIGHT), 243);

        // 3.4 * 169 - 100 = 474.6
        assert_eq!(select_row(&params, &mut state, 169, HEIGHT), 474);

        // Past the ramp but not yet a curve, pinned near the bottom
        assert_eq!(select_row(&params, &mut state, 185, HEIGHT), 478);
        assert_eq!(state.mode, LookaheadState::Cruising);
    }

    #[test]
    fn test_ramp_clamped_in_small_image() {
        let params = Params::default();
        let mut state = cruising_from(100);

        // 308 doesn't fit in a 240 row image
        assert_eq!(select_row(&params, &mut state, 120, 240), 238);
    }

    #[test]
    fn test_enter_curve() {
        let params = Params::default();
        let mut state = cruising_from(150);

        assert_eq!(select_row(&params, &mut state, 210, HEIGHT), 210);
        assert_eq!(state.mode, LookaheadState::EnteringCurve);
        assert_eq!(state.prev_boundary, 210);

        // Entry flag only lasts one frame
        select_row(&params, &mut state, 212, HEIGHT);
        assert_eq!(state.mode, LookaheadState::InCurve);
    }

    #[test]
    fn test_curve_holds_row() {
        let params = Params::default();
        let mut state = SelectorState {
            mode: LookaheadState::InCurve,
            row: 300,
            prev_boundary: 290
        };

        // Small movement beyond the cruise row, nothing re-anchors
        assert_eq!(select_row(&params, &mut state, 295, HEIGHT), 300);
        assert_eq!(select_row(&params, &mut state, 280, HEIGHT), 300);
    }

    #[test]
    fn test_curve_re_anchors() {
        let params = Params::default();

        // Boundary retreating towards the cruise row is followed
        let mut state = SelectorState {
            mode: LookaheadState::InCurve,
            row: 200,
            prev_boundary: 215
        };
        assert_eq!(select_row(&params, &mut state, 220, HEIGHT), 220);

        // Boundary jumping closer by more than the jump threshold
        let mut state = SelectorState {
            mode: LookaheadState::InCurve,
            row: 300,
            prev_boundary: 260
        };
        assert_eq!(select_row(&params, &mut state, 275, HEIGHT), 300);
        assert_eq!(select_row(&params, &mut state, 290, HEIGHT), 300);
        assert_eq!(select_row(&params, &mut state, 311, HEIGHT), 311);
    }

    #[test]
    fn test_entry_frame_more_sensitive() {
        let params = Params::default();

        let entering = SelectorState {
            mode: LookaheadState::EnteringCurve,
            row: 300,
            prev_boundary: 280
        };
        let in_curve = SelectorState {
            mode: LookaheadState::InCurve,
            ..entering
        };

        // A 15 row jump only re-anchors on the entry frame
        let mut state = entering;
        assert_eq!(select_row(&params, &mut state, 295, HEIGHT), 295);

        let mut state = in_curve;
        assert_eq!(select_row(&params, &mut state, 295, HEIGHT), 300);
    }

    #[test]
    fn test_hysteresis() {
        let params = Params::default();
        let mut state = cruising_from(150);

        select_row(&params, &mut state, 210, HEIGHT);
        assert_eq!(state.mode, LookaheadState::EnteringCurve);

        // Oscillating between the exit and enter thresholds stays in the curve
        for &b in &[160, 199, 150, 190, 155, 180] {
            select_row(&params, &mut state, b, HEIGHT);
            assert_eq!(state.mode, LookaheadState::InCurve, "left curve at {}", b);
        }

        // Below the exit threshold, back to cruising on the cruise row
        assert_eq!(select_row(&params, &mut state, 149, HEIGHT), 240);
        assert_eq!(state.mode, LookaheadState::Cruising);
    }

    #[test]
    fn test_deterministic() {
        let params = Params::default();

        for &mode in &[
            LookaheadState::Cruising,
            LookaheadState::EnteringCurve,
            LookaheadState::InCurve
        ] {
            for &b in &[50, 120, 180, 210, 260] {
                let init = SelectorState { mode, row: 230, prev_boundary: 190 };

                let mut a = init;
                let mut c = init;
                let row_a = select_row(&params, &mut a, b, HEIGHT);
                let row_c = select_row(&params, &mut c, b, HEIGHT);

                assert_eq!(row_a, row_c);
                assert_eq!(a, c);
                assert!(row_a < HEIGHT);
            }
        }
    }

    #[test]
    fn test_row_always_in_image() {
        let params = Params::default();

        // Cruise row beyond a tiny image
        let mut state = cruising_from(0);
        assert_eq!(select_row(&params, &mut state, 10, 100), 99);

        // Curve tracking a boundary at the very bottom
        let mut state = cruising_from(0);
        assert_eq!(select_row(&params, &mut state, 479, HEIGHT), 479);
    }
}
