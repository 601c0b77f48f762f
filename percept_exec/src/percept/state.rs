//! Implementations for the Percept state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{
    Params, PerceptError,
    BoundaryTracker,
    LookaheadState, SelectorState, select_row,
    WhiteRun, find_runs, longest_run};
use crate::binary_image::BinaryImage;
use comms_if::{traj::TrajPoint, tuning::TuningState};
use util::module::{State, TuningHandler};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Perception module state
#[derive(Default)]
pub struct Percept {
    pub(crate) params: Params,

    pub(crate) state: PerceptState,

    pub(crate) report: StatusReport,
}

/// State persisting between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerceptState {
    pub tracker: BoundaryTracker,
    pub selector: SelectorState,
}

/// Status report for perception processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Boundary estimate on this frame
    pub boundary: usize,

    /// Row which was segmented
    pub row: usize,

    /// Selector mode after this frame
    pub mode: LookaheadState,

    /// Number of runs found on the row
    pub num_runs: usize,

    /// The run chosen as the lane
    pub run: Option<WhiteRun>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Percept {
    /// Create a new instance with the given parameters, equivalent to calling `init` on a default
    /// instance.
    pub fn new(params: Params) -> Result<Self, PerceptError> {
        let mut percept = Self::default();
        percept.init(params)?;
        Ok(percept)
    }

    /// The state as of the last successful frame.
    pub fn state(&self) -> &PerceptState {
        &self.state
    }
}

impl State for Percept {
    type InitData = Params;
    type InitError = PerceptError;

    type InputData = BinaryImage;
    type OutputData = Option<TrajPoint>;
    type StatusReport = StatusReport;
    type ProcError = PerceptError;

    /// Initialise perception with the given parameters, clearing any previous state.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        if init_data.curve_exit_threshold >= init_data.curve_enter_threshold {
            return Err(PerceptError::InvalidParams(format!(
                "curve_exit_threshold ({}) must be less than curve_enter_threshold ({})",
                init_data.curve_exit_threshold,
                init_data.curve_enter_threshold
            )))
        }

        self.params = init_data;
        self.state = PerceptState::default();
        self.report = StatusReport::default();

        Ok(())
    }

    /// Process a single frame.
    ///
    /// Returns the target point, or `None` if no lane was found on the selected row. The
    /// persistent state is only advanced when a point is found, so a frame without a lane leaves
    /// the tracker and selector exactly as they were.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let image = input_data;

        if image.is_empty() {
            return Err(PerceptError::EmptyImage(image.width(), image.height()))
        }

        self.report = StatusReport::default();

        // Work on a copy, committed only on success
        let mut next = self.state;

        let boundary = next.tracker.update(image, self.params.boundary_step);
        let row = select_row(&self.params, &mut next.selector, boundary, image.height());

        let runs = find_runs(image.row(row), self.params.min_run_len);
        let run = longest_run(&runs);

        self.report.boundary = boundary;
        self.report.row = row;
        self.report.mode = next.selector.mode;
        self.report.num_runs = runs.len();
        self.report.run = run;

        trace!("Percept status: {:?}", self.report);

        let output = match run {
            Some(r) => {
                if next.selector.mode != self.state.selector.mode {
                    debug!(
                        "Lookahead {:?} -> {:?}",
                        self.state.selector.mode,
                        next.selector.mode
                    );
                }

                self.state = next;

                Some(TrajPoint {
                    x: r.midpoint() as u32,
                    y: row as u32
                })
            },
            None => None
        };

        Ok((output, self.report))
    }
}

impl TuningHandler for Percept {
    fn on_tuning_state(&mut self, state: &TuningState) {
        // Perception has no tunable values
        info!("Tuning state received ({} values), ignored by perception", state.values.len());
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// 640x480 frame with lane surface below `boundary` in the centre column and a band of lane
    /// between `left` and `right` on every row.
    fn frame(boundary: usize, left: usize, right: usize) -> BinaryImage {
        BinaryImage::from_fn(640, 480, |x, y| {
            if x == 320 {
                y > boundary
            }
            else {
                x >= left && x < right
            }
        })
    }

    #[test]
    fn test_straight() {
        let mut percept = Percept::new(Params::default()).unwrap();

        let (pt, report) = percept.proc(&frame(50, 100, 180)).unwrap();

        assert_eq!(report.boundary, 50);
        assert_eq!(report.row, 240);
        assert_eq!(report.mode, LookaheadState::Cruising);
        assert_eq!(pt, Some(TrajPoint { x: 140, y: 240 }));
    }

    #[test]
    fn test_no_lane_leaves_state() {
        let mut percept = Percept::new(Params::default()).unwrap();

        percept.proc(&frame(50, 100, 180)).unwrap();
        let before = *percept.state();

        // Nothing on the selected row
        let blank = BinaryImage::from_fn(640, 480, |x, y| x == 320 && y > 120);
        let (pt, report) = percept.proc(&blank).unwrap();

        assert_eq!(pt, None);
        assert_eq!(report.num_runs, 0);
        assert_eq!(*percept.state(), before);
    }

    #[test]
    fn test_cold_start_repeats_until_success() {
        let mut percept = Percept::new(Params::default()).unwrap();

        let blank = BinaryImage::from_fn(640, 480, |_, _| false);
        let (pt, _) = percept.proc(&blank).unwrap();
        assert_eq!(pt, None);
        assert_eq!(percept.state().tracker.estimate(), None);

        // Next frame still gets a full scan
        let (_, report) = percept.proc(&frame(80, 100, 180)).unwrap();
        assert_eq!(report.boundary, 80);
        assert_eq!(percept.state().tracker.estimate(), Some(80));
    }

    #[test]
    fn test_enters_curve() {
        let mut percept = Percept::new(Params::default()).unwrap();

        percept.proc(&frame(150, 100, 180)).unwrap();

        // Boundary creeps down towards the vehicle
        let mut report = StatusReport::default();
        for b in (152..=220).step_by(2) {
            let (pt, r) = percept.proc(&frame(b, 100, 180)).unwrap();
            assert!(pt.is_some());
            report = r;
        }

        assert_eq!(report.mode, LookaheadState::InCurve);
    }

    #[test]
    fn test_empty_image() {
        let mut percept = Percept::new(Params::default()).unwrap();
        let empty = BinaryImage::from_fn(0, 0, |_, _| true);

        assert!(matches!(percept.proc(&empty), Err(PerceptError::EmptyImage(0, 0))));
    }

    #[test]
    fn test_invalid_thresholds() {
        let params = Params {
            curve_enter_threshold: 150,
            curve_exit_threshold: 150,
            ..Params::default()
        };

        assert!(matches!(Percept::new(params), Err(PerceptError::InvalidParams(_))));
    }
}
