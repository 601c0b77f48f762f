//! # Perception Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{frame_source::FrameSourceParams, percept, preproc::PreprocParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the perception executable, loaded from `percept_exec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PerceptExecParams {
    /// Minimum log level, e.g. `"info"` or `"debug"`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Time allowed to process a single frame. Longer frames are reported.
    ///
    /// Units: seconds
    #[serde(default = "default_frame_budget_s")]
    pub frame_budget_s: f64,

    #[serde(default)]
    pub frame_source: FrameSourceParams,

    #[serde(default)]
    pub preproc: PreprocParams,

    #[serde(default)]
    pub percept: percept::Params,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".into()
}

fn default_frame_budget_s() -> f64 {
    0.05
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params: PerceptExecParams = util::params::from_str("").unwrap();

        assert_eq!(params.log_level, "info");
        assert_eq!(params.frame_source, FrameSourceParams::Stream);
        assert_eq!(params.preproc, PreprocParams::default());
        assert_eq!(params.percept, percept::Params::default());
    }

    #[test]
    fn test_partial_override() {
        let params: PerceptExecParams = util::params::from_str(r#"
            log_level = "debug"

            [preproc]
            threshold = 120

            [percept]
            cruise_row = 200
            curve_enter_threshold = 190
        "#).unwrap();

        assert_eq!(params.preproc.threshold, Some(120));
        assert_eq!(params.preproc.close_kernel_size, 5);
        assert_eq!(params.percept.cruise_row, 200);
        assert_eq!(params.percept.curve_enter_threshold, 190);
        assert_eq!(params.percept.curve_exit_threshold, 150);
    }
}
