//! # Shared tuning
//!
//! Gains and throttle speed are adjusted by the operator from the keyboard thread while the
//! control loop reads them every cycle. Both sides go through [`SharedTuning`]: the writer applies
//! and clamps a whole update under the lock, the reader copies a complete snapshot under the same
//! lock, so a cycle never sees half of an update.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Highest throttle speed the operator can set.
pub const MAX_THROTTLE_SPEED: f64 = 0.5;

/// Highest value of the operator adjustable gains.
pub const MAX_GAIN: f64 = 1.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The live tuning values of the steering controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningParameters {
    /// Proportional gain
    pub kp: f64,

    /// Integral gain
    pub ki: f64,

    /// Derivative gain
    pub kd: f64,

    /// Throttle demand sent to both sides, between 0 and [`MAX_THROTTLE_SPEED`]
    pub throttle_speed: f64,
}

/// Step applied by each tuning command.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TuningIncrements {
    pub speed: f64,
    pub kp: f64,
    pub kd: f64,
}

/// Handle to the tuning values shared between the control loop and the keyboard thread.
#[derive(Debug, Clone)]
pub struct SharedTuning {
    inner: Arc<Mutex<TuningParameters>>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An operator adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningCommand {
    SpeedUp,
    SpeedDown,
    KpUp,
    KpDown,
    KdUp,
    KdDown,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            kp: 0.003,
            ki: 0.0,
            kd: 0.0,
            throttle_speed: 0.2,
        }
    }
}

impl TuningParameters {
    /// Clamp the operator adjustable values into their allowed ranges.
    pub fn clamped(self) -> Self {
        Self {
            kp: self.kp.max(0.0).min(MAX_GAIN),
            kd: self.kd.max(0.0).min(MAX_GAIN),
            throttle_speed: self.throttle_speed.max(0.0).min(MAX_THROTTLE_SPEED),
            ..self
        }
    }

    /// Apply a command, returning the clamped result.
    pub fn apply(self, cmd: TuningCommand, inc: &TuningIncrements) -> Self {
        let mut next = self;

        match cmd {
            TuningCommand::SpeedUp => next.throttle_speed += inc.speed,
            TuningCommand::SpeedDown => next.throttle_speed -= inc.speed,
            TuningCommand::KpUp => next.kp += inc.kp,
            TuningCommand::KpDown => next.kp -= inc.kp,
            TuningCommand::KdUp => next.kd += inc.kd,
            TuningCommand::KdDown => next.kd -= inc.kd,
        }

        next.clamped()
    }
}

impl Default for TuningIncrements {
    fn default() -> Self {
        Self {
            speed: 0.05,
            kp: 0.00005,
            kd: 0.0001,
        }
    }
}

impl SharedTuning {
    /// Create a new handle, the initial values are clamped.
    pub fn new(initial: TuningParameters) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial.clamped()))
        }
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> TuningParameters {
        *self.lock()
    }

    /// Apply a command and return the new values.
    pub fn apply(&self, cmd: TuningCommand, inc: &TuningIncrements) -> TuningParameters {
        let mut params = self.lock();
        *params = params.apply(cmd, inc);
        *params
    }

    /// Replace all values at once, clamping them.
    pub fn set(&self, params: TuningParameters) -> TuningParameters {
        let mut current = self.lock();
        *current = params.clamped();
        *current
    }

    fn lock(&self) -> MutexGuard<'_, TuningParameters> {
        // Plain data, a poisoned lock still holds a valid set of values
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_kp_ceiling() {
        let tuning = SharedTuning::new(TuningParameters::default());
        let inc = TuningIncrements::default();

        for _ in 0..25_000 {
            let p = tuning.apply(TuningCommand::KpUp, &inc);
            assert!(p.kp <= 1.0);
        }

        assert_eq!(tuning.snapshot().kp, 1.0);
    }

    #[test]
    fn test_speed_limits() {
        let tuning = SharedTuning::new(TuningParameters::default());
        let inc = TuningIncrements::default();

        for _ in 0..20 {
            tuning.apply(TuningCommand::SpeedUp, &inc);
        }
        assert_eq!(tuning.snapshot().throttle_speed, MAX_THROTTLE_SPEED);

        for _ in 0..20 {
            tuning.apply(TuningCommand::SpeedDown, &inc);
        }
        assert_eq!(tuning.snapshot().throttle_speed, 0.0);
    }

    #[test]
    fn test_kd_floor() {
        let tuning = SharedTuning::new(TuningParameters {
            kd: 0.00015,
            ..TuningParameters::default()
        });
        let inc = TuningIncrements::default();

        let p = tuning.apply(TuningCommand::KdDown, &inc);
        assert!((p.kd - 0.00005).abs() < 1e-12);

        let p = tuning.apply(TuningCommand::KdDown, &inc);
        assert_eq!(p.kd, 0.0);

        // Other values untouched
        assert_eq!(p.kp, TuningParameters::default().kp);
        assert_eq!(p.throttle_speed, TuningParameters::default().throttle_speed);
    }

    #[test]
    fn test_initial_values_clamped() {
        let tuning = SharedTuning::new(TuningParameters {
            kp: 3.0,
            ki: 0.5,
            kd: -1.0,
            throttle_speed: 0.9
        });

        assert_eq!(tuning.snapshot(), TuningParameters {
            kp: 1.0,
            ki: 0.5,
            kd: 0.0,
            throttle_speed: 0.5
        });
    }

    #[test]
    fn test_snapshots_are_consistent() {
        // The writer keeps kp and kd equal, a reader must never see them differ
        let tuning = SharedTuning::new(TuningParameters {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            throttle_speed: 0.2
        });
        let inc = TuningIncrements { speed: 0.05, kp: 0.0001, kd: 0.0001 };

        let writer = {
            let tuning = tuning.clone();
            thread::spawn(move || {
                for _ in 0..2000 {
                    let mut p = tuning.snapshot();
                    p = p.apply(TuningCommand::KpUp, &inc).apply(TuningCommand::KdUp, &inc);
                    tuning.set(p);
                }
            })
        };

        for _ in 0..2000 {
            let p = tuning.snapshot();
            assert_eq!(p.kp, p.kd);
        }

        writer.join().unwrap();
    }
}
