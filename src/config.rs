//! Tunable constants for gestures, animations and playback.

use std::f64::consts::FRAC_PI_4;
use std::time::Duration;

/// Engine configuration.
///
/// Defaults reproduce the feel of the interactive visualizer; the CLI overrides
/// a few of them from flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Minimum accumulated drag angle (radians) that snaps to a quarter turn
    /// on release. Anything smaller cancels.
    pub snap_threshold: f64,
    /// Radians of rotation per pixel of cumulative pointer travel.
    pub drag_sensitivity: f64,
    /// Extra damping applied to every drag increment.
    pub drag_gain: f64,
    /// Drags shorter than this (world units, on the drag plane) are ignored.
    pub min_drag_length: f64,
    /// Duration of the snap or cancel animation after a drag is released.
    pub settle_duration: Duration,
    /// Duration of a discrete button turn.
    pub turn_duration: Duration,
    /// Extra animation time added to each solver replay turn.
    pub replay_extra_duration: Duration,
    /// Number of random moves in a scramble.
    pub scramble_length: usize,
    /// Delay between scramble steps.
    pub scramble_step_delay: Duration,
    /// Delay between solve replay steps.
    pub solve_step_delay: Duration,
    /// Longest solution the solver may return. `None` leaves it to the solver.
    pub solve_max_depth: Option<usize>,
    /// Distance between neighbouring cubie centers in world units.
    pub cubie_pitch: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snap_threshold: FRAC_PI_4,
            drag_sensitivity: 0.01,
            drag_gain: 0.69,
            min_drag_length: 0.05,
            settle_duration: Duration::from_millis(200),
            turn_duration: Duration::from_millis(100),
            replay_extra_duration: Duration::from_millis(100),
            scramble_length: 10,
            scramble_step_delay: Duration::from_millis(600),
            solve_step_delay: Duration::from_millis(300),
            solve_max_depth: None,
            // cubie size 0.2 plus a 0.01 gap
            cubie_pitch: 0.21,
        }
    }
}

impl Config {
    /// Returns a copy with every delay and animation shortened to zero.
    ///
    /// Used by the CLI's `--instant` flag and by tests.
    pub fn instant(mut self) -> Self {
        self.settle_duration = Duration::ZERO;
        self.turn_duration = Duration::ZERO;
        self.replay_extra_duration = Duration::ZERO;
        self.scramble_step_delay = Duration::ZERO;
        self.solve_step_delay = Duration::ZERO;
        self
    }
}
