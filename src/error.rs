use thiserror::Error;

/// Error produced by the cube engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CubeError {
    /// Move token does not start with a known layer letter, or carries an
    /// unknown suffix.
    #[error("invalid move notation: {token:?}")]
    InvalidNotation {
        /// The offending token.
        token: String,
    },
    /// A discrete commit received an angle that is not a multiple of a
    /// quarter turn.
    ///
    /// Continuous angles belong to the presentation layer and must never reach
    /// the state store, so this always indicates a bug in the caller.
    #[error("rotation angle {angle} is not a multiple of a quarter turn")]
    IllegalRotationAngle {
        /// Angle in radians.
        angle: f64,
    },
    /// Replaying the solver's answer did not leave the cube solved.
    #[error("solution replay left the cube unsolved after {applied} moves")]
    SolveVerificationFailed {
        /// Number of quarter-turn steps that were replayed.
        applied: usize,
    },
    /// The solver worker is gone or never acknowledged initialization.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),
    /// The solver received the request but could not answer it.
    #[error("solver failed: {0}")]
    SolverFailed(String),
}
