//! Typed failures surfaced by the measurement engine.

/// Errors produced by calibration, material lookup, sampling, and metric
/// computation.
///
/// Every variant carries enough context to render a user-facing message.
/// None are retried automatically: grain counting is sampling-based, so a
/// failed run should prompt the caller to change preprocessing or supply a
/// higher-contrast image, not to retry blindly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// Calibration inputs failed validation: non-positive or non-finite
    /// known length, display/source ratio, or derived pixels-per-micron.
    #[error("invalid calibration input: {reason}")]
    InvalidCalibrationInput { reason: String },

    /// The requested material key is absent from the table.
    #[error("unknown material {name:?}")]
    UnknownMaterial { name: String },

    /// No grain boundary crossed any sampling circle; terminal for the run.
    #[error(
        "no grain boundaries intersected any of the {circles_sampled} sampling circles; \
         the micrograph may be too low-contrast"
    )]
    NoBoundariesDetected { circles_sampled: usize },

    /// Guard on divisions that upstream checks should have made impossible.
    #[error("division by zero while computing {quantity}")]
    DivisionByZero { quantity: &'static str },
}
