//! Two-point scale calibration.

use crate::error::AnalysisError;

/// Validated image scale: source pixels per micron.
///
/// Produced by [`calibrate_two_point`] or wrapped directly via
/// [`ScaleCalibration::try_new`] when the caller already knows the ratio.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleCalibration {
    pixels_per_micron: f64,
}

impl ScaleCalibration {
    /// Wrap a known ratio. Fails with `InvalidCalibrationInput` unless the
    /// value is finite and positive.
    pub fn try_new(pixels_per_micron: f64) -> Result<Self, AnalysisError> {
        if !pixels_per_micron.is_finite() || pixels_per_micron <= 0.0 {
            return Err(AnalysisError::InvalidCalibrationInput {
                reason: format!(
                    "pixels-per-micron must be finite and positive, got {pixels_per_micron}"
                ),
            });
        }
        Ok(Self { pixels_per_micron })
    }

    pub fn pixels_per_micron(&self) -> f64 {
        self.pixels_per_micron
    }
}

/// Derive the scale from two picked points spanning a feature of known
/// physical length.
///
/// `p1` and `p2` are display-frame coordinates; `display_to_source_ratio` is
/// the factor by which the source image was scaled for display. The display
/// distance divided by that ratio is the source-pixel distance, and dividing
/// again by `known_length_microns` yields pixels-per-micron.
///
/// Fails with `InvalidCalibrationInput` when the known length or the
/// display/source ratio is not positive and finite, or when the points
/// coincide. Display and source pixels are different units, so a zero ratio
/// is rejected instead of being bridged by reading the display distance as a
/// source distance.
pub fn calibrate_two_point(
    p1: [f64; 2],
    p2: [f64; 2],
    display_to_source_ratio: f64,
    known_length_microns: f64,
) -> Result<ScaleCalibration, AnalysisError> {
    if !known_length_microns.is_finite() || known_length_microns <= 0.0 {
        return Err(AnalysisError::InvalidCalibrationInput {
            reason: format!(
                "known length must be finite and positive microns, got {known_length_microns}"
            ),
        });
    }
    if !display_to_source_ratio.is_finite() || display_to_source_ratio <= 0.0 {
        return Err(AnalysisError::InvalidCalibrationInput {
            reason: format!(
                "display-to-source ratio must be finite and positive, got {display_to_source_ratio}"
            ),
        });
    }

    let display_px = (p2[0] - p1[0]).hypot(p2[1] - p1[1]);
    if display_px <= 0.0 {
        return Err(AnalysisError::InvalidCalibrationInput {
            reason: "calibration points coincide; pick two distinct endpoints".into(),
        });
    }

    let source_px = display_px / display_to_source_ratio;
    ScaleCalibration::try_new(source_px / known_length_microns)
}
