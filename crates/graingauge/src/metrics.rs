//! Grain-size statistics and derived mechanical properties.

use crate::calibrate::ScaleCalibration;
use crate::error::AnalysisError;
use crate::intercept::InterceptSampling;
use crate::material::MaterialProperties;

/// Metrics derived from one sampling run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GrainMetrics {
    /// Total boundary crossings across all sampling circles.
    pub intercept_count: usize,
    /// Summed circumference of all sampling circles in pixels.
    pub total_circumference_px: f64,
    /// Mean lineal intercept in source pixels.
    pub mean_intercept_px: f64,
    /// Mean lineal intercept in microns.
    pub mean_lineal_intercept_um: f64,
    /// Mean grain diameter in millimeters.
    pub grain_diameter_mm: f64,
    /// ASTM E112 grain-size number G.
    pub astm_grain_number: f64,
    /// Hall-Petch yield-strength estimate in MPa.
    pub yield_strength_mpa: f64,
    /// Material constants the strength estimate was computed with.
    pub material: MaterialProperties,
}

/// ASTM E112 grain-size number from the mean lineal intercept in microns.
///
/// `G = -6.643856 * log10(d_mm) - 3.288` with the intercept converted to
/// millimeters; finer grains score higher. A non-positive intercept has no
/// grain-size number and maps to the 0.0 sentinel.
pub fn astm_grain_number(mean_lineal_intercept_um: f64) -> f64 {
    if mean_lineal_intercept_um <= 0.0 {
        return 0.0;
    }
    let diameter_mm = mean_lineal_intercept_um / 1000.0;
    -6.643856 * diameter_mm.log10() - 3.288
}

/// Hall-Petch yield-strength estimate in MPa.
///
/// `σ = σ0 + k / sqrt(d)` with the grain diameter in millimeters. A
/// non-positive diameter maps to the 0.0 sentinel.
pub fn hall_petch_yield(grain_diameter_mm: f64, material: &MaterialProperties) -> f64 {
    if grain_diameter_mm <= 0.0 {
        return 0.0;
    }
    material.friction_stress_mpa + material.locking_parameter / grain_diameter_mm.sqrt()
}

/// Reduce a sampling run to grain-size metrics for one material.
///
/// The mean lineal intercept is the summed circle circumference divided by
/// the total crossing count; a run with zero crossings has no mean and is
/// rejected rather than divided through.
pub fn compute_metrics(
    sampling: &InterceptSampling,
    calibration: ScaleCalibration,
    material: &MaterialProperties,
) -> Result<GrainMetrics, AnalysisError> {
    if sampling.intercept_count == 0 {
        return Err(AnalysisError::DivisionByZero {
            quantity: "mean intercept length",
        });
    }

    let mean_intercept_px = sampling.total_circumference_px / sampling.intercept_count as f64;
    let mean_lineal_intercept_um = mean_intercept_px / calibration.pixels_per_micron();
    let grain_diameter_mm = mean_lineal_intercept_um / 1000.0;

    let metrics = GrainMetrics {
        intercept_count: sampling.intercept_count,
        total_circumference_px: sampling.total_circumference_px,
        mean_intercept_px,
        mean_lineal_intercept_um,
        grain_diameter_mm,
        astm_grain_number: astm_grain_number(mean_lineal_intercept_um),
        yield_strength_mpa: hall_petch_yield(grain_diameter_mm, material),
        material: material.clone(),
    };
    tracing::debug!(
        intercepts = metrics.intercept_count,
        mean_um = metrics.mean_lineal_intercept_um,
        astm_g = metrics.astm_grain_number,
        "grain metrics computed"
    );
    Ok(metrics)
}
