//! Tunable engine parameters.
//!
//! Every constant the pipeline depends on lives here rather than inline in
//! the stage code; the [`Default`] impls pin the published values, so a
//! default-constructed config reproduces the standard analysis.

/// Parameters for the boundary-extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// CLAHE clip limit, relative to a uniform histogram: caps how much any
    /// single intensity bin may be amplified within a tile.
    pub clahe_clip_limit: f32,
    /// CLAHE tile grid as [columns, rows].
    pub clahe_tile_grid: [u32; 2],
    /// Gaussian blur kernel size (odd).
    pub blur_kernel_size: u32,
    /// Adaptive-threshold neighborhood size (odd).
    pub threshold_block_size: u32,
    /// Constant subtracted from the Gaussian-weighted local mean before the
    /// darker-than-neighborhood comparison.
    pub threshold_c: i32,
    /// Structuring-element size for the morphological opening.
    pub open_kernel_size: u32,
    /// Number of opening passes.
    pub open_iterations: u32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 2.5,
            clahe_tile_grid: [8, 8],
            blur_kernel_size: 5,
            threshold_block_size: 11,
            threshold_c: 2,
            open_kernel_size: 2,
            open_iterations: 1,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

/// Parameters for circular-intercept sampling.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Number of sampling circles per run.
    pub circle_count: usize,
    /// Circle radius as a fraction of min(width, height).
    pub radius_frac: f64,
    /// Maximum center jitter as a fraction of image width (x) and
    /// height (y).
    pub jitter_frac: f64,
    /// Fixed seed for circle placement. `None` draws placement from system
    /// entropy; repeated unseeded runs on the same image legitimately
    /// produce different intercept counts. That spread is sampling error
    /// proper to the intercept method, not a defect.
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            circle_count: 5,
            radius_frac: 0.35,
            jitter_frac: 0.10,
            seed: None,
        }
    }
}

/// Colors and stroke sizes for the annotated overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// RGB color of the sampling-circle outlines.
    pub circle_color: [u8; 3],
    /// Outline stroke width in pixels.
    pub circle_thickness: u32,
    /// RGB color of the filled intercept markers.
    pub marker_color: [u8; 3],
    /// Radius of the filled intercept markers in pixels.
    pub marker_radius: i32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            circle_color: [255, 0, 0],
            circle_thickness: 2,
            marker_color: [0, 255, 255],
            marker_radius: 3,
        }
    }
}

/// Top-level engine configuration aggregating the per-stage parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub boundary: BoundaryConfig,
    pub sampling: SamplingConfig,
    pub overlay: OverlayStyle,
}
