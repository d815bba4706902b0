//! High-level analysis API.
//!
//! [`GrainAnalyzer`] is the primary entry point for measuring grain size.
//! It wraps an [`AnalyzerConfig`] and a [`MaterialTable`] and provides
//! convenience methods for the common run shapes (named material, caller
//! RNG). The free functions underneath are public so callers that need the
//! intermediate boundary stages can compose the pipeline themselves.

use image::{GrayImage, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::boundary::extract_boundary_stages;
use crate::calibrate::ScaleCalibration;
use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::intercept::{InterceptSampling, sample_intercepts};
use crate::material::{MaterialProperties, MaterialTable};
use crate::metrics::{GrainMetrics, compute_metrics};
use crate::overlay::render_overlay;

/// Serializable record of one analysis run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisReport {
    /// Source image size as `[width, height]`.
    pub image_size: [u32; 2],
    /// Scale the run was calibrated with.
    pub pixels_per_micron: f64,
    /// Sampling-circle placement and per-circle crossing counts.
    pub sampling: InterceptSampling,
    /// Derived grain metrics.
    pub metrics: GrainMetrics,
}

/// Full outcome of one run: the report plus the annotated overlay.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    /// Source image with sampling circles and intercept markers drawn in.
    pub overlay: RgbImage,
}

/// Run the full measurement pipeline on one micrograph.
///
/// Boundary extraction, circular-intercept sampling, metric reduction and
/// overlay rendering, in that order.
pub fn analyze_image<R: Rng + ?Sized>(
    image: &RgbImage,
    calibration: ScaleCalibration,
    material: &MaterialProperties,
    config: &AnalyzerConfig,
    rng: &mut R,
) -> Result<AnalysisOutcome, AnalysisError> {
    let (width, height) = image.dimensions();
    tracing::info!(width, height, material = %material.name, "analysis started");
    let stages = extract_boundary_stages(image, &config.boundary);
    analyze_with_mask(image, &stages.mask, calibration, material, config, rng)
}

/// Run sampling and metric reduction on an already-extracted boundary mask.
///
/// Split out from [`analyze_image`] so callers that keep the intermediate
/// [`crate::BoundaryStages`] around (debug dumps, stage inspection) do not
/// extract the mask twice. Fails with
/// [`AnalysisError::NoBoundariesDetected`] when no circle crosses any
/// boundary.
pub fn analyze_with_mask<R: Rng + ?Sized>(
    image: &RgbImage,
    mask: &GrayImage,
    calibration: ScaleCalibration,
    material: &MaterialProperties,
    config: &AnalyzerConfig,
    rng: &mut R,
) -> Result<AnalysisOutcome, AnalysisError> {
    let sampling = sample_intercepts(mask, &config.sampling, rng);
    if sampling.intercept_count == 0 {
        tracing::warn!(
            circles = sampling.circles.len(),
            "no boundary crossings; mask may be empty or circles badly placed"
        );
        return Err(AnalysisError::NoBoundariesDetected {
            circles_sampled: sampling.circles.len(),
        });
    }

    let metrics = compute_metrics(&sampling, calibration, material)?;
    let overlay = render_overlay(image, &sampling, &config.overlay);
    tracing::info!(
        intercepts = metrics.intercept_count,
        astm_g = metrics.astm_grain_number,
        yield_mpa = metrics.yield_strength_mpa,
        "analysis finished"
    );

    Ok(AnalysisOutcome {
        report: AnalysisReport {
            image_size: [image.width(), image.height()],
            pixels_per_micron: calibration.pixels_per_micron(),
            sampling,
            metrics,
        },
        overlay,
    })
}

/// Primary analysis interface.
///
/// Encapsulates the engine configuration and the material table.
/// Create once, analyze many micrographs.
///
/// # Examples
///
/// ```no_run
/// use graingauge::{GrainAnalyzer, ScaleCalibration};
///
/// let analyzer = GrainAnalyzer::new();
/// let image = image::open("micrograph.png").unwrap().to_rgb8();
/// let scale = ScaleCalibration::try_new(12.5).unwrap();
/// let outcome = analyzer
///     .analyze(&image, scale, "Steel (Low Carbon)")
///     .unwrap();
/// println!("ASTM G = {:.2}", outcome.report.metrics.astm_grain_number);
/// ```
pub struct GrainAnalyzer {
    config: AnalyzerConfig,
    materials: MaterialTable,
}

impl GrainAnalyzer {
    /// Analyzer with the default configuration and the built-in materials.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Analyzer with full config control and the built-in materials.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            materials: MaterialTable::builtin(),
        }
    }

    /// Access the current configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut AnalyzerConfig {
        &mut self.config
    }

    /// Access the material table.
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Mutable access to the material table for custom alloys.
    pub fn materials_mut(&mut self) -> &mut MaterialTable {
        &mut self.materials
    }

    /// Analyze one micrograph against a named material.
    ///
    /// Circle placement seeds from `config.sampling.seed` when set and from
    /// system entropy otherwise.
    pub fn analyze(
        &self,
        image: &RgbImage,
        calibration: ScaleCalibration,
        material_name: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let mut rng = match self.config.sampling.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.analyze_with_rng(image, calibration, material_name, &mut rng)
    }

    /// Analyze with a caller-supplied random source, ignoring the config
    /// seed.
    pub fn analyze_with_rng<R: Rng + ?Sized>(
        &self,
        image: &RgbImage,
        calibration: ScaleCalibration,
        material_name: &str,
        rng: &mut R,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let material = self.materials.get(material_name)?;
        analyze_image(image, calibration, material, &self.config, rng)
    }
}

impl Default for GrainAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
