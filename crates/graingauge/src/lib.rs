//! graingauge — grain-size measurement for optical micrographs.
//!
//! Implements the ASTM E112 circular-intercept (Heyn) procedure on etched
//! metallographic images. The pipeline stages are:
//!
//! 1. **Boundary** – grayscale conversion, tile-based histogram
//!    equalization, Gaussian blur, adaptive inverse threshold, morphological
//!    opening, Canny edges, and the union of opened+edges as the boundary
//!    mask.
//! 2. **Sampling** – randomized circles jittered around the image center,
//!    intersected with the mask; each 8-connected crossing counts as one
//!    intercept.
//! 3. **Metrics** – mean lineal intercept, ASTM grain-size number G, and a
//!    Hall-Petch yield-strength estimate for a chosen material.
//! 4. **Overlay** – annotated render of the sampling circles and crossings
//!    on the source image.
//!
//! # Public API
//! The stable surface is intentionally small:
//! - [`GrainAnalyzer`] as the primary entry point
//! - [`AnalyzerConfig`] for tuning, [`MaterialTable`] for Hall-Petch
//!   constants
//! - [`calibrate_two_point`] / [`ScaleCalibration`] for image scale
//! - stage functions ([`extract_boundary_stages`], [`sample_intercepts`],
//!   [`compute_metrics`], [`render_overlay`]) for callers composing the
//!   pipeline themselves
//!
//! Filtering, equalization and morphology internals are not part of the
//! public surface.

mod analyzer;
mod boundary;
mod calibrate;
mod config;
mod contrast;
mod error;
mod filter;
mod intercept;
mod material;
mod metrics;
mod morphology;
mod overlay;
#[cfg(test)]
mod test_utils;

pub use analyzer::{
    AnalysisOutcome, AnalysisReport, GrainAnalyzer, analyze_image, analyze_with_mask,
};
pub use boundary::{BoundaryStages, extract_boundaries, extract_boundary_stages};
pub use calibrate::{ScaleCalibration, calibrate_two_point};
pub use config::{AnalyzerConfig, BoundaryConfig, OverlayStyle, SamplingConfig};
pub use error::AnalysisError;
pub use intercept::{InterceptSampling, SamplingCircle, sample_intercepts};
pub use material::{MaterialProperties, MaterialTable};
pub use metrics::{GrainMetrics, astm_grain_number, compute_metrics, hall_petch_yield};
pub use overlay::render_overlay;
