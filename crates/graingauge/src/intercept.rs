//! Circular-intercept sampling over a boundary mask.

use std::f64::consts::PI;

use image::{GrayImage, Luma};
use imageproc::drawing::draw_hollow_circle_mut;
use imageproc::region_labelling::{Connectivity, connected_components};
use rand::Rng;

use crate::config::SamplingConfig;

/// One sampling circle and what it found.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SamplingCircle {
    /// Center in source-image pixels.
    pub center: [i32; 2],
    /// Radius in pixels; identical for every circle of one run.
    pub radius: i32,
    /// Boundary crossings counted on this circle.
    pub intercepts: usize,
    /// The jittered placement would have left the image, so the circle fell
    /// back to the exact image center.
    pub recentered: bool,
}

/// Aggregated sampling outcome for one run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterceptSampling {
    /// Per-circle diagnostics.
    pub circles: Vec<SamplingCircle>,
    /// Total boundary crossings across all circles.
    pub intercept_count: usize,
    /// Sum of `2*pi*radius` over all circles, crossings or not.
    pub total_circumference_px: f64,
    /// Crossing centroids in source-image pixels, for overlay markers.
    pub intercept_centroids: Vec<[f64; 2]>,
}

/// Intersect randomized sampling circles with a boundary mask and count the
/// crossings.
///
/// The radius is `radius_frac * min(width, height)` truncated to whole
/// pixels and shared by every circle. Each center jitters the image center
/// by integer offsets drawn inclusively within ±`jitter_frac` of the
/// matching dimension; a placement whose circle would leave the image is
/// replaced by the exact image center, radius unchanged. The circle's 1-px
/// ring is intersected with the mask and every 8-connected foreground
/// component counts as one crossing.
///
/// Placement is the engine's only randomness: a seeded `rng` reproduces a
/// run exactly, while unseeded runs are allowed to disagree on the final
/// count. A run that crosses nothing reports a zero count; deciding that
/// zero is a failure is the caller's job.
pub fn sample_intercepts<R: Rng + ?Sized>(
    mask: &GrayImage,
    config: &SamplingConfig,
    rng: &mut R,
) -> InterceptSampling {
    let (width, height) = mask.dimensions();
    let radius = (f64::from(width.min(height)) * config.radius_frac) as i32;
    let center_x = (width / 2) as i32;
    let center_y = (height / 2) as i32;
    let jitter_x = (f64::from(width) * config.jitter_frac) as i32;
    let jitter_y = (f64::from(height) * config.jitter_frac) as i32;

    let mut circles = Vec::with_capacity(config.circle_count);
    let mut intercept_centroids = Vec::new();
    let mut intercept_count = 0usize;
    let mut total_circumference_px = 0.0f64;

    for _ in 0..config.circle_count {
        let mut cx = center_x + rng.gen_range(-jitter_x..=jitter_x);
        let mut cy = center_y + rng.gen_range(-jitter_y..=jitter_y);
        let mut recentered = false;
        if cx - radius < 0
            || cx + radius >= width as i32
            || cy - radius < 0
            || cy + radius >= height as i32
        {
            cx = center_x;
            cy = center_y;
            recentered = true;
        }

        let crossings = ring_crossings(mask, cx, cy, radius);
        intercept_count += crossings.len();
        total_circumference_px += 2.0 * PI * f64::from(radius);
        circles.push(SamplingCircle {
            center: [cx, cy],
            radius,
            intercepts: crossings.len(),
            recentered,
        });
        intercept_centroids.extend(crossings);
    }

    tracing::debug!(
        circles = circles.len(),
        intercepts = intercept_count,
        radius,
        "circular intercept sampling finished"
    );

    InterceptSampling {
        circles,
        intercept_count,
        total_circumference_px,
        intercept_centroids,
    }
}

/// Centroids of the 8-connected components of `ring AND mask`.
fn ring_crossings(mask: &GrayImage, cx: i32, cy: i32, radius: i32) -> Vec<[f64; 2]> {
    let (width, height) = mask.dimensions();
    let mut ring = GrayImage::new(width, height);
    draw_hollow_circle_mut(&mut ring, (cx, cy), radius, Luma([255u8]));
    for (ring_px, mask_px) in ring.pixels_mut().zip(mask.pixels()) {
        if mask_px[0] == 0 {
            ring_px.0[0] = 0;
        }
    }

    let labeled = connected_components(&ring, Connectivity::Eight, Luma([0u8]));
    let mut sums: Vec<(f64, f64, u32)> = Vec::new();
    for (x, y, px) in labeled.enumerate_pixels() {
        let label = px[0] as usize;
        if label == 0 {
            continue;
        }
        if label > sums.len() {
            sums.resize(label, (0.0, 0.0, 0));
        }
        let entry = &mut sums[label - 1];
        entry.0 += f64::from(x);
        entry.1 += f64::from(y);
        entry.2 += 1;
    }

    sums.iter()
        .filter(|&&(_, _, n)| n > 0)
        .map(|&(sx, sy, n)| [sx / f64::from(n), sy / f64::from(n)])
        .collect()
}
