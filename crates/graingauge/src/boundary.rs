//! Boundary extraction: color micrograph in, binary grain-boundary mask out.

use image::{GrayImage, RgbImage};
use imageproc::edges::canny;

use crate::config::BoundaryConfig;
use crate::contrast::clahe;
use crate::filter::{BorderMode, adaptive_threshold_inv, gaussian_blur, luminance};
use crate::morphology::open;

/// Every intermediate of the extraction pipeline, for inspection and debug
/// dumps. `mask` is the final product.
#[derive(Debug, Clone)]
pub struct BoundaryStages {
    /// Rec.601 luminance of the input.
    pub gray: GrayImage,
    /// After contrast-limited adaptive equalization.
    pub equalized: GrayImage,
    /// After Gaussian smoothing.
    pub blurred: GrayImage,
    /// Inverted adaptive threshold of the blurred image.
    pub thresholded: GrayImage,
    /// Threshold mask after morphological opening.
    pub opened: GrayImage,
    /// Canny edges of the blurred image.
    pub edges: GrayImage,
    /// Final boundary mask: `opened` OR `edges`.
    pub mask: GrayImage,
}

/// Run the extraction pipeline keeping every intermediate.
pub fn extract_boundary_stages(image: &RgbImage, config: &BoundaryConfig) -> BoundaryStages {
    let gray = luminance(image);
    let equalized = clahe(&gray, config.clahe_clip_limit, config.clahe_tile_grid);
    let blurred = gaussian_blur(&equalized, config.blur_kernel_size, BorderMode::Reflect101);
    let thresholded =
        adaptive_threshold_inv(&blurred, config.threshold_block_size, config.threshold_c);
    let opened = open(&thresholded, config.open_kernel_size, config.open_iterations);
    let edges = canny(&blurred, config.canny_low, config.canny_high);
    let mask = combine_or(&opened, &edges);

    tracing::debug!(
        width = mask.width(),
        height = mask.height(),
        foreground = mask.pixels().filter(|p| p[0] != 0).count(),
        "boundary mask extracted"
    );

    BoundaryStages {
        gray,
        equalized,
        blurred,
        thresholded,
        opened,
        edges,
        mask,
    }
}

/// Extract the binary grain-boundary mask for a micrograph.
///
/// Deterministic in its input; the mask always has the input's dimensions,
/// and any image of at least 1x1 produces one (a degenerate mask is valid
/// and handled downstream). The darker-than-neighborhood threshold path
/// recovers faint etch lines, the edge path recovers sharp transitions, and
/// the mask is their union.
pub fn extract_boundaries(image: &RgbImage, config: &BoundaryConfig) -> GrayImage {
    extract_boundary_stages(image, config).mask
}

fn combine_or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let mut out = a.clone();
    for (dst, src) in out.pixels_mut().zip(b.pixels()) {
        if src[0] != 0 {
            dst.0[0] = 255;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::draw_grain_micrograph;

    #[test]
    fn mask_dimensions_match_input() {
        let config = BoundaryConfig::default();
        for (w, h) in [(1, 1), (3, 5), (64, 48), (127, 33)] {
            let img = RgbImage::from_pixel(w, h, image::Rgb([180, 180, 180]));
            let mask = extract_boundaries(&img, &config);
            assert_eq!(mask.dimensions(), (w, h), "{w}x{h}");
        }
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = draw_grain_micrograph(96, 96, 24);
        let config = BoundaryConfig::default();
        let first = extract_boundaries(&img, &config);
        let second = extract_boundaries(&img, &config);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn grain_boundaries_land_in_the_mask() {
        let img = draw_grain_micrograph(128, 128, 32);
        let mask = extract_boundaries(&img, &BoundaryConfig::default());

        // The vertical boundary at x = 64 should be hit on nearly every row.
        let rows_hit = (0..128u32)
            .filter(|&y| (62..=66).any(|x| mask.get_pixel(x, y)[0] != 0))
            .count();
        assert!(
            rows_hit > 110,
            "boundary column missed on {} rows",
            128 - rows_hit
        );

        // Grain interiors stay mostly clean.
        let interior: usize = (8..24)
            .flat_map(|y| (8..24).map(move |x| (x, y)))
            .filter(|&(x, y)| mask.get_pixel(x, y)[0] != 0)
            .count();
        assert!(interior < 8, "interior speckle too dense: {interior}");
    }

    #[test]
    fn mask_is_the_union_of_opened_and_edges() {
        let img = draw_grain_micrograph(96, 96, 24);
        let stages = extract_boundary_stages(&img, &BoundaryConfig::default());
        for (x, y, px) in stages.mask.enumerate_pixels() {
            let expected =
                stages.opened.get_pixel(x, y)[0] != 0 || stages.edges.get_pixel(x, y)[0] != 0;
            assert_eq!(px[0] != 0, expected, "disagreement at ({x}, {y})");
        }
    }

    #[test]
    fn all_stages_share_the_input_dimensions() {
        let img = draw_grain_micrograph(80, 56, 20);
        let stages = extract_boundary_stages(&img, &BoundaryConfig::default());
        for (name, stage) in [
            ("gray", &stages.gray),
            ("equalized", &stages.equalized),
            ("blurred", &stages.blurred),
            ("thresholded", &stages.thresholded),
            ("opened", &stages.opened),
            ("edges", &stages.edges),
            ("mask", &stages.mask),
        ] {
            assert_eq!(stage.dimensions(), (80, 56), "{name}");
        }
    }

    #[test]
    fn thin_faint_lines_survive_into_the_mask() {
        // A one-pixel-wide, low-contrast boundary line: the kind the dual
        // threshold/edge path exists to keep.
        let mut img = RgbImage::from_pixel(256, 256, image::Rgb([190, 190, 190]));
        for x in 0..256 {
            img.put_pixel(x, 128, image::Rgb([150, 150, 150]));
        }
        let mask = extract_boundaries(&img, &BoundaryConfig::default());
        let near_line: usize = (126..=130)
            .flat_map(|y| (0..256).map(move |x| (x, y)))
            .filter(|&(x, y)| mask.get_pixel(x, y)[0] != 0)
            .count();
        assert!(near_line > 128, "faint line mostly missing: {near_line}");
    }
}
