use graingauge::{AnalysisError, GrainAnalyzer, ScaleCalibration, calibrate_two_point};
use image::{Rgb, RgbImage};

/// Flat light matrix crossed by a dark grain-boundary grid every `cell`
/// pixels, 2 px wide so the morphological opening keeps the lines.
fn grain_micrograph(width: u32, height: u32, cell: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([200, 200, 200]));
    for (x, y, px) in image.enumerate_pixels_mut() {
        if x % cell < 2 || y % cell < 2 {
            *px = Rgb([60, 60, 60]);
        }
    }
    image
}

fn seeded_analyzer(seed: u64) -> GrainAnalyzer {
    let mut analyzer = GrainAnalyzer::new();
    analyzer.config_mut().sampling.seed = Some(seed);
    analyzer
}

#[test]
fn grid_micrograph_yields_a_full_report() {
    let image = grain_micrograph(512, 512, 32);
    let analyzer = seeded_analyzer(33);
    let scale = ScaleCalibration::try_new(2.0).expect("valid scale");

    let outcome = analyzer
        .analyze(&image, scale, "Steel (Low Carbon)")
        .expect("grid fixture crosses every sampling circle");

    let report = &outcome.report;
    assert_eq!(report.image_size, [512, 512]);
    assert_eq!(report.pixels_per_micron, 2.0);
    assert_eq!(report.sampling.circles.len(), 5);
    assert!(
        report.metrics.intercept_count >= 50,
        "a 32 px grid should cross each circle dozens of times, got {}",
        report.metrics.intercept_count
    );
    assert!(
        report.metrics.mean_lineal_intercept_um > 1.0
            && report.metrics.mean_lineal_intercept_um < 100.0,
        "mean intercept {} um out of plausible range",
        report.metrics.mean_lineal_intercept_um
    );
    assert!(
        report.metrics.astm_grain_number > 3.0 && report.metrics.astm_grain_number < 15.0,
        "ASTM G {} out of plausible range",
        report.metrics.astm_grain_number
    );
    assert!(report.metrics.yield_strength_mpa > report.metrics.material.friction_stress_mpa);

    for circle in &report.sampling.circles {
        let [cx, cy] = circle.center;
        assert!(cx - circle.radius >= 0 && cx + circle.radius < 512);
        assert!(cy - circle.radius >= 0 && cy + circle.radius < 512);
        assert!(circle.intercepts > 0, "every circle crosses the grid");
    }
}

#[test]
fn overlay_is_annotated_in_place() {
    let image = grain_micrograph(256, 256, 32);
    let analyzer = seeded_analyzer(5);
    let scale = ScaleCalibration::try_new(1.0).expect("valid scale");
    let outcome = analyzer
        .analyze(&image, scale, "Brass (70/30 Cartridge)")
        .expect("analysis");

    assert_eq!(outcome.overlay.dimensions(), image.dimensions());
    let circle_px = outcome
        .overlay
        .pixels()
        .filter(|px| **px == Rgb([255, 0, 0]))
        .count();
    let marker_px = outcome
        .overlay
        .pixels()
        .filter(|px| **px == Rgb([0, 255, 255]))
        .count();
    assert!(circle_px > 100, "sampling circles should be drawn, got {circle_px} px");
    assert!(marker_px > 0, "intercept markers should be drawn");
}

#[test]
fn two_point_calibration_feeds_the_report() {
    // 200 display px at 1:1 display scale over a 100 um feature is 2 px/um.
    let scale = calibrate_two_point([0.0, 0.0], [200.0, 0.0], 1.0, 100.0).expect("calibration");
    let image = grain_micrograph(256, 256, 32);
    let analyzer = seeded_analyzer(8);
    let outcome = analyzer
        .analyze(&image, scale, "Titanium (CP Grade 2)")
        .expect("analysis");
    assert_eq!(outcome.report.pixels_per_micron, 2.0);
}

#[test]
fn seeded_analyzers_agree_across_instances() {
    let image = grain_micrograph(384, 384, 24);
    let scale = ScaleCalibration::try_new(1.5).expect("valid scale");
    let first = seeded_analyzer(77)
        .analyze(&image, scale, "Aluminum (1100-O Pure)")
        .expect("analysis");
    let second = seeded_analyzer(77)
        .analyze(&image, scale, "Aluminum (1100-O Pure)")
        .expect("analysis");
    assert_eq!(first.report, second.report);
}

#[test]
fn blank_micrograph_fails_with_no_boundaries() {
    let image = RgbImage::from_pixel(256, 256, Rgb([200, 200, 200]));
    let analyzer = seeded_analyzer(1);
    let scale = ScaleCalibration::try_new(1.0).expect("valid scale");
    let err = analyzer
        .analyze(&image, scale, "Steel (Low Carbon)")
        .unwrap_err();
    assert_eq!(err, AnalysisError::NoBoundariesDetected { circles_sampled: 5 });
}

#[test]
fn unknown_material_is_rejected_up_front() {
    let image = grain_micrograph(128, 128, 16);
    let analyzer = seeded_analyzer(2);
    let scale = ScaleCalibration::try_new(1.0).expect("valid scale");
    let err = analyzer.analyze(&image, scale, "Adamantium").unwrap_err();
    assert!(matches!(err, AnalysisError::UnknownMaterial { .. }));
}

#[test]
fn report_shape_is_stable_for_downstream_tools() {
    let image = grain_micrograph(256, 256, 32);
    let analyzer = seeded_analyzer(19);
    let scale = ScaleCalibration::try_new(1.0).expect("valid scale");
    let outcome = analyzer
        .analyze(&image, scale, "Inconel 718 (Sol. Ann.)")
        .expect("analysis");

    let value = serde_json::to_value(&outcome.report).expect("serialize");
    assert!(value["image_size"].is_array());
    assert!(value["pixels_per_micron"].is_number());
    assert!(value["sampling"]["circles"].is_array());
    assert!(value["metrics"]["astm_grain_number"].is_number());
    assert!(value["metrics"]["yield_strength_mpa"].is_number());
    assert_eq!(
        value["metrics"]["material"]["name"],
        "Inconel 718 (Sol. Ann.)"
    );
}
