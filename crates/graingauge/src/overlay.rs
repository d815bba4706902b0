//! Annotated overlay rendering.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};

use crate::config::OverlayStyle;
use crate::intercept::InterceptSampling;

/// Draw the sampling circles and intercept markers onto a copy of the
/// source image.
///
/// Circle outlines are stroked by stacking 1-px rings inward from the
/// nominal radius; intercept markers are filled discs at the rounded
/// crossing centroids. The source image is never modified.
pub fn render_overlay(
    image: &RgbImage,
    sampling: &InterceptSampling,
    style: &OverlayStyle,
) -> RgbImage {
    let mut canvas = image.clone();
    let circle_color = Rgb(style.circle_color);
    let marker_color = Rgb(style.marker_color);

    for circle in &sampling.circles {
        let (cx, cy) = (circle.center[0], circle.center[1]);
        for t in 0..style.circle_thickness as i32 {
            let r = circle.radius - t;
            if r <= 0 {
                break;
            }
            draw_hollow_circle_mut(&mut canvas, (cx, cy), r, circle_color);
        }
    }

    for centroid in &sampling.intercept_centroids {
        let x = centroid[0].round() as i32;
        let y = centroid[1].round() as i32;
        draw_filled_circle_mut(&mut canvas, (x, y), style.marker_radius, marker_color);
    }

    canvas
}
