//! Synthetic micrograph fixtures shared by the unit tests.

use image::{Rgb, RgbImage};

/// Flat light matrix crossed by a dark grain-boundary grid every `cell`
/// pixels.
///
/// Lines are 2 px wide so the 2x2 opening keeps them, and the background is
/// perfectly flat so histogram equalization cannot amplify texture into
/// phantom boundaries.
pub(crate) fn draw_grain_micrograph(width: u32, height: u32, cell: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([200, 200, 200]));
    for (x, y, px) in image.enumerate_pixels_mut() {
        if x % cell < 2 || y % cell < 2 {
            *px = Rgb([60, 60, 60]);
        }
    }
    image
}
