//! Scalar raster filters: luminance conversion, separable Gaussian
//! smoothing, and the Gaussian-weighted adaptive threshold.

use image::{GrayImage, Luma, RgbImage};

/// Out-of-bounds policy for neighborhood reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Repeat the edge sample.
    Clamp,
    /// Mirror around the edge sample without repeating it.
    Reflect101,
}

/// Map a possibly out-of-range index into `0..len`. `len` must be nonzero.
fn map_index(i: isize, len: usize, mode: BorderMode) -> usize {
    debug_assert!(len > 0);
    match mode {
        BorderMode::Clamp => i.clamp(0, len as isize - 1) as usize,
        BorderMode::Reflect101 => {
            if len == 1 {
                return 0;
            }
            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len { r } else { 2 * len - 2 - r }
        }
    }
}

/// Rec.601 luminance of a color image, rounded to u8.
pub fn luminance(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);
    for (x, y, px) in image.enumerate_pixels() {
        let [r, g, b] = px.0;
        let lum = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        gray.put_pixel(x, y, Luma([lum.round() as u8]));
    }
    gray
}

/// 1-D Gaussian taps for an odd `size`, normalized to sum 1.
///
/// Sigma is derived from the size as `0.3 * ((size - 1) * 0.5 - 1) + 0.8`
/// (1.1 for size 5, 2.0 for size 11). An even or zero `size` is promoted to
/// the next odd value.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1) | 1;
    let half = (size / 2) as isize;
    let sigma = 0.3 * ((size - 1) as f32 * 0.5 - 1.0) + 0.8;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    for tap in &mut taps {
        *tap /= sum;
    }
    taps
}

/// Separable Gaussian smoothing with the sigma-from-size rule of
/// [`gaussian_kernel`]. The horizontal pass keeps f32 precision; the
/// vertical pass rounds back to u8.
pub fn gaussian_blur(gray: &GrayImage, kernel_size: u32, border: BorderMode) -> GrayImage {
    let (width, height) = gray.dimensions();
    let taps = gaussian_kernel(kernel_size);
    let half = (taps.len() / 2) as isize;

    let mut horizontal = vec![0.0f32; (width as usize) * (height as usize)];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (ti, tap) in taps.iter().enumerate() {
                let sx = map_index(x as isize + ti as isize - half, width as usize, border);
                acc += tap * f32::from(gray.get_pixel(sx as u32, y)[0]);
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0f32;
            for (ti, tap) in taps.iter().enumerate() {
                let sy = map_index(y as isize + ti as isize - half, height as usize, border);
                acc += tap * horizontal[(sy as u32 * width + x) as usize];
            }
            out.put_pixel(x, y, Luma([acc.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Locally adaptive binarization: foreground 255 where a pixel is darker
/// than its Gaussian-weighted neighborhood mean minus `c`.
///
/// The mean over `block_size` uses clamped borders and is rounded to u8, so
/// the comparison `src <= mean - c` is exact integer arithmetic.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    let mean = gaussian_blur(gray, block_size, BorderMode::Clamp);
    let (width, height) = gray.dimensions();
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let src = i32::from(gray.get_pixel(x, y)[0]);
            let cutoff = i32::from(mean.get_pixel(x, y)[0]) - c;
            out.put_pixel(x, y, Luma([if src <= cutoff { 255 } else { 0 }]));
        }
    }
    out
}
