//! Contrast-limited adaptive histogram equalization.

use image::{GrayImage, Luma};

/// CLAHE over a tile grid.
///
/// Each tile gets a 256-bin histogram; bins above the scaled clip limit are
/// truncated and the clipped mass is redistributed evenly before the
/// cumulative mapping is built. Pixels are remapped through a bilinear blend
/// of the four nearest tile mappings, which hides tile seams.
///
/// `clip_limit` is relative to a perfectly uniform tile histogram. The grid
/// is reduced for images too small to give every tile at least one pixel.
pub fn clahe(gray: &GrayImage, clip_limit: f32, tile_grid: [u32; 2]) -> GrayImage {
    let (width, height) = gray.dimensions();
    let requested_cols = tile_grid[0].clamp(1, width.max(1)) as usize;
    let requested_rows = tile_grid[1].clamp(1, height.max(1)) as usize;
    let tile_w = (width as usize).div_ceil(requested_cols).max(1);
    let tile_h = (height as usize).div_ceil(requested_rows).max(1);
    // Ceil-divided grids can leave empty trailing tiles on sizes that are
    // not close to a multiple of the grid; shrink to the occupied tiles.
    let cols = (width as usize).div_ceil(tile_w);
    let rows = (height as usize).div_ceil(tile_h);

    let mut luts: Vec<[u8; 256]> = Vec::with_capacity(cols * rows);
    for ty in 0..rows {
        for tx in 0..cols {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width as usize);
            let y1 = (y0 + tile_h).min(height as usize);
            luts.push(tile_lut(gray, clip_limit, x0, y0, x1, y1));
        }
    }

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = tile_axis(y as usize, tile_h, rows);
        for x in 0..width {
            let (tx0, tx1, wx) = tile_axis(x as usize, tile_w, cols);
            let v = gray.get_pixel(x, y)[0] as usize;
            let top = (1.0 - wx) * f32::from(luts[ty0 * cols + tx0][v])
                + wx * f32::from(luts[ty0 * cols + tx1][v]);
            let bottom = (1.0 - wx) * f32::from(luts[ty1 * cols + tx0][v])
                + wx * f32::from(luts[ty1 * cols + tx1][v]);
            let blended = (1.0 - wy) * top + wy * bottom;
            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Clipped, redistributed cumulative mapping for one tile.
fn tile_lut(
    gray: &GrayImage,
    clip_limit: f32,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[gray.get_pixel(x as u32, y as u32)[0] as usize] += 1;
        }
    }
    let area = ((x1 - x0) * (y1 - y0)) as u32;

    let clip = ((clip_limit * area as f32 / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for bin in &mut hist {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    // Redistribution keeps the total mass equal to the tile area. The
    // remainder is strided across the range rather than dumped into the low
    // bins, so a uniform tile maps back near its own value.
    let share = excess / 256;
    for bin in &mut hist {
        *bin += share;
    }
    let mut residual = (excess % 256) as usize;
    if residual > 0 {
        let step = (256 / residual).max(1);
        let mut value = 0;
        while residual > 0 && value < 256 {
            hist[value] += 1;
            residual -= 1;
            value += step;
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    for (value, bin) in hist.iter().enumerate() {
        cumulative += bin;
        lut[value] = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Neighboring tile indices along one axis and the blend weight toward the
/// second, measured between tile centers. Coordinates beyond the first or
/// last center collapse onto that tile.
fn tile_axis(coord: usize, tile_size: usize, tiles: usize) -> (usize, usize, f32) {
    let f = (coord as f32 + 0.5) / tile_size as f32 - 0.5;
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let i = f.floor() as usize;
    if i + 1 >= tiles {
        return (tiles - 1, tiles - 1, 0.0);
    }
    (i, i + 1, f - i as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_contrast_texture(width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = 128.0 + 6.0 * (x as f32 * 0.3).sin() * (y as f32 * 0.2).cos();
                img.put_pixel(x, y, Luma([v.round() as u8]));
            }
        }
        img
    }

    fn value_range(img: &GrayImage) -> u8 {
        let min = img.pixels().map(|p| p[0]).min().unwrap_or(0);
        let max = img.pixels().map(|p| p[0]).max().unwrap_or(0);
        max - min
    }

    #[test]
    fn uniform_input_stays_uniform() {
        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        let out = clahe(&img, 2.5, [8, 8]);
        assert_eq!(out.dimensions(), (64, 64));
        let first = out.get_pixel(0, 0)[0];
        assert!(out.pixels().all(|p| p[0] == first));
        assert!(first.abs_diff(128) <= 8, "drifted to {first}");
    }

    #[test]
    fn low_contrast_texture_is_stretched() {
        let img = low_contrast_texture(256, 256);
        let before = value_range(&img);
        let out = clahe(&img, 2.5, [8, 8]);
        let after = value_range(&out);
        assert!(
            after > 2 * before,
            "range {before} should stretch well past itself, got {after}"
        );
    }

    #[test]
    fn tiny_images_shrink_the_grid_instead_of_panicking() {
        let img = low_contrast_texture(4, 4);
        let out = clahe(&img, 2.5, [8, 8]);
        assert_eq!(out.dimensions(), (4, 4));
    }

    #[test]
    fn tile_axis_clamps_outer_halves_and_blends_interior() {
        // 4 tiles of 8: centers at 4, 12, 20, 28.
        assert_eq!(tile_axis(0, 8, 4), (0, 0, 0.0));
        assert_eq!(tile_axis(4, 8, 4), (0, 1, 0.0625));
        let (a, b, w) = tile_axis(16, 8, 4);
        assert_eq!((a, b), (1, 2));
        assert!((w - 0.5625).abs() < 1e-6);
        assert_eq!(tile_axis(30, 8, 4), (3, 3, 0.0));
    }
}
