//! Binary morphology with small square structuring elements.
//!
//! Pixels are treated as binary with threshold `> 0`; outputs are 0 or 255.
//! The anchor sits at `size / 2`, and dilation uses the reflected element,
//! so erosion followed by dilation is an unshifted opening for even sizes
//! as well as odd ones.

use image::{GrayImage, Luma};

/// Erosion by a `size`x`size` ones element.
///
/// Out-of-bounds neighbors do not constrain the minimum, so foreground
/// touching the image border keeps its border pixels.
pub fn erode(mask: &GrayImage, size: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    let size = size.max(1) as isize;
    let anchor = size / 2;
    let mut out = GrayImage::new(width, height);
    for y in 0..height as isize {
        for x in 0..width as isize {
            let mut all_set = true;
            'probe: for dy in 0..size {
                for dx in 0..size {
                    let nx = x + dx - anchor;
                    let ny = y + dy - anchor;
                    if nx < 0 || nx >= width as isize || ny < 0 || ny >= height as isize {
                        continue;
                    }
                    if mask.get_pixel(nx as u32, ny as u32)[0] == 0 {
                        all_set = false;
                        break 'probe;
                    }
                }
            }
            out.put_pixel(x as u32, y as u32, Luma([if all_set { 255 } else { 0 }]));
        }
    }
    out
}

/// Dilation by the reflected `size`x`size` ones element.
pub fn dilate(mask: &GrayImage, size: u32) -> GrayImage {
    let (width, height) = mask.dimensions();
    let size = size.max(1) as isize;
    let anchor = size / 2;
    let mut out = GrayImage::new(width, height);
    for y in 0..height as isize {
        for x in 0..width as isize {
            let mut any_set = false;
            'probe: for dy in 0..size {
                for dx in 0..size {
                    let nx = x + anchor - dx;
                    let ny = y + anchor - dy;
                    if nx < 0 || nx >= width as isize || ny < 0 || ny >= height as isize {
                        continue;
                    }
                    if mask.get_pixel(nx as u32, ny as u32)[0] != 0 {
                        any_set = true;
                        break 'probe;
                    }
                }
            }
            out.put_pixel(x as u32, y as u32, Luma([if any_set { 255 } else { 0 }]));
        }
    }
    out
}

/// Morphological opening: `iterations` erosions followed by the same number
/// of dilations.
pub fn open(mask: &GrayImage, size: u32, iterations: u32) -> GrayImage {
    let mut out = mask.clone();
    for _ in 0..iterations {
        out = erode(&out, size);
    }
    for _ in 0..iterations {
        out = dilate(&out, size);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(coords: &[(u32, u32)], width: u32, height: u32) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        for &(x, y) in coords {
            mask.put_pixel(x, y, Luma([255]));
        }
        mask
    }

    fn foreground(mask: &GrayImage) -> Vec<(u32, u32)> {
        mask.enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn opening_removes_single_pixel_specks() {
        let mask = mask_from(&[(2, 2)], 5, 5);
        let out = open(&mask, 2, 1);
        assert!(foreground(&out).is_empty());
    }

    #[test]
    fn opening_keeps_a_two_by_two_block_in_place() {
        let block = [(1, 1), (2, 1), (1, 2), (2, 2)];
        let mask = mask_from(&block, 5, 5);
        let out = open(&mask, 2, 1);
        assert_eq!(foreground(&out), block.to_vec());
    }

    #[test]
    fn opening_removes_one_pixel_lines() {
        let line: Vec<(u32, u32)> = (0..8).map(|x| (x, 3)).collect();
        let mask = mask_from(&line, 8, 8);
        let out = open(&mask, 2, 1);
        assert!(foreground(&out).is_empty());
    }

    #[test]
    fn opening_keeps_two_pixel_lines() {
        let mut line = Vec::new();
        for x in 0..8 {
            line.push((x, 3));
            line.push((x, 4));
        }
        let mask = mask_from(&line, 8, 8);
        let out = open(&mask, 2, 1);
        assert_eq!(foreground(&out).len(), line.len());
    }

    #[test]
    fn dilation_reflects_the_even_element() {
        let mask = mask_from(&[(2, 2)], 5, 5);
        let out = dilate(&mask, 2);
        assert_eq!(foreground(&out), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn erosion_does_not_eat_borders() {
        let mask = GrayImage::from_pixel(4, 4, Luma([255]));
        let out = erode(&mask, 2);
        assert!(out.pixels().all(|p| p[0] == 255));
    }
}
