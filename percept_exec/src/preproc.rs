//! # Image preprocessing
//!
//! Converts a camera frame into a [`BinaryImage`]: grayscale, then a binary threshold, then a
//! morphological close with a square kernel to fill small holes in the lane surface.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{DynamicImage, GrayImage};
use serde::Deserialize;

use crate::binary_image::BinaryImage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for preprocessing.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreprocParams {
    /// Fixed grayscale threshold, pixels strictly above it are lane surface. If not set the
    /// threshold is chosen per frame with Otsu's method.
    pub threshold: Option<u8>,

    /// Side length of the square closing kernel, 0 or 1 disables closing.
    pub close_kernel_size: u32,
}

impl Default for PreprocParams {
    fn default() -> Self {
        Self {
            threshold: None,
            close_kernel_size: 5,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Binarise a camera frame.
pub fn binarise(frame: &DynamicImage, params: &PreprocParams) -> BinaryImage {
    let gray = frame.to_luma8();

    let level = match params.threshold {
        Some(t) => t,
        None => otsu_level(&gray)
    };

    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let mask: Vec<bool> = gray.pixels().map(|p| p[0] > level).collect();

    let radius = (params.close_kernel_size / 2) as usize;
    let mask = if radius > 0 {
        close(&mask, width, height, radius)
    }
    else {
        mask
    };

    BinaryImage::from_fn(width, height, |x, y| mask[y * width + x])
}

/// Otsu's threshold for the image, the level maximising the between class variance.
pub fn otsu_level(image: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for p in image.pixels() {
        hist[p[0] as usize] += 1;
    }

    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0
    }

    let sum_all: f64 = hist.iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum();

    let mut best_level = 0u8;
    let mut best_var = -1.0;

    let mut weight_bg = 0u64;
    let mut sum_bg = 0.0;

    for level in 0..256usize {
        weight_bg += hist[level];
        if weight_bg == 0 {
            continue;
        }

        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }

        sum_bg += level as f64 * hist[level] as f64;

        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;

        let var = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);
        if var > best_var {
            best_var = var;
            best_level = level as u8;
        }
    }

    best_level
}

/// Morphological close (dilate then erode) with a square kernel of the given radius.
///
/// Only samples inside the image take part.
fn close(mask: &[bool], width: usize, height: usize, radius: usize) -> Vec<bool> {
    let dilated = filter(mask, width, height, radius, true);
    filter(&dilated, width, height, radius, false)
}

/// Square min/max filter, applied separably as a row pass then a column pass.
///
/// With `dilate` a sample is set if any neighbour is set, otherwise only if all are.
fn filter(mask: &[bool], width: usize, height: usize, radius: usize, dilate: bool) -> Vec<bool> {
    let mut rows = vec![false; mask.len()];
    for y in 0..height {
        for x in 0..width {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius).min(width - 1);
            rows[y * width + x] = reduce((lo..=hi).map(|i| mask[y * width + i]), dilate);
        }
    }

    let mut out = vec![false; mask.len()];
    for y in 0..height {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(height - 1);
        for x in 0..width {
            out[y * width + x] = reduce((lo..=hi).map(|j| rows[j * width + x]), dilate);
        }
    }

    out
}

fn reduce<I: Iterator<Item = bool>>(mut samples: I, dilate: bool) -> bool {
    if dilate {
        samples.any(|s| s)
    }
    else {
        samples.all(|s| s)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    fn two_tone(width: u32, height: u32, split: u32, dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < split { Luma([dark]) } else { Luma([light]) }
        })
    }

    #[test]
    fn test_otsu_bimodal() {
        let img = two_tone(20, 10, 10, 30, 220);
        let level = otsu_level(&img);

        assert!(level >= 30 && level < 220, "level {}", level);
    }

    #[test]
    fn test_otsu_uniform() {
        let img = GrayImage::from_pixel(8, 8, Luma([128]));

        // No split exists, falls back to zero
        assert_eq!(otsu_level(&img), 0);
    }

    #[test]
    fn test_fixed_threshold() {
        let img = DynamicImage::ImageLuma8(two_tone(20, 4, 10, 100, 200));
        let params = PreprocParams {
            threshold: Some(150),
            close_kernel_size: 0
        };

        let bin = binarise(&img, &params);

        assert!(!bin.get(9, 0));
        assert!(bin.get(10, 0));
        assert_eq!(bin.row(2).iter().filter(|&&s| s).count(), 10);
    }

    #[test]
    fn test_close_fills_holes() {
        // Light field with a single dark pixel
        let mut gray = GrayImage::from_pixel(15, 15, Luma([200]));
        gray.put_pixel(7, 7, Luma([10]));
        let img = DynamicImage::ImageLuma8(gray);

        let open = binarise(&img, &PreprocParams { threshold: Some(100), close_kernel_size: 0 });
        assert!(!open.get(7, 7));

        let closed = binarise(&img, &PreprocParams { threshold: Some(100), close_kernel_size: 5 });
        assert!(closed.get(7, 7));
        assert!(closed.into_raw().into_iter().all(|s| s));
    }

    #[test]
    fn test_close_keeps_separate_lanes() {
        // Two bands of lane with a wide gap between them
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(40, 10, |x, _| {
            if x < 10 || x >= 30 { Luma([255]) } else { Luma([0]) }
        }));

        let bin = binarise(&img, &PreprocParams { threshold: Some(128), close_kernel_size: 5 });

        assert!(bin.get(5, 5));
        assert!(!bin.get(20, 5));
        assert!(bin.get(35, 5));
    }
}
