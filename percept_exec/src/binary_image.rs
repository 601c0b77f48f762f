//! # Binary image
//!
//! A fixed size grid of foreground/background samples, stored row-major. Foreground is the lane
//! surface (white after thresholding), background is everything else.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::GrayImage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A binary image. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage {
    width: usize,
    height: usize,
    data: Vec<bool>
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BinaryImage {
    /// Build an image by evaluating `f(x, y)` for every sample.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> bool
    {
        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }

        Self { width, height, data }
    }

    /// Build an image from row-major samples.
    ///
    /// Returns `None` if the number of samples doesn't match the size.
    pub fn from_raw(width: usize, height: usize, data: Vec<bool>) -> Option<Self> {
        if data.len() != width * height {
            return None
        }

        Some(Self { width, height, data })
    }

    /// Build an image from an 8 bit mask, any non-zero pixel is foreground.
    pub fn from_luma(mask: &GrayImage) -> Self {
        Self {
            width: mask.width() as usize,
            height: mask.height() as usize,
            data: mask.pixels().map(|p| p[0] != 0).collect()
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Column along which the boundary is tracked.
    pub fn centre_column(&self) -> usize {
        self.width / 2
    }

    /// Get the sample at `(x, y)`, `true` for foreground.
    ///
    /// # Panics
    /// - If `(x, y)` is outside the image.
    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.width && y < self.height, "({}, {}) is outside the image", x, y);
        self.data[y * self.width + x]
    }

    /// Get all samples in row `y`.
    pub fn row(&self, y: usize) -> &[bool] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Consume the image returning the row-major samples.
    pub fn into_raw(self) -> Vec<bool> {
        self.data
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    #[test]
    fn test_from_luma() {
        let mut mask = GrayImage::new(4, 3);
        mask.put_pixel(1, 2, Luma([255]));
        mask.put_pixel(3, 0, Luma([1]));

        let img = BinaryImage::from_luma(&mask);

        assert_eq!((img.width(), img.height()), (4, 3));
        assert!(img.get(1, 2));
        assert!(img.get(3, 0));
        assert!(!img.get(0, 0));
        assert_eq!(img.row(2), &[false, true, false, false]);
        assert_eq!(img.centre_column(), 2);
    }

    #[test]
    fn test_from_raw_size_checked() {
        assert!(BinaryImage::from_raw(2, 2, vec![true; 3]).is_none());
        assert!(BinaryImage::from_raw(2, 2, vec![true; 4]).is_some());
    }
}
