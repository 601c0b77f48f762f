//! # Camera Equipment Communications Module
//!
//! Frames published by the external acquisition process. The perception exec subscribes to these
//! and decodes them before binarisation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use base64::DecodeError;
use chrono::{DateTime, Utc, serde::ts_milliseconds};
use image::{DynamicImage, ImageError};
use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An individual encoded frame from the camera
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CamFrame {

    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// The format of this frame
    pub format: ImageFormat,

    /// The encoded image data, in base64
    pub b64_data: String
}

/// A decoded camera frame
#[derive(Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: DynamicImage
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible formats for camera images. This is used rather than image::ImageFormat to:
///     1. Restrict the formats that can be sent back and forth
///     2. Allow serialisation as image::ImageFormat does not implement serde.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq)]
pub enum ImageFormat {
    /// PNG image
    Png,

    /// JPEG image with a quality value between 1 and 100, where 100 is best.
    Jpeg(u8)
}

/// Errors converting between frames and images
#[derive(Debug, thiserror::Error)]
pub enum CamFrameError {
    #[error("Failed to decode frame data from base64: {0}")]
    Base64DecodeError(DecodeError),

    #[error("Failed to decode the frame image: {0}")]
    ImageDecodeError(ImageError),

    #[error("Failed to encode the image: {0}")]
    ImageEncodeError(ImageError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg(_) => image::ImageFormat::Jpeg
        }
    }
}

impl TryFrom<&CamFrame> for CamImage {
    type Error = CamFrameError;

    fn try_from(frame: &CamFrame) -> Result<Self, Self::Error> {
        let bytes = base64::decode(&frame.b64_data)
            .map_err(CamFrameError::Base64DecodeError)?;

        let image = image::load_from_memory_with_format(&bytes, frame.format.into())
            .map_err(CamFrameError::ImageDecodeError)?;

        Ok(CamImage {
            timestamp: frame.timestamp,
            image
        })
    }
}

impl CamImage {
    /// Convert this camera image into a camera frame with the given format
    pub fn to_cam_frame(&self, format: ImageFormat) -> Result<CamFrame, CamFrameError> {
        let mut data = Vec::<u8>::new();

        let output_format = match format {
            ImageFormat::Png => image::ImageOutputFormat::Png,
            ImageFormat::Jpeg(q)  => image::ImageOutputFormat::Jpeg(q)
        };

        self.image.write_to(&mut data, output_format)
            .map_err(CamFrameError::ImageEncodeError)?;

        Ok(CamFrame {
            timestamp: self.timestamp,
            format,
            b64_data: base64::encode(&data)
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_png_frame_decodes() {
        let mut gray = GrayImage::new(8, 4);
        gray.put_pixel(3, 2, Luma([255]));

        let cam_image = CamImage {
            timestamp: Utc::now(),
            image: DynamicImage::ImageLuma8(gray)
        };

        let frame = cam_image.to_cam_frame(ImageFormat::Png).unwrap();
        let decoded = CamImage::try_from(&frame).unwrap().image.to_luma8();

        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(3, 2)[0], 255);
        assert_eq!(decoded.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_bad_base64_rejected() {
        let frame = CamFrame {
            timestamp: Utc::now(),
            format: ImageFormat::Png,
            b64_data: "not base64!".into()
        };

        assert!(matches!(
            CamImage::try_from(&frame),
            Err(CamFrameError::Base64DecodeError(_))
        ));
    }
}
