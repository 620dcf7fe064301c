//! Conversion of uploaded image bytes into the tensor the classifier expects.
//!
//! The pipeline is fixed: decode to RGB, stretch to 224x224, scale every
//! channel to `[0, 1]` and prepend a batch dimension of one.

use crate::error::PreprocessError;
use image::{RgbImage, imageops::FilterType};

pub const INPUT_WIDTH: u32 = 224;
pub const INPUT_HEIGHT: u32 = 224;
pub const INPUT_CHANNELS: usize = 3;

/// Shape of the model input in NHWC order.
pub const TENSOR_SHAPE: [usize; 4] = [
    1,
    INPUT_HEIGHT as usize,
    INPUT_WIDTH as usize,
    INPUT_CHANNELS,
];

const TENSOR_LEN: usize = TENSOR_SHAPE[0] * TENSOR_SHAPE[1] * TENSOR_SHAPE[2] * TENSOR_SHAPE[3];

/// A `(1, 224, 224, 3)` float tensor with values in `[0, 1]`, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
}

impl ImageTensor {
    pub fn from_vec(data: Vec<f32>) -> Result<Self, PreprocessError> {
        if data.len() != TENSOR_LEN {
            return Err(PreprocessError::TensorSize {
                expected: TENSOR_LEN,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    pub fn zeros() -> Self {
        Self {
            data: vec![0.0; TENSOR_LEN],
        }
    }

    pub fn shape(&self) -> [usize; 4] {
        TENSOR_SHAPE
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Decodes any format the `image` crate recognizes and drops alpha/palette data.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, PreprocessError> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

/// Stretches the image to the model input size, ignoring aspect ratio.
pub fn resize(image: &RgbImage) -> RgbImage {
    image::imageops::resize(image, INPUT_WIDTH, INPUT_HEIGHT, FilterType::CatmullRom)
}

/// Scales a 224x224 RGB image to `[0, 1]` floats.
pub fn normalize(image: &RgbImage) -> Result<ImageTensor, PreprocessError> {
    let data = image
        .as_raw()
        .iter()
        .map(|&v| f32::from(v) / 255.0)
        .collect();
    ImageTensor::from_vec(data)
}

pub fn preprocess(bytes: &[u8]) -> Result<ImageTensor, PreprocessError> {
    let image = decode_rgb(bytes)?;
    normalize(&resize(&image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn black_image_becomes_zero_tensor() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::new(100, 100)),
            ImageFormat::Png,
        );
        let tensor = preprocess(&bytes).unwrap();
        assert_eq!(tensor.shape(), [1, 224, 224, 3]);
        assert_eq!(tensor.as_slice().len(), 224 * 224 * 3);
        assert!(tensor.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn white_image_becomes_ones() {
        let white = RgbImage::from_pixel(224, 224, Rgb([255, 255, 255]));
        let tensor = normalize(&white).unwrap();
        assert!(tensor.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn non_square_images_are_stretched() {
        let tall = RgbImage::from_pixel(31, 517, Rgb([10, 200, 90]));
        let resized = resize(&tall);
        assert_eq!(resized.dimensions(), (224, 224));
        assert_eq!(resized.get_pixel(0, 0), &Rgb([10, 200, 90]));
        assert_eq!(resized.get_pixel(223, 223), &Rgb([10, 200, 90]));
    }

    #[test]
    fn values_stay_in_unit_range() {
        let gradient = RgbImage::from_fn(97, 41, |x, y| {
            Rgb([(x * 2) as u8, (y * 6) as u8, ((x + y) % 256) as u8])
        });
        let bytes = encode(DynamicImage::ImageRgb8(gradient), ImageFormat::Png);
        let tensor = preprocess(&bytes).unwrap();
        assert!(tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn channels_are_interleaved_per_pixel() {
        let image = RgbImage::from_pixel(224, 224, Rgb([255, 0, 51]));
        let tensor = normalize(&image).unwrap();
        assert_eq!(&tensor.as_slice()[..3], &[1.0, 0.0, 0.2]);
    }

    #[test]
    fn alpha_channel_is_discarded() {
        let translucent = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 7]));
        let bytes = encode(DynamicImage::ImageRgba8(translucent), ImageFormat::Png);
        let rgb = decode_rgb(&bytes).unwrap();
        assert_eq!(rgb.get_pixel(3, 3), &Rgb([255, 0, 0]));
    }

    #[test]
    fn jpeg_uploads_decode() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([120, 120, 120]))),
            ImageFormat::Jpeg,
        );
        let tensor = preprocess(&bytes).unwrap();
        assert_eq!(tensor.shape(), TENSOR_SHAPE);
    }

    #[test]
    fn garbage_and_empty_bytes_fail_to_decode() {
        assert!(matches!(
            preprocess(b"not an image at all"),
            Err(PreprocessError::Decode(_))
        ));
        assert!(matches!(preprocess(&[]), Err(PreprocessError::Decode(_))));
    }

    #[test]
    fn wrong_sized_buffers_are_not_tensors() {
        let err = ImageTensor::from_vec(vec![0.0; 10]).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::TensorSize {
                expected: TENSOR_LEN,
                actual: 10
            }
        ));
    }
}
