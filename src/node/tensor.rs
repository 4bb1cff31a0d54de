//! Host image representation and its conversion to and from encoded images.
//!
//! The host hands images around as a batch-of-one float tensor shaped
//! `(1, H, W, 3)` with RGB channels in `[0, 1]`. Channel order is never
//! swapped in either direction.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};

use super::error::NodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl ImageTensor {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, NodeError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3));
        if width == 0 || height == 0 || expected != Some(data.len()) {
            return Err(NodeError::TensorShape {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `[batch, height, width, channels]`.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, 3]
    }

    /// Encodes as 8-bit RGB PNG. Values are scaled by 255, clamped, then truncated.
    pub fn to_png(&self) -> Result<Vec<u8>, NodeError> {
        let bytes: Vec<u8> = self
            .data
            .iter()
            .map(|v| (v * 255.0).clamp(0.0, 255.0) as u8)
            .collect();
        let img = RgbImage::from_raw(self.width, self.height, bytes).ok_or(NodeError::TensorShape {
            width: self.width,
            height: self.height,
            len: self.data.len(),
        })?;

        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// Decodes a PNG, JPEG or WebP image into an RGB tensor. Alpha is dropped.
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        let img = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = img.dimensions();
        let data = img.into_raw().into_iter().map(|b| f32::from(b) / 255.0).collect();
        Self::new(width, height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let err = ImageTensor::new(2, 2, vec![0.0; 11]).unwrap_err();
        assert!(matches!(err, NodeError::TensorShape { width: 2, height: 2, len: 11 }));
        assert!(ImageTensor::new(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn oversized_dimensions_are_a_shape_error() {
        let err = ImageTensor::new(u32::MAX, u32::MAX, vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, NodeError::TensorShape { len: 3, .. }));
    }

    #[test]
    fn decodes_jpeg_replies() {
        let img = RgbImage::from_pixel(4, 3, image::Rgb([200, 40, 40]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();

        let t = ImageTensor::decode(buf.get_ref()).unwrap();
        assert_eq!(t.shape(), [1, 3, 4, 3]);
        // Lossy, so only check the red channel dominates.
        assert!(t.data[0] > 0.6 && t.data[1] < 0.4);
    }

    #[test]
    fn shape_is_batch_of_one_hwc() {
        let t = ImageTensor::new(3, 2, vec![0.5; 18]).unwrap();
        assert_eq!(t.shape(), [1, 2, 3, 3]);
    }

    #[test]
    fn png_conversion_keeps_rgb_order_and_8bit_values() {
        // One red pixel and one pixel with out-of-range channels.
        let t = ImageTensor::new(2, 1, vec![1.0, 0.0, 0.0, 1.7, -0.3, 0.5]).unwrap();
        let png = t.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let back = ImageTensor::decode(&png).unwrap();
        assert_eq!((back.width(), back.height()), (2, 1));
        let expected = [255.0, 0.0, 0.0, 255.0, 0.0, 127.0].map(|b: f32| b / 255.0);
        assert_eq!(back.data, expected);
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = ImageTensor::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, NodeError::Image(_)));
    }
}
