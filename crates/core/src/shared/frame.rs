use image::RgbaImage;
use ndarray::ArrayView3;

use crate::shared::geometry::Dimensions;

/// A decoded video frame or surface snapshot: interleaved 8-bit pixels in
/// row-major order, either RGB (3 channels) or RGBA (4 channels).
///
/// Only the first three channels are read by the face nets, so both
/// layouts can be analyzed directly.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert!(channels == 3 || channels == 4, "frames are RGB or RGBA");
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn from_rgba_image(image: RgbaImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 4, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Decode order for video frames, tick sequence for surface snapshots.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                self.channels as usize,
            ),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// Converts to an opaque RGBA image, adding an alpha channel if needed.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let data = if self.channels == 4 {
            self.data.clone()
        } else {
            let mut rgba = Vec::with_capacity(self.data.len() / 3 * 4);
            for px in self.data.chunks_exact(3) {
                rgba.extend_from_slice(px);
                rgba.push(u8::MAX);
            }
            rgba
        };
        RgbaImage::from_raw(self.width, self.height, data)
            .expect("Frame data length must match dimensions")
    }
}
