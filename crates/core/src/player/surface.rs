//! In-memory drawing surfaces.
//!
//! [`DrawingSurface`] is a plain RGBA raster. [`SharedSurface`] wraps one
//! for use across the render loop, the detection poller and the UI, and
//! refuses writes once disposed so late results from a torn-down session
//! cannot reach it.

use std::sync::{Arc, Mutex};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::geometry::Dimensions;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface has been disposed")]
    Disposed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawingSurface {
    image: RgbaImage,
}

impl DrawingSurface {
    /// A fully transparent surface.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            image: RgbaImage::from_pixel(dimensions.width, dimensions.height, TRANSPARENT),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = self.image.dimensions();
        Dimensions::new(width, height)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| *p = TRANSPARENT);
    }

    /// Clears to `dimensions`, keeping the existing buffer when the size is
    /// unchanged.
    pub fn match_dimensions(&mut self, dimensions: Dimensions) {
        if self.dimensions() == dimensions {
            self.clear();
        } else {
            self.image = RgbaImage::from_pixel(dimensions.width, dimensions.height, TRANSPARENT);
        }
    }

    /// Replaces the contents with `frame` scaled to the surface size and
    /// placed at `offset`. Whatever falls outside is clipped.
    pub fn draw_frame(&mut self, frame: &Frame, offset: (i64, i64)) {
        self.clear();
        let dims = self.dimensions();
        if frame.is_empty() || dims.is_empty() {
            return;
        }

        let source = frame.to_rgba_image();
        let scaled = if source.dimensions() == (dims.width, dims.height) {
            source
        } else {
            imageops::resize(&source, dims.width, dims.height, FilterType::Nearest)
        };
        imageops::replace(&mut self.image, &scaled, offset.0, offset.1);
    }

    pub fn snapshot(&self, index: usize) -> Frame {
        Frame::from_rgba_image(self.image.clone(), index)
    }
}

struct SurfaceState {
    surface: DrawingSurface,
    disposed: bool,
    version: u64,
}

/// A drawing surface shared between threads.
///
/// Every successful write bumps the version so readers can tell whether
/// the pixels changed.
#[derive(Clone)]
pub struct SharedSurface {
    inner: Arc<Mutex<SurfaceState>>,
}

impl SharedSurface {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SurfaceState {
                surface: DrawingSurface::new(dimensions),
                disposed: false,
                version: 0,
            })),
        }
    }

    /// Runs `draw` against the surface unless it has been disposed.
    pub fn write<R>(&self, draw: impl FnOnce(&mut DrawingSurface) -> R) -> Result<R, SurfaceError> {
        let mut state = self.inner.lock().unwrap();
        if state.disposed {
            return Err(SurfaceError::Disposed);
        }
        let result = draw(&mut state.surface);
        state.version += 1;
        Ok(result)
    }

    /// Copies the current pixels into a frame tagged with `index`.
    pub fn snapshot(&self, index: usize) -> Result<Frame, SurfaceError> {
        let state = self.inner.lock().unwrap();
        if state.disposed {
            return Err(SurfaceError::Disposed);
        }
        Ok(state.surface.snapshot(index))
    }

    /// Current pixels and version, for display.
    pub fn image(&self) -> (RgbaImage, u64) {
        let state = self.inner.lock().unwrap();
        (state.surface.image().clone(), state.version)
    }

    pub fn dimensions(&self) -> Dimensions {
        self.inner.lock().unwrap().surface.dimensions()
    }

    pub fn version(&self) -> u64 {
        self.inner.lock().unwrap().version
    }

    pub fn dispose(&self) {
        self.inner.lock().unwrap().disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().unwrap().disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = DrawingSurface::new(Dimensions::new(4, 3));
        assert_eq!(surface.dimensions(), Dimensions::new(4, 3));
        assert!(surface.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_draw_frame_scales_and_offsets() {
        let mut surface = DrawingSurface::new(Dimensions::new(40, 20));
        surface.draw_frame(&solid_frame(8, 4, [200, 10, 10]), (10, 10));

        let img = surface.image();
        // left and top strips stay clear
        assert_eq!(img.get_pixel(5, 15).0[3], 0);
        assert_eq!(img.get_pixel(15, 5).0[3], 0);
        assert_eq!(img.get_pixel(10, 10).0, [200, 10, 10, 255]);
        assert_eq!(img.get_pixel(39, 19).0, [200, 10, 10, 255]);
    }

    #[test]
    fn test_draw_empty_frame_clears() {
        let mut surface = DrawingSurface::new(Dimensions::new(4, 4));
        surface.draw_frame(&solid_frame(4, 4, [1, 2, 3]), (0, 0));
        surface.draw_frame(&Frame::new(Vec::new(), 0, 0, 3, 0), (0, 0));
        assert!(surface.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_match_dimensions_resizes_or_clears() {
        let mut surface = DrawingSurface::new(Dimensions::new(4, 4));
        surface.draw_frame(&solid_frame(4, 4, [9, 9, 9]), (0, 0));

        surface.match_dimensions(Dimensions::new(4, 4));
        assert!(surface.image().pixels().all(|p| p.0[3] == 0));

        surface.match_dimensions(Dimensions::new(768, 432));
        assert_eq!(surface.dimensions(), Dimensions::new(768, 432));
    }

    #[test]
    fn test_snapshot_carries_index_and_pixels() {
        let mut surface = DrawingSurface::new(Dimensions::new(2, 2));
        surface.draw_frame(&solid_frame(2, 2, [5, 6, 7]), (0, 0));
        let frame = surface.snapshot(42);
        assert_eq!(frame.index(), 42);
        assert_eq!(frame.channels(), 4);
        assert_eq!(&frame.data()[..4], &[5, 6, 7, 255]);
    }

    #[test]
    fn test_shared_writes_bump_version() {
        let shared = SharedSurface::new(Dimensions::new(2, 2));
        assert_eq!(shared.version(), 0);
        shared.write(|s| s.clear()).unwrap();
        shared.write(|s| s.clear()).unwrap();
        assert_eq!(shared.version(), 2);
        assert_eq!(shared.image().1, 2);
    }

    #[test]
    fn test_disposed_surface_rejects_writes() {
        let shared = SharedSurface::new(Dimensions::new(2, 2));
        let other = shared.clone();
        shared.dispose();

        assert!(other.is_disposed());
        assert_eq!(other.write(|s| s.clear()), Err(SurfaceError::Disposed));
        assert_eq!(other.snapshot(0).unwrap_err(), SurfaceError::Disposed);
        assert_eq!(other.version(), 0);
    }
}
