//! Shared preprocessing and postprocessing for the face nets.

use ndarray::Array4;

use crate::detection::domain::face_detector::FaceBox;
use crate::shared::frame::Frame;
use crate::shared::geometry::{BoundingBox, Point};

/// Per-channel RGB means and the divisor applied after subtracting them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub mean_rgb: [f32; 3],
    pub divisor: f32,
}

/// A square window in frame coordinates that was resampled into the
/// network input. Pixels of the window outside `content` are zero-padded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareWindow {
    pub origin: Point,
    pub side: f64,
    pub content: BoundingBox,
}

impl SquareWindow {
    /// Whole frame padded on the right/bottom to a square.
    pub fn letterbox(frame: &Frame) -> Self {
        let (w, h) = (frame.width() as f64, frame.height() as f64);
        Self {
            origin: Point::new(0.0, 0.0),
            side: w.max(h),
            content: BoundingBox::new(0.0, 0.0, w, h),
        }
    }

    /// A face box clipped to the frame, padded evenly to a square.
    ///
    /// Returns `None` if the box lies entirely outside the frame.
    pub fn centered_on(frame: &Frame, face: &BoundingBox) -> Option<Self> {
        let content = face.clip(frame.dimensions())?;
        let side = content.width.max(content.height);
        Some(Self {
            origin: Point::new(
                content.x - (side - content.width) / 2.0,
                content.y - (side - content.height) / 2.0,
            ),
            side,
            content,
        })
    }

    /// Maps a point given relative to the window (0..1) back into the frame.
    pub fn to_frame(&self, rel_x: f64, rel_y: f64) -> Point {
        Point::new(
            self.origin.x + rel_x * self.side,
            self.origin.y + rel_y * self.side,
        )
    }
}

/// Resamples `window` to `size x size`, normalizes, NCHW float32.
///
/// Nearest-neighbor sampling; padding pixels are zero before normalization.
pub fn square_tensor(
    frame: &Frame,
    window: &SquareWindow,
    size: usize,
    norm: Normalization,
) -> Array4<f32> {
    let src = frame.as_ndarray();
    let max_x = frame.width().saturating_sub(1) as usize;
    let max_y = frame.height().saturating_sub(1) as usize;
    let c = &window.content;

    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    let step = window.side / size as f64;

    for y in 0..size {
        let fy = window.origin.y + (y as f64 + 0.5) * step;
        let row_inside = fy >= c.y && fy < c.bottom();
        for x in 0..size {
            let fx = window.origin.x + (x as f64 + 0.5) * step;
            let inside = row_inside && fx >= c.x && fx < c.right();
            for ch in 0..3 {
                let value = if inside {
                    src[[(fy as usize).min(max_y), (fx as usize).min(max_x), ch]] as f32
                } else {
                    0.0
                };
                tensor[[0, ch, y, x]] = (value - norm.mean_rgb[ch]) / norm.divisor;
            }
        }
    }

    tensor
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Greedy non-maximum suppression, highest score first.
pub fn nms(mut boxes: Vec<FaceBox>, iou_thresh: f64) -> Vec<FaceBox> {
    boxes.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keep: Vec<FaceBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if keep
            .iter()
            .all(|kept| kept.bbox.iou(&candidate.bbox) <= iou_thresh)
        {
            keep.push(candidate);
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY: Normalization = Normalization {
        mean_rgb: [0.0; 3],
        divisor: 1.0,
    };

    fn solid_frame(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(
            vec![value; (width * height * 3) as usize],
            width,
            height,
            3,
            0,
        )
    }

    fn face(x: f64, y: f64, w: f64, h: f64, score: f64) -> FaceBox {
        FaceBox {
            bbox: BoundingBox::new(x, y, w, h),
            score,
        }
    }

    #[test]
    fn test_letterbox_pads_bottom_of_wide_frame() {
        let frame = solid_frame(200, 100, 255);
        let window = SquareWindow::letterbox(&frame);
        assert_relative_eq!(window.side, 200.0);

        let t = square_tensor(&frame, &window, 4, IDENTITY);
        assert_eq!(t.shape(), &[1, 3, 4, 4]);
        // top half is content, bottom half padding
        assert_relative_eq!(t[[0, 0, 0, 0]], 255.0);
        assert_relative_eq!(t[[0, 0, 1, 3]], 255.0);
        assert_relative_eq!(t[[0, 0, 2, 0]], 0.0);
        assert_relative_eq!(t[[0, 2, 3, 3]], 0.0);
    }

    #[test]
    fn test_normalization_subtracts_mean_then_divides() {
        let frame = solid_frame(8, 8, 200);
        let window = SquareWindow::letterbox(&frame);
        let norm = Normalization {
            mean_rgb: [100.0, 50.0, 0.0],
            divisor: 100.0,
        };
        let t = square_tensor(&frame, &window, 2, norm);
        assert_relative_eq!(t[[0, 0, 0, 0]], 1.0);
        assert_relative_eq!(t[[0, 1, 0, 0]], 1.5);
        assert_relative_eq!(t[[0, 2, 0, 0]], 2.0);
    }

    #[test]
    fn test_centered_window_pads_tall_face_sideways() {
        let frame = solid_frame(100, 100, 0);
        let window =
            SquareWindow::centered_on(&frame, &BoundingBox::new(40.0, 10.0, 20.0, 40.0)).unwrap();
        assert_relative_eq!(window.side, 40.0);
        assert_relative_eq!(window.origin.x, 30.0);
        assert_relative_eq!(window.origin.y, 10.0);

        let p = window.to_frame(0.5, 0.5);
        assert_relative_eq!(p.x, 50.0);
        assert_relative_eq!(p.y, 30.0);
    }

    #[test]
    fn test_centered_window_outside_frame_is_none() {
        let frame = solid_frame(10, 10, 0);
        assert!(SquareWindow::centered_on(&frame, &BoundingBox::new(50.0, 50.0, 5.0, 5.0)).is_none());
    }

    #[test]
    fn test_sigmoid() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_nms_suppresses_overlap_keeping_best() {
        let kept = nms(
            vec![
                face(5.0, 5.0, 100.0, 100.0, 0.7),
                face(0.0, 0.0, 100.0, 100.0, 0.9),
            ],
            0.4,
        );
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_nms_keeps_separate_faces() {
        let kept = nms(
            vec![
                face(0.0, 0.0, 50.0, 50.0, 0.9),
                face(200.0, 200.0, 50.0, 50.0, 0.8),
            ],
            0.4,
        );
        assert_eq!(kept.len(), 2);
    }
}
