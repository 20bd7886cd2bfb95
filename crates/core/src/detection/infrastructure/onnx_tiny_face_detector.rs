/// Tiny YOLOv2-style face detector using ONNX Runtime via `ort`.
///
/// A single-class detector: the frame is letterboxed to a square, the net
/// predicts five anchor boxes per grid cell, and overlapping boxes are
/// merged with NMS.
use std::path::Path;

use crate::detection::domain::face_analyzer::TinyFaceDetectorOptions;
use crate::detection::domain::face_detector::{FaceBox, FaceDetector};
use crate::detection::infrastructure::execution_provider::open_session;
use crate::detection::infrastructure::tensor::{
    nms, sigmoid, square_tensor, Normalization, SquareWindow,
};
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// Anchor box sizes in grid-cell units.
const ANCHORS: [(f32, f32); 5] = [
    (1.603231, 2.094468),
    (6.041143, 7.080126),
    (2.882459, 3.518061),
    (4.266906, 5.178857),
    (9.041765, 10.66308),
];

/// tx, ty, tw, th, objectness.
const VALUES_PER_BOX: usize = 5;

const CELL_SIZE: u32 = 32;

const NMS_IOU_THRESH: f64 = 0.4;

const NORMALIZATION: Normalization = Normalization {
    mean_rgb: [117.001, 114.697, 97.404],
    divisor: 256.0,
};

/// Memory order of the prediction grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GridLayout {
    /// `[1, anchors * 5, grid, grid]`
    ChannelsFirst,
    /// `[1, grid, grid, anchors * 5]`
    ChannelsLast,
}

pub struct OnnxTinyFaceDetector {
    session: ort::session::Session,
}

impl OnnxTinyFaceDetector {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
        })
    }
}

impl FaceDetector for OnnxTinyFaceDetector {
    fn detect(
        &mut self,
        frame: &Frame,
        options: &TinyFaceDetectorOptions,
    ) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }
        let window = SquareWindow::letterbox(frame);
        let input = square_tensor(frame, &window, options.input_size as usize, NORMALIZATION);

        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let prediction = outputs[0].try_extract_array::<f32>()?;

        let grid = (options.input_size / CELL_SIZE) as usize;
        let layout = grid_layout(prediction.shape(), grid)?;
        let data: Vec<f32> = prediction.iter().copied().collect();

        let boxes = decode_grid(&data, layout, grid, &window, options.score_threshold);
        let kept = nms(boxes, NMS_IOU_THRESH);
        log::trace!("Tiny face detector kept {} boxes", kept.len());
        Ok(kept)
    }
}

fn grid_layout(shape: &[usize], grid: usize) -> Result<GridLayout, String> {
    let channels = ANCHORS.len() * VALUES_PER_BOX;
    match shape {
        [1, c, h, w] if *c == channels && *h == grid && *w == grid => Ok(GridLayout::ChannelsFirst),
        [1, h, w, c] if *c == channels && *h == grid && *w == grid => Ok(GridLayout::ChannelsLast),
        _ => Err(format!(
            "unexpected detector output shape {shape:?} for a {grid}x{grid} grid"
        )),
    }
}

/// Decodes every anchor prediction scoring at least `threshold` into a
/// frame-space box.
fn decode_grid(
    data: &[f32],
    layout: GridLayout,
    grid: usize,
    window: &SquareWindow,
    threshold: f64,
) -> Vec<FaceBox> {
    let channels = ANCHORS.len() * VALUES_PER_BOX;
    let value = |row: usize, col: usize, anchor: usize, k: usize| -> f32 {
        let channel = anchor * VALUES_PER_BOX + k;
        let idx = match layout {
            GridLayout::ChannelsFirst => (channel * grid + row) * grid + col,
            GridLayout::ChannelsLast => (row * grid + col) * channels + channel,
        };
        data[idx]
    };

    let bounds = window.content;
    let g = grid as f32;
    let mut boxes = Vec::new();

    for row in 0..grid {
        for col in 0..grid {
            for (anchor, &(anchor_w, anchor_h)) in ANCHORS.iter().enumerate() {
                let score = sigmoid(value(row, col, anchor, 4)) as f64;
                if score < threshold {
                    continue;
                }

                let cx = (col as f32 + sigmoid(value(row, col, anchor, 0))) / g;
                let cy = (row as f32 + sigmoid(value(row, col, anchor, 1))) / g;
                let w = value(row, col, anchor, 2).exp() * anchor_w / g;
                let h = value(row, col, anchor, 3).exp() * anchor_h / g;

                let top_left = window.to_frame((cx - w / 2.0) as f64, (cy - h / 2.0) as f64);
                let bottom_right = window.to_frame((cx + w / 2.0) as f64, (cy + h / 2.0) as f64);
                let x1 = top_left.x.max(bounds.x);
                let y1 = top_left.y.max(bounds.y);
                let x2 = bottom_right.x.min(bounds.right());
                let y2 = bottom_right.y.min(bounds.bottom());
                if x2 <= x1 || y2 <= y1 {
                    continue;
                }

                boxes.push(FaceBox {
                    bbox: BoundingBox::from_corners(x1, y1, x2, y2),
                    score,
                });
            }
        }
    }

    boxes
}
