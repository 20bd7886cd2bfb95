/// 68-point landmark regressor using ONNX Runtime via `ort`.
use std::path::Path;

use crate::detection::domain::face_landmarks::{FaceLandmarks, NUM_LANDMARKS};
use crate::detection::domain::landmark_estimator::LandmarkEstimator;
use crate::detection::infrastructure::execution_provider::open_session;
use crate::detection::infrastructure::tensor::{square_tensor, Normalization, SquareWindow};
use crate::shared::frame::Frame;
use crate::shared::geometry::{BoundingBox, Point};

const INPUT_SIZE: usize = 112;

pub(crate) const FACE_CROP_NORMALIZATION: Normalization = Normalization {
    mean_rgb: [122.782, 117.001, 104.298],
    divisor: 255.0,
};

pub struct OnnxLandmarkNet {
    session: ort::session::Session,
}

impl OnnxLandmarkNet {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
        })
    }
}

impl LandmarkEstimator for OnnxLandmarkNet {
    fn estimate(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>> {
        let window =
            SquareWindow::centered_on(frame, face).ok_or("face box lies outside the frame")?;
        let input = square_tensor(frame, &window, INPUT_SIZE, FACE_CROP_NORMALIZATION);

        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let coords = outputs[0].try_extract_array::<f32>()?;
        let coords: Vec<f32> = coords.iter().copied().collect();

        Ok(decode_landmarks(&coords, &window)?)
    }
}

/// Maps `[x0, y0, x1, y1, ...]` relative to the square window into frame
/// coordinates.
fn decode_landmarks(coords: &[f32], window: &SquareWindow) -> Result<FaceLandmarks, String> {
    if coords.len() < NUM_LANDMARKS * 2 {
        return Err(format!(
            "landmark net returned {} values, expected {}",
            coords.len(),
            NUM_LANDMARKS * 2
        ));
    }
    let points: Vec<Point> = coords[..NUM_LANDMARKS * 2]
        .chunks_exact(2)
        .map(|xy| window.to_frame(xy[0] as f64, xy[1] as f64))
        .collect();
    FaceLandmarks::new(points)
}
