/// Seven-class facial expression classifier using ONNX Runtime via `ort`.
use std::path::Path;

use crate::detection::domain::expression_classifier::ExpressionClassifier;
use crate::detection::domain::face_expressions::FaceExpressions;
use crate::detection::infrastructure::execution_provider::open_session;
use crate::detection::infrastructure::onnx_landmark_net::FACE_CROP_NORMALIZATION;
use crate::detection::infrastructure::tensor::{square_tensor, SquareWindow};
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

const INPUT_SIZE: usize = 112;

pub struct OnnxExpressionNet {
    session: ort::session::Session,
}

impl OnnxExpressionNet {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
        })
    }
}

impl ExpressionClassifier for OnnxExpressionNet {
    fn classify(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceExpressions, Box<dyn std::error::Error>> {
        let window =
            SquareWindow::centered_on(frame, face).ok_or("face box lies outside the frame")?;
        let input = square_tensor(frame, &window, INPUT_SIZE, FACE_CROP_NORMALIZATION);

        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let logits = outputs[0].try_extract_array::<f32>()?;
        let logits: Vec<f32> = logits.iter().copied().collect();

        Ok(FaceExpressions::from_logits(&logits)?)
    }
}
