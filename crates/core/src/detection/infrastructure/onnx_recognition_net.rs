/// Face descriptor extractor (128-d embedding) using ONNX Runtime via `ort`.
use std::path::Path;

use crate::detection::domain::face_descriptor::FaceDescriptor;
use crate::detection::domain::face_recognizer::FaceRecognizer;
use crate::detection::infrastructure::execution_provider::open_session;
use crate::detection::infrastructure::tensor::{square_tensor, Normalization, SquareWindow};
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

const INPUT_SIZE: usize = 150;

const NORMALIZATION: Normalization = Normalization {
    mean_rgb: [122.782, 117.001, 104.298],
    divisor: 256.0,
};

pub struct OnnxRecognitionNet {
    session: ort::session::Session,
}

impl OnnxRecognitionNet {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
        })
    }
}

impl FaceRecognizer for OnnxRecognitionNet {
    fn describe(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceDescriptor, Box<dyn std::error::Error>> {
        let window =
            SquareWindow::centered_on(frame, face).ok_or("face box lies outside the frame")?;
        let input = square_tensor(frame, &window, INPUT_SIZE, NORMALIZATION);

        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding = outputs[0].try_extract_array::<f32>()?;

        Ok(FaceDescriptor::new(embedding.iter().copied().collect())?)
    }
}
