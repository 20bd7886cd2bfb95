use crate::detection::domain::face_expressions::FaceExpressions;
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// Scores the facial expression of a detected face.
pub trait ExpressionClassifier: Send {
    fn classify(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceExpressions, Box<dyn std::error::Error>>;
}
