use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// Estimates facial landmarks inside a detected face box.
pub trait LandmarkEstimator: Send {
    fn estimate(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceLandmarks, Box<dyn std::error::Error>>;
}
