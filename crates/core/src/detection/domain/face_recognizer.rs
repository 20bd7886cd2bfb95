use crate::detection::domain::face_descriptor::FaceDescriptor;
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// Computes an identity descriptor for a detected face.
pub trait FaceRecognizer: Send {
    fn describe(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceDescriptor, Box<dyn std::error::Error>>;
}
