use crate::detection::domain::face_analyzer::TinyFaceDetectorOptions;
use crate::shared::frame::Frame;
use crate::shared::geometry::BoundingBox;

/// A face box in frame pixel coordinates with the detector's confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBox {
    pub bbox: BoundingBox,
    pub score: f64,
}

/// Domain interface for face detection.
///
/// Implementations hold inference sessions that need exclusive access,
/// hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
        options: &TinyFaceDetectorOptions,
    ) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;
}
