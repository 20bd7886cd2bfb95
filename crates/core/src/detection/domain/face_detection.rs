use crate::detection::domain::face_descriptor::FaceDescriptor;
use crate::detection::domain::face_expressions::FaceExpressions;
use crate::detection::domain::face_landmarks::FaceLandmarks;
use crate::shared::geometry::{BoundingBox, Dimensions};

/// One detected face with whatever extra analysis was requested.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceDetection {
    pub bbox: BoundingBox,
    pub score: f64,
    pub landmarks: Option<FaceLandmarks>,
    pub expressions: Option<FaceExpressions>,
    pub descriptor: Option<FaceDescriptor>,
}

impl FaceDetection {
    pub fn new(bbox: BoundingBox, score: f64) -> Self {
        Self {
            bbox,
            score,
            landmarks: None,
            expressions: None,
            descriptor: None,
        }
    }

    /// Maps geometry from `from` space into `to` space. Expressions and
    /// descriptors are resolution-independent and carried over.
    pub fn rescale(&self, from: Dimensions, to: Dimensions) -> Self {
        let (sx, sy) = if from.is_empty() {
            (1.0, 1.0)
        } else {
            (
                to.width as f64 / from.width as f64,
                to.height as f64 / from.height as f64,
            )
        };
        Self {
            bbox: self.bbox.scale(sx, sy),
            score: self.score,
            landmarks: self.landmarks.as_ref().map(|l| l.scale(sx, sy)),
            expressions: self.expressions.clone(),
            descriptor: self.descriptor.clone(),
        }
    }
}

/// Rescales a batch of detections computed on a `from`-sized frame into a
/// `to`-sized drawing surface.
pub fn resize_results(
    detections: &[FaceDetection],
    from: Dimensions,
    to: Dimensions,
) -> Vec<FaceDetection> {
    detections.iter().map(|d| d.rescale(from, to)).collect()
}
