/// The four face nets composed into a single [`FaceAnalyzer`].
///
/// Detection always runs; the per-face nets only run for what the
/// request asks for.
use crate::detection::domain::expression_classifier::ExpressionClassifier;
use crate::detection::domain::face_analyzer::{DetectionRequest, FaceAnalyzer};
use crate::detection::domain::face_detection::FaceDetection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_recognizer::FaceRecognizer;
use crate::detection::domain::landmark_estimator::LandmarkEstimator;
use crate::shared::frame::Frame;

pub struct FaceNets {
    detector: Box<dyn FaceDetector>,
    landmarks: Box<dyn LandmarkEstimator>,
    expressions: Box<dyn ExpressionClassifier>,
    recognizer: Box<dyn FaceRecognizer>,
}

impl FaceNets {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        landmarks: Box<dyn LandmarkEstimator>,
        expressions: Box<dyn ExpressionClassifier>,
        recognizer: Box<dyn FaceRecognizer>,
    ) -> Self {
        Self {
            detector,
            landmarks,
            expressions,
            recognizer,
        }
    }
}

impl FaceAnalyzer for FaceNets {
    fn analyze(
        &mut self,
        frame: &Frame,
        request: &DetectionRequest,
    ) -> Result<Vec<FaceDetection>, Box<dyn std::error::Error>> {
        let boxes = self.detector.detect(frame, &request.detector)?;

        let mut detections = Vec::with_capacity(boxes.len());
        for face in boxes {
            let mut detection = FaceDetection::new(face.bbox, face.score);
            if request.landmarks {
                detection.landmarks = Some(self.landmarks.estimate(frame, &face.bbox)?);
            }
            if request.expressions {
                detection.expressions = Some(self.expressions.classify(frame, &face.bbox)?);
            }
            if request.descriptors {
                detection.descriptor = Some(self.recognizer.describe(frame, &face.bbox)?);
            }
            detections.push(detection);
        }

        Ok(detections)
    }
}
