use crate::detection::domain::face_detection::FaceDetection;
use crate::shared::frame::Frame;

pub const DEFAULT_INPUT_SIZE: u32 = 416;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Settings for the lightweight face detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TinyFaceDetectorOptions {
    /// Square network input side; must be a multiple of 32.
    pub input_size: u32,
    pub score_threshold: f64,
}

impl TinyFaceDetectorOptions {
    pub fn new(input_size: u32, score_threshold: f64) -> Result<Self, String> {
        if input_size == 0 || input_size % 32 != 0 {
            return Err(format!(
                "input size must be a positive multiple of 32, got {input_size}"
            ));
        }
        if !(0.0..=1.0).contains(&score_threshold) {
            return Err(format!(
                "score threshold must be within 0..=1, got {score_threshold}"
            ));
        }
        Ok(Self {
            input_size,
            score_threshold,
        })
    }
}

impl Default for TinyFaceDetectorOptions {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

/// What to compute for every detected face.
///
/// Built fluently: `DetectionRequest::all_faces(opts).with_landmarks().with_expressions()`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DetectionRequest {
    pub detector: TinyFaceDetectorOptions,
    pub landmarks: bool,
    pub expressions: bool,
    pub descriptors: bool,
}

impl DetectionRequest {
    pub fn all_faces(detector: TinyFaceDetectorOptions) -> Self {
        Self {
            detector,
            ..Self::default()
        }
    }

    pub fn with_landmarks(mut self) -> Self {
        self.landmarks = true;
        self
    }

    pub fn with_expressions(mut self) -> Self {
        self.expressions = true;
        self
    }

    pub fn with_descriptors(mut self) -> Self {
        self.descriptors = true;
        self
    }
}

/// Runs a full detection request against a frame.
pub trait FaceAnalyzer: Send {
    fn analyze(
        &mut self,
        frame: &Frame,
        request: &DetectionRequest,
    ) -> Result<Vec<FaceDetection>, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_builder_sets_flags() {
        let req = DetectionRequest::all_faces(TinyFaceDetectorOptions::default())
            .with_landmarks()
            .with_expressions();
        assert!(req.landmarks);
        assert!(req.expressions);
        assert!(!req.descriptors);
        assert_eq!(req.detector.input_size, DEFAULT_INPUT_SIZE);
    }

    #[rstest]
    #[case::not_multiple(100, 0.5)]
    #[case::zero(0, 0.5)]
    #[case::threshold_high(416, 1.5)]
    #[case::threshold_negative(416, -0.1)]
    fn test_invalid_options_rejected(#[case] size: u32, #[case] threshold: f64) {
        assert!(TinyFaceDetectorOptions::new(size, threshold).is_err());
    }

    #[rstest]
    #[case(128)]
    #[case(320)]
    #[case(608)]
    fn test_valid_input_sizes(#[case] size: u32) {
        assert!(TinyFaceDetectorOptions::new(size, 0.5).is_ok());
    }
}
