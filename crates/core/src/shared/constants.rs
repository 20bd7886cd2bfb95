use std::time::Duration;

pub const DEFAULT_VIDEO_URL: &str =
    "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Directory the model bundles are read from unless configured otherwise.
pub const DEFAULT_MODELS_DIR: &str = "models";

pub const TINY_FACE_DETECTOR_MODEL: &str = "tiny_face_detector.onnx";
pub const FACE_LANDMARK_68_MODEL: &str = "face_landmark_68.onnx";
pub const FACE_RECOGNITION_MODEL: &str = "face_recognition.onnx";
pub const FACE_EXPRESSION_MODEL: &str = "face_expression.onnx";

pub const DETECTION_INTERVAL: Duration = Duration::from_millis(100);

/// Roughly one 60 Hz display refresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_micros(16_667);

/// Where the video is placed on the render surface, in surface pixels.
pub const RENDER_OFFSET: (i64, i64) = (10, 10);

pub const ASPECT_NUMERATOR: u32 = 9;
pub const ASPECT_DENOMINATOR: u32 = 16;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];
