pub mod expression_classifier;
pub mod face_analyzer;
pub mod face_descriptor;
pub mod face_detection;
pub mod face_detector;
pub mod face_expressions;
pub mod face_landmarks;
pub mod face_recognizer;
pub mod landmark_estimator;
