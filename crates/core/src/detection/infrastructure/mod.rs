pub mod execution_provider;
pub mod face_nets;
pub mod model_loader;
pub mod onnx_expression_net;
pub mod onnx_landmark_net;
pub mod onnx_recognition_net;
pub mod onnx_tiny_face_detector;
pub mod tensor;
