//! Loads the four face nets in the background.
//!
//! Each bundle is resolved (local dir, cache, download) and opened as a
//! session on its own thread; the loader finishes when all four are
//! ready or the first one fails.

use std::path::Path;
use std::thread;

use crossbeam_channel::Receiver;
use thiserror::Error;

use crate::detection::infrastructure::face_nets::FaceNets;
use crate::detection::infrastructure::onnx_expression_net::OnnxExpressionNet;
use crate::detection::infrastructure::onnx_landmark_net::OnnxLandmarkNet;
use crate::detection::infrastructure::onnx_recognition_net::OnnxRecognitionNet;
use crate::detection::infrastructure::onnx_tiny_face_detector::OnnxTinyFaceDetector;
use crate::shared::constants::{
    FACE_EXPRESSION_MODEL, FACE_LANDMARK_68_MODEL, FACE_RECOGNITION_MODEL,
    TINY_FACE_DETECTOR_MODEL,
};
use crate::shared::model_resolver::{self, ModelLocation, ModelResolveError};

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("could not locate {model}: {source}")]
    Resolve {
        model: &'static str,
        #[source]
        source: ModelResolveError,
    },
    #[error("could not load {model}: {message}")]
    Session { model: &'static str, message: String },
    #[error("model loader thread panicked while loading {0}")]
    Panicked(&'static str),
    #[error("model loader stopped without reporting a result")]
    Disconnected,
}

/// Messages sent from the loader thread to the UI.
pub enum LoaderMessage {
    DownloadProgress {
        model: &'static str,
        downloaded: u64,
        total: u64,
    },
    Finished(Result<FaceNets, ModelLoadError>),
}

#[derive(Clone, Debug)]
pub struct ModelLoader {
    location: ModelLocation,
}

impl ModelLoader {
    pub fn new(location: ModelLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &ModelLocation {
        &self.location
    }

    /// Loads all four nets, blocking until done.
    pub fn load(&self) -> Result<FaceNets, ModelLoadError> {
        self.load_with_progress(&|_, _, _| {})
    }

    /// Loads on a background thread. The receiver gets zero or more
    /// progress messages followed by exactly one `Finished`.
    pub fn spawn(self) -> Receiver<LoaderMessage> {
        let (tx, rx) = crossbeam_channel::unbounded();

        thread::spawn(move || {
            let tx_progress = tx.clone();
            let progress = move |model: &'static str, downloaded: u64, total: u64| {
                let _ = tx_progress.send(LoaderMessage::DownloadProgress {
                    model,
                    downloaded,
                    total,
                });
            };
            let result = self.load_with_progress(&progress);
            match &result {
                Ok(_) => log::info!("Face models loaded from {}", self.location.dir.display()),
                Err(e) => log::error!("Face model loading failed: {e}"),
            }
            let _ = tx.send(LoaderMessage::Finished(result));
        });

        rx
    }

    fn load_with_progress(
        &self,
        progress: &(dyn Fn(&'static str, u64, u64) + Sync),
    ) -> Result<FaceNets, ModelLoadError> {
        let location = &self.location;

        thread::scope(|scope| -> Result<FaceNets, ModelLoadError> {
            let detector = scope.spawn(|| {
                open(TINY_FACE_DETECTOR_MODEL, location, progress, |path| {
                    OnnxTinyFaceDetector::new(path)
                })
            });
            let landmarks = scope.spawn(|| {
                open(FACE_LANDMARK_68_MODEL, location, progress, |path| {
                    OnnxLandmarkNet::new(path)
                })
            });
            let recognizer = scope.spawn(|| {
                open(FACE_RECOGNITION_MODEL, location, progress, |path| {
                    OnnxRecognitionNet::new(path)
                })
            });
            let expressions = scope.spawn(|| {
                open(FACE_EXPRESSION_MODEL, location, progress, |path| {
                    OnnxExpressionNet::new(path)
                })
            });

            let detector = detector
                .join()
                .map_err(|_| ModelLoadError::Panicked(TINY_FACE_DETECTOR_MODEL))?;
            let landmarks = landmarks
                .join()
                .map_err(|_| ModelLoadError::Panicked(FACE_LANDMARK_68_MODEL))?;
            let recognizer = recognizer
                .join()
                .map_err(|_| ModelLoadError::Panicked(FACE_RECOGNITION_MODEL))?;
            let expressions = expressions
                .join()
                .map_err(|_| ModelLoadError::Panicked(FACE_EXPRESSION_MODEL))?;

            Ok(FaceNets::new(
                Box::new(detector?),
                Box::new(landmarks?),
                Box::new(expressions?),
                Box::new(recognizer?),
            ))
        })
    }
}

fn open<T>(
    model: &'static str,
    location: &ModelLocation,
    progress: &(dyn Fn(&'static str, u64, u64) + Sync),
    build: impl FnOnce(&Path) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, ModelLoadError> {
    let path = thread::scope(|scope| {
        // resolve() wants an owned 'static callback; forward through a channel
        let (tx, rx) = crossbeam_channel::unbounded::<(u64, u64)>();
        let forward = scope.spawn(move || {
            for (downloaded, total) in rx {
                progress(model, downloaded, total);
            }
        });
        let result = model_resolver::resolve(
            model,
            location,
            Some(Box::new(move |downloaded: u64, total: u64| {
                let _ = tx.send((downloaded, total));
            })),
        );
        let _ = forward.join();
        result
    })
    .map_err(|source| ModelLoadError::Resolve { model, source })?;

    log::debug!("Opening {model} from {}", path.display());
    build(&path).map_err(|e| ModelLoadError::Session {
        model,
        message: e.to_string(),
    })
}
