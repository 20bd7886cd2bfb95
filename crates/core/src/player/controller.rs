//! The single owner of player state.
//!
//! UI events come in as method calls; every call goes through a
//! [`PlayerState`] transition and, when the transition changed the source
//! or the viewport width, the surface session is torn down and recreated.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::detection::domain::face_analyzer::{
    DetectionRequest, FaceAnalyzer, TinyFaceDetectorOptions,
};
use crate::detection::infrastructure::model_loader::ModelLoadError;
use crate::player::detection_poller::{AnalyzerSlot, DetectionSummary, PollerEvent};
use crate::player::media::{MediaElement, MediaError, MediaEvent};
use crate::player::overlay::DrawOptions;
use crate::player::session::{LoopCounters, SurfaceSession};
use crate::player::state::{PlaybackState, PlayerError, PlayerState};
use crate::player::surface::SharedSurface;
use crate::shared::constants::{DETECTION_INTERVAL, REFRESH_INTERVAL, RENDER_OFFSET};
use crate::video::domain::video_source::VideoSource;

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    pub detection_interval: Duration,
    pub refresh_interval: Duration,
    /// Top-left position of the video on the render surface.
    pub render_offset: (i64, i64),
    pub request: DetectionRequest,
    pub draw: DrawOptions,
}

impl PlayerConfig {
    pub fn with_detector(mut self, options: TinyFaceDetectorOptions) -> Self {
        self.request.detector = options;
        self
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            detection_interval: DETECTION_INTERVAL,
            refresh_interval: REFRESH_INTERVAL,
            render_offset: RENDER_OFFSET,
            request: DetectionRequest::all_faces(TinyFaceDetectorOptions::default())
                .with_landmarks()
                .with_expressions(),
            draw: DrawOptions::default(),
        }
    }
}

pub struct PlayerController<M: MediaElement> {
    config: PlayerConfig,
    state: PlayerState,
    media: M,
    analyzer: AnalyzerSlot,
    session: Option<SurfaceSession>,
    session_generation: u64,
    counters: LoopCounters,
    last_detection: Option<DetectionSummary>,
}

impl<M: MediaElement> PlayerController<M> {
    pub fn new(media: M, config: PlayerConfig, source: VideoSource, viewport_width: u32) -> Self {
        Self {
            config,
            state: PlayerState::new(source, viewport_width),
            media,
            analyzer: Arc::new(Mutex::new(None)),
            session: None,
            session_generation: 0,
            counters: LoopCounters::default(),
            last_detection: None,
        }
    }

    /// Binds the initial source, starts playback and the first session.
    pub fn mount(&mut self) {
        self.load_current_source();
        self.restart_session();
    }

    /// Installs the analyzer once loading finishes, or records the failure.
    pub fn on_models_loaded<A>(&mut self, result: Result<A, ModelLoadError>)
    where
        A: FaceAnalyzer + 'static,
    {
        match result {
            Ok(analyzer) => {
                if self.state.models_loaded() {
                    *self.analyzer.lock().unwrap() = Some(Box::new(analyzer));
                    log::info!("Face models ready");
                }
            }
            Err(e) => {
                log::error!("Loading face models failed: {e}");
                self.state.models_failed(e.to_string());
            }
        }
    }

    pub fn select_file(&mut self, path: PathBuf) {
        self.select_source(VideoSource::File(path));
    }

    /// Reloads the media element with `source`, autoplays and restarts the
    /// surface session.
    pub fn select_source(&mut self, source: VideoSource) {
        log::info!("Selected video {source}");
        self.state.select_source(source);
        self.stop_session();
        self.last_detection = None;
        self.load_current_source();
        self.restart_session();
    }

    pub fn play(&mut self) {
        if self.state.request_play() {
            let result = self.media.play();
            self.record_media(result);
        }
    }

    pub fn pause(&mut self) {
        if self.state.request_pause() {
            let result = self.media.pause();
            self.record_media(result);
        }
    }

    pub fn resize(&mut self, width: u32) {
        if self.state.resize(width) {
            log::debug!("Viewport width changed to {width}");
            self.restart_session();
        }
    }

    /// Drains pending media and detection events into the state.
    pub fn pump(&mut self) {
        while let Some(event) = self.media.poll_event() {
            match event {
                MediaEvent::Failed(message) => {
                    self.state.record_error(PlayerError::Media(message));
                }
                MediaEvent::Ended => {
                    log::info!("Reached end of {}", self.state.source());
                    self.state.media_ended();
                }
            }
        }

        let Some(session) = &self.session else {
            return;
        };
        while let Some(event) = session.try_event() {
            match event {
                PollerEvent::Drawn(summary) => self.last_detection = Some(summary),
                PollerEvent::Failed { error, .. } => {
                    self.state.record_error(PlayerError::Detection(error));
                }
            }
        }
    }

    /// Stops both loops. Playback is left as it is.
    pub fn unmount(&mut self) {
        self.stop_session();
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn render_surface(&self) -> Option<&SharedSurface> {
        self.session.as_ref().map(|s| s.render_surface())
    }

    pub fn overlay_surface(&self) -> Option<&SharedSurface> {
        self.session.as_ref().map(|s| s.overlay_surface())
    }

    pub fn last_detection(&self) -> Option<&DetectionSummary> {
        self.last_detection.as_ref()
    }

    /// Increases every time a new surface session starts.
    pub fn session_generation(&self) -> u64 {
        self.session_generation
    }

    pub fn active_render_loops(&self) -> usize {
        self.counters.render_loops.get()
    }

    pub fn active_detection_timers(&self) -> usize {
        self.counters.detection_timers.get()
    }

    fn load_current_source(&mut self) {
        let source = self.state.source().clone();
        let result = self.media.load(&source);
        self.record_media(result);
        if self.state.playback() == PlaybackState::Playing {
            let result = self.media.play();
            self.record_media(result);
        }
    }

    fn restart_session(&mut self) {
        self.stop_session();
        self.session = Some(SurfaceSession::start(
            &self.config,
            self.media.frame_slot(),
            self.analyzer.clone(),
            self.state.surface_dimensions(),
            &self.counters,
        ));
        self.session_generation += 1;
    }

    fn stop_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
    }

    fn record_media(&mut self, result: Result<(), MediaError>) {
        if let Err(e) = result {
            log::error!("Media command failed: {e}");
            self.state.record_error(PlayerError::Media(e.to_string()));
        }
    }
}

impl<M: MediaElement> Drop for PlayerController<M> {
    fn drop(&mut self) {
        self.unmount();
    }
}
