//! Player state and its transitions.
//!
//! All UI-visible flags live in [`PlayerState`] and change only through
//! the methods below. Each transition returns whether anything changed so
//! the caller knows when to restart the surface session.

use thiserror::Error;

use crate::shared::geometry::Dimensions;
use crate::video::domain::video_source::VideoSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Playing,
    Paused,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ModelReadiness {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("face models failed to load: {0}")]
    ModelLoad(String),
    #[error("video playback failed: {0}")]
    Media(String),
    #[error("face detection failed: {0}")]
    Detection(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    playback: PlaybackState,
    models: ModelReadiness,
    viewport_width: u32,
    source: VideoSource,
    /// Bumped on every source selection, even when the same file is picked
    /// again.
    source_generation: u64,
    last_error: Option<PlayerError>,
}

impl PlayerState {
    pub fn new(source: VideoSource, viewport_width: u32) -> Self {
        Self {
            playback: PlaybackState::default(),
            models: ModelReadiness::default(),
            viewport_width,
            source,
            source_generation: 0,
            last_error: None,
        }
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn models(&self) -> &ModelReadiness {
        &self.models
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// `{W, W * 9 / 16}` for the current viewport.
    pub fn surface_dimensions(&self) -> Dimensions {
        Dimensions::for_viewport(self.viewport_width)
    }

    pub fn source(&self) -> &VideoSource {
        &self.source
    }

    pub fn source_generation(&self) -> u64 {
        self.source_generation
    }

    pub fn last_error(&self) -> Option<&PlayerError> {
        self.last_error.as_ref()
    }

    /// True unless the models are ready; stays true after a load failure.
    pub fn is_loading(&self) -> bool {
        self.models != ModelReadiness::Ready
    }

    pub fn upload_visible(&self) -> bool {
        self.models == ModelReadiness::Ready
    }

    pub fn play_enabled(&self) -> bool {
        self.playback == PlaybackState::Paused
    }

    pub fn pause_enabled(&self) -> bool {
        self.playback == PlaybackState::Playing
    }

    pub fn request_play(&mut self) -> bool {
        self.set_playback(PlaybackState::Playing)
    }

    pub fn request_pause(&mut self) -> bool {
        self.set_playback(PlaybackState::Paused)
    }

    /// End of stream leaves the player paused so Play is offered again.
    pub fn media_ended(&mut self) -> bool {
        self.set_playback(PlaybackState::Paused)
    }

    /// Always counts as a change: picking a file reloads and autoplays.
    pub fn select_source(&mut self, source: VideoSource) -> bool {
        self.source = source;
        self.source_generation += 1;
        self.playback = PlaybackState::Playing;
        self.clear_error();
        true
    }

    pub fn resize(&mut self, width: u32) -> bool {
        if width == self.viewport_width {
            return false;
        }
        self.viewport_width = width;
        true
    }

    /// Ready is set at most once; a later report changes nothing.
    pub fn models_loaded(&mut self) -> bool {
        if self.models != ModelReadiness::Loading {
            return false;
        }
        self.models = ModelReadiness::Ready;
        true
    }

    pub fn models_failed(&mut self, message: impl Into<String>) -> bool {
        if self.models != ModelReadiness::Loading {
            return false;
        }
        let message = message.into();
        self.models = ModelReadiness::Failed(message.clone());
        self.last_error = Some(PlayerError::ModelLoad(message));
        true
    }

    pub fn record_error(&mut self, error: PlayerError) {
        self.last_error = Some(error);
    }

    /// Drops a media or detection error. A model-load failure stays.
    pub fn clear_error(&mut self) {
        if !matches!(self.last_error, Some(PlayerError::ModelLoad(_))) {
            self.last_error = None;
        }
    }

    fn set_playback(&mut self, target: PlaybackState) -> bool {
        if self.playback == target {
            return false;
        }
        self.playback = target;
        true
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(VideoSource::default(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Clone, Copy, Debug)]
    enum Click {
        Play,
        Pause,
    }

    #[test]
    fn test_initial_state() {
        let state = PlayerState::new(VideoSource::default(), 1024);
        assert_eq!(state.playback(), PlaybackState::Playing);
        assert!(state.is_loading());
        assert!(!state.upload_visible());
        assert!(!state.play_enabled());
        assert!(state.pause_enabled());
        assert_eq!(state.surface_dimensions(), Dimensions::new(1024, 576));
        assert!(state.last_error().is_none());
    }

    #[rstest]
    #[case::empty(&[], PlaybackState::Playing)]
    #[case::pause(&[Click::Pause], PlaybackState::Paused)]
    #[case::play_noop(&[Click::Play], PlaybackState::Playing)]
    #[case::double_pause(&[Click::Pause, Click::Pause], PlaybackState::Paused)]
    #[case::pause_play(&[Click::Pause, Click::Play], PlaybackState::Playing)]
    #[case::mixed(&[Click::Pause, Click::Play, Click::Play, Click::Pause], PlaybackState::Paused)]
    fn test_playback_follows_last_effective_click(
        #[case] clicks: &[Click],
        #[case] expected: PlaybackState,
    ) {
        let mut state = PlayerState::default();
        for click in clicks {
            match click {
                Click::Play => state.request_play(),
                Click::Pause => state.request_pause(),
            };
            assert_eq!(state.play_enabled(), state.playback() == PlaybackState::Paused);
            assert_eq!(state.pause_enabled(), state.playback() == PlaybackState::Playing);
        }
        assert_eq!(state.playback(), expected);
    }

    #[test]
    fn test_noop_transitions_report_unchanged() {
        let mut state = PlayerState::default();
        assert!(!state.request_play());
        assert!(state.request_pause());
        assert!(!state.request_pause());
    }

    #[test]
    fn test_select_source_autoplays_and_bumps_generation() {
        let mut state = PlayerState::default();
        state.request_pause();
        let clip = VideoSource::File("clip.mp4".into());

        assert!(state.select_source(clip.clone()));
        assert!(state.select_source(clip.clone()));
        assert_eq!(state.source(), &clip);
        assert_eq!(state.source_generation(), 2);
        assert_eq!(state.playback(), PlaybackState::Playing);
        assert!(!state.play_enabled());
        assert!(state.pause_enabled());
    }

    #[test]
    fn test_resize_same_width_is_noop() {
        let mut state = PlayerState::new(VideoSource::default(), 1024);
        assert!(!state.resize(1024));
        assert!(state.resize(768));
        assert_eq!(state.surface_dimensions(), Dimensions::new(768, 432));
    }

    #[test]
    fn test_models_ready_is_set_once() {
        let mut state = PlayerState::default();
        assert!(state.models_loaded());
        assert!(!state.is_loading());
        assert!(state.upload_visible());
        assert!(!state.models_loaded());
        assert!(!state.models_failed("late"));
        assert_eq!(state.models(), &ModelReadiness::Ready);
    }

    #[test]
    fn test_model_failure_keeps_loading_flag_and_records_error() {
        let mut state = PlayerState::default();
        assert!(state.models_failed("network down"));
        assert!(state.is_loading());
        assert!(!state.upload_visible());
        assert_eq!(
            state.last_error(),
            Some(&PlayerError::ModelLoad("network down".into()))
        );
        // no recovery
        assert!(!state.models_loaded());
        assert!(state.is_loading());
    }

    #[test]
    fn test_media_end_pauses() {
        let mut state = PlayerState::default();
        assert!(state.media_ended());
        assert!(state.play_enabled());
    }

    #[test]
    fn test_new_source_clears_media_error() {
        let mut state = PlayerState::default();
        state.record_error(PlayerError::Media("moov atom not found".into()));
        state.select_source(VideoSource::File("clip.mp4".into()));
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_model_load_error_survives_clear() {
        let mut state = PlayerState::default();
        state.models_failed("network down");
        state.select_source(VideoSource::File("clip.mp4".into()));
        assert_eq!(
            state.last_error(),
            Some(&PlayerError::ModelLoad("network down".into()))
        );
    }
}
