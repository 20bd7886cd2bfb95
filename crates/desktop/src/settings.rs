use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use faceoverlay_core::detection::domain::face_analyzer::{
    TinyFaceDetectorOptions, DEFAULT_INPUT_SIZE, DEFAULT_SCORE_THRESHOLD,
};
use faceoverlay_core::player::controller::PlayerConfig;
use faceoverlay_core::shared::constants::{DEFAULT_MODELS_DIR, DETECTION_INTERVAL};
use faceoverlay_core::shared::model_resolver::ModelLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub models_dir: PathBuf,
    /// Bundles missing from `models_dir` are downloaded from here.
    pub model_base_url: Option<String>,
    pub input_size: u32,
    pub score_threshold: f64,
    pub detection_interval_ms: u64,
    pub draw_landmarks: bool,
    pub appearance: Appearance,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            model_base_url: None,
            input_size: DEFAULT_INPUT_SIZE,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            detection_interval_ms: DETECTION_INTERVAL.as_millis() as u64,
            draw_landmarks: false,
            appearance: Appearance::System,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("FaceOverlay").join("settings.json"))
    }

    /// Loads the user's settings, writing the defaults out on first run so
    /// there is a file to edit.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(&path);
            return settings;
        }
        Self::load_from(&path)
    }

    /// Missing or unreadable files give the defaults; missing fields fall
    /// back individually.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Could not save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Could not serialize settings: {e}"),
        }
    }

    pub fn model_location(&self) -> ModelLocation {
        let location = ModelLocation::directory(&self.models_dir);
        match &self.model_base_url {
            Some(url) => location.with_base_url(url.clone()),
            None => location,
        }
    }

    /// Player configuration; invalid detector values fall back to the
    /// defaults.
    pub fn player_config(&self) -> PlayerConfig {
        let detector = TinyFaceDetectorOptions::new(self.input_size, self.score_threshold)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring detector settings: {e}");
                TinyFaceDetectorOptions::default()
            });
        let mut config = PlayerConfig::default().with_detector(detector);
        if self.detection_interval_ms > 0 {
            config.detection_interval = Duration::from_millis(self.detection_interval_ms);
        }
        config.draw.draw_landmarks = self.draw_landmarks;
        config
    }
}
