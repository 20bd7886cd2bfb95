use std::fmt;
use std::path::{Path, PathBuf};

use crate::shared::constants::{DEFAULT_VIDEO_URL, VIDEO_EXTENSIONS};

/// The video currently bound to the media element.
///
/// Replaced wholesale on selection; no history is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoSource {
    /// A remote stream that FFmpeg opens by URL.
    Url(String),
    /// A local file picked by the user.
    File(PathBuf),
}

impl VideoSource {
    /// Parses user input: anything with a URL scheme is remote, the rest is a path.
    pub fn parse(input: &str) -> Self {
        if input.contains("://") {
            VideoSource::Url(input.to_string())
        } else {
            VideoSource::File(PathBuf::from(input))
        }
    }

    /// Location string handed to the demuxer.
    pub fn location(&self) -> PathBuf {
        match self {
            VideoSource::Url(url) => PathBuf::from(url),
            VideoSource::File(path) => path.clone(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, VideoSource::File(_))
    }
}

impl Default for VideoSource {
    fn default() -> Self {
        VideoSource::Url(DEFAULT_VIDEO_URL.to_string())
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::Url(url) => write!(f, "{url}"),
            VideoSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Whether the picker would offer this file.
pub fn is_supported_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_sample_url() {
        assert_eq!(
            VideoSource::default(),
            VideoSource::Url(DEFAULT_VIDEO_URL.to_string())
        );
        assert!(!VideoSource::default().is_local());
    }

    #[rstest]
    #[case::http("http://host/clip.mp4", false)]
    #[case::https("https://host/clip.mp4", false)]
    #[case::relative("clip.mp4", true)]
    #[case::absolute("/videos/clip.mp4", true)]
    fn test_parse(#[case] input: &str, #[case] local: bool) {
        let source = VideoSource::parse(input);
        assert_eq!(source.is_local(), local);
        assert_eq!(source.to_string(), input);
        assert_eq!(source.location(), PathBuf::from(input));
    }

    #[rstest]
    #[case::mp4("clip.mp4", true)]
    #[case::upper("CLIP.MP4", true)]
    #[case::mov("clip.mov", false)]
    #[case::none("clip", false)]
    fn test_is_supported_video(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_supported_video(Path::new(name)), expected);
    }
}
