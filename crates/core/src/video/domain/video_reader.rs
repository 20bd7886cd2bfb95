use crate::shared::frame::Frame;
use crate::video::domain::video_source::VideoSource;

/// Stream properties reported when a source is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub codec: String,
}

/// Reads frames from a video source.
///
/// Implementations handle I/O details (codec, container format, network)
/// while the player works with the abstract `Frame` and `VideoMetadata`
/// types.
pub trait VideoReader: Send {
    /// Opens a source and returns its metadata.
    fn open(&mut self, source: &VideoSource) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader.
    fn close(&mut self);
}
