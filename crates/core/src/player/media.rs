//! The media element seam: something that plays a [`VideoSource`] and
//! publishes its current frame.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::video::domain::video_source::VideoSource;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("media decode thread is not running")]
    Disconnected,
}

/// Asynchronous notifications from the media element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaEvent {
    /// The current source could not be opened or decoded.
    Failed(String),
    /// Playback reached the end of the stream.
    Ended,
}

/// Latest decoded frame, shared between the decoder and the render loop.
///
/// The version increases on every publish so readers can skip redraws
/// when nothing changed.
#[derive(Clone, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<SlotState>>,
}

#[derive(Default)]
struct SlotState {
    frame: Option<Arc<Frame>>,
    version: u64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: Frame) {
        let mut state = self.inner.lock().unwrap();
        state.frame = Some(Arc::new(frame));
        state.version += 1;
    }

    /// Drops the current frame, e.g. when a new source is loaded.
    pub fn clear(&self) {
        let mut state = self.inner.lock().unwrap();
        state.frame = None;
        state.version += 1;
    }

    pub fn latest(&self) -> Option<(Arc<Frame>, u64)> {
        let state = self.inner.lock().unwrap();
        state.frame.clone().map(|frame| (frame, state.version))
    }

    pub fn version(&self) -> u64 {
        self.inner.lock().unwrap().version
    }
}

/// A playable video element.
///
/// Commands return immediately; decode errors and end-of-stream arrive
/// later through [`MediaElement::poll_event`].
pub trait MediaElement: Send {
    /// Replaces the source. Playback does not start until `play`.
    fn load(&mut self, source: &VideoSource) -> Result<(), MediaError>;
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self) -> Result<(), MediaError>;
    fn poll_event(&mut self) -> Option<MediaEvent>;
    fn frame_slot(&self) -> FrameSlot;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0; 2 * 2 * 3], 2, 2, 3, index)
    }

    #[test]
    fn test_empty_slot_has_no_frame() {
        let slot = FrameSlot::new();
        assert!(slot.latest().is_none());
        assert_eq!(slot.version(), 0);
    }

    #[test]
    fn test_publish_bumps_version_and_is_shared_between_clones() {
        let slot = FrameSlot::new();
        let reader = slot.clone();
        slot.publish(frame(3));
        slot.publish(frame(4));

        let (latest, version) = reader.latest().unwrap();
        assert_eq!(latest.index(), 4);
        assert_eq!(version, 2);
    }

    #[test]
    fn test_clear_drops_frame() {
        let slot = FrameSlot::new();
        slot.publish(frame(0));
        slot.clear();
        assert!(slot.latest().is_none());
        assert_eq!(slot.version(), 2);
    }
}
