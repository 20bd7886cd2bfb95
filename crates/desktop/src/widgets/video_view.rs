use iced::widget::{image, Space};
use iced::{ContentFit, Element, Length};

use faceoverlay_core::player::surface::SharedSurface;

/// Display copy of a shared surface, re-uploaded only when it changed.
#[derive(Default)]
pub struct SurfaceView {
    handle: Option<image::Handle>,
    /// (session generation, surface version) of the cached pixels.
    shown: Option<(u64, u64)>,
}

impl SurfaceView {
    pub fn refresh(&mut self, surface: Option<&SharedSurface>, generation: u64) {
        let Some(surface) = surface else {
            self.handle = None;
            self.shown = None;
            return;
        };
        let key = (generation, surface.version());
        if self.shown == Some(key) {
            return;
        }
        let (pixels, version) = surface.image();
        let (width, height) = pixels.dimensions();
        self.handle = Some(image::Handle::from_rgba(width, height, pixels.into_raw()));
        self.shown = Some((generation, version));
    }

    pub fn view<'a, Message: 'a>(&self) -> Element<'a, Message> {
        match &self.handle {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .content_fit(ContentFit::Contain)
                .into(),
            None => Space::new().width(Length::Fill).into(),
        }
    }
}
