use std::path::PathBuf;
use std::time::Instant;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{column, container, row, stack, text, Space};
use iced::{Element, Length, Size, Subscription, Task, Theme};

use faceoverlay_core::detection::infrastructure::face_nets::FaceNets;
use faceoverlay_core::detection::infrastructure::model_loader::{
    LoaderMessage, ModelLoadError, ModelLoader,
};
use faceoverlay_core::player::controller::PlayerController;
use faceoverlay_core::player::video_player::VideoPlayer;
use faceoverlay_core::shared::constants::{REFRESH_INTERVAL, VIDEO_EXTENSIONS};
use faceoverlay_core::video::domain::video_source::{is_supported_video, VideoSource};

use crate::settings::Settings;
use crate::theme;
use crate::widgets::primary_button::primary_button;
use crate::widgets::video_view::SurfaceView;

/// Viewport width assumed until the first resize event arrives.
pub const INITIAL_WIDTH: f32 = 1024.0;

/// Everything decided before the window opens.
#[derive(Debug, Clone)]
pub struct Launch {
    pub source: VideoSource,
    pub settings: Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Upload,
    Play,
    Pause,
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick(Instant),
    WindowResized(Size),
    SelectFile,
    FileSelected(Option<PathBuf>),
    Play,
    Pause,
    Hover(Control, bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Download {
    model: &'static str,
    downloaded: u64,
    total: u64,
}

/// What draining the loader channel produced.
enum LoaderPoll {
    Pending(Option<Download>),
    Finished(Result<FaceNets, ModelLoadError>),
}

/// Reads every queued loader message. A channel that closes without a
/// result counts as a failed load.
fn drain_loader(loader: &Receiver<LoaderMessage>) -> LoaderPoll {
    let mut latest = None;
    loop {
        match loader.try_recv() {
            Ok(LoaderMessage::DownloadProgress {
                model,
                downloaded,
                total,
            }) => {
                latest = Some(Download {
                    model,
                    downloaded,
                    total,
                });
            }
            Ok(LoaderMessage::Finished(result)) => return LoaderPoll::Finished(result),
            Err(TryRecvError::Empty) => return LoaderPoll::Pending(latest),
            Err(TryRecvError::Disconnected) => {
                log::error!("Face model loader disconnected without a result");
                return LoaderPoll::Finished(Err(ModelLoadError::Disconnected));
            }
        }
    }
}

pub struct App {
    settings: Settings,
    controller: PlayerController<VideoPlayer>,
    loader: Option<Receiver<LoaderMessage>>,
    download: Option<Download>,
    render_view: SurfaceView,
    overlay_view: SurfaceView,
    hovered: Option<Control>,
}

impl App {
    pub fn new(launch: Launch) -> (Self, Task<Message>) {
        let Launch { source, settings } = launch;

        let mut controller = PlayerController::new(
            VideoPlayer::ffmpeg(),
            settings.player_config(),
            source,
            INITIAL_WIDTH as u32,
        );
        controller.mount();

        let loader = ModelLoader::new(settings.model_location()).spawn();

        (
            Self {
                settings,
                controller,
                loader: Some(loader),
                download: None,
                render_view: SurfaceView::default(),
                overlay_view: SurfaceView::default(),
                hovered: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(_) => {
                self.poll_loader();
                self.controller.pump();
                let generation = self.controller.session_generation();
                self.render_view
                    .refresh(self.controller.render_surface(), generation);
                self.overlay_view
                    .refresh(self.controller.overlay_surface(), generation);
            }
            Message::WindowResized(size) => {
                self.controller.resize(size.width as u32);
            }
            Message::SelectFile => {
                if !self.controller.state().upload_visible() {
                    return Task::none();
                }
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Select a video")
                            .add_filter("MP4 Video", VIDEO_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::FileSelected,
                );
            }
            Message::FileSelected(Some(path)) => {
                if is_supported_video(&path) {
                    self.controller.select_file(path);
                } else {
                    log::warn!("Ignoring unsupported file {}", path.display());
                }
            }
            Message::FileSelected(None) => {}
            Message::Play => self.controller.play(),
            Message::Pause => self.controller.pause(),
            Message::Hover(control, true) => self.hovered = Some(control),
            Message::Hover(control, false) => {
                if self.hovered == Some(control) {
                    self.hovered = None;
                }
            }
        }
        Task::none()
    }

    fn poll_loader(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        match drain_loader(loader) {
            LoaderPoll::Pending(Some(download)) => self.download = Some(download),
            LoaderPoll::Pending(None) => {}
            LoaderPoll::Finished(result) => {
                self.controller.on_models_loaded(result);
                self.download = None;
                self.loader = None;
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let state = self.controller.state();

        let status: Element<'_, Message> = if state.is_loading() {
            text(self.loading_label()).into()
        } else {
            text("Face detection active").into()
        };

        let mut controls = row![].spacing(10);
        if state.upload_visible() {
            controls = controls.push(primary_button(
                "Upload video",
                Some(Message::SelectFile),
                self.hovered == Some(Control::Upload),
                |h| Message::Hover(Control::Upload, h),
            ));
        }
        controls = controls
            .push(primary_button(
                "Play",
                state.play_enabled().then_some(Message::Play),
                self.hovered == Some(Control::Play),
                |h| Message::Hover(Control::Play, h),
            ))
            .push(primary_button(
                "Pause",
                state.pause_enabled().then_some(Message::Pause),
                self.hovered == Some(Control::Pause),
                |h| Message::Hover(Control::Pause, h),
            ))
            .push(Space::new().width(Length::Fill))
            .push(status);

        let error: Element<'_, Message> = match state.last_error() {
            Some(e) => text(e.to_string()).style(text::danger).into(),
            None => Space::new().into(),
        };

        let video = stack![self.render_view.view(), self.overlay_view.view()];

        let summary = match self.controller.last_detection() {
            Some(summary) => text(summary_label(
                summary.faces,
                summary.expressions.iter().flatten().map(|e| e.to_string()),
            )),
            None => text(state.source().to_string()),
        };

        container(column![controls, error, video, summary].spacing(12))
            .padding(16)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn loading_label(&self) -> String {
        if let Some(error) = self.controller.state().last_error() {
            if self.loader.is_none() {
                return format!("Face detection unavailable: {error}");
            }
        }
        match &self.download {
            Some(d) if d.total > 0 => format!(
                "Downloading {} ({}%)",
                d.model,
                d.downloaded * 100 / d.total
            ),
            Some(d) => format!("Downloading {} ({} KB)", d.model, d.downloaded / 1024),
            None => "Loading face models...".to_string(),
        }
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(REFRESH_INTERVAL).map(Message::Tick),
            iced::window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
        ])
    }
}

fn summary_label(faces: usize, expressions: impl Iterator<Item = String>) -> String {
    let expressions: Vec<String> = expressions.collect();
    let noun = if faces == 1 { "face" } else { "faces" };
    if expressions.is_empty() {
        format!("{faces} {noun}")
    } else {
        format!("{faces} {noun}: {}", expressions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_label() {
        assert_eq!(summary_label(0, std::iter::empty()), "0 faces");
        assert_eq!(
            summary_label(1, ["happy".to_string()].into_iter()),
            "1 face: happy"
        );
        assert_eq!(
            summary_label(2, ["sad".to_string(), "neutral".to_string()].into_iter()),
            "2 faces: sad, neutral"
        );
    }

    #[test]
    fn test_drain_loader_keeps_latest_progress() {
        let (tx, rx) = crossbeam_channel::unbounded();
        for downloaded in [10, 20] {
            tx.send(LoaderMessage::DownloadProgress {
                model: "tiny_face_detector.onnx",
                downloaded,
                total: 40,
            })
            .unwrap();
        }
        match drain_loader(&rx) {
            LoaderPoll::Pending(Some(download)) => assert_eq!(download.downloaded, 20),
            _ => panic!("expected pending progress"),
        }
        assert!(matches!(drain_loader(&rx), LoaderPoll::Pending(None)));
    }

    #[test]
    fn test_drain_loader_reports_lost_loader_as_failure() {
        let (tx, rx) = crossbeam_channel::unbounded::<LoaderMessage>();
        drop(tx);
        assert!(matches!(
            drain_loader(&rx),
            LoaderPoll::Finished(Err(ModelLoadError::Disconnected))
        ));
    }
}
