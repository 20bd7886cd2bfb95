mod app;
mod settings;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::Parser;

use faceoverlay_core::video::domain::video_source::VideoSource;

use app::{App, Launch, INITIAL_WIDTH};
use settings::Settings;

/// Plays a video with a live face detection overlay.
#[derive(Parser, Debug)]
#[command(name = "faceoverlay")]
struct Cli {
    /// Video to open: a local .mp4 path or a URL. Defaults to a sample stream.
    #[arg(long)]
    video: Option<String>,

    /// Directory holding the four face model bundles.
    #[arg(long)]
    models: Option<PathBuf>,

    /// Base URL to download missing model bundles from.
    #[arg(long)]
    model_url: Option<String>,
}

impl Cli {
    fn into_launch(self, mut settings: Settings) -> Launch {
        if let Some(models) = self.models {
            settings.models_dir = models;
        }
        if let Some(url) = self.model_url {
            settings.model_base_url = Some(url);
        }
        let source = self
            .video
            .as_deref()
            .map(VideoSource::parse)
            .unwrap_or_default();
        Launch { source, settings }
    }
}

fn main() -> iced::Result {
    env_logger::init();

    let launch = Cli::parse().into_launch(Settings::load());
    log::info!(
        "Starting with {} (models from {})",
        launch.source,
        launch.settings.models_dir.display()
    );

    iced::application(move || App::new(launch.clone()), App::update, App::view)
        .title("FaceOverlay")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(INITIAL_WIDTH, 760.0),
            ..Default::default()
        })
        .run()
}
