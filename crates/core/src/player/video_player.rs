//! FFmpeg-backed media element.
//!
//! A dedicated decode thread owns the [`VideoReader`], paces frames to the
//! stream's frame rate and publishes each one into a [`FrameSlot`].
//! Commands reach the thread over a channel, so a `play` sent while a
//! source is still opening takes effect once the open finishes.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::player::media::{FrameSlot, MediaElement, MediaError, MediaEvent};
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_source::VideoSource;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

/// Used when a stream does not report a usable frame rate.
const FALLBACK_FPS: f64 = 30.0;

enum Command {
    Load(VideoSource),
    Play,
    Pause,
    Shutdown,
}

/// How a single playback run ended.
enum RunEnd {
    Ended,
    Failed,
    Load(VideoSource),
    Shutdown,
}

pub struct VideoPlayer {
    commands: Sender<Command>,
    events: Receiver<MediaEvent>,
    slot: FrameSlot,
}

impl VideoPlayer {
    pub fn new(reader: Box<dyn VideoReader>) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let slot = FrameSlot::new();
        let thread_slot = slot.clone();

        thread::spawn(move || decode_thread(reader, command_rx, event_tx, thread_slot));

        Self {
            commands: command_tx,
            events: event_rx,
            slot,
        }
    }

    pub fn ffmpeg() -> Self {
        Self::new(Box::new(FfmpegReader::new()))
    }

    fn send(&self, command: Command) -> Result<(), MediaError> {
        self.commands
            .send(command)
            .map_err(|_| MediaError::Disconnected)
    }
}

impl MediaElement for VideoPlayer {
    fn load(&mut self, source: &VideoSource) -> Result<(), MediaError> {
        self.send(Command::Load(source.clone()))
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.send(Command::Play)
    }

    fn pause(&mut self) -> Result<(), MediaError> {
        self.send(Command::Pause)
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.events.try_recv().ok()
    }

    fn frame_slot(&self) -> FrameSlot {
        self.slot.clone()
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        // Not joined: the thread may be blocked opening a remote stream and
        // exits at its next command check.
        let _ = self.commands.send(Command::Shutdown);
    }
}

fn decode_thread(
    mut reader: Box<dyn VideoReader>,
    commands: Receiver<Command>,
    events: Sender<MediaEvent>,
    slot: FrameSlot,
) {
    let mut source: Option<VideoSource> = None;
    let mut playing = false;

    loop {
        if let (Some(current), true) = (source.clone(), playing) {
            let end = run_source(reader.as_mut(), &current, &commands, &events, &slot);
            reader.close();
            match end {
                // Source is kept, so the next play starts again from the top.
                RunEnd::Ended | RunEnd::Failed => playing = false,
                RunEnd::Load(next) => {
                    slot.clear();
                    source = Some(next);
                    playing = false;
                }
                RunEnd::Shutdown => break,
            }
            continue;
        }

        match commands.recv() {
            Ok(Command::Load(next)) => {
                log::info!("Loading video source {next}");
                slot.clear();
                source = Some(next);
                playing = false;
            }
            Ok(Command::Play) => playing = true,
            Ok(Command::Pause) => playing = false,
            Ok(Command::Shutdown) | Err(_) => break,
        }
    }

    log::debug!("Media decode thread exiting");
}

fn run_source(
    reader: &mut dyn VideoReader,
    source: &VideoSource,
    commands: &Receiver<Command>,
    events: &Sender<MediaEvent>,
    slot: &FrameSlot,
) -> RunEnd {
    let metadata = match reader.open(source) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::error!("Failed to open {source}: {e}");
            let _ = events.send(MediaEvent::Failed(e.to_string()));
            return RunEnd::Failed;
        }
    };
    log::info!(
        "Playing {source}: {}x{} @ {:.2} fps ({})",
        metadata.width,
        metadata.height,
        metadata.fps,
        metadata.codec
    );

    let fps = if metadata.fps > 0.0 {
        metadata.fps
    } else {
        FALLBACK_FPS
    };
    let frame_interval = Duration::from_secs_f64(1.0 / fps);
    let mut deadline = Instant::now();

    for frame in reader.frames() {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Decode error in {source}: {e}");
                let _ = events.send(MediaEvent::Failed(e.to_string()));
                return RunEnd::Failed;
            }
        };
        slot.publish(frame);
        deadline += frame_interval;

        if let Some(end) = wait_until(&mut deadline, commands) {
            return end;
        }
    }

    let _ = events.send(MediaEvent::Ended);
    RunEnd::Ended
}

/// Handles commands until `deadline` passes. Pausing blocks here and
/// shifts the deadline on resume. Returns `Some` when the run must stop.
fn wait_until(deadline: &mut Instant, commands: &Receiver<Command>) -> Option<RunEnd> {
    loop {
        match commands.recv_deadline(*deadline) {
            Ok(Command::Play) => {}
            Ok(Command::Pause) => {
                let paused_at = Instant::now();
                loop {
                    match commands.recv() {
                        Ok(Command::Play) => break,
                        Ok(Command::Pause) => {}
                        Ok(Command::Load(next)) => return Some(RunEnd::Load(next)),
                        Ok(Command::Shutdown) | Err(_) => return Some(RunEnd::Shutdown),
                    }
                }
                *deadline += paused_at.elapsed();
            }
            Ok(Command::Load(next)) => return Some(RunEnd::Load(next)),
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                return Some(RunEnd::Shutdown)
            }
            Err(RecvTimeoutError::Timeout) => return None,
        }
    }
}
