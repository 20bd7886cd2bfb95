//! Fixed-interval face detection drawn onto the overlay surface.
//!
//! A timer thread snapshots the render surface every interval and hands
//! the frame to a worker thread that runs the analyzer and draws the
//! rescaled results. While a detection is in flight further ticks are
//! skipped, and results whose tick sequence is not newer than the last
//! drawn one are dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};

use crate::detection::domain::face_analyzer::{DetectionRequest, FaceAnalyzer};
use crate::detection::domain::face_detection::{resize_results, FaceDetection};
use crate::detection::domain::face_expressions::Expression;
use crate::player::overlay::{draw_detections, DrawOptions};
use crate::player::live_count::LiveCount;
use crate::player::surface::SharedSurface;
use crate::shared::frame::Frame;
use crate::shared::geometry::Dimensions;

/// The loaded analyzer, shared by whichever poller is current.
/// `None` until the models are ready.
pub type AnalyzerSlot = Arc<Mutex<Option<Box<dyn FaceAnalyzer>>>>;

/// What was drawn for one detection tick.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionSummary {
    pub seq: u64,
    pub faces: usize,
    /// Dominant expression per face, when expressions were requested.
    pub expressions: Vec<Option<Expression>>,
}

impl DetectionSummary {
    fn from_detections(seq: u64, detections: &[FaceDetection]) -> Self {
        Self {
            seq,
            faces: detections.len(),
            expressions: detections
                .iter()
                .map(|d| d.expressions.as_ref().map(|e| e.dominant().0))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PollerEvent {
    Drawn(DetectionSummary),
    Failed { seq: u64, error: String },
}

#[derive(Clone, Debug)]
pub struct PollerSettings {
    pub interval: Duration,
    pub request: DetectionRequest,
    pub draw: DrawOptions,
    /// Overlay size; detections are rescaled into it.
    pub dimensions: Dimensions,
}

/// Admits results in strictly increasing tick order.
#[derive(Debug, Default)]
struct TickGate {
    last_drawn: u64,
}

impl TickGate {
    fn admit(&mut self, seq: u64) -> bool {
        if seq <= self.last_drawn {
            return false;
        }
        self.last_drawn = seq;
        true
    }
}

struct Job {
    seq: u64,
    frame: Frame,
}

pub struct DetectionPoller {
    stop_tx: Option<Sender<()>>,
    timer: Option<JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
    events: Receiver<PollerEvent>,
}

impl DetectionPoller {
    pub fn start(
        render: SharedSurface,
        overlay: SharedSurface,
        analyzer: AnalyzerSlot,
        settings: PollerSettings,
        live: &LiveCount,
    ) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(1);
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let stopped = Arc::new(AtomicBool::new(false));
        let in_flight = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            analyzer: analyzer.clone(),
            overlay,
            settings: settings.clone(),
            stopped: stopped.clone(),
            in_flight: in_flight.clone(),
            events: event_tx,
            gate: TickGate::default(),
        };
        thread::spawn(move || worker.run(job_rx));

        let guard = live.enter();
        let timer_stopped = stopped.clone();
        let timer = thread::spawn(move || {
            let _guard = guard;
            let ticker = crossbeam_channel::tick(settings.interval);
            let mut seq: u64 = 0;

            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        if timer_stopped.load(Ordering::Relaxed) {
                            break;
                        }
                        if in_flight.load(Ordering::Acquire) {
                            log::trace!("Detection tick skipped: previous tick in flight");
                            continue;
                        }
                        // A poisoned slot is handed to the worker so the failure is reported.
                        let ready = match analyzer.try_lock() {
                            Ok(slot) => slot.is_some(),
                            Err(TryLockError::Poisoned(_)) => true,
                            Err(TryLockError::WouldBlock) => false,
                        };
                        if !ready {
                            continue;
                        }

                        seq += 1;
                        let Ok(frame) = render.snapshot(seq as usize) else {
                            break;
                        };
                        in_flight.store(true, Ordering::Release);
                        if job_tx.send(Job { seq, frame }).is_err() {
                            break;
                        }
                    }
                }
            }
            log::trace!("Detection timer exited after {seq} ticks");
        });

        Self {
            stop_tx: Some(stop_tx),
            timer: Some(timer),
            stopped,
            events: event_rx,
        }
    }

    /// Cancels the timer and waits for it to exit. An in-flight detection
    /// finishes on its own but its result is discarded.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(timer) = self.timer.take() {
            if timer.join().is_err() {
                log::error!("Detection timer thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn try_event(&self) -> Option<PollerEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for DetectionPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    analyzer: AnalyzerSlot,
    overlay: SharedSurface,
    settings: PollerSettings,
    stopped: Arc<AtomicBool>,
    in_flight: Arc<AtomicBool>,
    events: Sender<PollerEvent>,
    gate: TickGate,
}

impl Worker {
    fn run(mut self, jobs: Receiver<Job>) {
        for job in jobs {
            self.handle(job);
            self.in_flight.store(false, Ordering::Release);
        }
    }

    /// Runs the analyzer on `frame`, or `None` while no analyzer is loaded.
    /// A panicking analyzer is reported as a failed tick.
    fn analyze(&self, frame: &Frame) -> Option<Result<Vec<FaceDetection>, String>> {
        let mut slot = match self.analyzer.lock() {
            Ok(slot) => slot,
            Err(_) => return Some(Err("face analyzer is unusable after a panic".to_string())),
        };
        let analyzer = slot.as_mut()?;
        let request = &self.settings.request;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            analyzer.analyze(frame, request).map_err(|e| e.to_string())
        }));
        Some(outcome.unwrap_or_else(|_| Err("face analyzer panicked".to_string())))
    }

    fn handle(&mut self, job: Job) {
        let Some(result) = self.analyze(&job.frame) else {
            return;
        };

        if self.stopped.load(Ordering::Acquire) {
            log::debug!("Discarding detection tick {} after stop", job.seq);
            return;
        }

        let detections = match result {
            Ok(detections) => detections,
            Err(error) => {
                log::warn!("Detection tick {} failed: {error}", job.seq);
                let _ = self.events.send(PollerEvent::Failed {
                    seq: job.seq,
                    error,
                });
                return;
            }
        };

        if !self.gate.admit(job.seq) {
            log::debug!("Discarding stale detection tick {}", job.seq);
            return;
        }

        let target = self.settings.dimensions;
        let scaled = resize_results(&detections, job.frame.dimensions(), target);
        let draw = &self.settings.draw;
        let written = self.overlay.write(|surface| {
            surface.match_dimensions(target);
            draw_detections(surface.image_mut(), &scaled, draw);
        });

        match written {
            Ok(()) => {
                let summary = DetectionSummary::from_detections(job.seq, &scaled);
                log::trace!("Tick {}: drew {} faces", summary.seq, summary.faces);
                let _ = self.events.send(PollerEvent::Drawn(summary));
            }
            Err(_) => log::debug!("Overlay disposed before tick {} was drawn", job.seq),
        }
    }
}
