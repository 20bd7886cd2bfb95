//! Continuous copy of the media element's current frame onto the render
//! surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Sender};

use crate::player::live_count::LiveCount;
use crate::player::media::FrameSlot;
use crate::player::surface::SharedSurface;

/// Redraws the render surface every `interval` from the latest frame.
///
/// `stop` is synchronous: it returns after the thread has exited, and no
/// write reaches the surface afterwards.
pub struct RenderLoop {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl RenderLoop {
    pub fn start(
        slot: FrameSlot,
        surface: SharedSurface,
        interval: Duration,
        offset: (i64, i64),
        live: &LiveCount,
    ) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_clone = cancelled.clone();
        let guard = live.enter();

        let handle = thread::spawn(move || {
            let _guard = guard;
            let ticker = crossbeam_channel::tick(interval);
            let mut drawn_version: Option<u64> = None;

            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => {
                        if cancelled_clone.load(Ordering::Relaxed) {
                            break;
                        }
                        let Some((frame, version)) = slot.latest() else {
                            continue;
                        };
                        if drawn_version == Some(version) {
                            continue;
                        }
                        match surface.write(|s| s.draw_frame(&frame, offset)) {
                            Ok(()) => drawn_version = Some(version),
                            Err(_) => break,
                        }
                    }
                }
            }
            log::trace!("Render loop exited");
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            cancelled,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stop(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Render loop thread panicked");
            }
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
