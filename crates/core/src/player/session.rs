//! One render loop and one detection poller with their two surfaces,
//! tied to a single (source, width) pair.

use crate::player::controller::PlayerConfig;
use crate::player::detection_poller::{AnalyzerSlot, DetectionPoller, PollerEvent, PollerSettings};
use crate::player::live_count::LiveCount;
use crate::player::media::FrameSlot;
use crate::player::render_loop::RenderLoop;
use crate::player::surface::SharedSurface;
use crate::shared::geometry::Dimensions;

/// Live thread counts across all sessions.
#[derive(Clone, Debug, Default)]
pub struct LoopCounters {
    pub render_loops: LiveCount,
    pub detection_timers: LiveCount,
}

pub struct SurfaceSession {
    dimensions: Dimensions,
    render: SharedSurface,
    overlay: SharedSurface,
    render_loop: RenderLoop,
    poller: DetectionPoller,
    stopped: bool,
}

impl SurfaceSession {
    pub fn start(
        config: &PlayerConfig,
        frames: FrameSlot,
        analyzer: AnalyzerSlot,
        dimensions: Dimensions,
        counters: &LoopCounters,
    ) -> Self {
        let render = SharedSurface::new(dimensions);
        let overlay = SharedSurface::new(dimensions);

        let render_loop = RenderLoop::start(
            frames,
            render.clone(),
            config.refresh_interval,
            config.render_offset,
            &counters.render_loops,
        );
        let poller = DetectionPoller::start(
            render.clone(),
            overlay.clone(),
            analyzer,
            PollerSettings {
                interval: config.detection_interval,
                request: config.request,
                draw: config.draw,
                dimensions,
            },
            &counters.detection_timers,
        );

        log::info!(
            "Surface session started at {}x{}",
            dimensions.width,
            dimensions.height
        );
        Self {
            dimensions,
            render,
            overlay,
            render_loop,
            poller,
            stopped: false,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn render_surface(&self) -> &SharedSurface {
        &self.render
    }

    pub fn overlay_surface(&self) -> &SharedSurface {
        &self.overlay
    }

    pub fn try_event(&self) -> Option<PollerEvent> {
        self.poller.try_event()
    }

    /// Stops both loops, then disposes both surfaces.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.render_loop.stop();
        self.poller.stop();
        self.render.dispose();
        self.overlay.dispose();
        log::debug!(
            "Surface session at {}x{} stopped",
            self.dimensions.width,
            self.dimensions.height
        );
    }
}

impl Drop for SurfaceSession {
    fn drop(&mut self) {
        self.stop();
    }
}
