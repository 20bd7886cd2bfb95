pub mod controller;
pub mod detection_poller;
pub mod live_count;
pub mod media;
pub mod overlay;
pub mod render_loop;
pub mod session;
pub mod state;
pub mod surface;
pub mod video_player;
