pub mod detection;
pub mod player;
pub mod shared;
pub mod video;
