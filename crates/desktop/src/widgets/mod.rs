pub mod primary_button;
pub mod video_view;
