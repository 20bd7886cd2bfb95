//! Draws face detections onto the overlay surface.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::detection::domain::face_detection::FaceDetection;
use crate::detection::domain::face_landmarks::FaceLandmarks;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawOptions {
    pub box_color: Rgba<u8>,
    pub line_width: u32,
    pub draw_landmarks: bool,
    pub landmark_color: Rgba<u8>,
    pub landmark_radius: i32,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            box_color: Rgba([0, 0, 255, 255]),
            line_width: 2,
            draw_landmarks: false,
            landmark_color: Rgba([0, 255, 0, 255]),
            landmark_radius: 1,
        }
    }
}

/// Draws every detection's box, and its landmark contours when enabled.
///
/// Geometry must already be in the image's coordinate space.
pub fn draw_detections(image: &mut RgbaImage, detections: &[FaceDetection], options: &DrawOptions) {
    for detection in detections {
        let bbox = detection.bbox;
        for inset in 0..options.line_width {
            let width = bbox.width as i64 - 2 * inset as i64;
            let height = bbox.height as i64 - 2 * inset as i64;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(bbox.x as i32 + inset as i32, bbox.y as i32 + inset as i32)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(image, rect, options.box_color);
        }

        if !options.draw_landmarks {
            continue;
        }
        if let Some(landmarks) = &detection.landmarks {
            draw_landmarks(image, landmarks, options);
        }
    }
}

/// Connects each facial region's points, then dots every point.
fn draw_landmarks(image: &mut RgbaImage, landmarks: &FaceLandmarks, options: &DrawOptions) {
    for (points, closed) in landmarks.contours() {
        for pair in points.windows(2) {
            draw_line_segment_mut(
                image,
                (pair[0].x as f32, pair[0].y as f32),
                (pair[1].x as f32, pair[1].y as f32),
                options.landmark_color,
            );
        }
        if let (true, Some(first), Some(last)) = (closed, points.first(), points.last()) {
            draw_line_segment_mut(
                image,
                (last.x as f32, last.y as f32),
                (first.x as f32, first.y as f32),
                options.landmark_color,
            );
        }
    }

    for point in landmarks.points() {
        let center = (point.x as i32, point.y as i32);
        draw_filled_circle_mut(image, center, options.landmark_radius, options.landmark_color);
    }
}
