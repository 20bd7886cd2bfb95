//! 68-point facial landmarks in the iBUG / Multi-PIE layout.
//!
//! Index ranges: jaw 0-16, eyebrows 17-26, nose 27-35, eyes 36-47,
//! mouth 48-67.

use std::ops::Range;

use crate::shared::geometry::Point;

pub const NUM_LANDMARKS: usize = 68;

const JAW: Range<usize> = 0..17;
const LEFT_EYEBROW: Range<usize> = 17..22;
const RIGHT_EYEBROW: Range<usize> = 22..27;
const NOSE: Range<usize> = 27..36;
const LEFT_EYE: Range<usize> = 36..42;
const RIGHT_EYE: Range<usize> = 42..48;
const MOUTH: Range<usize> = 48..68;

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point>) -> Result<Self, String> {
        if points.len() != NUM_LANDMARKS {
            return Err(format!(
                "expected {NUM_LANDMARKS} landmarks, got {}",
                points.len()
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn jaw_outline(&self) -> &[Point] {
        &self.points[JAW]
    }

    pub fn left_eyebrow(&self) -> &[Point] {
        &self.points[LEFT_EYEBROW]
    }

    pub fn right_eyebrow(&self) -> &[Point] {
        &self.points[RIGHT_EYEBROW]
    }

    pub fn nose(&self) -> &[Point] {
        &self.points[NOSE]
    }

    pub fn left_eye(&self) -> &[Point] {
        &self.points[LEFT_EYE]
    }

    pub fn right_eye(&self) -> &[Point] {
        &self.points[RIGHT_EYE]
    }

    pub fn mouth(&self) -> &[Point] {
        &self.points[MOUTH]
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p.scale(sx, sy)).collect(),
        }
    }

    /// Region outlines in drawing order, each flagged `true` when it
    /// closes back on its first point.
    pub fn contours(&self) -> [(&[Point], bool); 7] {
        [
            (self.jaw_outline(), false),
            (self.left_eyebrow(), false),
            (self.right_eyebrow(), false),
            (self.nose(), false),
            (self.left_eye(), true),
            (self.right_eye(), true),
            (self.mouth(), true),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn numbered() -> FaceLandmarks {
        FaceLandmarks::new((0..NUM_LANDMARKS).map(|i| Point::new(i as f64, 0.0)).collect())
            .unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_count() {
        assert!(FaceLandmarks::new(vec![Point::default(); 5]).is_err());
    }

    #[test]
    fn test_contours_partition_all_points_in_order() {
        let lm = numbered();
        let flattened: Vec<Point> = lm
            .contours()
            .iter()
            .flat_map(|(points, _)| points.iter().copied())
            .collect();
        assert_eq!(flattened, lm.points());
    }

    #[test]
    fn test_only_eyes_and_mouth_are_closed() {
        let lm = numbered();
        let closed: Vec<f64> = lm
            .contours()
            .iter()
            .filter(|(_, closed)| *closed)
            .map(|(points, _)| points[0].x)
            .collect();
        assert_eq!(closed, vec![36.0, 42.0, 48.0]);
        assert_eq!(lm.mouth().len(), 20);
        assert_eq!(lm.jaw_outline().len(), 17);
    }

    #[test]
    fn test_scale() {
        let lm = numbered().scale(0.5, 2.0);
        assert_relative_eq!(lm.points()[10].x, 5.0);
        assert_relative_eq!(lm.points()[10].y, 0.0);
    }
}
