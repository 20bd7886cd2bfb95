use crate::shared::constants::{ASPECT_DENOMINATOR, ASPECT_NUMERATOR};

/// Pixel dimensions of a frame or drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Surface size for a viewport width at the fixed 16:9 ratio.
    ///
    /// Height is floored, matching how a fractional canvas height is
    /// truncated.
    pub fn for_viewport(width: u32) -> Self {
        let height = (width as u64 * ASPECT_NUMERATOR as u64 / ASPECT_DENOMINATOR as u64) as u32;
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }
}

/// Axis-aligned box in floating-point pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Maps the box from one coordinate space into another of different size.
    pub fn rescale(&self, from: Dimensions, to: Dimensions) -> Self {
        if from.is_empty() {
            return *self;
        }
        self.scale(
            to.width as f64 / from.width as f64,
            to.height as f64 / from.height as f64,
        )
    }

    /// Intersection with `[0, width) x [0, height)`; `None` if nothing is left.
    pub fn clip(&self, bounds: Dimensions) -> Option<Self> {
        let x1 = self.x.max(0.0);
        let y1 = self.y.max(0.0);
        let x2 = self.right().min(bounds.width as f64);
        let y2 = self.bottom().min(bounds.height as f64);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self::from_corners(x1, y1, x2, y2))
    }

    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x.max(other.x);
        let iy1 = self.y.max(other.y);
        let ix2 = self.right().min(other.right());
        let iy2 = self.bottom().min(other.bottom());

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        if inter == 0.0 {
            return 0.0;
        }
        inter / (self.area() + other.area() - inter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::wide(1024, 576)]
    #[case::narrow(768, 432)]
    #[case::floors_fraction(1000, 562)]
    #[case::zero(0, 0)]
    fn test_for_viewport_is_sixteen_by_nine(#[case] width: u32, #[case] height: u32) {
        assert_eq!(
            Dimensions::for_viewport(width),
            Dimensions::new(width, height)
        );
    }

    #[test]
    fn test_rescale_maps_between_spaces() {
        let b = BoundingBox::new(100.0, 50.0, 200.0, 100.0);
        let r = b.rescale(Dimensions::new(1000, 500), Dimensions::new(500, 250));
        assert_relative_eq!(r.x, 50.0);
        assert_relative_eq!(r.y, 25.0);
        assert_relative_eq!(r.width, 100.0);
        assert_relative_eq!(r.height, 50.0);
    }

    #[test]
    fn test_rescale_from_empty_is_identity() {
        let b = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(b.rescale(Dimensions::default(), Dimensions::new(10, 10)), b);
    }

    #[test]
    fn test_clip_trims_to_bounds() {
        let b = BoundingBox::new(-10.0, 90.0, 50.0, 50.0);
        let c = b.clip(Dimensions::new(100, 100)).unwrap();
        assert_relative_eq!(c.x, 0.0);
        assert_relative_eq!(c.y, 90.0);
        assert_relative_eq!(c.width, 40.0);
        assert_relative_eq!(c.height, 10.0);
    }

    #[test]
    fn test_clip_outside_is_none() {
        let b = BoundingBox::new(200.0, 200.0, 10.0, 10.0);
        assert!(b.clip(Dimensions::new(100, 100)).is_none());
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let b = BoundingBox::new(50.0, 0.0, 100.0, 100.0);
        assert_relative_eq!(a.iou(&b), 5000.0 / 15000.0);
    }

    #[rstest]
    #[case::disjoint(BoundingBox::new(100.0, 100.0, 50.0, 50.0))]
    #[case::touching(BoundingBox::new(50.0, 0.0, 50.0, 50.0))]
    #[case::degenerate(BoundingBox::new(0.0, 0.0, 0.0, 50.0))]
    fn test_iou_zero(#[case] other: BoundingBox) {
        let a = BoundingBox::new(0.0, 0.0, 50.0, 50.0);
        assert_relative_eq!(a.iou(&other), 0.0);
    }
}
