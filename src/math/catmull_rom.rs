use super::curve::ParametricCurve2d;
use super::{Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A single Catmull-Rom spline segment.
///
/// The segment runs from the second to the third control point; the first and
/// last control points only shape the tangents at either end.
#[derive(Copy, Clone, Debug)]
pub struct CatmullRom2d {
    points: [Point2d; 4],
}

impl CatmullRom2d {
    pub const fn new(points: &[Point2d; 4]) -> Self {
        Self { points: *points }
    }

    /// Gets the segment of a closed spline through `points` which starts at `points[idx]`.
    /// Control point indices wrap around.
    pub fn closed_segment(points: &[Point2d], idx: usize) -> Self {
        let n = points.len();
        let p = |k: usize| points[k % n];
        Self::new(&[p(idx + n - 1), p(idx), p(idx + 1), p(idx + 2)])
    }
}

impl ParametricCurve2d for CatmullRom2d {
    fn sample(&self, t: f64) -> Point2d {
        let [p0, p1, p2, p3] = self.points.map(|p| p.to_vec());
        let (t2, t3) = (t * t, t * t * t);
        Point2d::from_vec(
            0.5 * (2.0 * p1
                + (p2 - p0) * t
                + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3),
        )
    }

    fn bounds(&self) -> Interval<f64> {
        Interval { min: 0.0, max: 1.0 }
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let [p0, p1, p2, p3] = self.points.map(|p| p.to_vec());
        0.5 * ((p2 - p0)
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * (2.0 * t)
            + (3.0 * p1 - p0 - 3.0 * p2 + p3) * (3.0 * t * t))
    }
}
