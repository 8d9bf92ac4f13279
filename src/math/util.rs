use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Gets the unit vector pointing along the given heading, in radians.
pub fn heading_vector(angle: f64) -> Vector2d {
    Vector2d::new(angle.cos(), angle.sin())
}

/// Returns `count` evenly spaced values over the closed interval `[start, end]`.
///
/// A single value is placed at `start`.
pub fn linspace(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| start + step * i as f64)
}

/// Computes the distance between a point and the line segment `a`-`b`.
pub fn distance_to_segment(point: Point2d, a: Point2d, b: Point2d) -> f64 {
    let ab = b - a;
    let len2 = ab.magnitude2();
    if len2 == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len2).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
