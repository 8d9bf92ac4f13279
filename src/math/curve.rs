use super::{linspace, Point2d, Vector2d};
use crate::util::Interval;

/// A parametric curve in 2D space.
pub trait ParametricCurve2d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point2d;

    /// Returns the minimum and maximum t-values that define the bounds of the curve.
    fn bounds(&self) -> Interval<f64>;

    /// Samples the derivative of the parametric curve.
    fn sample_dt(&self, t: f64) -> Vector2d;
}

/// Samples `count` points along the curve at evenly spaced t-values,
/// including both ends of the curve's bounds.
pub fn sample_uniform(
    curve: &impl ParametricCurve2d,
    count: usize,
) -> impl Iterator<Item = Point2d> + '_ {
    let bounds = curve.bounds();
    linspace(bounds.min, bounds.max, count).map(move |t| curve.sample(t))
}
