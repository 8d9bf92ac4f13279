//! Range sensors cast against the track's drivable region.

use crate::debug::debug_line;
use crate::error::{Result, SimError};
use crate::math::{heading_vector, linspace, OccupancyGrid, Point2d};
use crate::vehicle::VehicleState;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::PI;

/// Normalised sensor readings, one per ray, ordered from the leftmost
/// (most negative) angle to the rightmost.
pub type Readings = SmallVec<[f64; 8]>;

/// The attributes of the range sensor fan.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorAttributes {
    /// The number of rays.
    pub ray_count: usize,
    /// The total angle covered by the fan, centred on the heading, in radians.
    pub fan_angle: f64,
    /// The distance reported when no wall is found.
    pub max_range: f64,
    /// The distance between consecutive samples along a ray.
    pub step: f64,
    /// The distance of the first sample from the vehicle.
    pub offset: f64,
}

impl Default for SensorAttributes {
    fn default() -> Self {
        Self {
            ray_count: 7,
            fan_angle: PI,
            max_range: 200.0,
            step: 10.0,
            offset: 5.0,
        }
    }
}

impl SensorAttributes {
    /// Checks that the attributes describe a usable sensor.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SimError::Configuration(msg));
        if self.ray_count == 0 {
            return fail("the sensor needs at least one ray".into());
        }
        if self.max_range.is_nan() || self.max_range <= 0.0 {
            return fail(format!("max range must be positive, got {}", self.max_range));
        }
        if self.step.is_nan() || self.step <= 0.0 {
            return fail(format!("sample step must be positive, got {}", self.step));
        }
        if self.offset.is_nan() || self.offset < 0.0 || !self.fan_angle.is_finite() {
            return fail("sample offset must be non-negative and fan angle finite".into());
        }
        Ok(())
    }

    /// The angle of each ray relative to the vehicle's heading.
    pub fn ray_angles(&self) -> impl Iterator<Item = f64> {
        let half = 0.5 * self.fan_angle;
        linspace(-half, half, self.ray_count)
    }
}

/// Casts every ray of the fan from the vehicle's pose.
pub fn sense(state: &VehicleState, mask: &OccupancyGrid, attribs: &SensorAttributes) -> Readings {
    attribs
        .ray_angles()
        .map(|angle| cast_ray(mask, state.position(), state.heading() + angle, attribs))
        .map(|dist| dist / attribs.max_range)
        .collect()
}

/// Walks a ray outwards in fixed steps and returns the distance of the first
/// sample that is out of bounds or a wall, or the max range if there is none.
pub fn cast_ray(mask: &OccupancyGrid, origin: Point2d, angle: f64, attribs: &SensorAttributes) -> f64 {
    let dir = heading_vector(angle);
    let hit = (0..)
        .map(|i| attribs.offset + attribs.step * i as f64)
        .take_while(|dist| *dist < attribs.max_range)
        .find(|dist| match mask.cell(origin + dir * *dist) {
            None => true,
            Some((x, y)) => !mask.is_drivable_cell(x, y),
        });
    let dist = hit.unwrap_or(attribs.max_range);
    debug_line("ray", origin, origin + dir * dist);
    dist
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn state_at(x: f64, y: f64, heading: f64) -> VehicleState {
        VehicleState::new(Point2d::new(x, y), heading, 0.0)
    }

    #[test]
    fn open_space_reads_max_range() {
        let mask = OccupancyGrid::from_fn(1000, 1000, |_, _| true);
        let readings = sense(&state_at(500.0, 500.0, 0.3), &mask, &SensorAttributes::default());
        assert_eq!(readings.len(), 7);
        assert!(readings.iter().all(|r| *r == 1.0));
    }

    #[test]
    fn wall_distance_is_quantised() {
        let mask = OccupancyGrid::from_fn(1000, 1000, |x, _| x < 515);
        let readings = sense(&state_at(500.0, 500.0, 0.0), &mask, &SensorAttributes::default());
        let expected = [200.0, 35.0, 25.0, 15.0, 25.0, 35.0, 200.0];
        for (reading, dist) in readings.iter().zip(expected) {
            assert_approx_eq!(*reading, dist / 200.0);
        }
    }

    #[test]
    fn leaving_the_raster_ends_the_ray() {
        let mask = OccupancyGrid::from_fn(100, 100, |_, _| true);
        let attribs = SensorAttributes::default();
        let dist = cast_ray(&mask, Point2d::new(50.0, 50.0), 0.0, &attribs);
        assert_approx_eq!(dist, 55.0);
        let dist = cast_ray(&mask, Point2d::new(50.0, 50.0), PI, &attribs);
        assert_approx_eq!(dist, 55.0);
    }

    #[test]
    fn wall_under_first_sample() {
        let mask = OccupancyGrid::from_fn(100, 100, |x, _| x < 52);
        let dist = cast_ray(&mask, Point2d::new(50.0, 50.0), 0.0, &SensorAttributes::default());
        assert_approx_eq!(dist, 5.0);
    }

    #[test]
    fn rays_span_the_forward_half_plane() {
        let angles = SensorAttributes::default().ray_angles().collect::<Vec<_>>();
        assert_eq!(angles.len(), 7);
        assert_approx_eq!(angles[0], -PI / 2.0);
        assert_approx_eq!(angles[3], 0.0);
        assert_approx_eq!(angles[6], PI / 2.0);
    }

    #[test]
    fn invalid_attributes() {
        let attribs = SensorAttributes {
            ray_count: 0,
            ..Default::default()
        };
        assert!(attribs.validate().is_err());
        let attribs = SensorAttributes {
            step: 0.0,
            ..Default::default()
        };
        assert!(attribs.validate().is_err());
        let attribs = SensorAttributes {
            max_range: f64::NAN,
            ..Default::default()
        };
        assert!(attribs.validate().is_err());
        let attribs = SensorAttributes {
            offset: f64::NAN,
            ..Default::default()
        };
        assert!(attribs.validate().is_err());
        assert!(SensorAttributes::default().validate().is_ok());
    }
}
