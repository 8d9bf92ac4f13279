use crate::math::Point2d;
use crate::track::Track;
use crate::vehicle::{Action, VehicleState};
use cgmath::prelude::*;
use itertools::Itertools;
use std::f64::consts::PI;

/// A scripted driver which steers towards a point a fixed number of
/// centre line vertices ahead of the closest one, at constant throttle.
///
/// Useful as a baseline and for exercising the simulation without a learner.
#[derive(Clone, Copy, Debug)]
pub struct Autopilot {
    /// How many centre line vertices ahead of the closest one to aim for.
    pub lookahead: usize,
    /// The throttle applied every step.
    pub throttle: f64,
    /// The vehicle's steering gain, used to convert a heading error into steering.
    pub steering_gain: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            lookahead: 10,
            throttle: 0.5,
            steering_gain: 0.15,
        }
    }
}

impl Autopilot {
    /// Chooses an action for the vehicle.
    pub fn act(&self, track: &Track, vehicle: &VehicleState) -> Action {
        let line = track.centerline();
        let pos = vehicle.position();
        let closest = line
            .iter()
            .map(|p| p.distance2(pos))
            .position_min_by(|a, b| a.total_cmp(b))
            .unwrap_or(0);
        let target = line[(closest + self.lookahead) % line.len()];
        let steering = (heading_error(pos, vehicle.heading(), target) / self.steering_gain)
            .clamp(-1.0, 1.0);
        Action::new(steering, self.throttle)
    }
}

/// The signed angle in `(-π, π]` the heading must turn through to face `target`.
fn heading_error(pos: Point2d, heading: f64, target: Point2d) -> f64 {
    let to_target = target - pos;
    let error = to_target.y.atan2(to_target.x) - heading;
    let wrapped = (error + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}
