use super::{Action, VehicleAttributes, VehicleState};
use crate::math::heading_vector;

/// Integrates one step of the kinematic model.
///
/// Steering turns the heading, throttle changes the speed, which is then
/// clamped to the speed limits and decayed by friction before the vehicle
/// moves along its new heading.
pub fn integrate(state: &VehicleState, action: Action, attribs: &VehicleAttributes) -> VehicleState {
    let heading = state.heading + action.steering * attribs.steering_gain;

    let limits = attribs.speed_limits;
    let speed = state.speed + action.throttle * attribs.throttle_gain;
    let speed = speed.clamp(limits.min, limits.max) * attribs.friction;

    let pos = state.pos + heading_vector(heading) * speed;

    VehicleState {
        pos,
        heading,
        speed,
    }
}
