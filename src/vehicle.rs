use crate::error::{Result, SimError};
use crate::math::{heading_vector, Point2d, Vector2d};
use crate::util::{Interval, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod dynamics;

/// The attributes of the simulated vehicle.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleAttributes {
    /// The change in heading per step per unit of steering, in radians.
    pub steering_gain: f64,
    /// The change in speed per step per unit of throttle.
    pub throttle_gain: f64,
    /// The minimum (reverse) and maximum speeds, in units per step.
    pub speed_limits: Interval<f64>,
    /// The factor applied to the speed each step.
    pub friction: f64,
    /// The side length of the vehicle's square bounding box.
    pub size: f64,
    /// The position at the start of each episode.
    pub start_position: Point2d,
    /// The heading at the start of each episode, in radians.
    pub start_heading: f64,
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            steering_gain: 0.15,
            throttle_gain: 0.5,
            speed_limits: Interval::new(-5.0, 15.0),
            friction: 0.95,
            size: 20.0,
            start_position: Point2d::new(100.0, 150.0),
            start_heading: 0.0,
        }
    }
}

impl VehicleAttributes {
    /// Checks that the attributes describe a usable vehicle.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SimError::Configuration(msg));
        let Interval { min, max } = self.speed_limits;
        if min.is_nan() || max.is_nan() || min > max || max <= 0.0 {
            return fail(format!("invalid speed limits {:?}", self.speed_limits));
        }
        if self.friction.is_nan() || self.friction <= 0.0 || self.friction > 1.0 {
            return fail(format!("friction must be in (0, 1], got {}", self.friction));
        }
        if self.size.is_nan() || self.size <= 0.0 {
            return fail(format!("vehicle size must be positive, got {}", self.size));
        }
        let finite = [
            self.steering_gain,
            self.throttle_gain,
            self.start_position.x,
            self.start_position.y,
            self.start_heading,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return fail("vehicle gains and start pose must be finite".into());
        }
        Ok(())
    }
}

/// A control input for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Action {
    /// Steering, nominally in `[-1, 1]`. Positive values increase the heading.
    pub steering: f64,
    /// Throttle, nominally in `[-1, 1]`. Negative values brake and then reverse.
    pub throttle: f64,
}

impl Action {
    /// Creates a new action.
    pub const fn new(steering: f64, throttle: f64) -> Self {
        Self { steering, throttle }
    }

    /// Checks that both components are finite.
    ///
    /// Finite values outside `[-1, 1]` are accepted as-is; they are only
    /// limited by the vehicle's gains and speed limits.
    pub fn validate(&self) -> Result<()> {
        if self.steering.is_finite() && self.throttle.is_finite() {
            Ok(())
        } else {
            Err(SimError::InvalidAction(format!(
                "components must be finite, got [{}, {}]",
                self.steering, self.throttle
            )))
        }
    }
}

impl From<[f64; 2]> for Action {
    fn from([steering, throttle]: [f64; 2]) -> Self {
        Self { steering, throttle }
    }
}

impl TryFrom<&[f32]> for Action {
    type Error = SimError;

    fn try_from(values: &[f32]) -> Result<Self> {
        match values {
            [steering, throttle] => Ok(Self::new(*steering as f64, *throttle as f64)),
            _ => Err(SimError::InvalidAction(format!(
                "expected 2 components, got {}",
                values.len()
            ))),
        }
    }
}

/// The kinematic state of the vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    /// The world space coordinates of the centre of the vehicle.
    pos: Point2d,
    /// The heading in radians, measured from the positive x-axis.
    heading: f64,
    /// The signed speed in units per step.
    speed: f64,
}

impl VehicleState {
    /// Creates a vehicle state.
    pub const fn new(pos: Point2d, heading: f64, speed: f64) -> Self {
        Self {
            pos,
            heading,
            speed,
        }
    }

    /// The stationary state at the start of an episode.
    pub fn start(attribs: &VehicleAttributes) -> Self {
        Self::new(attribs.start_position, attribs.start_heading, 0.0)
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.pos
    }

    /// The heading in radians.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The signed speed in units per step.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// A unit vector in world space aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        heading_vector(self.heading)
    }

    /// The vehicle's axis-aligned bounding box.
    pub fn bounding_box(&self, attribs: &VehicleAttributes) -> Rect {
        Rect::square(self.pos, attribs.size)
    }

    /// Advances the vehicle by one step.
    pub fn step(&self, action: Action, attribs: &VehicleAttributes) -> Self {
        dynamics::integrate(self, action, attribs)
    }
}
