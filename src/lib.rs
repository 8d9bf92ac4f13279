pub use cgmath;
pub use env::{BoxSpace, EnvAttributes, Environment, Observation, RaceEnv, StepInfo, StepResult};
pub use episode::{Episode, EpisodeEnd, RewardAttributes, RewardBreakdown, StepOutcome};
pub use error::SimError;
pub use pilot::Autopilot;
pub use scene::{Scene, Visualizer};
pub use sensor::{Readings, SensorAttributes};
pub use track::{Track, TrackAttributes, DEFAULT_WAYPOINTS};
pub use util::{Interval, Rect};
pub use vehicle::{Action, VehicleAttributes, VehicleState};

mod debug;
mod env;
mod episode;
mod error;
pub mod math;
mod pilot;
mod scene;
pub mod sensor;
mod track;
mod util;
mod vehicle;
