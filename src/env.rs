//! The reset/step interface consumed by learners and visualisers.

use crate::episode::{Episode, EpisodeEnd, RewardAttributes, RewardBreakdown};
use crate::error::Result;
use crate::math::Point2d;
use crate::scene::{Scene, Visualizer};
use crate::sensor::{sense, SensorAttributes};
use crate::track::{Track, TrackAttributes};
use crate::vehicle::{Action, VehicleAttributes, VehicleState};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// A reinforcement learning environment.
pub trait Environment {
    /// The observation type.
    type Observation;

    /// The action type.
    type Action;

    /// Starts a new episode and returns its first observation.
    fn reset(&mut self, seed: Option<u64>) -> Self::Observation;

    /// Advances the episode with an action.
    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>>;

    /// The bounds of each observation channel.
    fn observation_space(&self) -> BoxSpace;

    /// The bounds of each action component.
    fn action_space(&self) -> BoxSpace;

    /// Releases any resources held by the environment.
    fn close(&mut self) {}
}

/// The result of an environment step.
#[derive(Debug, Clone)]
pub struct StepResult<O> {
    /// The observation after the step.
    pub observation: O,
    /// The reward received.
    pub reward: f64,
    /// Whether the episode ended through a collision, regression or a completed lap.
    pub terminated: bool,
    /// Whether the episode was cut short by the step limit.
    pub truncated: bool,
    /// Additional information.
    pub info: StepInfo,
}

impl<O> StepResult<O> {
    /// Returns true if the episode is over for either reason.
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Additional step information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// The checkpoint reached this step, if any.
    pub checkpoint: Option<usize>,
    /// Why the episode ended, if it did.
    pub end: Option<EpisodeEnd>,
    /// The components of the reward.
    pub reward: RewardBreakdown,
}

/// A box-shaped space with per-channel bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSpace {
    pub low: Vec<f32>,
    pub high: Vec<f32>,
}

impl BoxSpace {
    /// The number of channels.
    pub fn len(&self) -> usize {
        self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// Returns true if every value lies within its channel's bounds.
    pub fn contains(&self, values: &[f32]) -> bool {
        values.len() == self.len()
            && values
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| v >= lo && v <= hi)
    }

    /// The observation bounds older policies were trained against, which
    /// declare `[0, 1]` for every channel even though the heading channel
    /// ranges over `[-1, 1]`.
    pub fn legacy_observation(ray_count: usize) -> Self {
        Self {
            low: vec![0.0; ray_count + 2],
            high: vec![1.0; ray_count + 2],
        }
    }
}

/// The perception vector handed to a policy.
///
/// Layout: one normalised reading per ray in `[0, 1]`, then the speed as a
/// fraction of the maximum speed clamped to `[0, 1]`, then the sine of the
/// heading in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    values: SmallVec<[f32; 12]>,
}

impl Observation {
    /// Observes the vehicle on the given track.
    fn capture(
        vehicle: &VehicleState,
        track: &Track,
        vehicle_attribs: &VehicleAttributes,
        sensor_attribs: &SensorAttributes,
    ) -> Self {
        let readings = sense(vehicle, track.mask(), sensor_attribs);
        let speed = (vehicle.speed() / vehicle_attribs.speed_limits.max).clamp(0.0, 1.0);
        let values = readings
            .iter()
            .copied()
            .chain([speed, vehicle.heading().sin()])
            .map(|v| v as f32)
            .collect();
        Self { values }
    }

    /// All values, in layout order.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The normalised ray readings.
    pub fn rays(&self) -> &[f32] {
        &self.values[..self.values.len() - 2]
    }

    /// The normalised speed.
    pub fn speed(&self) -> f32 {
        self.values[self.values.len() - 2]
    }

    /// The sine of the heading.
    pub fn heading_sin(&self) -> f32 {
        self.values[self.values.len() - 1]
    }
}

/// All the attributes of a racing environment.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvAttributes {
    pub track: TrackAttributes,
    pub vehicle: VehicleAttributes,
    pub sensor: SensorAttributes,
    pub reward: RewardAttributes,
}

impl EnvAttributes {
    /// Checks that an environment can be built from these attributes.
    pub fn validate(&self) -> Result<()> {
        self.track.validate()?;
        self.vehicle.validate()?;
        self.sensor.validate()?;
        self.reward.validate()
    }
}

/// A car driving laps of a closed track.
pub struct RaceEnv {
    /// The attributes the environment was built from.
    attribs: EnvAttributes,
    /// The track, which may be shared with other environments.
    track: Arc<Track>,
    /// The current episode.
    episode: Episode,
    /// The most recent observation.
    observation: Observation,
    /// The attached visualiser, if any.
    visualizer: Option<Box<dyn Visualizer>>,
}

impl RaceEnv {
    /// Creates an environment, building its track from `attribs.track`.
    pub fn new(attribs: EnvAttributes) -> Result<Self> {
        let track = Arc::new(Track::new(&attribs.track)?);
        Self::with_track(track, attribs)
    }

    /// Creates an environment on an already built track.
    /// `attribs.track` is not used to rebuild it.
    pub fn with_track(track: Arc<Track>, attribs: EnvAttributes) -> Result<Self> {
        attribs.vehicle.validate()?;
        attribs.sensor.validate()?;
        attribs.reward.validate()?;

        let episode = Episode::new(&attribs.vehicle);
        let observation = Observation::capture(
            episode.vehicle(),
            &track,
            &attribs.vehicle,
            &attribs.sensor,
        );
        Ok(Self {
            attribs,
            track,
            episode,
            observation,
            visualizer: None,
        })
    }

    /// Attaches a visualiser, which is drawn after every reset and step.
    pub fn attach_visualizer(&mut self, visualizer: Box<dyn Visualizer>) {
        self.visualizer = Some(visualizer);
        self.draw();
    }

    /// The attributes the environment was built from.
    pub fn attributes(&self) -> &EnvAttributes {
        &self.attribs
    }

    /// The track.
    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    /// The current episode.
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// The coordinates of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.episode.vehicle().position()
    }

    /// The vehicle's heading in radians.
    pub fn heading(&self) -> f64 {
        self.episode.vehicle().heading()
    }

    /// The vehicle's signed speed.
    pub fn speed(&self) -> f64 {
        self.episode.vehicle().speed()
    }

    /// The index of the last checkpoint reached.
    pub fn current_checkpoint(&self) -> usize {
        self.episode.checkpoint()
    }

    /// The number of laps completed this episode.
    pub fn laps(&self) -> usize {
        self.episode.laps()
    }

    /// The number of steps taken this episode.
    pub fn steps(&self) -> usize {
        self.episode.steps()
    }

    /// The most recent observation.
    pub fn last_observation(&self) -> &Observation {
        &self.observation
    }

    /// The current scene, as handed to visualisers.
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            track: &self.track,
            vehicle: self.episode.vehicle(),
            checkpoint: self.episode.checkpoint(),
            laps: self.episode.laps(),
            steps: self.episode.steps(),
            observation: &self.observation,
            sensor: &self.attribs.sensor,
        }
    }

    /// Gets the debugging primitives recorded since the last call as a JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        crate::debug::take_debug_frame()
    }

    fn observe(&mut self) -> Observation {
        self.observation = Observation::capture(
            self.episode.vehicle(),
            &self.track,
            &self.attribs.vehicle,
            &self.attribs.sensor,
        );
        self.draw();
        self.observation.clone()
    }

    fn draw(&mut self) {
        if let Some(mut visualizer) = self.visualizer.take() {
            visualizer.draw(&self.scene());
            self.visualizer = Some(visualizer);
        }
    }
}

impl Environment for RaceEnv {
    type Observation = Observation;
    type Action = Action;

    /// Starts a new episode with the vehicle at its start pose.
    ///
    /// The simulation has no randomness, so `seed` only shows up in the logs.
    fn reset(&mut self, seed: Option<u64>) -> Observation {
        log::debug!("reset (seed {:?})", seed);
        self.episode = Episode::new(&self.attribs.vehicle);
        self.observe()
    }

    fn step(&mut self, action: Action) -> Result<StepResult<Observation>> {
        let outcome = self.episode.step(
            action,
            &self.track,
            &self.attribs.vehicle,
            &self.attribs.reward,
        )?;
        let truncated = outcome.end.is_some_and(|end| end.is_truncation());
        Ok(StepResult {
            observation: self.observe(),
            reward: outcome.reward,
            terminated: outcome.end.is_some() && !truncated,
            truncated,
            info: StepInfo {
                checkpoint: outcome.checkpoint,
                end: outcome.end,
                reward: outcome.breakdown,
            },
        })
    }

    fn observation_space(&self) -> BoxSpace {
        let rays = self.attribs.sensor.ray_count;
        let mut low = vec![0.0; rays + 2];
        let high = vec![1.0; rays + 2];
        low[rays + 1] = -1.0;
        BoxSpace { low, high }
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace {
            low: vec![-1.0, -1.0],
            high: vec![1.0, 1.0],
        }
    }

    /// Closes and detaches the visualiser, if one is attached.
    fn close(&mut self) {
        if let Some(mut visualizer) = self.visualizer.take() {
            visualizer.close();
        }
    }
}
