use crate::debug::debug_rect;
use crate::error::{Result, SimError};
use crate::math::Point2d;
use crate::track::Track;
use crate::vehicle::{Action, VehicleAttributes, VehicleState};
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The reward shaping and episode limits.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardAttributes {
    /// The reward for driving backwards or away from the next checkpoint.
    pub regression_penalty: f64,
    /// Regression is only checked when the absolute speed exceeds this.
    pub regression_min_speed: f64,
    /// Movement whose alignment with the next checkpoint is below this is regression.
    pub regression_alignment: f64,
    /// Regression is only penalised further than this from the next checkpoint.
    pub regression_distance: f64,
    /// The reward for ending a step on a wall.
    pub collision_penalty: f64,
    /// The reward for reaching the next checkpoint.
    pub checkpoint_reward: f64,
    /// The additional reward for completing a lap.
    pub lap_reward: f64,
    /// The reward added to every step.
    pub step_penalty: f64,
    /// The episode is truncated once the step count exceeds this.
    pub max_steps: usize,
}

impl Default for RewardAttributes {
    fn default() -> Self {
        Self {
            regression_penalty: -100.0,
            regression_min_speed: 0.5,
            regression_alignment: -0.3,
            regression_distance: 100.0,
            collision_penalty: -50.0,
            checkpoint_reward: 20.0,
            lap_reward: 1000.0,
            step_penalty: -0.05,
            max_steps: 1500,
        }
    }
}

impl RewardAttributes {
    /// Checks that the episode can end by timeout.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(SimError::Configuration("max steps must be positive".into()));
        }
        let values = [
            self.regression_penalty,
            self.regression_min_speed,
            self.regression_alignment,
            self.regression_distance,
            self.collision_penalty,
            self.checkpoint_reward,
            self.lap_reward,
            self.step_penalty,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SimError::Configuration("rewards must be finite".into()));
        }
        Ok(())
    }
}

/// The reason an episode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EpisodeEnd {
    /// The vehicle ended a step on a wall.
    Collision,
    /// The vehicle was reversing.
    Backward,
    /// The vehicle was driving away from the next checkpoint.
    Regression,
    /// The vehicle reached the final checkpoint.
    LapComplete,
    /// The step limit was exceeded.
    Timeout,
}

impl EpisodeEnd {
    /// Returns true if the episode was cut short by the step limit
    /// rather than ended by the simulation itself.
    pub fn is_truncation(&self) -> bool {
        matches!(self, EpisodeEnd::Timeout)
    }
}

/// The components that made up a step's reward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RewardBreakdown {
    pub regression: f64,
    pub collision: f64,
    pub checkpoint: f64,
    pub lap: f64,
    pub step: f64,
}

/// The result of advancing an [Episode] by one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// The total reward.
    pub reward: f64,
    /// The components of the reward.
    pub breakdown: RewardBreakdown,
    /// The checkpoint reached this step, if any.
    pub checkpoint: Option<usize>,
    /// Why the episode ended, if it did.
    pub end: Option<EpisodeEnd>,
}

/// The mutable state of one episode.
#[derive(Clone, Debug)]
pub struct Episode {
    /// The vehicle.
    vehicle: VehicleState,
    /// The vehicle's position at the start of the last step.
    prev_pos: Point2d,
    /// The number of steps taken.
    steps: usize,
    /// The index of the last checkpoint reached.
    checkpoint: usize,
    /// The number of laps completed.
    laps: usize,
    /// Why the episode ended, if it has.
    end: Option<EpisodeEnd>,
}

impl Episode {
    /// Starts a new episode with the vehicle at its start pose.
    pub fn new(attribs: &VehicleAttributes) -> Self {
        let vehicle = VehicleState::start(attribs);
        Self {
            vehicle,
            prev_pos: vehicle.position(),
            steps: 0,
            checkpoint: 0,
            laps: 0,
            end: None,
        }
    }

    /// The vehicle.
    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    /// The number of steps taken.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// The index of the last checkpoint reached.
    pub fn checkpoint(&self) -> usize {
        self.checkpoint
    }

    /// The number of laps completed.
    pub fn laps(&self) -> usize {
        self.laps
    }

    /// Why the episode ended, or `None` if it is still running.
    pub fn end(&self) -> Option<EpisodeEnd> {
        self.end
    }

    /// Advances the episode by one step.
    ///
    /// The checks run in a fixed order: regression, which ends the step
    /// immediately and returns the vehicle to its start pose; then wall
    /// collision; then checkpoint progress; then the per-step penalty and
    /// the step limit. The collision penalty is not cleared by a checkpoint
    /// reached in the same step; both rewards apply.
    pub fn step(
        &mut self,
        action: Action,
        track: &Track,
        vehicle_attribs: &VehicleAttributes,
        reward_attribs: &RewardAttributes,
    ) -> Result<StepOutcome> {
        if self.end.is_some() {
            return Err(SimError::EpisodeOver);
        }
        action.validate()?;

        self.prev_pos = self.vehicle.position();
        self.vehicle = self.vehicle.step(action, vehicle_attribs);
        self.steps += 1;

        let mut breakdown = RewardBreakdown::default();

        if let Some(end) = self.check_regression(track, reward_attribs) {
            breakdown.regression = reward_attribs.regression_penalty;
            self.restart(vehicle_attribs);
            return Ok(self.finish(breakdown.regression, breakdown, None, Some(end)));
        }

        let mut reward = 0.0;
        let mut end = None;

        if track.is_wall(self.vehicle.position()) {
            breakdown.collision = reward_attribs.collision_penalty;
            reward = breakdown.collision;
            end = Some(EpisodeEnd::Collision);
        }

        let next = track.next_checkpoint(self.checkpoint);
        let region = &track.checkpoints()[next];
        let bounds = self.vehicle.bounding_box(vehicle_attribs);
        debug_rect("checkpoint", region);
        debug_rect("vehicle", &bounds);

        let mut reached = None;
        if bounds.overlaps(region) {
            breakdown.checkpoint = reward_attribs.checkpoint_reward;
            reward += breakdown.checkpoint;
            self.checkpoint = next;
            reached = Some(next);
            log::debug!("checkpoint {} reached at step {}", next, self.steps);

            if next == 0 {
                breakdown.lap = reward_attribs.lap_reward;
                reward += breakdown.lap;
                self.laps += 1;
                end = Some(EpisodeEnd::LapComplete);
            }
        }

        breakdown.step = reward_attribs.step_penalty;
        reward += breakdown.step;

        if end.is_none() && self.steps > reward_attribs.max_steps {
            end = Some(EpisodeEnd::Timeout);
        }

        Ok(self.finish(reward, breakdown, reached, end))
    }

    /// Determines whether the vehicle is reversing or moving away from the
    /// next checkpoint while still far from it.
    fn check_regression(&self, track: &Track, attribs: &RewardAttributes) -> Option<EpisodeEnd> {
        let speed = self.vehicle.speed();
        if speed.abs() <= attribs.regression_min_speed {
            return None;
        }
        if speed < 0.0 {
            return Some(EpisodeEnd::Backward);
        }

        let next = track.next_checkpoint(self.checkpoint);
        let to_target = track.checkpoints()[next].centre() - self.vehicle.position();
        let moved = self.vehicle.position() - self.prev_pos;
        let alignment = moved.normalize().dot(to_target.normalize());

        let regressing = alignment < attribs.regression_alignment
            && to_target.magnitude() > attribs.regression_distance;
        regressing.then_some(EpisodeEnd::Regression)
    }

    /// Returns the vehicle to its start pose and clears checkpoint progress.
    fn restart(&mut self, attribs: &VehicleAttributes) {
        self.vehicle = VehicleState::start(attribs);
        self.prev_pos = self.vehicle.position();
        self.checkpoint = 0;
    }

    fn finish(
        &mut self,
        reward: f64,
        breakdown: RewardBreakdown,
        checkpoint: Option<usize>,
        end: Option<EpisodeEnd>,
    ) -> StepOutcome {
        log::trace!("step {}: reward {} ({:?})", self.steps, reward, breakdown);
        if let Some(end) = end {
            log::info!(
                "episode ended: {:?} after {} steps, {} laps",
                end,
                self.steps,
                self.laps
            );
        }
        self.end = end;
        StepOutcome {
            reward,
            breakdown,
            checkpoint,
            end,
        }
    }
}
