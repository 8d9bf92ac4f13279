use crate::env::Observation;
use crate::math::{heading_vector, Point2d};
use crate::sensor::SensorAttributes;
use crate::track::Track;
use crate::util::Rect;
use crate::vehicle::VehicleState;

/// Everything a renderer needs to draw one frame, borrowed from the environment.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    /// The track.
    pub track: &'a Track,
    /// The vehicle.
    pub vehicle: &'a VehicleState,
    /// The index of the last checkpoint reached.
    pub checkpoint: usize,
    /// The number of laps completed.
    pub laps: usize,
    /// The number of steps taken this episode.
    pub steps: usize,
    /// The most recent observation.
    pub observation: &'a Observation,
    /// The sensor the observation was taken with.
    pub sensor: &'a SensorAttributes,
}

impl<'a> Scene<'a> {
    /// The checkpoint the vehicle is heading for.
    pub fn next_checkpoint(&self) -> &'a Rect {
        let track: &'a Track = self.track;
        &track.checkpoints()[track.next_checkpoint(self.checkpoint)]
    }

    /// The start and end point of each sensor ray, reconstructed from the observation.
    pub fn rays(&self) -> impl Iterator<Item = (Point2d, Point2d)> + 'a {
        let origin = self.vehicle.position();
        let heading = self.vehicle.heading();
        let max_range = self.sensor.max_range;
        let observation: &'a Observation = self.observation;
        self.sensor
            .ray_angles()
            .zip(observation.rays())
            .map(move |(angle, reading)| {
                let dist = *reading as f64 * max_range;
                (origin, origin + heading_vector(heading + angle) * dist)
            })
    }
}

/// Draws the simulation, e.g. to a window.
pub trait Visualizer {
    /// Draws a frame.
    fn draw(&mut self, scene: &Scene<'_>);

    /// Releases any resources, such as a window.
    fn close(&mut self) {}
}
