use crate::error::{Result, SimError};
use crate::math::{sample_uniform, CatmullRom2d, OccupancyGrid, Point2d};
use crate::util::Rect;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The waypoints of the default circuit, as `(x, y)` pairs.
pub const DEFAULT_WAYPOINTS: [(f64, f64); 12] = [
    (100.0, 150.0),
    (400.0, 100.0),
    (800.0, 150.0),
    (900.0, 400.0),
    (800.0, 700.0),
    (500.0, 700.0),
    (300.0, 500.0),
    (600.0, 400.0),
    (500.0, 250.0),
    (200.0, 300.0),
    (100.0, 600.0),
    (50.0, 400.0),
];

/// The attributes of a track.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackAttributes {
    /// The ordered waypoints defining the closed circuit.
    pub waypoints: Vec<Point2d>,
    /// The width of the drivable road.
    pub road_width: f64,
    /// The number of points interpolated between consecutive waypoints.
    pub smoothness: usize,
    /// The side length of each square checkpoint region.
    pub checkpoint_size: f64,
    /// The width of the rasterised region. Points beyond it are walls.
    pub width: usize,
    /// The height of the rasterised region. Points beyond it are walls.
    pub height: usize,
}

impl Default for TrackAttributes {
    fn default() -> Self {
        Self {
            waypoints: DEFAULT_WAYPOINTS
                .iter()
                .map(|&(x, y)| Point2d::new(x, y))
                .collect(),
            road_width: 140.0,
            smoothness: 30,
            checkpoint_size: 140.0,
            width: 1000,
            height: 800,
        }
    }
}

impl TrackAttributes {
    /// Checks that a track can be built from these attributes.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SimError::Configuration(msg));
        if self.waypoints.len() < 3 {
            return fail(format!(
                "a track needs at least 3 waypoints, got {}",
                self.waypoints.len()
            ));
        }
        if self.waypoints.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return fail("waypoints must be finite".into());
        }
        if self.smoothness < 2 {
            return fail(format!("smoothness must be at least 2, got {}", self.smoothness));
        }
        if self.road_width.is_nan() || self.road_width <= 0.0 {
            return fail(format!("road width must be positive, got {}", self.road_width));
        }
        if self.checkpoint_size.is_nan() || self.checkpoint_size <= 0.0 {
            return fail(format!(
                "checkpoint size must be positive, got {}",
                self.checkpoint_size
            ));
        }
        if self.width == 0 || self.height == 0 {
            return fail(format!(
                "track raster must not be empty, got {}x{}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

/// A closed circuit: the smoothed centre line, the rasterised drivable region
/// and the ordered checkpoints.
///
/// A track is immutable once built and may be shared between environments.
#[derive(Clone)]
pub struct Track {
    /// The waypoints the track was built from.
    waypoints: Vec<Point2d>,
    /// The smoothed centre line, a closed polyline.
    centerline: Vec<Point2d>,
    /// The drivable region.
    mask: OccupancyGrid,
    /// The checkpoints, in the order they must be reached.
    checkpoints: Vec<Rect>,
    /// The width of the road.
    road_width: f64,
}

impl Track {
    /// Builds a track from the given attributes.
    pub fn new(attribs: &TrackAttributes) -> Result<Self> {
        attribs.validate()?;

        let centerline = smooth_closed(&attribs.waypoints, attribs.smoothness);
        let mask = rasterise(&centerline, attribs.width, attribs.height, attribs.road_width);
        let checkpoints = place_checkpoints(&attribs.waypoints, attribs.checkpoint_size);

        log::debug!(
            "built track: {} waypoints, {} centre line points, {} of {} cells drivable",
            attribs.waypoints.len(),
            centerline.len(),
            mask.drivable_count(),
            mask.width() * mask.height(),
        );

        Ok(Self {
            waypoints: attribs.waypoints.clone(),
            centerline,
            mask,
            checkpoints,
            road_width: attribs.road_width,
        })
    }

    /// The waypoints the track was built from.
    pub fn waypoints(&self) -> &[Point2d] {
        &self.waypoints
    }

    /// The smoothed centre line. The last point connects back to the first.
    pub fn centerline(&self) -> &[Point2d] {
        &self.centerline
    }

    /// The checkpoints, in the order they must be reached.
    pub fn checkpoints(&self) -> &[Rect] {
        &self.checkpoints
    }

    /// The index of the checkpoint which follows `idx`.
    pub fn next_checkpoint(&self, idx: usize) -> usize {
        (idx + 1) % self.checkpoints.len()
    }

    /// The rasterised drivable region.
    pub fn mask(&self) -> &OccupancyGrid {
        &self.mask
    }

    /// The width of the road.
    pub fn road_width(&self) -> f64 {
        self.road_width
    }

    /// Returns true if the point is not drivable, including points outside the raster.
    pub fn is_wall(&self, point: Point2d) -> bool {
        self.mask.is_wall(point)
    }
}

/// Interpolates a closed Catmull-Rom spline through `waypoints`, producing
/// `smoothness` points per segment. The first point of every segment but the
/// first is dropped, as it duplicates the end of the previous segment.
fn smooth_closed(waypoints: &[Point2d], smoothness: usize) -> Vec<Point2d> {
    let mut points = Vec::with_capacity(waypoints.len() * smoothness);
    for idx in 0..waypoints.len() {
        let segment = CatmullRom2d::closed_segment(waypoints, idx);
        let skip = usize::from(idx > 0);
        points.extend(sample_uniform(&segment, smoothness).skip(skip));
    }
    points
}

/// Rasterises the closed polyline as a stroke of the given width.
fn rasterise(polyline: &[Point2d], width: usize, height: usize, road_width: f64) -> OccupancyGrid {
    let mut mask = OccupancyGrid::walled(width, height);
    for (a, b) in polyline.iter().copied().circular_tuple_windows() {
        mask.stroke_segment(a, b, 0.5 * road_width);
    }
    mask
}

/// Places a square checkpoint at the midpoint of each waypoint-to-waypoint segment.
fn place_checkpoints(waypoints: &[Point2d], size: f64) -> Vec<Rect> {
    waypoints
        .iter()
        .copied()
        .circular_tuple_windows()
        .map(|(a, b)| Rect::square(Point2d::new(0.5 * (a.x + b.x), 0.5 * (a.y + b.y)), size))
        .collect()
}
