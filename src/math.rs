//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};
pub use catmull_rom::CatmullRom2d;
pub use curve::{sample_uniform, ParametricCurve2d};
pub use grid::OccupancyGrid;
pub use util::*;

mod catmull_rom;
mod curve;
mod grid;
mod util;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;
