use super::{distance_to_segment, Point2d};
use itertools::iproduct;

/// A rasterised drivable/wall classification over a rectangular region
/// whose origin is at `(0, 0)`, with one cell per unit square.
///
/// Points are mapped onto cells by truncating their coordinates towards zero,
/// so queries are O(1) regardless of the geometry that was rasterised.
#[derive(Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    drivable: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates a grid in which every cell is a wall.
    pub fn walled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            drivable: vec![false; width * height],
        }
    }

    /// Creates a grid by classifying each cell with `f(x, y)`, which returns `true` if drivable.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let drivable = iproduct!(0..height, 0..width)
            .map(|(y, x)| f(x, y))
            .collect();
        Self {
            width,
            height,
            drivable,
        }
    }

    /// The number of cells along the x-axis.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The number of cells along the y-axis.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Gets the cell containing the point, or `None` if it is out of bounds.
    pub fn cell(&self, point: Point2d) -> Option<(usize, usize)> {
        let (x, y) = (point.x as i64, point.y as i64);
        let in_bounds = x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height;
        in_bounds.then_some((x as usize, y as usize))
    }

    /// Returns true if the point lies within the bounds of the grid.
    pub fn contains(&self, point: Point2d) -> bool {
        self.cell(point).is_some()
    }

    /// Returns true if the cell is drivable. Cells out of bounds are not.
    pub fn is_drivable_cell(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.drivable[y * self.width + x]
    }

    /// Returns true if the point is a wall. Points out of bounds are walls.
    pub fn is_wall(&self, point: Point2d) -> bool {
        match self.cell(point) {
            Some((x, y)) => !self.drivable[y * self.width + x],
            None => true,
        }
    }

    /// The number of drivable cells.
    pub fn drivable_count(&self) -> usize {
        self.drivable.iter().filter(|d| **d).count()
    }

    /// Marks as drivable every cell whose centre lies within `half_width`
    /// of the line segment `a`-`b`.
    pub fn stroke_segment(&mut self, a: Point2d, b: Point2d, half_width: f64) {
        let clamp_x = |v: f64| (v.floor().max(0.0) as usize).min(self.width);
        let clamp_y = |v: f64| (v.floor().max(0.0) as usize).min(self.height);
        let (x0, x1) = (
            clamp_x(a.x.min(b.x) - half_width),
            clamp_x(a.x.max(b.x) + half_width + 1.0),
        );
        let (y0, y1) = (
            clamp_y(a.y.min(b.y) - half_width),
            clamp_y(a.y.max(b.y) + half_width + 1.0),
        );

        for (y, x) in iproduct!(y0..y1, x0..x1) {
            let centre = Point2d::new(x as f64 + 0.5, y as f64 + 0.5);
            if distance_to_segment(centre, a, b) <= half_width {
                self.drivable[y * self.width + x] = true;
            }
        }
    }
}
