use common::math::wrap_2pi;
use common::robot::{LaserScan, Pose};
use itertools::iproduct;
use nalgebra::Vector2;

use super::{Cell, CellState, GridData};
use crate::error::{MapError, Result};

/// A local occupancy grid built from a single scan, expressed in cells
/// relative to the pose the scan was taken at.
///
/// The pose sits at cell `(xmin, ymin)`: the grid extends `xmin` cells below
/// and `xmax` cells above the pose cell along x (symmetrically for y), so it
/// is `xmin + xmax + 1` cells wide and `ymin + ymax + 1` cells tall. Both
/// edges of the bounding rectangle are part of the grid, so the pose cell and
/// every beam end point always lie inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanGrid {
    /** the resolution of this grid, given in meters per cell */
    resolution: f64,

    /** number of cells between the pose cell and the negative-x edge */
    xmin: usize,

    /** number of cells between the pose cell and the positive-x edge */
    xmax: usize,

    /** number of cells between the pose cell and the negative-y edge */
    ymin: usize,

    /** number of cells between the pose cell and the positive-y edge */
    ymax: usize,

    cells: GridData<CellState>,
}

impl ScanGrid {
    /// Builds the local grid for one `(pose, scan)` observation.
    ///
    /// Cells holding the end point of a trusted beam become
    /// [`CellState::Blocked`], cells between the sensor and a trusted end
    /// point become [`CellState::Free`] and everything else stays
    /// [`CellState::Unknown`]. A beam is trusted when its measurement does
    /// not exceed `range_max * range_threshold`.
    pub fn from_scan(
        pose: Pose,
        scan: &LaserScan,
        resolution: f64,
        range_threshold: f64,
    ) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "resolution must be a positive finite number, got {resolution}"
            )));
        }
        if !range_threshold.is_finite() || range_threshold <= 0.0 || range_threshold > 1.0 {
            return Err(MapError::InvalidConfig(format!(
                "range_threshold must be in (0, 1], got {range_threshold}"
            )));
        }
        if scan.is_empty() {
            return Err(MapError::InvalidScan("scan contains no beams".into()));
        }
        if ![scan.angle_min, scan.angle_increment, scan.range_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(MapError::InvalidScan(
                "angle_min, angle_increment and range_max must be finite".into(),
            ));
        }
        if let Some(i) = scan.ranges.iter().position(|r| !r.is_finite()) {
            return Err(MapError::InvalidScan(format!("range {i} is not finite")));
        }

        let mut grid = Self::with_scan_bounds(pose, scan, resolution);
        grid.place_endpoints(pose, scan, range_threshold);
        grid.fill_free_space(pose, scan, range_threshold);
        Ok(grid)
    }

    /// Sizes the grid so that it tightly bounds every beam end point.
    ///
    /// The raw measurements are used here: beams that `range_threshold` later
    /// discards still count towards the bounds.
    fn with_scan_bounds(pose: Pose, scan: &LaserScan, resolution: f64) -> Self {
        let mut xmin_w = f64::INFINITY;
        let mut xmax_w = f64::NEG_INFINITY;
        let mut ymin_w = f64::INFINITY;
        let mut ymax_w = f64::NEG_INFINITY;

        for point in scan.to_points(pose) {
            xmin_w = xmin_w.min(point.x);
            xmax_w = xmax_w.max(point.x);
            ymin_w = ymin_w.min(point.y);
            ymax_w = ymax_w.max(point.y);
        }

        // distance from the pose to each edge, in whole cells; a scan that
        // only covers one side of an axis must not shrink the other side
        // below the pose cell
        let half_extent = |distance: f64| (distance / resolution).round().max(0.0) as usize;

        let xmin = half_extent(pose.x - xmin_w);
        let xmax = half_extent(xmax_w - pose.x);
        let ymin = half_extent(pose.y - ymin_w);
        let ymax = half_extent(ymax_w - pose.y);

        let size = Vector2::new(xmin + xmax + 1, ymin + ymax + 1);

        Self {
            resolution,
            xmin,
            xmax,
            ymin,
            ymax,
            cells: GridData::new_fill(size, CellState::Unknown),
        }
    }

    /// Marks the cell every trusted beam ends in as blocked.
    fn place_endpoints(&mut self, pose: Pose, scan: &LaserScan, range_threshold: f64) {
        let max_range = scan.range_max * range_threshold;

        for (i, &range) in scan.ranges.iter().enumerate() {
            // out-of-range measurements leave no obstacle behind
            if range > max_range {
                continue;
            }

            let angle = pose.theta + scan.beam_angle(i);
            let x = range * angle.cos();
            let y = range * angle.sin();

            let column = (self.xmin as isize + (x / self.resolution).round() as isize) as usize;
            let row = (self.ymin as isize + (y / self.resolution).round() as isize) as usize;

            *self.cells.get_mut(Cell::new(column, row)) = CellState::Blocked;
        }
    }

    /// Classifies all remaining cells by casting their bearing back onto the
    /// scan: a cell in front of the end point of a trusted beam is free,
    /// everything else stays unknown.
    fn fill_free_space(&mut self, pose: Pose, scan: &LaserScan, range_threshold: f64) {
        let max_range = scan.range_max * range_threshold;
        let num_beams = scan.len();
        let size = self.cells.size();

        for (row, column) in iproduct!(0..size.y, 0..size.x) {
            let cell = Cell::new(column, row);
            if *self.cells.get(cell) == CellState::Blocked {
                continue;
            }

            // the pose cell is where the sensor stands
            if column == self.xmin && row == self.ymin {
                *self.cells.get_mut(cell) = CellState::Free;
                continue;
            }

            let dx = column as f64 - self.xmin as f64;
            let dy = row as f64 - self.ymin as f64;

            // bearing of the cell as seen from the sensor, mapped onto a beam index
            let bearing = wrap_2pi(dy.atan2(dx) - pose.theta - scan.angle_min);
            let index = (bearing / scan.angle_increment).round();
            if !(0.0..num_beams as f64).contains(&index) {
                continue;
            }

            let range = scan.ranges[index as usize];
            if range > max_range {
                continue;
            }

            let distance = (dx * dx + dy * dy).sqrt() * self.resolution;
            if range - distance > 0.0 {
                *self.cells.get_mut(cell) = CellState::Free;
            }
        }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn xmin(&self) -> usize {
        self.xmin
    }

    pub fn xmax(&self) -> usize {
        self.xmax
    }

    pub fn ymin(&self) -> usize {
        self.ymin
    }

    pub fn ymax(&self) -> usize {
        self.ymax
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.cells.size().x
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.cells.size().y
    }

    /// The cell the pose itself maps to.
    pub fn pose_cell(&self) -> Cell {
        Cell::new(self.xmin, self.ymin)
    }

    pub fn get(&self, cell: Cell) -> CellState {
        *self.cells.get(cell)
    }

    pub fn cells(&self) -> &GridData<CellState> {
        &self.cells
    }

    /// The row-major cell values encoded with the external `-1 / 0 / 100` convention.
    pub fn to_occupancy(&self) -> Vec<i8> {
        self.cells.to_occupancy()
    }
}
