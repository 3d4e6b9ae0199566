use std::cmp::Ordering;

use itertools::iproduct;
use nalgebra::Vector2;
use tracing::debug;

use super::{Cell, CellState, GridData};
use crate::error::{MapError, Result};
use crate::graph::Node;

/// The fused world-frame occupancy grid covering all observed terrain.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalMap {
    /** the position of this map in the world (lower left corner), in meters */
    origin: Vector2<f64>,

    /** the resolution of this map, given in meters per cell */
    resolution: f64,

    cells: GridData<CellState>,
}

impl GlobalMap {
    /// Fuses the local grids of all nodes into one map by per-cell voting.
    ///
    /// Every node stamps its local grid into the shared frame and votes on
    /// each covered cell; a cell ends up free or blocked when one kind of
    /// evidence outnumbers the other and unknown on a tie (including the
    /// never-observed case).
    pub(crate) fn fuse(nodes: &[Node], resolution: f64) -> Result<Self> {
        if nodes.is_empty() {
            return Err(MapError::EmptyGraph);
        }

        // outer bounds of the fused map in world coordinates
        let mut xmin = f64::INFINITY;
        let mut xmax = f64::NEG_INFINITY;
        let mut ymin = f64::INFINITY;
        let mut ymax = f64::NEG_INFINITY;

        for node in nodes {
            let pose = node.pose();
            let grid = node.grid();

            xmax = xmax.max(pose.x + grid.xmax() as f64 * resolution);
            xmin = xmin.min(pose.x - grid.xmin() as f64 * resolution);
            ymax = ymax.max(pose.y + grid.ymax() as f64 * resolution);
            ymin = ymin.min(pose.y - grid.ymin() as f64 * resolution);
        }

        // both edge columns and rows are part of the map, like in the local
        // grids; with consistent rounding every stamped cell then lands inside
        let width = ((xmax - xmin) / resolution).round() as usize + 1;
        let height = ((ymax - ymin) / resolution).round() as usize + 1;

        let size = width.checked_mul(height).ok_or_else(|| {
            MapError::MapExtent(format!("{width}x{height} cells exceed addressable memory"))
        })?;

        debug!(nodes = nodes.len(), width, height, "fusing local grids");

        // per-cell vote counters over all local grids
        let mut seen = vec![0u32; size];
        let mut free = vec![0u32; size];
        let mut blocked = vec![0u32; size];

        for node in nodes {
            let pose = node.pose();
            let grid = node.grid();

            // global cell of the local grid's lower-left corner
            let nx = ((pose.x - xmin) / resolution).round() as isize - grid.xmin() as isize;
            let ny = ((pose.y - ymin) / resolution).round() as isize - grid.ymin() as isize;
            debug_assert!(nx >= 0 && ny >= 0);
            let (nx, ny) = (nx as usize, ny as usize);

            for (row, column) in iproduct!(0..grid.height(), 0..grid.width()) {
                let global = (ny + row) * width + nx + column;

                seen[global] += 1;
                match grid.get(Cell::new(column, row)) {
                    CellState::Blocked => blocked[global] += 1,
                    CellState::Free => free[global] += 1,
                    CellState::Unknown => {}
                }
            }
        }

        let observed = seen.iter().filter(|&&count| count > 0).count();
        debug!(observed, total = size, "vote counting finished");

        // majority vote per cell; a tie carries no decision
        let data = free
            .iter()
            .zip(blocked.iter())
            .map(|(f, b)| match f.cmp(b) {
                Ordering::Greater => CellState::Free,
                Ordering::Less => CellState::Blocked,
                Ordering::Equal => CellState::Unknown,
            })
            .collect();

        Ok(Self {
            origin: Vector2::new(xmin, ymin),
            resolution,
            cells: GridData::from_vec(Vector2::new(width, height), data),
        })
    }

    /// World coordinates of the lower-left corner, in meters.
    pub fn origin(&self) -> Vector2<f64> {
        self.origin
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Width of the map in cells.
    pub fn width(&self) -> usize {
        self.cells.size().x
    }

    /// Height of the map in cells.
    pub fn height(&self) -> usize {
        self.cells.size().y
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

#[cfg(test)]
mod test {

    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;
    use common::robot::{LaserScan, Pose};

    use super::*;
    use crate::config::MappingConfig;
    use crate::graph::Graph;

    fn config(resolution: f64, range_threshold: f64) -> MappingConfig {
        MappingConfig {
            resolution,
            range_threshold,
            ..Default::default()
        }
    }

    fn cardinal_scan() -> LaserScan {
        LaserScan {
            angle_min: 0.0,
            angle_increment: FRAC_PI_2,
            range_max: 10.0,
            ranges: vec![1.0, 1.0, 1.0, 1.0],
        }
    }

    /// A single east-pointing beam of the given length.
    fn east_beam(range: f64) -> LaserScan {
        LaserScan {
            angle_min: 0.0,
            angle_increment: FRAC_PI_2,
            range_max: 10.0,
            ranges: vec![range],
        }
    }

    #[test]
    fn single_node_map_embeds_the_local_grid() {
        let mut graph = Graph::new(config(0.1, 1.0)).unwrap();
        let id = graph.add_node(Pose::default(), cardinal_scan()).unwrap();
        let map = graph.generate_map().unwrap();

        let grid = graph.node(id).unwrap().grid();
        assert_eq!(map.width(), grid.width());
        assert_eq!(map.height(), grid.height());
        assert_eq!(map.to_occupancy(), grid.to_occupancy());

        // lower-left corner sits one local half-extent below the pose
        assert_relative_eq!(map.origin().x, -1.0);
        assert_relative_eq!(map.origin().y, -1.0);
    }

    #[test]
    fn identical_nodes_never_vote_each_other_unknown() {
        let mut graph = Graph::new(config(0.1, 1.0)).unwrap();
        graph.add_node(Pose::default(), cardinal_scan()).unwrap();
        let single = graph.generate_map().unwrap();

        graph.add_node(Pose::default(), cardinal_scan()).unwrap();
        let double = graph.generate_map().unwrap();

        assert_eq!(single.to_occupancy(), double.to_occupancy());
    }

    #[test]
    fn conflicting_votes_cancel_to_unknown() {
        let mut graph = Graph::new(config(0.1, 1.0)).unwrap();

        // node A ends its beam at 1 m, node B sees 2 m through the same cell
        graph.add_node(Pose::default(), east_beam(1.0)).unwrap();
        graph.add_node(Pose::default(), east_beam(2.0)).unwrap();

        let map = graph.generate_map().unwrap();
        assert_eq!((map.width(), map.height()), (21, 1));

        // blocked for A, free for B: one vote each
        assert_eq!(map.get(Cell::new(10, 0)), CellState::Unknown);

        // both agree on the cells closer than 1 m
        assert_eq!(map.get(Cell::new(5, 0)), CellState::Free);

        // only B reaches past 1 m
        assert_eq!(map.get(Cell::new(20, 0)), CellState::Blocked);
        assert_eq!(map.get(Cell::new(15, 0)), CellState::Free);
    }

    #[test]
    fn displaced_nodes_expand_the_extent() {
        let mut graph = Graph::new(config(0.1, 1.0)).unwrap();
        graph.add_node(Pose::default(), cardinal_scan()).unwrap();
        graph
            .add_node(Pose::new(2.0, 0.5, 0.0), cardinal_scan())
            .unwrap();

        let map = graph.generate_map().unwrap();

        // x spans [-1, 3], y spans [-1, 1.5]
        assert_relative_eq!(map.origin().x, -1.0);
        assert_relative_eq!(map.origin().y, -1.0);
        assert_eq!((map.width(), map.height()), (41, 26));

        // all stamped votes landed inside the map, and both pose cells are free
        assert_eq!(map.get(Cell::new(10, 10)), CellState::Free);
        assert_eq!(map.get(Cell::new(30, 15)), CellState::Free);
    }

    #[test]
    fn adding_nodes_only_adds_evidence() {
        let mut graph = Graph::new(config(0.1, 1.0)).unwrap();
        graph.add_node(Pose::default(), east_beam(1.0)).unwrap();
        let before = graph.generate_map().unwrap();

        // a second observation of the same obstacle
        graph.add_node(Pose::default(), east_beam(1.0)).unwrap();
        let after = graph.generate_map().unwrap();

        for (cell, &state) in before.cells().iter_cells() {
            if state != CellState::Unknown {
                assert_eq!(after.get(cell), state);
            }
        }
    }
}
