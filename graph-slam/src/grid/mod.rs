mod map;
mod scan;

pub use map::GlobalMap;
pub use scan::ScanGrid;

use nalgebra::Vector2;

/// Occupancy value of a free cell at the external boundary.
pub const OCC_FREE: i8 = 0;
/// Occupancy value of a blocked cell at the external boundary.
pub const OCC_BLOCKED: i8 = 100;
/// Occupancy value of an unknown cell at the external boundary.
pub const OCC_UNKNOWN: i8 = -1;

/// The three-valued occupancy state of a single grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellState {
    /// No beam provided any evidence about this cell.
    #[default]
    Unknown,

    /// The cell lies between the sensor and a beam end point.
    Free,

    /// A beam end point lies within this cell.
    Blocked,
}

impl CellState {
    /// Encodes the state using the standard `-1 / 0 / 100` occupancy grid convention.
    pub fn to_occupancy(self) -> i8 {
        match self {
            CellState::Unknown => OCC_UNKNOWN,
            CellState::Free => OCC_FREE,
            CellState::Blocked => OCC_BLOCKED,
        }
    }

    /// Decodes an external occupancy value, if it is one of the three known values.
    pub fn from_occupancy(value: i8) -> Option<CellState> {
        match value {
            OCC_UNKNOWN => Some(CellState::Unknown),
            OCC_FREE => Some(CellState::Free),
            OCC_BLOCKED => Some(CellState::Blocked),
            _ => None,
        }
    }
}

/// A single cell position within a grid; the column counts along x, the row along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub column: usize,
    pub row: usize,
}

impl Cell {
    pub fn new(column: usize, row: usize) -> Self {
        Cell { column, row }
    }
}

/// Rectangular container of per-cell values stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridData<T> {
    /** the size of the grid in cells (x = columns, y = rows) */
    size: Vector2<usize>,

    /// Vector containing all the data values
    data: Vec<T>,
}

impl<T> GridData<T> {
    fn index(&self, cell: Cell) -> usize {
        // Row-major order
        cell.row * self.size.x + cell.column
    }

    fn cell(&self, index: usize) -> Cell {
        // Row-major order
        assert!(index < self.size.x * self.size.y);

        Cell {
            row: index / self.size.x,
            column: index % self.size.x,
        }
    }

    pub fn get(&self, cell: Cell) -> &T {
        &self.data[self.index(cell)]
    }

    pub fn get_mut(&mut self, cell: Cell) -> &mut T {
        let index = self.index(cell);
        &mut self.data[index]
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (Cell, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (self.cell(i), v))
    }

    /// The raw row-major values of the grid.
    pub fn values(&self) -> &[T] {
        &self.data
    }

    pub fn size(&self) -> Vector2<usize> {
        self.size
    }
}

impl<T: Clone> GridData<T> {
    pub fn new_fill(size: Vector2<usize>, initial_value: T) -> Self {
        Self {
            size,
            data: vec![initial_value; size.x * size.y],
        }
    }

    pub fn from_vec(size: Vector2<usize>, data: Vec<T>) -> Self {
        assert_eq!(data.len(), size.x * size.y);
        Self { size, data }
    }
}

impl GridData<CellState> {
    /// The row-major cell values encoded with the external `-1 / 0 / 100` convention.
    pub fn to_occupancy(&self) -> Vec<i8> {
        self.data.iter().map(|s| s.to_occupancy()).collect()
    }
}
