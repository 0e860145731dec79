use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::grid::CellState::{Alive, Dead};

/// Byte value an alive cell is stored as in PGM images.
pub const ALIVE_BYTE: u8 = 0xFF;
/// Byte value a dead cell is stored as in PGM images.
pub const DEAD_BYTE: u8 = 0x00;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum CellState {
    #[default]
    Dead,
    Alive,
}

impl CellState {
    /// Any non-zero byte decodes as alive.
    pub fn from_byte(byte: u8) -> Self {
        if byte == DEAD_BYTE {
            Dead
        } else {
            Alive
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Alive => ALIVE_BYTE,
            Dead => DEAD_BYTE,
        }
    }

    pub fn is_alive(self) -> bool {
        self == Alive
    }

    /// Compute the next state of a cell from its live neighbour count.
    pub fn next(self, alive_neighbors: u8) -> Self {
        match (self, alive_neighbors) {
            (Alive, 2..=3) => Alive, // Survives
            (Dead, 3) => Alive,      // Becomes alive
            _ => Dead,               // Dies or remains dead
        }
    }
}

/// A cell coordinate, `x` is the column and `y` the row.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<CellState>>,
    width: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            cells: vec![vec![Dead; width]; height],
            width,
        }
    }

    /// Build a grid from complete rows. Every row must be `width` cells long.
    pub fn from_rows(width: usize, cells: Vec<Vec<CellState>>) -> Self {
        debug_assert!(cells.iter().all(|row| row.len() == width));
        Grid { cells, width }
    }

    /// Build a grid from a row-major byte stream of exactly `width * height` values.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Option<Self> {
        if width == 0 || bytes.len() != width * height {
            return None;
        }
        let cells = bytes
            .chunks(width)
            .map(|row| row.iter().copied().map(CellState::from_byte).collect())
            .collect();
        Some(Grid { cells, width })
    }

    /// An all-dead grid with the given cells brought to life. Coordinates wrap.
    pub fn with_alive(width: usize, height: usize, alive: &[Cell]) -> Self {
        let mut grid = Grid::new(width, height);
        for cell in alive {
            grid.cells[cell.y % height][cell.x % width] = Alive;
        }
        grid
    }

    pub fn random(width: usize, height: usize) -> Self {
        Self::random_with(width, height, &mut rand::rng())
    }

    pub fn random_with<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Self {
        let mut grid = Grid::new(width, height);
        for row in grid.cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = if rng.random_bool(0.5) { Alive } else { Dead };
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.cells
    }

    /// Row-major byte encoding, the inverse of [`Grid::from_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells
            .iter()
            .flat_map(|row| row.iter().map(|cell| cell.to_byte()))
            .collect()
    }
}

/// Read-only view over one generation.
///
/// Coordinates are normalised onto the torus, so `get(-1, -1)` is the bottom
/// right cell. Cloning a view shares the same underlying grid.
#[derive(Debug, Clone)]
pub struct GridView {
    grid: Arc<Grid>,
}

impl GridView {
    pub fn new(grid: Grid) -> Self {
        GridView { grid: Arc::new(grid) }
    }

    pub fn get(&self, y: isize, x: isize) -> CellState {
        let row = y.rem_euclid(self.height() as isize) as usize;
        let col = x.rem_euclid(self.width() as isize) as usize;
        self.grid.cells[row][col]
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.cells.len()
    }

    /// Raw access for the image collaborators; everything else reads through `get`.
    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Count the alive cells among the eight wrapped neighbours of `(y, x)`.
    pub fn alive_neighbors(&self, y: usize, x: usize) -> u8 {
        let (y, x) = (y as isize, x as isize);
        let mut count = 0;

        for dy in [-1, 0, 1] {
            for dx in [-1, 0, 1] {
                if dy == 0 && dx == 0 {
                    // Skip the current cell
                    continue;
                }
                if self.get(y + dy, x + dx).is_alive() {
                    count += 1;
                }
            }
        }

        count
    }

    /// True when both views point at the same generation.
    pub fn same_generation(&self, other: &GridView) -> bool {
        Arc::ptr_eq(&self.grid, &other.grid)
    }
}
