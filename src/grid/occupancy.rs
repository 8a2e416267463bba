//! Boolean occupancy grid.
//!
//! Cell `(0, 0)` has its lower-left corner at `origin`; cell `(x, y)` covers
//! `[origin.x + x·s, origin.x + (x+1)·s) × [origin.y + y·s, origin.y + (y+1)·s)`
//! where `s` is the cell size.
//!
//! The grid is built through `&mut` methods and then shared read-only behind
//! an `Arc` by the localizer, which never mutates it.

use crate::core::Point2D;
use crate::error::{LocalizationError, Result};

use super::GridCoord;

/// Occupancy grid with `true` = occupied.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cell_size: f32,
    inv_cell_size: f32,
    origin: Point2D,
    /// Row-major storage: `cells[y * width + x]`
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Create an all-free grid with its origin at (0, 0).
    pub fn new(width: usize, height: usize, cell_size: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(LocalizationError::InvalidMap(format!(
                "grid must have at least one cell, got {}x{}",
                width, height
            )));
        }
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(LocalizationError::InvalidMap(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }

        Ok(Self {
            width,
            height,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            origin: Point2D::zero(),
            cells: vec![false; width * height],
        })
    }

    /// Create a grid from columns of occupancy flags.
    ///
    /// The outer index is x and the inner index is y, so
    /// `columns[x][y]` is the state of cell `(x, y)`.
    pub fn from_cells(columns: &[Vec<bool>], cell_size: f32) -> Result<Self> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != height) {
            return Err(LocalizationError::InvalidMap(
                "all grid columns must have the same length".to_string(),
            ));
        }

        let mut grid = Self::new(width, height, cell_size)?;
        for (x, column) in columns.iter().enumerate() {
            for (y, &occupied) in column.iter().enumerate() {
                grid.cells[y * width + x] = occupied;
            }
        }
        Ok(grid)
    }

    /// Move the world position of cell (0, 0)'s lower-left corner.
    pub fn with_origin(mut self, origin: Point2D) -> Self {
        self.origin = origin;
        self
    }

    /// Set a cell's occupancy. Returns false if the cell is outside the grid.
    pub fn set_occupied(&mut self, cell: GridCoord, occupied: bool) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.cells[i] = occupied;
                true
            }
            None => false,
        }
    }

    /// Grid width and height in cells.
    #[inline]
    pub fn size_in_cells(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Edge length of a cell in meters.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of cell (0, 0)'s lower-left corner.
    #[inline]
    pub fn origin(&self) -> Point2D {
        self.origin
    }

    /// World bounds: (min_point, max_point).
    pub fn bounds(&self) -> (Point2D, Point2D) {
        let max = Point2D::new(
            self.origin.x + self.width as f32 * self.cell_size,
            self.origin.y + self.height as f32 * self.cell_size,
        );
        (self.origin, max)
    }

    /// Check if grid coordinates are within bounds.
    #[inline]
    pub fn covers_cell(&self, cell: GridCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    /// Check if a world point lies on the grid.
    #[inline]
    pub fn covers_point(&self, pos: Point2D) -> bool {
        self.pos_to_cell(pos).is_some()
    }

    /// Convert world coordinates to the containing cell, if on the grid.
    #[inline]
    pub fn pos_to_cell(&self, pos: Point2D) -> Option<GridCoord> {
        if !(pos.x.is_finite() && pos.y.is_finite()) {
            return None;
        }
        let cell = self.pos_to_cell_unchecked(pos);
        self.covers_cell(cell).then_some(cell)
    }

    /// Convert world coordinates to a cell index without bounds checking.
    #[inline]
    pub fn pos_to_cell_unchecked(&self, pos: Point2D) -> GridCoord {
        let x = ((pos.x - self.origin.x) * self.inv_cell_size).floor();
        let y = ((pos.y - self.origin.y) * self.inv_cell_size).floor();
        // clamp keeps huge values from saturating into a valid-looking index
        GridCoord::new(
            x.clamp(i32::MIN as f32, i32::MAX as f32) as i32,
            y.clamp(i32::MIN as f32, i32::MAX as f32) as i32,
        )
    }

    /// Convert grid coordinates to world coordinates (cell center).
    #[inline]
    pub fn cell_to_pos(&self, cell: GridCoord) -> Point2D {
        Point2D::new(
            self.origin.x + (cell.x as f32 + 0.5) * self.cell_size,
            self.origin.y + (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Is the cell occupied? Cells outside the grid are reported free.
    #[inline]
    pub fn is_occupied(&self, cell: GridCoord) -> bool {
        self.index(cell).is_some_and(|i| self.cells[i])
    }

    /// Is the cell containing `pos` occupied? Off-grid points are reported free.
    #[inline]
    pub fn is_occupied_at(&self, pos: Point2D) -> bool {
        self.pos_to_cell(pos).is_some_and(|c| self.is_occupied(c))
    }

    /// Is `pos` on the grid and in a free cell?
    #[inline]
    pub fn is_free_at(&self, pos: Point2D) -> bool {
        self.pos_to_cell(pos).is_some_and(|c| !self.is_occupied(c))
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Number of free cells.
    pub fn free_count(&self) -> usize {
        self.cells.len() - self.occupied_count()
    }

    /// Iterate over all occupied cells.
    pub fn occupied_cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .map(|(i, _)| GridCoord::new((i % self.width) as i32, (i / self.width) as i32))
    }

    #[inline]
    fn index(&self, cell: GridCoord) -> Option<usize> {
        self.covers_cell(cell)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }
}
