//! The [`Grid`] type: a dense 2D container with change tracking.
//!
//! A `Grid<T>` owns exactly one value per cell in `[0, width) × [0, height)`,
//! stored row-major so that every cell has a stable flat index for the
//! lifetime of the grid. Reads outside the grid return `None`; writes
//! outside the grid are ignored.
//!
//! Writes can be observed by enabling change tracking: each write then
//! appends its coordinate to a queue that a renderer drains at its own pace.

use thiserror::Error;

use crate::geom::Point;

/// Errors raised when constructing a [`Grid`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Width or height is zero or negative.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    /// Cell size is zero, negative, or not finite.
    #[error("grid cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
}

/// A dense 2D grid of `T` values.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    cells: Vec<T>,
    width: i32,
    height: i32,
    cell_size: f32,
    // `None` while change tracking is disabled.
    changes: Option<Vec<Point>>,
}

impl<T> Grid<T> {
    /// Create a grid, building each cell with `factory(x, y)` in row-major
    /// order.
    pub fn new(
        width: i32,
        height: i32,
        cell_size: f32,
        mut factory: impl FnMut(i32, i32) -> T,
    ) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidSize { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(factory(x, y));
            }
        }
        Ok(Self {
            cells,
            width,
            height,
            cell_size,
            changes: None,
        })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Side length of one cell in world units.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Size of the grid as a `Point`.
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: construction rejects empty grids.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Stable row-major index of `p`, or `None` outside the grid.
    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    /// Inverse of [`index`](Self::index). `idx` must be `< len()`.
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        let w = self.width as usize;
        Point::new((idx % w) as i32, (idx / w) as i32)
    }

    /// Read the cell at `p`. Returns `None` outside the grid.
    #[inline]
    pub fn at(&self, p: Point) -> Option<&T> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Replace the cell at `p` and record the change.
    ///
    /// Returns `false` (and does nothing) if `p` is outside the grid.
    pub fn set(&mut self, p: Point, value: T) -> bool {
        let Some(i) = self.index(p) else {
            return false;
        };
        self.cells[i] = value;
        self.notify(p);
        true
    }

    /// Mutate the cell at `p` in place and record the change.
    pub fn update<R>(&mut self, p: Point, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let i = self.index(p)?;
        let r = f(&mut self.cells[i]);
        self.notify(p);
        Some(r)
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Mutable access to all cells. Writes through this slice are not
    /// recorded; pair them with [`notify`](Self::notify).
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Record that the cell at `p` changed. Ignored outside the grid or
    /// while tracking is disabled.
    #[inline]
    pub fn notify(&mut self, p: Point) {
        if !self.contains(p) {
            return;
        }
        if let Some(changes) = self.changes.as_mut() {
            changes.push(p);
        }
    }

    /// Enable or disable change tracking. Disabling discards pending changes.
    pub fn track_changes(&mut self, enabled: bool) {
        match (enabled, self.changes.is_some()) {
            (true, false) => self.changes = Some(Vec::new()),
            (false, true) => self.changes = None,
            _ => {}
        }
    }

    /// Whether change tracking is enabled.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.changes.is_some()
    }

    /// Drain recorded changes in write order. A cell written twice appears
    /// twice.
    pub fn drain_changes(&mut self) -> impl Iterator<Item = Point> + '_ {
        self.changes.iter_mut().flat_map(|changes| changes.drain(..))
    }

    /// Grid coordinate containing the world position `(world_x, world_z)`.
    ///
    /// The world's depth axis (`z`) maps to the grid's `y` axis. The result
    /// may lie outside the grid.
    pub fn world_to_grid(&self, world_x: f32, world_z: f32) -> Point {
        Point::new(
            (world_x / self.cell_size).floor() as i32,
            (world_z / self.cell_size).floor() as i32,
        )
    }

    /// World position `[x, 0, z]` of the corner of cell `p`.
    pub fn grid_to_world(&self, p: Point) -> [f32; 3] {
        [
            p.x as f32 * self.cell_size,
            0.0,
            p.y as f32 * self.cell_size,
        ]
    }

    /// Read the cell under a world position.
    pub fn at_world(&self, world_x: f32, world_z: f32) -> Option<&T> {
        self.at(self.world_to_grid(world_x, world_z))
    }

    /// Row-major iterator over `(Point, &T)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (self.point(i), c))
    }
}
