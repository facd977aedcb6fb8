use tickpath_core::{Grid, Point};

use crate::node::NodeRecord;

/// Reusable buffer for 8-way neighbor enumeration.
///
/// Diagonal steps are allowed even when both orthogonal cells beside them
/// are obstacles.
#[derive(Debug)]
pub struct Neighbors {
    buf: Vec<usize>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Indices of the walkable in-bounds neighbors of `p`, in
    /// [`Point::neighbors_8`] order.
    pub fn walkable(&mut self, grid: &Grid<NodeRecord>, p: Point) -> &[usize] {
        self.buf.clear();
        for n in p.neighbors_8() {
            let Some(i) = grid.index(n) else {
                continue;
            };
            if grid.cells()[i].walkable {
                self.buf.push(i);
            }
        }
        &self.buf
    }
}
