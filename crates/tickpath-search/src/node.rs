use std::cmp::Ordering;

use tickpath_core::{Grid, GridError, Point};

use crate::goalbound::Direction;

/// Where a node currently sits in the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    Unvisited,
    Open,
    Closed,
}

/// Per-cell search state.
///
/// One record exists per grid cell, owned by the engine's [`Grid`] arena.
/// Frontier backends and parent links refer to records by their stable
/// `index`, never by reference.
///
/// Two records are equal when they describe the same cell, regardless of
/// their costs.
#[derive(Debug, Clone, Copy)]
pub struct NodeRecord {
    pub x: i32,
    pub y: i32,
    /// Stable row-major index, assigned once at grid construction.
    pub index: usize,
    pub walkable: bool,
    pub g_cost: f64,
    pub h_cost: f64,
    pub f_cost: f64,
    /// Index of the predecessor on the best known path.
    pub parent: Option<usize>,
    pub status: NodeStatus,
    /// First-step bucket assigned during goal-bound preprocessing.
    pub best_goal_bound_edge: Option<Direction>,
}

impl NodeRecord {
    /// A fresh, unvisited record.
    pub fn new(x: i32, y: i32, index: usize) -> Self {
        Self {
            x,
            y,
            index,
            walkable: true,
            g_cost: f64::INFINITY,
            h_cost: 0.0,
            f_cost: f64::INFINITY,
            parent: None,
            status: NodeStatus::Unvisited,
            best_goal_bound_edge: None,
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Recompute `f_cost` from `g_cost` and `h_cost`.
    #[inline]
    pub fn calculate_f_cost(&mut self) {
        self.f_cost = self.g_cost + self.h_cost;
    }

    /// Record a better path through `parent`.
    #[inline]
    pub(crate) fn relax(&mut self, g_cost: f64, h_cost: f64, parent: usize) {
        self.g_cost = g_cost;
        self.h_cost = h_cost;
        self.calculate_f_cost();
        self.parent = Some(parent);
    }

    /// Clear all search state. Coordinates, index and walkability survive.
    pub fn reset(&mut self) {
        self.g_cost = f64::INFINITY;
        self.h_cost = 0.0;
        self.f_cost = f64::INFINITY;
        self.parent = None;
        self.status = NodeStatus::Unvisited;
        self.best_goal_bound_edge = None;
    }

    /// Frontier order: lower `f_cost`, then lower `h_cost`, then lower
    /// index. Total, so every backend extracts nodes in the same sequence.
    #[inline]
    pub fn rank_cmp(&self, other: &NodeRecord) -> Ordering {
        self.f_cost
            .total_cmp(&other.f_cost)
            .then(self.h_cost.total_cmp(&other.h_cost))
            .then(self.index.cmp(&other.index))
    }
}

impl PartialEq for NodeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for NodeRecord {}

/// Build a grid of fresh records, marking cells for which `walkable`
/// returns `false` as obstacles.
pub fn node_grid(
    width: i32,
    height: i32,
    cell_size: f32,
    walkable: impl Fn(Point) -> bool,
) -> Result<Grid<NodeRecord>, GridError> {
    let mut index = 0;
    Grid::new(width, height, cell_size, |x, y| {
        let mut n = NodeRecord::new(x, y, index);
        n.walkable = walkable(Point::new(x, y));
        index += 1;
        n
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_coordinates() {
        let mut a = NodeRecord::new(2, 3, 17);
        let b = NodeRecord::new(2, 3, 17);
        a.g_cost = 4.0;
        a.calculate_f_cost();
        assert_eq!(a, b);
        assert_ne!(a, NodeRecord::new(3, 2, 17));
    }

    #[test]
    fn rank_breaks_ties_by_h_then_index() {
        let mut a = NodeRecord::new(0, 0, 5);
        let mut b = NodeRecord::new(1, 0, 2);
        a.relax(2.0, 1.0, 0);
        b.relax(1.0, 2.0, 0);
        // Same f: lower h wins.
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
        b.relax(2.0, 1.0, 0);
        // Same f and h: lower index wins.
        assert_eq!(b.rank_cmp(&a), Ordering::Less);
        b.relax(0.5, 1.0, 0);
        assert_eq!(b.rank_cmp(&a), Ordering::Less);
    }

    #[test]
    fn reset_keeps_identity_and_walkability() {
        let mut n = NodeRecord::new(4, 1, 9);
        n.walkable = false;
        n.relax(3.0, 1.5, 2);
        n.status = NodeStatus::Closed;
        n.best_goal_bound_edge = Some(Direction::Left);
        n.reset();
        assert_eq!((n.x, n.y, n.index, n.walkable), (4, 1, 9, false));
        assert_eq!(n.status, NodeStatus::Unvisited);
        assert!(n.g_cost.is_infinite() && n.parent.is_none());
        assert!(n.best_goal_bound_edge.is_none());
    }

    #[test]
    fn node_grid_assigns_stable_indices() {
        let g = node_grid(3, 2, 1.0, |p| p != Point::new(1, 1)).unwrap();
        for (i, n) in g.cells().iter().enumerate() {
            assert_eq!(n.index, i);
            assert_eq!(g.index(n.pos()), Some(i));
        }
        assert!(!g.at(Point::new(1, 1)).unwrap().walkable);
        assert!(g.at(Point::new(2, 1)).unwrap().walkable);
    }
}
