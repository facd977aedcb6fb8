use std::collections::HashMap;

use tickpath_core::Point;

use super::ClosedSet;
use crate::node::{NodeRecord, NodeStatus};

/// Closed set keyed by cell coordinates, for O(1) membership tests.
#[derive(Debug, Default, Clone)]
pub struct ClosedDictionary {
    map: HashMap<Point, usize>,
}

impl ClosedDictionary {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClosedSet for ClosedDictionary {
    fn initialize(&mut self) {
        self.map.clear();
    }

    fn add(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        nodes[id].status = NodeStatus::Closed;
        self.map.insert(nodes[id].pos(), id);
    }

    fn search(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize> {
        self.map.get(&nodes[id].pos()).copied()
    }

    fn remove(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        if let Some(i) = self.map.remove(&nodes[id].pos()) {
            nodes[i].status = NodeStatus::Unvisited;
        }
    }

    fn count(&self) -> usize {
        self.map.len()
    }

    fn members<'a>(&'a self, _nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        self.map.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::node_grid;

    #[test]
    fn re_adding_a_cell_keeps_one_entry() {
        let mut nodes = node_grid(2, 2, 1.0, |_| true).unwrap().cells().to_vec();
        let mut closed = ClosedDictionary::new();
        closed.add(3, &mut nodes);
        closed.add(3, &mut nodes);
        assert_eq!(closed.count(), 1);
        assert_eq!(closed.search(3, &nodes), Some(3));
        closed.remove(3, &mut nodes);
        assert_eq!(closed.count(), 0);
        assert_eq!(nodes[3].status, NodeStatus::Unvisited);
    }
}
