use super::Frontier;
use super::heap::IndexedHeap;
use crate::node::{NodeRecord, NodeStatus};

/// Combined open/closed frontier indexed by each record's stable index.
///
/// The closed set is nothing more than the records' `status` field plus a
/// counter, so closed membership is a single array read. The open set is
/// an [`IndexedHeap`] with true decrease-key. Clearing the frontier only
/// touches the nodes it holds; record state is reset by the engine.
#[derive(Debug, Default, Clone)]
pub struct NodeArray {
    open: IndexedHeap,
    closed: usize,
}

impl NodeArray {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for NodeArray {
    fn initialize(&mut self) {
        self.open.clear();
        self.closed = 0;
    }

    fn add_to_open(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        if nodes[id].status == NodeStatus::Closed {
            self.closed -= 1;
        }
        nodes[id].status = NodeStatus::Open;
        self.open.push(id, nodes);
    }

    fn best_and_remove(&mut self, nodes: &mut [NodeRecord]) -> Option<usize> {
        self.open.pop(nodes)
    }

    fn peek_best(&self, _nodes: &[NodeRecord]) -> Option<usize> {
        self.open.peek()
    }

    fn search_in_open(&self, id: usize, _nodes: &[NodeRecord]) -> Option<usize> {
        self.open.contains(id).then_some(id)
    }

    fn update_in_open(&mut self, id: usize, nodes: &[NodeRecord]) {
        self.open.update(id, nodes);
    }

    fn remove_from_open(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        if self.open.remove(id, nodes) {
            nodes[id].status = NodeStatus::Unvisited;
        }
    }

    fn count_open(&self) -> usize {
        self.open.len()
    }

    fn add_to_closed(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        self.open.remove(id, nodes);
        if nodes[id].status != NodeStatus::Closed {
            self.closed += 1;
        }
        nodes[id].status = NodeStatus::Closed;
    }

    fn search_in_closed(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize> {
        (nodes[id].status == NodeStatus::Closed).then_some(id)
    }

    fn remove_from_closed(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        if nodes[id].status == NodeStatus::Closed {
            nodes[id].status = NodeStatus::Unvisited;
            self.closed -= 1;
        }
    }

    fn count_closed(&self) -> usize {
        self.closed
    }

    fn open_members<'a>(&'a self, _nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        self.open.iter()
    }

    /// Scans the whole arena; closed membership is only stored in the
    /// records.
    fn closed_members<'a>(&'a self, nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.status == NodeStatus::Closed)
            .map(|(i, _)| i)
    }

    #[inline]
    fn status_of(&self, id: usize, nodes: &[NodeRecord]) -> NodeStatus {
        nodes[id].status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::node_grid;

    #[test]
    fn status_is_read_straight_from_the_record() {
        let mut nodes = node_grid(3, 3, 1.0, |_| true).unwrap().cells().to_vec();
        let mut f = NodeArray::new();
        f.add_to_open(4, &mut nodes);
        assert_eq!(f.status_of(4, &nodes), NodeStatus::Open);
        assert_eq!(f.best_and_remove(&mut nodes), Some(4));
        f.add_to_closed(4, &mut nodes);
        assert_eq!(f.status_of(4, &nodes), NodeStatus::Closed);
        assert_eq!(f.status_of(0, &nodes), NodeStatus::Unvisited);
    }

    #[test]
    fn reopening_a_closed_node_keeps_counts_consistent() {
        let mut nodes = node_grid(3, 1, 1.0, |_| true).unwrap().cells().to_vec();
        let mut f = NodeArray::new();
        f.add_to_closed(1, &mut nodes);
        f.add_to_closed(2, &mut nodes);
        assert_eq!(f.count_closed(), 2);
        // Reopened without an explicit removal from the closed set.
        f.add_to_open(1, &mut nodes);
        assert_eq!(f.count_closed(), 1);
        assert_eq!(f.count_open(), 1);
        assert_eq!(f.search_in_closed(1, &nodes), None);
    }
}
