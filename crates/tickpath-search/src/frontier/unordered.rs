use super::{ClosedSet, OpenSet};
use crate::node::{NodeRecord, NodeStatus};

/// A plain vector of node indices.
///
/// Every lookup is a linear scan comparing cell coordinates, and the best
/// node is found by scanning the whole list. Slow, but simple enough to
/// serve as the reference the other backends are checked against. Works as
/// either an open set or a closed set.
#[derive(Debug, Default, Clone)]
pub struct UnorderedList {
    items: Vec<usize>,
}

impl UnorderedList {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize> {
        let target = &nodes[id];
        self.items.iter().position(|&i| nodes[i] == *target)
    }

    fn best_position(&self, nodes: &[NodeRecord]) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| nodes[**a].rank_cmp(&nodes[**b]))
            .map(|(pos, _)| pos)
    }

    fn take(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        if let Some(pos) = self.position(id, nodes) {
            let i = self.items.swap_remove(pos);
            nodes[i].status = NodeStatus::Unvisited;
        }
    }
}

impl OpenSet for UnorderedList {
    fn initialize(&mut self) {
        self.items.clear();
    }

    fn add(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        nodes[id].status = NodeStatus::Open;
        self.items.push(id);
    }

    fn best_and_remove(&mut self, nodes: &mut [NodeRecord]) -> Option<usize> {
        let pos = self.best_position(nodes)?;
        Some(self.items.swap_remove(pos))
    }

    fn peek_best(&self, nodes: &[NodeRecord]) -> Option<usize> {
        self.best_position(nodes).map(|pos| self.items[pos])
    }

    fn search(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize> {
        self.position(id, nodes).map(|pos| self.items[pos])
    }

    fn remove(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        self.take(id, nodes);
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn members<'a>(&'a self, _nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        self.items.iter().copied()
    }
}

impl ClosedSet for UnorderedList {
    fn initialize(&mut self) {
        self.items.clear();
    }

    fn add(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        nodes[id].status = NodeStatus::Closed;
        self.items.push(id);
    }

    fn search(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize> {
        self.position(id, nodes).map(|pos| self.items[pos])
    }

    fn remove(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        self.take(id, nodes);
    }

    fn count(&self) -> usize {
        self.items.len()
    }

    fn members<'a>(&'a self, _nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        self.items.iter().copied()
    }
}
