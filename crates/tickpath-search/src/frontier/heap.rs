use super::OpenSet;
use crate::node::{NodeRecord, NodeStatus};

const ABSENT: usize = usize::MAX;

/// Binary min-heap of node indices ordered by [`NodeRecord::rank_cmp`].
///
/// `slots[id]` holds the heap position of node `id` (or `ABSENT`), which
/// makes membership O(1) and lets any member be removed or re-sifted after
/// its costs change.
#[derive(Debug, Default, Clone)]
pub(crate) struct IndexedHeap {
    heap: Vec<usize>,
    slots: Vec<usize>,
}

impl IndexedHeap {
    pub(crate) fn clear(&mut self) {
        for &id in &self.heap {
            self.slots[id] = ABSENT;
        }
        self.heap.clear();
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub(crate) fn contains(&self, id: usize) -> bool {
        self.slots.get(id).is_some_and(|&s| s != ABSENT)
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    /// Members in heap order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.heap.iter().copied()
    }

    /// Insert `id`, or re-sift it if already present.
    pub(crate) fn push(&mut self, id: usize, nodes: &[NodeRecord]) {
        if self.contains(id) {
            self.update(id, nodes);
            return;
        }
        if id >= self.slots.len() {
            self.slots.resize(id + 1, ABSENT);
        }
        let pos = self.heap.len();
        self.heap.push(id);
        self.slots[id] = pos;
        self.sift_up(pos, nodes);
    }

    pub(crate) fn pop(&mut self, nodes: &[NodeRecord]) -> Option<usize> {
        let top = self.peek()?;
        self.remove(top, nodes);
        Some(top)
    }

    /// Remove `id` if present.
    pub(crate) fn remove(&mut self, id: usize, nodes: &[NodeRecord]) -> bool {
        if !self.contains(id) {
            return false;
        }
        let pos = self.slots[id];
        let last = self.heap.len() - 1;
        self.swap(pos, last);
        self.heap.pop();
        self.slots[id] = ABSENT;
        if pos < self.heap.len() {
            self.sift_down(pos, nodes);
            self.sift_up(pos, nodes);
        }
        true
    }

    /// Restore heap order after the costs of `id` changed.
    pub(crate) fn update(&mut self, id: usize, nodes: &[NodeRecord]) {
        if !self.contains(id) {
            return;
        }
        let pos = self.slots[id];
        self.sift_up(pos, nodes);
        let pos = self.slots[id];
        self.sift_down(pos, nodes);
    }

    fn less(&self, a: usize, b: usize, nodes: &[NodeRecord]) -> bool {
        nodes[self.heap[a]].rank_cmp(&nodes[self.heap[b]]).is_lt()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots[self.heap[a]] = a;
        self.slots[self.heap[b]] = b;
    }

    fn sift_up(&mut self, mut pos: usize, nodes: &[NodeRecord]) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.less(pos, parent, nodes) {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize, nodes: &[NodeRecord]) {
        let n = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let child = if right < n && self.less(right, left, nodes) {
                right
            } else {
                left
            };
            if !self.less(child, pos, nodes) {
                break;
            }
            self.swap(pos, child);
            pos = child;
        }
    }
}

/// Open set backed by an indexed binary heap: O(log n) insertion,
/// extraction and decrease-key, O(1) membership.
///
/// Membership is by stable node index, so it relies on every record of a
/// given cell sharing one index (which the engine's arena guarantees).
#[derive(Debug, Default, Clone)]
pub struct PriorityHeap {
    heap: IndexedHeap,
}

impl PriorityHeap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OpenSet for PriorityHeap {
    fn initialize(&mut self) {
        self.heap.clear();
    }

    fn add(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        nodes[id].status = NodeStatus::Open;
        self.heap.push(id, nodes);
    }

    fn best_and_remove(&mut self, nodes: &mut [NodeRecord]) -> Option<usize> {
        self.heap.pop(nodes)
    }

    fn peek_best(&self, _nodes: &[NodeRecord]) -> Option<usize> {
        self.heap.peek()
    }

    fn search(&self, id: usize, _nodes: &[NodeRecord]) -> Option<usize> {
        self.heap.contains(id).then_some(id)
    }

    fn update(&mut self, id: usize, nodes: &[NodeRecord]) {
        self.heap.update(id, nodes);
    }

    fn remove(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        if self.heap.remove(id, nodes) {
            nodes[id].status = NodeStatus::Unvisited;
        }
    }

    fn count(&self) -> usize {
        self.heap.len()
    }

    fn members<'a>(&'a self, _nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        self.heap.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::node_grid;

    fn arena(costs: &[f64]) -> Vec<NodeRecord> {
        let mut nodes = node_grid(costs.len() as i32, 1, 1.0, |_| true)
            .unwrap()
            .cells()
            .to_vec();
        for (n, &c) in nodes.iter_mut().zip(costs) {
            n.g_cost = c;
            n.calculate_f_cost();
        }
        nodes
    }

    fn check_invariant(h: &IndexedHeap, nodes: &[NodeRecord]) {
        for (pos, &id) in h.heap.iter().enumerate() {
            assert_eq!(h.slots[id], pos);
            if pos > 0 {
                let parent = h.heap[(pos - 1) / 2];
                assert!(nodes[parent].rank_cmp(&nodes[id]).is_le());
            }
        }
    }

    #[test]
    fn pops_in_rank_order() {
        let nodes = arena(&[5.0, 1.0, 4.0, 1.0, 3.0, 0.5, 2.0]);
        let mut h = IndexedHeap::default();
        for id in 0..nodes.len() {
            h.push(id, &nodes);
            check_invariant(&h, &nodes);
        }
        let mut order = Vec::new();
        while let Some(id) = h.pop(&nodes) {
            check_invariant(&h, &nodes);
            order.push(id);
        }
        assert_eq!(order, vec![5, 1, 3, 6, 4, 2, 0]);
        assert!(!h.contains(5));
    }

    #[test]
    fn arbitrary_removal_and_decrease_key() {
        let mut nodes = arena(&[5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let mut h = IndexedHeap::default();
        for id in 0..nodes.len() {
            h.push(id, &nodes);
        }
        assert!(h.remove(2, &nodes));
        assert!(!h.remove(2, &nodes));
        check_invariant(&h, &nodes);

        nodes[4].g_cost = 1.0;
        nodes[4].calculate_f_cost();
        h.update(4, &nodes);
        check_invariant(&h, &nodes);
        assert_eq!(h.peek(), Some(4));
        assert_eq!(h.len(), 5);

        h.clear();
        assert_eq!(h.len(), 0);
        assert!(!h.contains(0));
        h.push(3, &nodes);
        assert_eq!(h.peek(), Some(3));
    }

    #[test]
    fn push_existing_resifts_instead_of_duplicating() {
        let mut nodes = arena(&[3.0, 2.0, 1.0]);
        let mut h = IndexedHeap::default();
        h.push(0, &nodes);
        h.push(1, &nodes);
        nodes[0].g_cost = 0.0;
        nodes[0].calculate_f_cost();
        h.push(0, &nodes);
        assert_eq!(h.len(), 2);
        assert_eq!(h.peek(), Some(0));
    }
}
