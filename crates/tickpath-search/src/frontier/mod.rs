//! Open/closed set backends.
//!
//! The engine only talks to a [`Frontier`]. A frontier is either a
//! combined structure ([`NodeArray`]) or any [`OpenSet`] paired with any
//! [`ClosedSet`] through [`Split`].
//!
//! Backends store node indices into the engine's record arena and receive
//! the arena on every call. They keep each record's `status` field in sync
//! with membership: added to open ⇒ `Open`, added to closed ⇒ `Closed`,
//! removed from either ⇒ `Unvisited`. [`Frontier::best_and_remove`] leaves
//! the status untouched; the engine closes the node right after.
//!
//! Extraction order is [`NodeRecord::rank_cmp`] in every backend, so
//! swapping backends never changes a search's result.
//!
//! Membership can be listed with [`Frontier::open_members`] and
//! [`Frontier::closed_members`], in no particular order. A renderer that
//! already walks the grid can read each record's `status` instead.

mod closed_dict;
mod heap;
mod node_array;
mod unordered;

pub use closed_dict::ClosedDictionary;
pub use heap::PriorityHeap;
pub use node_array::NodeArray;
pub use unordered::UnorderedList;

use crate::node::{NodeRecord, NodeStatus};

/// Nodes discovered but not yet expanded.
pub trait OpenSet {
    /// Empty the set.
    fn initialize(&mut self);
    fn add(&mut self, id: usize, nodes: &mut [NodeRecord]);
    /// Remove and return the best node by [`NodeRecord::rank_cmp`].
    fn best_and_remove(&mut self, nodes: &mut [NodeRecord]) -> Option<usize>;
    fn peek_best(&self, nodes: &[NodeRecord]) -> Option<usize>;
    /// The member describing the same cell as `id`, if any.
    fn search(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize>;
    /// Called after a member's costs were lowered in place.
    fn update(&mut self, _id: usize, _nodes: &[NodeRecord]) {}
    fn remove(&mut self, id: usize, nodes: &mut [NodeRecord]);
    fn count(&self) -> usize;
    /// Every member, in no particular order.
    fn members<'a>(&'a self, nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a;
}

/// Nodes already expanded.
pub trait ClosedSet {
    /// Empty the set.
    fn initialize(&mut self);
    fn add(&mut self, id: usize, nodes: &mut [NodeRecord]);
    /// The member describing the same cell as `id`, if any.
    fn search(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize>;
    fn remove(&mut self, id: usize, nodes: &mut [NodeRecord]);
    fn count(&self) -> usize;
    /// Every member, in no particular order.
    fn members<'a>(&'a self, nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a;
}

/// The combined open/closed contract the search engine is generic over.
pub trait Frontier {
    /// Empty both sets.
    fn initialize(&mut self);
    fn add_to_open(&mut self, id: usize, nodes: &mut [NodeRecord]);
    fn best_and_remove(&mut self, nodes: &mut [NodeRecord]) -> Option<usize>;
    fn peek_best(&self, nodes: &[NodeRecord]) -> Option<usize>;
    fn search_in_open(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize>;
    /// Decrease-key hook, called after an open node's costs were lowered.
    fn update_in_open(&mut self, id: usize, nodes: &[NodeRecord]);
    fn remove_from_open(&mut self, id: usize, nodes: &mut [NodeRecord]);
    fn count_open(&self) -> usize;
    fn add_to_closed(&mut self, id: usize, nodes: &mut [NodeRecord]);
    fn search_in_closed(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize>;
    fn remove_from_closed(&mut self, id: usize, nodes: &mut [NodeRecord]);
    fn count_closed(&self) -> usize;
    fn open_members<'a>(&'a self, nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a;
    fn closed_members<'a>(&'a self, nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a;

    /// Membership of `id`, checking closed first.
    fn status_of(&self, id: usize, nodes: &[NodeRecord]) -> NodeStatus {
        if self.search_in_closed(id, nodes).is_some() {
            NodeStatus::Closed
        } else if self.search_in_open(id, nodes).is_some() {
            NodeStatus::Open
        } else {
            NodeStatus::Unvisited
        }
    }
}

/// An independent open set and closed set used together.
#[derive(Debug, Default)]
pub struct Split<O, C> {
    pub open: O,
    pub closed: C,
}

impl<O, C> Split<O, C> {
    pub fn new(open: O, closed: C) -> Self {
        Self { open, closed }
    }
}

impl<O: OpenSet, C: ClosedSet> Frontier for Split<O, C> {
    fn initialize(&mut self) {
        self.open.initialize();
        self.closed.initialize();
    }

    fn add_to_open(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        self.open.add(id, nodes);
    }

    fn best_and_remove(&mut self, nodes: &mut [NodeRecord]) -> Option<usize> {
        self.open.best_and_remove(nodes)
    }

    fn peek_best(&self, nodes: &[NodeRecord]) -> Option<usize> {
        self.open.peek_best(nodes)
    }

    fn search_in_open(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize> {
        self.open.search(id, nodes)
    }

    fn update_in_open(&mut self, id: usize, nodes: &[NodeRecord]) {
        self.open.update(id, nodes);
    }

    fn remove_from_open(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        self.open.remove(id, nodes);
    }

    fn count_open(&self) -> usize {
        self.open.count()
    }

    fn add_to_closed(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        self.closed.add(id, nodes);
    }

    fn search_in_closed(&self, id: usize, nodes: &[NodeRecord]) -> Option<usize> {
        self.closed.search(id, nodes)
    }

    fn remove_from_closed(&mut self, id: usize, nodes: &mut [NodeRecord]) {
        self.closed.remove(id, nodes);
    }

    fn count_closed(&self) -> usize {
        self.closed.count()
    }

    fn open_members<'a>(&'a self, nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        self.open.members(nodes)
    }

    fn closed_members<'a>(&'a self, nodes: &'a [NodeRecord]) -> impl Iterator<Item = usize> + 'a {
        self.closed.members(nodes)
    }
}

/// Unordered list for both sets: the O(n) baseline.
pub type SimpleFrontier = Split<UnorderedList, UnorderedList>;
/// Unordered open list with O(1) closed membership.
pub type DictionaryFrontier = Split<UnorderedList, ClosedDictionary>;
/// Binary-heap open set with O(1) closed membership.
pub type HeapFrontier = Split<PriorityHeap, ClosedDictionary>;
