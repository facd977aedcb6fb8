//! Frame-budgeted grid pathfinding.
//!
//! The centre of this crate is [`AStarPathfinding`], an A* engine that can
//! be advanced a bounded amount of work at a time and resumed on the next
//! frame:
//!
//! ```
//! use tickpath_core::Point;
//! use tickpath_search::{node_grid, AStarPathfinding, EuclideanDistance, NodeArray, SearchResult};
//!
//! let grid = node_grid(5, 5, 1.0, |_| true).unwrap();
//! let mut engine = AStarPathfinding::new(grid, NodeArray::new(), EuclideanDistance);
//! assert!(engine.initialize_search(Point::new(0, 0), Point::new(4, 4)));
//! let path = loop {
//!     match engine.search(8) {
//!         SearchResult::Pending => continue,
//!         SearchResult::Found(path) => break path,
//!         other => panic!("{other:?}"),
//!     }
//! };
//! assert_eq!(path.cost(), 6.0);
//! ```
//!
//! # Frontier backends
//!
//! | Backend | Open set | Closed set |
//! |---|---|---|
//! | [`SimpleFrontier`] | [`UnorderedList`], O(n) | [`UnorderedList`], O(n) |
//! | [`DictionaryFrontier`] | [`UnorderedList`], O(n) | [`ClosedDictionary`], O(1) |
//! | [`HeapFrontier`] | [`PriorityHeap`], O(log n) | [`ClosedDictionary`], O(1) |
//! | [`NodeArray`] | indexed heap, O(log n) | record status, O(1) |
//!
//! All of them extract nodes in the same order, so they produce identical
//! paths.
//!
//! # Goal bounding
//!
//! [`GoalBoundPathfinding`] adds a per-map preprocessing pass whose
//! [`GoalBounds`] table prunes expansions that cannot lie on a shortest
//! path. Tables can be saved and loaded with [`BoundsEncoder`] and
//! [`BoundsDecoder`].

mod astar;
mod codec;
mod config;
mod distance;
mod error;
mod frontier;
mod goalbound;
mod heuristic;
mod neighbors;
mod node;

pub use astar::{AStarPathfinding, Path, SearchResult, SearchStats, UNBOUNDED};
pub use codec::{BoundsDecoder, BoundsEncoder};
pub use config::SearchConfig;
pub use distance::{MoveCosts, euclidean};
pub use error::GoalBoundsError;
pub use frontier::{
    ClosedDictionary, ClosedSet, DictionaryFrontier, Frontier, HeapFrontier, NodeArray, OpenSet,
    PriorityHeap, SimpleFrontier, Split, UnorderedList,
};
pub use goalbound::{
    BoundBox, BoundRecord, Direction, GoalBoundPathfinding, GoalBounds, MAX_TABLE_CELLS,
    PreprocessStatus, fingerprint,
};
pub use heuristic::{EuclideanDistance, Heuristic, ZeroHeuristic};
pub use neighbors::Neighbors;
pub use node::{NodeRecord, NodeStatus, node_grid};
